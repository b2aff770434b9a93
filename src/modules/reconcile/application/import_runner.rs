use std::sync::Arc;

use crate::modules::reconcile::application::ports::confirmation::ConfirmationPort;
use crate::modules::reconcile::application::ports::unit_store::UnitStore;
use crate::modules::reconcile::domain::services::reconciler::Reconciler;
use crate::modules::reconcile::domain::value_objects::decision::{
    Decision, ImportSummary, RecordOutcome, SkipReason, StagedField,
};
use crate::modules::units::{EntityKind, IncomingRecord};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::{LogContext, TimedOperation};
use crate::{log_info, log_warn};

/// Drives one import batch through the reconciler, strictly sequentially:
/// each record is fully decided and applied before the next is looked at.
///
/// Per-record failures (bad input, storage errors) are logged and counted;
/// they never abort the batch. Only an unreachable store or confirmation
/// channel surfaces as an error from `run`.
pub struct ImportRunner {
    store: Arc<dyn UnitStore>,
    confirmation: Arc<dyn ConfirmationPort>,
}

impl ImportRunner {
    pub fn new(store: Arc<dyn UnitStore>, confirmation: Arc<dyn ConfirmationPort>) -> Self {
        Self {
            store,
            confirmation,
        }
    }

    pub async fn run(
        &self,
        kind: EntityKind,
        reconciler: &Reconciler,
        batch: Vec<IncomingRecord>,
    ) -> AppResult<ImportSummary> {
        let timer = TimedOperation::new("import_batch");
        let mut summary = ImportSummary::default();
        let total = batch.len();

        for (index, incoming) in batch.into_iter().enumerate() {
            LogContext::import_progress(index + 1, total, &incoming.name);

            let outcome = match self.process_record(kind, reconciler, &incoming).await {
                Ok(outcome) => outcome,
                Err(AppError::ValidationError(reason)) => RecordOutcome::Rejected { reason },
                Err(e) => RecordOutcome::Failed {
                    reason: e.to_string(),
                },
            };

            self.log_outcome(kind, &incoming.name, &outcome);
            summary.record(&incoming.name, &outcome);
        }

        timer.finish_with_info(&format!(
            "{} record(s): {} inserted, {} updated, {} skipped, {} rejected, {} failed",
            summary.total,
            summary.inserted,
            summary.updated,
            summary.skipped,
            summary.rejected,
            summary.failed.len()
        ));
        Ok(summary)
    }

    async fn process_record(
        &self,
        kind: EntityKind,
        reconciler: &Reconciler,
        incoming: &IncomingRecord,
    ) -> AppResult<RecordOutcome> {
        incoming.validate()?;

        let exact = self.store.find_by_name(kind, &incoming.name).await?;
        let names = if exact.is_some() {
            Vec::new()
        } else {
            self.store.list_names(kind).await?
        };

        let decision = reconciler.reconcile(incoming, exact.as_ref(), &names)?;

        // Ambiguous matches block here until the operator answers
        let decision = match decision {
            Decision::Prompt { candidate, score } => {
                self.resolve_prompt(kind, incoming, candidate, score).await
            }
            other => other,
        };

        self.apply(kind, incoming, decision).await
    }

    async fn resolve_prompt(
        &self,
        kind: EntityKind,
        incoming: &IncomingRecord,
        candidate: String,
        score: f64,
    ) -> Decision {
        let question = format!(
            "{} \"{}\" is somewhat similar to \"{}\" (score {:.3}). Do you want to insert it? (yes/no): ",
            kind.label(),
            incoming.name,
            candidate,
            score
        );

        match self.confirmation.confirm(&question).await {
            Ok(true) => Decision::Insert,
            Ok(false) => Decision::Skip {
                reason: SkipReason::Declined { candidate },
            },
            // Fail safe: an unreachable channel never inserts a possible duplicate
            Err(e) => {
                log_warn!(
                    "Confirmation channel unavailable ({}); skipping \"{}\"",
                    e,
                    incoming.name
                );
                Decision::Skip {
                    reason: SkipReason::Declined { candidate },
                }
            }
        }
    }

    /// Perform the I/O a decision calls for. Insert ids come from a plain
    /// max+1 read; see `UnitStore` for the single-writer caveat.
    async fn apply(
        &self,
        kind: EntityKind,
        incoming: &IncomingRecord,
        decision: Decision,
    ) -> AppResult<RecordOutcome> {
        match decision {
            Decision::Insert => {
                let next_id = self.store.max_id(kind).await?.unwrap_or(0) + 1;
                self.store.insert(kind, next_id, incoming).await?;
                Ok(RecordOutcome::Inserted { id: next_id })
            }
            Decision::Backfill { id, fields } => {
                let columns: Vec<&'static str> = fields.iter().map(StagedField::column).collect();
                self.store.backfill(kind, id, &fields).await?;
                Ok(RecordOutcome::Updated { id, columns })
            }
            Decision::Skip { reason } => Ok(RecordOutcome::Skipped { reason }),
            Decision::Prompt { .. } => unreachable!("prompts are resolved before apply"),
        }
    }

    fn log_outcome(&self, kind: EntityKind, name: &str, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Inserted { id } => {
                log_info!("{} \"{}\" inserted with id {}", kind.label(), name, id)
            }
            RecordOutcome::Updated { id, columns } => log_info!(
                "{} \"{}\" (id {}) updated with missing data: {}",
                kind.label(),
                name,
                id,
                columns.join(", ")
            ),
            RecordOutcome::Skipped { reason } => {
                log_info!("{} \"{}\" skipped: {}", kind.label(), name, reason)
            }
            RecordOutcome::Rejected { reason } => {
                log_warn!("{} record rejected: {}", kind.label(), reason)
            }
            RecordOutcome::Failed { reason } => log_warn!(
                "{} \"{}\" could not be applied: {}",
                kind.label(),
                name,
                reason
            ),
        }
    }
}
