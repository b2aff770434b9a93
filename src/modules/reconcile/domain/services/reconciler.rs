use super::similarity::{best_match, SimilarityStrategy, SorensenDiceStrategy};
use crate::modules::reconcile::domain::value_objects::decision::{
    Decision, MatchResult, MatchType, SkipReason, StagedField,
};
use crate::modules::units::domain::entities::unit_record::is_empty_field;
use crate::modules::units::{EntityKind, IncomingRecord, UnitRecord};
use crate::shared::errors::{AppError, AppResult};

/// Threshold configuration for one entity kind.
///
/// Scores strictly above `near_duplicate_threshold` are treated as noise on
/// an existing name and skipped. Scores from `confirm_threshold` up to and
/// including `near_duplicate_threshold` go to the operator for confirmation.
/// Everything below inserts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcilerConfig {
    pub near_duplicate_threshold: f64,
    pub confirm_threshold: f64,
}

impl ReconcilerConfig {
    pub fn new(near_duplicate_threshold: f64, confirm_threshold: f64) -> AppResult<Self> {
        let config = Self {
            near_duplicate_threshold,
            confirm_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    /// Historical per-table thresholds carried over from the legacy scripts.
    pub fn for_kind(kind: EntityKind) -> Self {
        Self {
            near_duplicate_threshold: kind.near_duplicate_threshold(),
            confirm_threshold: 0.8,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        for (label, value) in [
            ("near_duplicate_threshold", self.near_duplicate_threshold),
            ("confirm_threshold", self.confirm_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::InvalidInput(format!(
                    "{} must be in [0, 1], got {}",
                    label, value
                )));
            }
        }
        if self.confirm_threshold > self.near_duplicate_threshold {
            return Err(AppError::InvalidInput(format!(
                "confirm_threshold {} exceeds near_duplicate_threshold {}",
                self.confirm_threshold, self.near_duplicate_threshold
            )));
        }
        Ok(())
    }
}

/// Decides the fate of incoming records against the persisted set of one
/// entity kind. Pure decision logic: no I/O happens here, which is what makes
/// re-running an import idempotent and the whole procedure testable with
/// plain data.
pub struct Reconciler {
    config: ReconcilerConfig,
    strategy: Box<dyn SimilarityStrategy>,
}

impl Reconciler {
    pub fn new(config: ReconcilerConfig) -> Self {
        Self {
            config,
            strategy: Box::new(SorensenDiceStrategy),
        }
    }

    pub fn with_strategy(config: ReconcilerConfig, strategy: Box<dyn SimilarityStrategy>) -> Self {
        Self { config, strategy }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Classify an incoming name against the existing name set.
    pub fn classify(&self, name: &str, existing_names: &[String]) -> MatchResult {
        match best_match(self.strategy.as_ref(), name, existing_names) {
            None => MatchResult {
                match_type: MatchType::None,
                matched_name: None,
                score: 0.0,
            },
            Some(hit) => {
                let match_type = if hit.score > self.config.near_duplicate_threshold {
                    MatchType::NearDuplicate
                } else if hit.score >= self.config.confirm_threshold {
                    MatchType::Similar
                } else {
                    MatchType::None
                };
                MatchResult {
                    match_type,
                    matched_name: Some(hit.name),
                    score: hit.score,
                }
            }
        }
    }

    /// The decision procedure. `exact` is the record whose name equals
    /// `incoming.name` exactly, if any; `existing_names` is the full name set
    /// of the kind and is only consulted when there is no exact match.
    pub fn reconcile(
        &self,
        incoming: &IncomingRecord,
        exact: Option<&UnitRecord>,
        existing_names: &[String],
    ) -> AppResult<Decision> {
        incoming.validate()?;

        // Exact name match: fill gaps, never insert a second row
        if let Some(existing) = exact {
            let fields = Self::stage_backfill(existing, incoming);
            return Ok(if fields.is_empty() {
                Decision::Skip {
                    reason: SkipReason::CompleteData,
                }
            } else {
                Decision::Backfill {
                    id: existing.id,
                    fields,
                }
            });
        }

        let matched = self.classify(&incoming.name, existing_names);
        let decision = match matched.match_type {
            MatchType::NearDuplicate => Decision::Skip {
                reason: SkipReason::NearDuplicate {
                    of: matched.matched_name.unwrap_or_default(),
                    score: matched.score,
                },
            },
            MatchType::Similar => Decision::Prompt {
                candidate: matched.matched_name.unwrap_or_default(),
                score: matched.score,
            },
            MatchType::None | MatchType::Exact => Decision::Insert,
        };
        Ok(decision)
    }

    /// Stage values for every field the persisted record is missing and the
    /// incoming record carries. Populated fields are never touched.
    fn stage_backfill(existing: &UnitRecord, incoming: &IncomingRecord) -> Vec<StagedField> {
        let mut fields = Vec::new();

        if is_empty_field(&existing.formation_site) {
            if let Some(site) = &incoming.formation_site {
                fields.push(StagedField::FormationSite(site.clone()));
            }
        }
        if existing.formation_date.is_none() {
            if let Some(date) = incoming.formation_date {
                fields.push(StagedField::FormationDate(date));
            }
        }
        if existing.location.is_none() {
            if let Some(geo) = incoming.formation_geo {
                fields.push(StagedField::Location(geo));
            }
        }
        if is_empty_field(&existing.description) {
            if let Some(description) = &incoming.description {
                fields.push(StagedField::Description(description.clone()));
            }
        }
        if is_empty_field(&existing.wikipedia_url) {
            if let Some(url) = &incoming.wikipedia_url {
                fields.push(StagedField::WikipediaUrl(url.clone()));
            }
        }

        fields
    }
}
