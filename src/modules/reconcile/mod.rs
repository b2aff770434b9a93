pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::import_runner::ImportRunner;
pub use application::ports::confirmation::ConfirmationPort;
pub use application::ports::unit_store::UnitStore;
pub use domain::services::reconciler::{Reconciler, ReconcilerConfig};
pub use domain::value_objects::decision::{Decision, ImportSummary, RecordOutcome};
