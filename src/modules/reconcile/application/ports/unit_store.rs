use async_trait::async_trait;

use crate::modules::reconcile::domain::value_objects::decision::StagedField;
use crate::modules::units::{EntityKind, IncomingRecord, UnitRecord};
use crate::shared::errors::AppResult;

/// Port for the persisted unit store. The infrastructure layer provides the
/// MySQL implementation; tests substitute an in-memory one.
///
/// All operations are single-row atomic. Nothing here takes a lock across the
/// max-id read and the following insert: concurrent importers can race and
/// mint duplicate ids. The tooling assumes one writer at a time.
#[async_trait]
pub trait UnitStore: Send + Sync {
    /// Exact-name lookup, zero or one record.
    async fn find_by_name(&self, kind: EntityKind, name: &str) -> AppResult<Option<UnitRecord>>;

    /// Every name currently stored for the kind.
    async fn list_names(&self, kind: EntityKind) -> AppResult<Vec<String>>;

    /// Highest assigned id for the kind, None for an empty table.
    async fn max_id(&self, kind: EntityKind) -> AppResult<Option<i32>>;

    /// Insert a new record under an explicitly chosen id.
    async fn insert(&self, kind: EntityKind, id: i32, record: &IncomingRecord) -> AppResult<()>;

    /// Fill the given fields of an existing record. Callers only ever pass
    /// fields that were staged against an empty column.
    async fn backfill(&self, kind: EntityKind, id: i32, fields: &[StagedField]) -> AppResult<()>;

    /// Full listing, used by export and enrichment.
    async fn list_all(&self, kind: EntityKind) -> AppResult<Vec<UnitRecord>>;
}
