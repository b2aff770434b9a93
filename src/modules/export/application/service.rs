use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::log_info;
use crate::modules::reconcile::UnitStore;
use crate::modules::units::EntityKind;
use crate::shared::errors::AppResult;

/// Dumps the persisted records of one kind to a JSON file, for offline
/// processing and as input to the markdown-generation pipeline.
pub struct ExportService {
    store: Arc<dyn UnitStore>,
}

impl ExportService {
    pub fn new(store: Arc<dyn UnitStore>) -> Self {
        Self { store }
    }

    /// Writes pretty-printed JSON and returns the number of exported records.
    pub async fn export(&self, kind: EntityKind, output: &Path) -> AppResult<usize> {
        let records = self.store.list_all(kind).await?;

        let json = serde_json::to_string_pretty(&records)?;
        fs::write(output, json)?;

        log_info!(
            "Exported {} {} record(s) to {}",
            records.len(),
            kind.label(),
            output.display()
        );
        Ok(records.len())
    }
}
