use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use nob_atlas::modules::reconcile::domain::value_objects::decision::StagedField;
use nob_atlas::modules::reconcile::UnitStore;
use nob_atlas::modules::units::{EntityKind, IncomingRecord, UnitRecord};
use nob_atlas::{AppError, AppResult};

/// In-memory `UnitStore` keeping one record set per entity kind, with the
/// same visible behavior as the MySQL store: exact-name lookup, name lists,
/// max-id, explicit-id insert and field backfill.
#[derive(Default)]
pub struct InMemoryUnitStore {
    tables: Mutex<HashMap<EntityKind, HashMap<i32, UnitRecord>>>,
}

impl InMemoryUnitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(kind: EntityKind, records: Vec<UnitRecord>) -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.lock().unwrap();
            tables.insert(kind, records.into_iter().map(|r| (r.id, r)).collect());
        }
        store
    }

    pub fn ids(&self, kind: EntityKind) -> Vec<i32> {
        let tables = self.tables.lock().unwrap();
        let mut ids: Vec<i32> = tables
            .get(&kind)
            .map(|t| t.keys().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    pub fn get(&self, kind: EntityKind, id: i32) -> Option<UnitRecord> {
        self.tables
            .lock()
            .unwrap()
            .get(&kind)
            .and_then(|t| t.get(&id))
            .cloned()
    }
}

#[async_trait]
impl UnitStore for InMemoryUnitStore {
    async fn find_by_name(&self, kind: EntityKind, name: &str) -> AppResult<Option<UnitRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .get(&kind)
            .and_then(|t| t.values().find(|r| r.name == name))
            .cloned())
    }

    async fn list_names(&self, kind: EntityKind) -> AppResult<Vec<String>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .get(&kind)
            .map(|t| t.values().map(|r| r.name.clone()).collect())
            .unwrap_or_default())
    }

    async fn max_id(&self, kind: EntityKind) -> AppResult<Option<i32>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.get(&kind).and_then(|t| t.keys().copied().max()))
    }

    async fn insert(&self, kind: EntityKind, id: i32, record: &IncomingRecord) -> AppResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let table = tables.entry(kind).or_default();
        if table.contains_key(&id) {
            return Err(AppError::StorageError(format!(
                "Duplicate id {} in {}",
                id,
                kind.table_name()
            )));
        }
        table.insert(
            id,
            UnitRecord {
                id,
                name: record.name.clone(),
                formation_date: record.formation_date,
                formation_site: record.formation_site.clone(),
                location: record.formation_geo,
                description: record.description.clone(),
                wikipedia_url: record.wikipedia_url.clone(),
            },
        );
        Ok(())
    }

    async fn backfill(&self, kind: EntityKind, id: i32, fields: &[StagedField]) -> AppResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let record = tables
            .get_mut(&kind)
            .and_then(|t| t.get_mut(&id))
            .ok_or_else(|| AppError::NotFound(format!("id {} in {}", id, kind.table_name())))?;
        for field in fields {
            match field {
                StagedField::FormationSite(v) => record.formation_site = Some(v.clone()),
                StagedField::FormationDate(v) => record.formation_date = Some(*v),
                StagedField::Location(v) => record.location = Some(*v),
                StagedField::Description(v) => record.description = Some(v.clone()),
                StagedField::WikipediaUrl(v) => record.wikipedia_url = Some(v.clone()),
            }
        }
        Ok(())
    }

    async fn list_all(&self, kind: EntityKind) -> AppResult<Vec<UnitRecord>> {
        let tables = self.tables.lock().unwrap();
        let mut records: Vec<UnitRecord> = tables
            .get(&kind)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }
}
