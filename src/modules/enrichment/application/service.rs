use std::sync::Arc;

use serde::Deserialize;

use crate::modules::enrichment::application::ports::text_generator::TextGenerator;
use crate::modules::reconcile::domain::value_objects::decision::StagedField;
use crate::modules::reconcile::UnitStore;
use crate::modules::units::domain::entities::unit_record::is_empty_field;
use crate::modules::units::{EntityKind, GeoPoint, UnitRecord};
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::LogContext;
use crate::{log_info, log_warn};

/// Fills gaps in persisted records from the completion service: structured
/// markdown descriptions, and formation sites with coordinates.
///
/// Everything goes through the store's backfill operation, so enrichment can
/// only ever write into empty fields; re-running it is harmless.
pub struct EnrichmentService {
    store: Arc<dyn UnitStore>,
    generator: Arc<dyn TextGenerator>,
}

/// Shape the locate prompt asks the service to answer with.
#[derive(Debug, Deserialize)]
struct SiteAnswer {
    formation_site: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Default)]
pub struct EnrichmentSummary {
    pub scanned: usize,
    pub enriched: usize,
    pub unresolved: usize,
    pub failed: usize,
}

impl EnrichmentService {
    pub fn new(store: Arc<dyn UnitStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { store, generator }
    }

    /// Generate markdown descriptions for records that have none.
    pub async fn describe_missing(&self, kind: EntityKind) -> AppResult<EnrichmentSummary> {
        let records = self.store.list_all(kind).await?;
        let total = records.len();
        let mut summary = EnrichmentSummary::default();

        for (index, record) in records.iter().enumerate() {
            if !is_empty_field(&record.description) {
                continue;
            }
            summary.scanned += 1;
            LogContext::import_progress(index + 1, total, &record.name);

            let prompt = Self::describe_prompt(kind, record);
            match self.generator.complete(&prompt).await {
                Ok(markdown) if !markdown.trim().is_empty() => {
                    self.store
                        .backfill(kind, record.id, &[StagedField::Description(markdown)])
                        .await?;
                    summary.enriched += 1;
                    log_info!("Generated description for \"{}\"", record.name);
                }
                Ok(_) => {
                    summary.unresolved += 1;
                    log_warn!("Empty description returned for \"{}\"", record.name);
                }
                Err(e) => {
                    summary.failed += 1;
                    log_warn!("Description generation failed for \"{}\": {}", record.name, e);
                }
            }
        }

        Ok(summary)
    }

    /// Resolve formation sites and coordinates for records missing them.
    pub async fn fill_formation_sites(&self, kind: EntityKind) -> AppResult<EnrichmentSummary> {
        let records = self.store.list_all(kind).await?;
        let total = records.len();
        let mut summary = EnrichmentSummary::default();

        for (index, record) in records.iter().enumerate() {
            let needs_site = is_empty_field(&record.formation_site);
            let needs_location = record.location.is_none();
            if !needs_site && !needs_location {
                continue;
            }
            summary.scanned += 1;
            LogContext::import_progress(index + 1, total, &record.name);

            let answer = match self.ask_for_site(kind, record).await {
                Ok(answer) => answer,
                Err(e) => {
                    summary.failed += 1;
                    log_warn!("Site lookup failed for \"{}\": {}", record.name, e);
                    continue;
                }
            };

            let mut fields = Vec::new();
            if needs_site {
                if let Some(site) = answer.formation_site.filter(|s| !s.trim().is_empty()) {
                    fields.push(StagedField::FormationSite(site));
                }
            }
            if needs_location {
                if let (Some(lat), Some(lon)) = (answer.latitude, answer.longitude) {
                    match GeoPoint::new(lat, lon) {
                        Ok(point) => fields.push(StagedField::Location(point)),
                        Err(e) => {
                            log_warn!("Discarding coordinates for \"{}\": {}", record.name, e)
                        }
                    }
                }
            }

            if fields.is_empty() {
                summary.unresolved += 1;
                log_info!("No formation site found for \"{}\"", record.name);
                continue;
            }

            let columns: Vec<&str> = fields.iter().map(StagedField::column).collect();
            self.store.backfill(kind, record.id, &fields).await?;
            summary.enriched += 1;
            log_info!("Enriched \"{}\" with: {}", record.name, columns.join(", "));
        }

        Ok(summary)
    }

    async fn ask_for_site(&self, kind: EntityKind, record: &UnitRecord) -> AppResult<SiteAnswer> {
        let prompt = Self::locate_prompt(kind, record);
        let reply = self.generator.complete(&prompt).await?;
        // The prompt demands bare JSON; anything else fails the parse and
        // counts against this record only
        Ok(serde_json::from_str(reply.trim())?)
    }

    fn describe_prompt(kind: EntityKind, record: &UnitRecord) -> String {
        format!(
            "You are a military historian specializing in World War II and the Yugoslav \
             Partisan movement.\n\
             Write a structured markdown document about the {} \"{}\" with sections for \
             formation (date, place, constituent units, strength, commander, commissar) \
             and combat path. Translate any non-English source material to English. \
             Where information is not known, write \"Information not available\" — \
             do not invent facts.",
            kind.label(),
            record.name
        )
    }

    fn locate_prompt(kind: EntityKind, record: &UnitRecord) -> String {
        format!(
            "You are analyzing a WW2 military {}: \"{}\".\n\
             Based on the historical context (WW2, Yugoslavia/Balkans region), determine \
             where it was formed and the approximate coordinates of that place.\n\
             Respond with JSON only, in exactly this shape:\n\
             {{\"formation_site\": \"City/Location Name\", \"latitude\": 44.8125, \
             \"longitude\": 20.4612}}\n\
             Use null for anything you cannot determine.",
            kind.label(),
            record.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::units::IncomingRecord;
    use crate::shared::errors::AppError;
    use async_trait::async_trait;
    use mockall::mock;
    use std::collections::HashMap;
    use std::sync::Mutex;

    mock! {
        Generator {}

        #[async_trait]
        impl TextGenerator for Generator {
            async fn complete(&self, prompt: &str) -> AppResult<String>;
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<HashMap<i32, UnitRecord>>,
    }

    impl MemoryStore {
        fn with_records(records: Vec<UnitRecord>) -> Self {
            Self {
                records: Mutex::new(records.into_iter().map(|r| (r.id, r)).collect()),
            }
        }

        fn get(&self, id: i32) -> UnitRecord {
            self.records.lock().unwrap().get(&id).unwrap().clone()
        }
    }

    #[async_trait]
    impl UnitStore for MemoryStore {
        async fn find_by_name(
            &self,
            _kind: EntityKind,
            name: &str,
        ) -> AppResult<Option<UnitRecord>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .find(|r| r.name == name)
                .cloned())
        }

        async fn list_names(&self, _kind: EntityKind) -> AppResult<Vec<String>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .map(|r| r.name.clone())
                .collect())
        }

        async fn max_id(&self, _kind: EntityKind) -> AppResult<Option<i32>> {
            Ok(self.records.lock().unwrap().keys().copied().max())
        }

        async fn insert(
            &self,
            _kind: EntityKind,
            _id: i32,
            _record: &IncomingRecord,
        ) -> AppResult<()> {
            Err(AppError::StorageError("not used".to_string()))
        }

        async fn backfill(
            &self,
            _kind: EntityKind,
            id: i32,
            fields: &[StagedField],
        ) -> AppResult<()> {
            let mut records = self.records.lock().unwrap();
            let record = records
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("id {}", id)))?;
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

        async fn list_all(&self, _kind: EntityKind) -> AppResult<Vec<UnitRecord>> {
            let mut records: Vec<UnitRecord> =
                self.records.lock().unwrap().values().cloned().collect();
            records.sort_by_key(|r| r.id);
            Ok(records)
        }
    }

    fn bare_record(id: i32, name: &str) -> UnitRecord {
        UnitRecord {
            id,
            name: name.to_string(),
            formation_date: None,
            formation_site: None,
            location: None,
            description: None,
            wikipedia_url: None,
        }
    }

    #[tokio::test]
    async fn describe_fills_only_records_without_description() {
        let described = UnitRecord {
            description: Some("already written".to_string()),
            ..bare_record(1, "1st Proletarian Brigade")
        };
        let store = Arc::new(MemoryStore::with_records(vec![
            described,
            bare_record(2, "Mosor Detachment"),
        ]));

        let mut generator = MockGenerator::new();
        generator
            .expect_complete()
            .withf(|prompt| prompt.contains("Mosor Detachment"))
            .times(1)
            .returning(|_| Ok("## Mosor Detachment\n...".to_string()));

        let service = EnrichmentService::new(store.clone(), Arc::new(generator));
        let summary = service
            .describe_missing(EntityKind::Detachment)
            .await
            .unwrap();

        assert_eq!(summary.enriched, 1);
        assert_eq!(store.get(1).description.as_deref(), Some("already written"));
        assert!(store.get(2).description.unwrap().contains("Mosor"));
    }

    #[tokio::test]
    async fn locate_backfills_site_and_coordinates() {
        let store = Arc::new(MemoryStore::with_records(vec![bare_record(
            7,
            "3rd Dalmatian Brigade",
        )]));

        let mut generator = MockGenerator::new();
        generator.expect_complete().times(1).returning(|_| {
            Ok(r#"{"formation_site": "Imotski", "latitude": 43.45, "longitude": 17.22}"#
                .to_string())
        });

        let service = EnrichmentService::new(store.clone(), Arc::new(generator));
        let summary = service
            .fill_formation_sites(EntityKind::Brigade)
            .await
            .unwrap();

        assert_eq!(summary.enriched, 1);
        let record = store.get(7);
        assert_eq!(record.formation_site.as_deref(), Some("Imotski"));
        assert_eq!(record.location.unwrap().latitude, 43.45);
    }

    #[tokio::test]
    async fn locate_never_touches_populated_site() {
        let existing = UnitRecord {
            formation_site: Some("Split".to_string()),
            ..bare_record(7, "3rd Dalmatian Brigade")
        };
        let store = Arc::new(MemoryStore::with_records(vec![existing]));

        let mut generator = MockGenerator::new();
        generator.expect_complete().times(1).returning(|_| {
            Ok(r#"{"formation_site": "Imotski", "latitude": 43.45, "longitude": 17.22}"#
                .to_string())
        });

        let service = EnrichmentService::new(store.clone(), Arc::new(generator));
        service
            .fill_formation_sites(EntityKind::Brigade)
            .await
            .unwrap();

        let record = store.get(7);
        // Site was populated and stays; only the missing location is filled
        assert_eq!(record.formation_site.as_deref(), Some("Split"));
        assert!(record.location.is_some());
    }

    #[tokio::test]
    async fn null_answer_counts_as_unresolved() {
        let store = Arc::new(MemoryStore::with_records(vec![bare_record(
            1,
            "Biokovo Detachment",
        )]));

        let mut generator = MockGenerator::new();
        generator.expect_complete().times(1).returning(|_| {
            Ok(r#"{"formation_site": null, "latitude": null, "longitude": null}"#.to_string())
        });

        let service = EnrichmentService::new(store.clone(), Arc::new(generator));
        let summary = service
            .fill_formation_sites(EntityKind::Detachment)
            .await
            .unwrap();

        assert_eq!(summary.unresolved, 1);
        assert_eq!(summary.enriched, 0);
        assert!(store.get(1).formation_site.is_none());
    }

    #[tokio::test]
    async fn service_failure_on_one_record_continues_with_the_rest() {
        let store = Arc::new(MemoryStore::with_records(vec![
            bare_record(1, "Biokovo Detachment"),
            bare_record(2, "Mosor Detachment"),
        ]));

        let mut generator = MockGenerator::new();
        let mut calls = 0;
        generator.expect_complete().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(AppError::ApiError("overloaded".to_string()))
            } else {
                Ok(r#"{"formation_site": "Omiš", "latitude": 43.44, "longitude": 16.69}"#
                    .to_string())
            }
        });

        let service = EnrichmentService::new(store.clone(), Arc::new(generator));
        let summary = service
            .fill_formation_sites(EntityKind::Detachment)
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.enriched, 1);
    }
}
