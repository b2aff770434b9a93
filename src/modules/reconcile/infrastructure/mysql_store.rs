use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Date, Double, Integer, Nullable, Text};
use tokio::task;

use crate::modules::reconcile::application::ports::unit_store::UnitStore;
use crate::modules::reconcile::domain::value_objects::decision::StagedField;
use crate::modules::units::{EntityKind, GeoPoint, IncomingRecord, UnitRecord};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::LogContext;
use crate::shared::Database;

/// MySQL-backed unit store.
///
/// The geometry column never crosses the wire as a binary value: writes go
/// through `ST_GeomFromText` on a WKT string and reads come back as
/// `ST_X`/`ST_Y` doubles, the same way the rest of the project's SQL handles
/// locations. Table names are compile-time constants from `EntityKind`, so
/// interpolating them into the statements is safe.
pub struct MysqlUnitStore {
    db: Arc<Database>,
}

impl MysqlUnitStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[derive(QueryableByName)]
struct UnitRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Nullable<Date>)]
    formation_date: Option<NaiveDate>,
    #[diesel(sql_type = Nullable<Text>)]
    formation_site: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    description: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    wikipedia_url: Option<String>,
    #[diesel(sql_type = Nullable<Double>)]
    lat: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    lon: Option<f64>,
}

#[derive(QueryableByName)]
struct NameRow {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct MaxIdRow {
    #[diesel(sql_type = Nullable<Integer>)]
    max_id: Option<i32>,
}

impl UnitRow {
    fn into_record(self) -> UnitRecord {
        // A half-read point cannot come out of a POINT column; treat it as absent
        let location = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => GeoPoint::new(lat, lon).ok(),
            _ => None,
        };
        UnitRecord {
            id: self.id,
            name: self.name,
            formation_date: self.formation_date,
            formation_site: self.formation_site,
            location,
            description: self.description,
            wikipedia_url: self.wikipedia_url,
        }
    }
}

fn select_clause(table: &str) -> String {
    format!(
        "SELECT id, name, formation_date, formation_site, description, wikipedia_url, \
         ST_Y(location) AS lat, ST_X(location) AS lon FROM {}",
        table
    )
}

#[async_trait]
impl UnitStore for MysqlUnitStore {
    async fn find_by_name(&self, kind: EntityKind, name: &str) -> AppResult<Option<UnitRecord>> {
        let db = Arc::clone(&self.db);
        let name = name.to_string();
        let table = kind.table_name();

        let row = task::spawn_blocking(move || -> AppResult<Option<UnitRow>> {
            let mut conn = db.get_connection()?;
            let rows: Vec<UnitRow> = sql_query(format!("{} WHERE name = ?", select_clause(table)))
                .bind::<Text, _>(&name)
                .load(&mut conn)?;
            Ok(rows.into_iter().next())
        })
        .await??;

        Ok(row.map(UnitRow::into_record))
    }

    async fn list_names(&self, kind: EntityKind) -> AppResult<Vec<String>> {
        let db = Arc::clone(&self.db);
        let table = kind.table_name();

        let names = task::spawn_blocking(move || -> AppResult<Vec<String>> {
            let mut conn = db.get_connection()?;
            let rows: Vec<NameRow> =
                sql_query(format!("SELECT name FROM {}", table)).load(&mut conn)?;
            Ok(rows.into_iter().map(|r| r.name).collect())
        })
        .await??;

        Ok(names)
    }

    async fn max_id(&self, kind: EntityKind) -> AppResult<Option<i32>> {
        let db = Arc::clone(&self.db);
        let table = kind.table_name();

        let row = task::spawn_blocking(move || -> AppResult<MaxIdRow> {
            let mut conn = db.get_connection()?;
            let row = sql_query(format!("SELECT MAX(id) AS max_id FROM {}", table))
                .get_result(&mut conn)?;
            Ok(row)
        })
        .await??;

        Ok(row.max_id)
    }

    async fn insert(&self, kind: EntityKind, id: i32, record: &IncomingRecord) -> AppResult<()> {
        let db = Arc::clone(&self.db);
        let table = kind.table_name();
        let record = record.clone();
        let wkt = record.formation_geo.map(|geo| geo.to_wkt());

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;
            let statement = format!(
                "INSERT INTO {} (id, name, formation_date, formation_site, location, \
                 description, wikipedia_url) \
                 VALUES (?, ?, ?, ?, ST_GeomFromText(?), ?, ?)",
                table
            );
            let affected = sql_query(statement)
                .bind::<Integer, _>(id)
                .bind::<Text, _>(&record.name)
                .bind::<Nullable<Date>, _>(record.formation_date)
                .bind::<Nullable<Text>, _>(&record.formation_site)
                .bind::<Nullable<Text>, _>(&wkt)
                .bind::<Nullable<Text>, _>(&record.description)
                .bind::<Nullable<Text>, _>(&record.wikipedia_url)
                .execute(&mut conn)?;
            if affected != 1 {
                return Err(AppError::StorageError(format!(
                    "Insert into {} affected {} rows",
                    table, affected
                )));
            }
            Ok(())
        })
        .await??;

        LogContext::db_operation("INSERT", kind.table_name(), None);
        Ok(())
    }

    async fn backfill(&self, kind: EntityKind, id: i32, fields: &[StagedField]) -> AppResult<()> {
        if fields.is_empty() {
            return Ok(());
        }

        let db = Arc::clone(&self.db);
        let table = kind.table_name();
        let fields = fields.to_vec();

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;

            // SET list mirrors the staged fields; binds are chained in the
            // same order on the boxed query
            let assignments: Vec<String> = fields
                .iter()
                .map(|field| match field {
                    StagedField::Location(_) => "location = ST_GeomFromText(?)".to_string(),
                    other => format!("{} = ?", other.column()),
                })
                .collect();
            let statement = format!(
                "UPDATE {} SET {} WHERE id = ?",
                table,
                assignments.join(", ")
            );

            let mut query = sql_query(statement).into_boxed::<diesel::mysql::Mysql>();
            for field in &fields {
                query = match field {
                    StagedField::FormationSite(v) => query.bind::<Text, _>(v.clone()),
                    StagedField::FormationDate(v) => query.bind::<Date, _>(*v),
                    StagedField::Location(v) => query.bind::<Text, _>(v.to_wkt()),
                    StagedField::Description(v) => query.bind::<Text, _>(v.clone()),
                    StagedField::WikipediaUrl(v) => query.bind::<Text, _>(v.clone()),
                };
            }
            query.bind::<Integer, _>(id).execute(&mut conn)?;
            Ok(())
        })
        .await??;

        LogContext::db_operation("UPDATE", kind.table_name(), None);
        Ok(())
    }

    async fn list_all(&self, kind: EntityKind) -> AppResult<Vec<UnitRecord>> {
        let db = Arc::clone(&self.db);
        let table = kind.table_name();

        let rows = task::spawn_blocking(move || -> AppResult<Vec<UnitRow>> {
            let mut conn = db.get_connection()?;
            let rows = sql_query(format!("{} ORDER BY id", select_clause(table))).load(&mut conn)?;
            Ok(rows)
        })
        .await??;

        Ok(rows.into_iter().map(UnitRow::into_record).collect())
    }
}
