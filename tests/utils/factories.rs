/// Test data factories using builder pattern
///
/// Provides convenient methods to create records with sensible defaults
use chrono::NaiveDate;
use nob_atlas::modules::units::{GeoPoint, IncomingRecord, UnitRecord};

pub struct IncomingRecordFactory {
    record: IncomingRecord,
}

impl IncomingRecordFactory {
    pub fn named(name: &str) -> Self {
        Self {
            record: IncomingRecord {
                name: name.to_string(),
                formation_date: None,
                formation_site: None,
                formation_geo: None,
                description: None,
                wikipedia_url: None,
            },
        }
    }

    pub fn formation_site(mut self, site: &str) -> Self {
        self.record.formation_site = Some(site.to_string());
        self
    }

    pub fn formation_date(mut self, year: i32, month: u32, day: u32) -> Self {
        self.record.formation_date = NaiveDate::from_ymd_opt(year, month, day);
        self
    }

    pub fn formation_geo(mut self, latitude: f64, longitude: f64) -> Self {
        self.record.formation_geo = Some(GeoPoint::new(latitude, longitude).unwrap());
        self
    }

    pub fn wikipedia_url(mut self, url: &str) -> Self {
        self.record.wikipedia_url = Some(url.to_string());
        self
    }

    pub fn build(self) -> IncomingRecord {
        self.record
    }
}

pub struct UnitRecordFactory {
    record: UnitRecord,
}

impl UnitRecordFactory {
    pub fn new(id: i32, name: &str) -> Self {
        Self {
            record: UnitRecord {
                id,
                name: name.to_string(),
                formation_date: None,
                formation_site: None,
                location: None,
                description: None,
                wikipedia_url: None,
            },
        }
    }

    pub fn complete(id: i32, name: &str) -> Self {
        Self::new(id, name)
            .formation_site("Split")
            .formation_date(1942, 9, 12)
            .location(43.51, 16.44)
            .description("Formed from coastal partisan companies.")
            .wikipedia_url("https://en.wikipedia.org/wiki/Example")
    }

    pub fn formation_site(mut self, site: &str) -> Self {
        self.record.formation_site = Some(site.to_string());
        self
    }

    pub fn formation_date(mut self, year: i32, month: u32, day: u32) -> Self {
        self.record.formation_date = NaiveDate::from_ymd_opt(year, month, day);
        self
    }

    pub fn location(mut self, latitude: f64, longitude: f64) -> Self {
        self.record.location = Some(GeoPoint::new(latitude, longitude).unwrap());
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.record.description = Some(text.to_string());
        self
    }

    pub fn wikipedia_url(mut self, url: &str) -> Self {
        self.record.wikipedia_url = Some(url.to_string());
        self
    }

    pub fn build(self) -> UnitRecord {
        self.record
    }
}
