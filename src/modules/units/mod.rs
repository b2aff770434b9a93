pub mod domain;

pub use domain::entities::unit_record::{IncomingRecord, UnitRecord};
pub use domain::value_objects::entity_kind::EntityKind;
pub use domain::value_objects::geo_point::GeoPoint;
