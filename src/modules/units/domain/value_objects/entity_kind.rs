use serde::{Deserialize, Serialize};

/// The military-unit tables the importer can reconcile against.
///
/// The legacy tooling had one near-identical script per table; the kind
/// carries everything that actually differed between them: the table name,
/// the default asset file, and the near-duplicate threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Brigade,
    Detachment,
    Division,
    Corps,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Brigade,
        EntityKind::Detachment,
        EntityKind::Division,
        EntityKind::Corps,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Brigade => "brigades",
            EntityKind::Detachment => "detachments",
            EntityKind::Division => "divisions",
            EntityKind::Corps => "corpuses",
        }
    }

    /// Human-readable singular label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Brigade => "brigade",
            EntityKind::Detachment => "detachment",
            EntityKind::Division => "division",
            EntityKind::Corps => "corps",
        }
    }

    /// Default map-asset file for this kind, as shipped with the frontend.
    pub fn asset_file(&self) -> &'static str {
        match self {
            EntityKind::Brigade => "dalmatia-brigades.json",
            EntityKind::Detachment => "dalmatia-odredi.json",
            EntityKind::Division => "divizije.json",
            EntityKind::Corps => "korpusi.json",
        }
    }

    /// Above this score an incoming name is treated as noise on an existing
    /// one and skipped outright. Detachment names are shorter and noisier,
    /// so their importer historically ran with a lower cutoff.
    pub fn near_duplicate_threshold(&self) -> f64 {
        match self {
            EntityKind::Detachment => 0.95,
            _ => 0.99,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_match_schema() {
        assert_eq!(EntityKind::Brigade.table_name(), "brigades");
        assert_eq!(EntityKind::Corps.table_name(), "corpuses");
    }

    #[test]
    fn detachments_use_looser_near_duplicate_cutoff() {
        assert_eq!(EntityKind::Detachment.near_duplicate_threshold(), 0.95);
        assert_eq!(EntityKind::Brigade.near_duplicate_threshold(), 0.99);
        assert_eq!(EntityKind::Division.near_duplicate_threshold(), 0.99);
    }
}
