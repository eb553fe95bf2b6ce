//! Serializable command output for `--json`.

use serde::Serialize;
use stepwise_core::unit::{Unit, VersionedUnit};
use stepwise_resolver::VersionedItems;

/// Result of `order` and `plan`.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub ordered: Vec<String>,
    pub unsatisfied: Vec<String>,
    pub valid: bool,
}

impl PlanReport {
    pub fn new(items: &VersionedItems<'_, Unit>) -> Self {
        Self {
            ordered: items.versions().iter().map(ToString::to_string).collect(),
            unsatisfied: items
                .unsatisfied_versions()
                .iter()
                .map(ToString::to_string)
                .collect(),
            valid: items.is_valid(),
        }
    }
}

/// One unit as listed by `list` and `deps`.
#[derive(Debug, Serialize)]
pub struct UnitEntry {
    pub version: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UnitEntry {
    pub fn new(unit: &Unit) -> Self {
        Self {
            version: unit.version().to_string(),
            depends: unit.dependencies().iter().map(ToString::to_string).collect(),
            description: unit.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_core::version::Version;
    use stepwise_resolver::Model;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn plan_report_json_shape() {
        let model = Model::new(
            ["scout", "app"],
            vec![
                Unit::new(v("scout-1")),
                Unit::new(v("scout-2")),
                Unit::new(v("app-1")).depends_on(v("scout-1")),
            ],
        )
        .unwrap();
        let items = model.resolve_all().unwrap();
        let json = serde_json::to_value(PlanReport::new(&items)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ordered": ["scout-1", "scout-2", "app-1"],
                "unsatisfied": [],
                "valid": true
            })
        );
    }

    #[test]
    fn unit_entry_skips_empty_fields() {
        let json = serde_json::to_value(UnitEntry::new(&Unit::new(v("scout-1")))).unwrap();
        assert_eq!(json, serde_json::json!({ "version": "scout-1" }));
    }
}
