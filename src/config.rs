//! Pipeline configuration: grouping, ordering, unit targets and display labels.
//!
//! A [`PipelineConfig`] is built per request (from query parameters, see [`crate::query`], or
//! deserialized from JSON) and checked with [`PipelineConfig::validate`] before the pipeline runs.
//! The pipeline itself assumes a validated configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::units::UnitRegistry;

/// Requested target unit per unit family (`{"Energy": "TWh"}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitSelection(BTreeMap<String, String>);

impl UnitSelection {
    /// Empty selection (no conversion).
    pub fn new() -> Self {
        Self::default()
    }

    /// Every family's default unit.
    pub fn defaults(registry: &UnitRegistry) -> Self {
        Self(
            registry
                .families()
                .iter()
                .map(|f| (f.name.clone(), f.default.clone()))
                .collect(),
        )
    }

    /// Select `unit` for `family`, replacing any previous choice.
    pub fn with(mut self, family: impl Into<String>, unit: impl Into<String>) -> Self {
        self.0.insert(family.into(), unit.into());
        self
    }

    /// Select `unit` for `family`.
    pub fn insert(&mut self, family: impl Into<String>, unit: impl Into<String>) {
        self.0.insert(family.into(), unit.into());
    }

    /// Target unit for a family.
    pub fn get(&self, family: &str) -> Option<&str> {
        self.0.get(family).map(String::as_str)
    }

    /// Target units, one per selected family.
    pub fn targets(&self) -> Vec<String> {
        self.0.values().cloned().collect()
    }

    /// Iterate `(family, unit)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` if no family is selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Mapping from raw categorical values to display labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap(BTreeMap<String, String>);

impl LabelMap {
    /// Empty label map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label, replacing any previous one for `raw`.
    pub fn with(mut self, raw: impl Into<String>, label: impl Into<String>) -> Self {
        self.0.insert(raw.into(), label.into());
        self
    }

    /// Display label for a raw value, if one is configured.
    pub fn get(&self, raw: &str) -> Option<&str> {
        self.0.get(raw).map(String::as_str)
    }

    /// Returns `true` if no label is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Per-request pipeline configuration.
///
/// All fields default to "do nothing", so `{}` is a valid JSON configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Dimension columns to aggregate by. Empty means raw rows.
    pub group_by: Vec<String>,
    /// Column to sort ascending by.
    pub order_by: Option<String>,
    /// Target unit per unit family.
    pub units: UnitSelection,
    /// Display labels for categorical values.
    pub labels: LabelMap,
}

impl PipelineConfig {
    /// Parse a configuration from JSON.
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Check the cross-field constraints that the pipeline relies on.
    ///
    /// - When `group_by` is non-empty, `order_by` must be one of its columns (other columns do not
    ///   exist after aggregation). Ungrouped requests may order by any column.
    /// - Every unit family must be known and its target must be selectable in that family.
    pub fn validate(&self, registry: &UnitRegistry) -> Result<(), ConfigError> {
        if let Some(order_by) = &self.order_by {
            if !self.group_by.is_empty() && !self.group_by.contains(order_by) {
                return Err(ConfigError::OrderNotGrouped {
                    order_by: order_by.clone(),
                });
            }
        }
        for (family_name, unit) in self.units.iter() {
            let family = registry
                .family(family_name)
                .ok_or_else(|| ConfigError::UnknownFamily {
                    family: family_name.to_string(),
                })?;
            if !family.contains(unit) {
                return Err(ConfigError::UnitNotInFamily {
                    unit: unit.to_string(),
                    family: family_name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Check that a plotting dimension (e.g. a chart axis) survives aggregation.
    pub fn require_grouped(&self, dimension: &str) -> Result<(), ConfigError> {
        if self.group_by.is_empty() || self.group_by.iter().any(|g| g == dimension) {
            Ok(())
        } else {
            Err(ConfigError::DimensionNotGrouped {
                dimension: dimension.to_string(),
            })
        }
    }

    /// Fill in the default unit of every family the selection does not mention.
    pub fn with_default_units(mut self, registry: &UnitRegistry) -> Self {
        for family in registry.families() {
            if self.units.get(&family.name).is_none() {
                self.units.insert(family.name.clone(), family.default.clone());
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped(order_by: &str) -> PipelineConfig {
        PipelineConfig {
            group_by: vec!["region".to_string(), "year".to_string()],
            order_by: Some(order_by.to_string()),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn order_by_must_be_grouped_when_grouping() {
        let reg = UnitRegistry::energy_system();
        assert!(grouped("year").validate(&reg).is_ok());
        assert_eq!(
            grouped("technology").validate(&reg),
            Err(ConfigError::OrderNotGrouped {
                order_by: "technology".to_string()
            })
        );
    }

    #[test]
    fn ungrouped_requests_may_order_by_anything() {
        let reg = UnitRegistry::energy_system();
        let cfg = PipelineConfig {
            order_by: Some("technology".to_string()),
            ..PipelineConfig::default()
        };
        assert!(cfg.validate(&reg).is_ok());
        assert!(cfg.require_grouped("technology").is_ok());
    }

    #[test]
    fn plotting_dimension_must_be_grouped() {
        let cfg = grouped("region");
        assert!(cfg.require_grouped("year").is_ok());
        assert!(matches!(
            cfg.require_grouped("scenario"),
            Err(ConfigError::DimensionNotGrouped { .. })
        ));
    }

    #[test]
    fn unit_targets_must_belong_to_their_family() {
        let reg = UnitRegistry::energy_system();
        let mut cfg = PipelineConfig::default();
        cfg.units = UnitSelection::new().with("Energy", "TWh");
        assert!(cfg.validate(&reg).is_ok());

        cfg.units = UnitSelection::new().with("Energy", "GW");
        assert!(matches!(
            cfg.validate(&reg),
            Err(ConfigError::UnitNotInFamily { .. })
        ));

        cfg.units = UnitSelection::new().with("Volume", "m3");
        assert!(matches!(
            cfg.validate(&reg),
            Err(ConfigError::UnknownFamily { .. })
        ));
    }

    #[test]
    fn default_units_fill_missing_families_only() {
        let reg = UnitRegistry::energy_system();
        let cfg = PipelineConfig {
            units: UnitSelection::new().with("Energy", "TWh"),
            ..PipelineConfig::default()
        }
        .with_default_units(&reg);
        assert_eq!(cfg.units.get("Energy"), Some("TWh"));
        assert_eq!(cfg.units.get("Power"), Some("GW"));
        assert_eq!(cfg.units.targets().len(), reg.families().len());
    }

    #[test]
    fn deserializes_partial_json() {
        let cfg = PipelineConfig::from_json_str(
            r#"{"group_by":["region"],"units":{"Energy":"TWh"},"labels":{"A":"Region A"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.group_by, vec!["region".to_string()]);
        assert_eq!(cfg.order_by, None);
        assert_eq!(cfg.units.get("Energy"), Some("TWh"));
        assert_eq!(cfg.labels.get("A"), Some("Region A"));
    }

    #[test]
    fn empty_json_is_a_no_op_config() {
        let cfg = PipelineConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert!(cfg.group_by.is_empty());
        assert!(cfg.units.is_empty());
        assert!(cfg.labels.is_empty());
        assert!(!UnitSelection::defaults(&UnitRegistry::energy_system()).is_empty());
    }
}
