//! Query parameters → row filters + [`PipelineConfig`].
//!
//! The dashboard encodes a request as flat string parameters. Lists use a bracket syntax
//! (`groupby=[region,year]`); a bare value is a one-element list. The keys `groupby`, `orderby`
//! and `units` configure the pipeline, every other key filters rows by column.

use std::collections::BTreeMap;

use crate::config::{PipelineConfig, UnitSelection};
use crate::error::{ConfigError, RecordResult};
use crate::processing::{cell_matches, filter};
use crate::types::RecordSet;
use crate::units::UnitRegistry;

const GROUP_BY_KEY: &str = "groupby";
const ORDER_BY_KEY: &str = "orderby";
const UNITS_KEY: &str = "units";

/// Split `[a,b,c]` into its items; anything else is a single item.
pub fn parse_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    match trimmed.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        Some(inner) => inner
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        None => vec![trimmed.to_string()],
    }
}

/// Allowed values per column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters(BTreeMap<String, Vec<String>>);

impl Filters {
    /// No filtering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `column` to `values`.
    pub fn with(mut self, column: impl Into<String>, values: Vec<String>) -> Self {
        self.0.insert(column.into(), values);
        self
    }

    /// Allowed values for a column.
    pub fn get(&self, column: &str) -> Option<&[String]> {
        self.0.get(column).map(Vec::as_slice)
    }

    /// Returns `true` if no column is filtered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep rows whose cells match every filter (see [`cell_matches`]).
    ///
    /// # Errors
    ///
    /// [`crate::error::RecordError::MissingColumn`] if a filtered column does not exist.
    pub fn apply(&self, records: &RecordSet) -> RecordResult<RecordSet> {
        let mut checks: Vec<(usize, &[String])> = Vec::with_capacity(self.0.len());
        for (column, allowed) in &self.0 {
            checks.push((records.require_column(column)?, allowed.as_slice()));
        }
        Ok(filter(records, |row| {
            checks
                .iter()
                .all(|(idx, allowed)| row.get(*idx).is_some_and(|cell| cell_matches(cell, allowed)))
        }))
    }
}

/// A query split into row filters and pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub filters: Filters,
    pub config: PipelineConfig,
}

impl ParsedQuery {
    /// Interpret query parameters.
    ///
    /// Unit targets are listed without their family (`units=[TWh,GW]`); each is assigned to the
    /// family that offers it.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnknownUnit`] for a target that no family offers
    /// - [`ConfigError::InvalidQuery`] for an empty filter list or more than one `orderby` column
    pub fn parse<'a, I>(params: I, registry: &UnitRegistry) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut parsed = ParsedQuery::default();
        let mut units = UnitSelection::new();

        for (key, raw) in params {
            let values = parse_list(raw);
            match key {
                GROUP_BY_KEY => parsed.config.group_by = values,
                ORDER_BY_KEY => {
                    parsed.config.order_by = match values.as_slice() {
                        [] => None,
                        [column] => Some(column.clone()),
                        _ => {
                            return Err(ConfigError::InvalidQuery {
                                key: key.to_string(),
                                message: "expected a single column".to_string(),
                            });
                        }
                    }
                }
                UNITS_KEY => {
                    for unit in values {
                        let family = registry
                            .family_of(&unit)
                            .ok_or_else(|| ConfigError::UnknownUnit { unit: unit.clone() })?;
                        units.insert(family.name.clone(), unit);
                    }
                }
                column => {
                    if values.iter().all(|v| v.is_empty()) {
                        return Err(ConfigError::InvalidQuery {
                            key: column.to_string(),
                            message: "no filter values".to_string(),
                        });
                    }
                    parsed.filters = parsed.filters.with(column, values);
                }
            }
        }

        parsed.config.units = units;
        Ok(parsed)
    }
}
