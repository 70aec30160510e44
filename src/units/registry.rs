//! Unit definitions and linear conversion factors.

use std::collections::{BTreeMap, HashMap};

use crate::error::{UnitError, UnitResult};

/// Exponents of base units, e.g. `{W: 1, s: 1}` for energy.
///
/// Two units are compatible exactly when their dimensions are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dimension(BTreeMap<String, i32>);

impl Dimension {
    fn base(name: &str) -> Self {
        Self(BTreeMap::from([(name.to_string(), 1)]))
    }

    fn combine(&self, other: &Dimension, sign: i32) -> Self {
        let mut out = self.0.clone();
        for (base, exp) in &other.0 {
            let entry = out.entry(base.clone()).or_insert(0);
            *entry += sign * exp;
        }
        out.retain(|_, exp| *exp != 0);
        Self(out)
    }

    /// Exponent of a base unit (0 if absent).
    pub fn exponent(&self, base: &str) -> i32 {
        self.0.get(base).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
struct UnitDef {
    /// Multiplier from this unit to the base units of its dimension.
    factor: f64,
    dimension: Dimension,
}

/// A named group of selectable units that can be converted into each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFamily {
    /// Display name (`"Energy"`, `"Power"`, ...).
    pub name: String,
    /// Units offered for selection, smallest first.
    pub units: Vec<String>,
    /// Unit used when the caller does not select one.
    pub default: String,
}

impl UnitFamily {
    /// Create a family definition.
    pub fn new(name: impl Into<String>, units: &[&str], default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: units.iter().map(|u| u.to_string()).collect(),
            default: default.into(),
        }
    }

    /// Returns `true` if `unit` is selectable in this family.
    pub fn contains(&self, unit: &str) -> bool {
        self.units.iter().any(|u| u == unit)
    }
}

/// Registry of known units and selectable unit families.
///
/// Built once at startup and then only read; share it by reference (or `Arc`) between requests.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    units: HashMap<String, UnitDef>,
    families: Vec<UnitFamily>,
}

impl UnitRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a base unit with its own dimension.
    pub fn register_base(&mut self, name: &str) -> UnitResult<()> {
        self.insert(
            name,
            UnitDef {
                factor: 1.0,
                dimension: Dimension::base(name),
            },
        )
    }

    /// Build a linear scale chain on top of `base_unit`.
    ///
    /// Each entry of `derived` is `(name, factor)`, where `factor` is relative to the previous unit
    /// in the chain: `[("kW", 1e3), ("MW", 1e3)]` makes `1 MW = 1e3 kW = 1e6 W`. The base unit is
    /// defined first if it is not known yet.
    pub fn register_family(&mut self, base_unit: &str, derived: &[(&str, f64)]) -> UnitResult<()> {
        if !self.is_known(base_unit) {
            self.register_base(base_unit)?;
        }
        let mut previous = base_unit.to_string();
        for (name, factor) in derived {
            self.register_scaled(name, &previous, *factor)?;
            previous = name.to_string();
        }
        Ok(())
    }

    /// Define `name` as `factor` times `reference`.
    pub fn register_scaled(&mut self, name: &str, reference: &str, factor: f64) -> UnitResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(UnitError::InvalidFactor {
                unit: name.to_string(),
                factor,
            });
        }
        let reference = self.lookup(reference)?;
        let def = UnitDef {
            factor: reference.factor * factor,
            dimension: reference.dimension.clone(),
        };
        self.insert(name, def)
    }

    /// Define `name` as the product `lhs · rhs` (e.g. `kWh = kW · h`).
    pub fn register_product(&mut self, name: &str, lhs: &str, rhs: &str) -> UnitResult<()> {
        let (l, r) = (self.lookup(lhs)?, self.lookup(rhs)?);
        let def = UnitDef {
            factor: l.factor * r.factor,
            dimension: l.dimension.combine(&r.dimension, 1),
        };
        self.insert(name, def)
    }

    /// Define `name` as the quotient `numerator / denominator` (e.g. `Mt/a`).
    pub fn register_quotient(&mut self, name: &str, numerator: &str, denominator: &str) -> UnitResult<()> {
        let (n, d) = (self.lookup(numerator)?, self.lookup(denominator)?);
        let def = UnitDef {
            factor: n.factor / d.factor,
            dimension: n.dimension.combine(&d.dimension, -1),
        };
        self.insert(name, def)
    }

    /// Register a selectable family. All of its units must already be defined and compatible.
    pub fn add_family(&mut self, family: UnitFamily) -> UnitResult<()> {
        let Some(first) = family.units.first() else {
            return Err(UnitError::InvalidFamily {
                family: family.name,
                message: "no units".to_string(),
            });
        };
        if !family.contains(&family.default) {
            return Err(UnitError::InvalidFamily {
                message: format!("default '{}' is not one of its units", family.default),
                family: family.name,
            });
        }
        for unit in &family.units {
            if !self.are_compatible(first, unit) {
                // distinguishes "unknown" from "incompatible" for the caller
                self.lookup(unit)?;
                return Err(UnitError::Incompatible {
                    from: first.clone(),
                    to: unit.clone(),
                });
            }
        }
        self.families.push(family);
        Ok(())
    }

    /// Returns `true` if `unit` has been defined.
    pub fn is_known(&self, unit: &str) -> bool {
        self.units.contains_key(unit)
    }

    /// Returns `true` if both units are known and measure the same quantity.
    pub fn are_compatible(&self, a: &str, b: &str) -> bool {
        match (self.units.get(a), self.units.get(b)) {
            (Some(a), Some(b)) => a.dimension == b.dimension,
            _ => false,
        }
    }

    /// Dimension of a known unit.
    pub fn dimension(&self, unit: &str) -> UnitResult<&Dimension> {
        self.lookup(unit).map(|def| &def.dimension)
    }

    /// Multiplier that converts a quantity expressed in `from` into `to`.
    pub fn factor(&self, from: &str, to: &str) -> UnitResult<f64> {
        let (f, t) = (self.lookup(from)?, self.lookup(to)?);
        if f.dimension != t.dimension {
            return Err(UnitError::Incompatible {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(f.factor / t.factor)
    }

    /// Convert `value` from `from` into `to`.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> UnitResult<f64> {
        if from == to {
            self.lookup(from)?;
            return Ok(value);
        }
        Ok(value * self.factor(from, to)?)
    }

    /// All registered families, in registration order.
    pub fn families(&self) -> &[UnitFamily] {
        &self.families
    }

    /// Family by name.
    pub fn family(&self, name: &str) -> Option<&UnitFamily> {
        self.families.iter().find(|f| f.name == name)
    }

    /// First family that offers `unit` for selection.
    pub fn family_of(&self, unit: &str) -> Option<&UnitFamily> {
        self.families.iter().find(|f| f.contains(unit))
    }

    fn lookup(&self, unit: &str) -> UnitResult<&UnitDef> {
        self.units.get(unit).ok_or_else(|| UnitError::Unknown {
            unit: unit.to_string(),
        })
    }

    fn insert(&mut self, name: &str, def: UnitDef) -> UnitResult<()> {
        if self.units.contains_key(name) {
            return Err(UnitError::AlreadyDefined {
                unit: name.to_string(),
            });
        }
        self.units.insert(name.to_string(), def);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    fn power_and_time() -> UnitRegistry {
        let mut reg = UnitRegistry::new();
        reg.register_family("W", &[("kW", 1e3), ("MW", 1e3)]).unwrap();
        reg.register_family("s", &[("h", 3600.0)]).unwrap();
        reg.register_product("kWh", "kW", "h").unwrap();
        reg.register_product("MWh", "MW", "h").unwrap();
        reg.register_quotient("MW/h", "MW", "h").unwrap();
        reg
    }

    #[test]
    fn scale_chain_multiplies_factors() {
        let reg = power_and_time();
        assert!(close(reg.convert(1.0, "MW", "W").unwrap(), 1e6));
        assert!(close(reg.convert(1.0, "MW", "kW").unwrap(), 1000.0));
    }

    #[test]
    fn composed_units_share_dimension() {
        let reg = power_and_time();
        assert!(reg.are_compatible("kWh", "MWh"));
        assert!(!reg.are_compatible("kWh", "kW"));
        assert!(!reg.are_compatible("MW/h", "MW"));
        let dim = reg.dimension("MW/h").unwrap();
        assert_eq!(dim.exponent("W"), 1);
        assert_eq!(dim.exponent("s"), -1);
        assert!(close(reg.convert(1.0, "kWh", "MWh").unwrap(), 0.001));
    }

    #[test]
    fn incompatible_and_unknown_units_are_errors() {
        let reg = power_and_time();
        assert_eq!(
            reg.convert(1.0, "kWh", "MW"),
            Err(UnitError::Incompatible {
                from: "kWh".to_string(),
                to: "MW".to_string()
            })
        );
        assert!(matches!(
            reg.convert(1.0, "furlong", "MW"),
            Err(UnitError::Unknown { .. })
        ));
        assert!(!reg.is_known("furlong"));
    }

    #[test]
    fn rejects_duplicates_and_bad_factors() {
        let mut reg = power_and_time();
        assert!(matches!(
            reg.register_scaled("kW", "W", 1e3),
            Err(UnitError::AlreadyDefined { .. })
        ));
        assert!(matches!(
            reg.register_scaled("GW", "MW", 0.0),
            Err(UnitError::InvalidFactor { .. })
        ));
        assert!(matches!(
            reg.register_scaled("GW", "MW", f64::NAN),
            Err(UnitError::InvalidFactor { .. })
        ));
    }

    #[test]
    fn add_family_validates_members() {
        let mut reg = power_and_time();
        assert!(matches!(
            reg.add_family(UnitFamily::new("Mixed", &["kW", "kWh"], "kW")),
            Err(UnitError::Incompatible { .. })
        ));
        assert!(matches!(
            reg.add_family(UnitFamily::new("Power", &["kW", "MW"], "GW")),
            Err(UnitError::InvalidFamily { .. })
        ));
        reg.add_family(UnitFamily::new("Power", &["kW", "MW"], "MW")).unwrap();
        assert_eq!(reg.family_of("MW").map(|f| f.name.as_str()), Some("Power"));
        assert!(reg.family_of("kWh").is_none());
    }
}
