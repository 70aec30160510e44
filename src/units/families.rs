//! The unit table understood by the dashboard.

use crate::error::UnitResult;

use super::registry::{UnitFamily, UnitRegistry};

const POWER_PREFIXES: [&str; 4] = ["k", "M", "G", "T"];

impl UnitRegistry {
    /// Registry with the energy-system units and the five selectable families
    /// (Energy, Power, Power per Hour, Mass, Mass per year).
    ///
    /// # Panics
    ///
    /// Only if the built-in table itself is inconsistent; see [`define_energy_system_units`].
    pub fn energy_system() -> Self {
        let mut registry = Self::new();
        define_energy_system_units(&mut registry).expect("built-in unit table is valid");
        registry
    }
}

/// Registers base units, scale chains and composed units, then the selectable families.
pub fn define_energy_system_units(registry: &mut UnitRegistry) -> UnitResult<()> {
    registry.register_family(
        "W",
        &[("kW", 1e3), ("MW", 1e3), ("GW", 1e3), ("TW", 1e3)],
    )?;
    registry.register_family(
        "s",
        &[("min", 60.0), ("h", 60.0), ("day", 24.0), ("a", 365.0)],
    )?;
    registry.register_family("t", &[("kt", 1e3), ("Mt", 1e3), ("Gt", 1e3)])?;

    registry.register_product("Wh", "W", "h")?;
    for prefix in POWER_PREFIXES {
        let power = format!("{prefix}W");
        registry.register_product(&format!("{power}h"), &power, "h")?;
        registry.register_quotient(&format!("{power}/h"), &power, "h")?;
    }
    for mass in ["t", "kt", "Mt", "Gt"] {
        registry.register_quotient(&format!("{mass}/a"), mass, "a")?;
    }

    for family in default_families() {
        registry.add_family(family)?;
    }
    Ok(())
}

/// Selectable unit families with their defaults.
pub fn default_families() -> Vec<UnitFamily> {
    vec![
        UnitFamily::new("Energy", &["kWh", "MWh", "GWh", "TWh"], "GWh"),
        UnitFamily::new("Power", &["kW", "MW", "GW", "TW"], "GW"),
        UnitFamily::new("Power per Hour", &["kW/h", "MW/h", "GW/h", "TW/h"], "MW/h"),
        UnitFamily::new("Mass", &["Mt", "Gt"], "Gt"),
        UnitFamily::new("Mass per year", &["Mt/a", "Gt/a"], "Gt/a"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let tol = 1e-12 * expected.abs().max(1.0);
        assert!((actual - expected).abs() <= tol, "{actual} != {expected}");
    }

    #[test]
    fn builtin_table_converts_energy_and_power() {
        let reg = UnitRegistry::energy_system();
        assert_close(reg.convert(1.0, "kWh", "MWh").unwrap(), 0.001);
        assert_close(reg.convert(1.0, "MW", "kW").unwrap(), 1000.0);
        assert_close(reg.convert(12.0, "GWh", "TWh").unwrap(), 0.012);
        assert_close(reg.convert(1.0, "Gt/a", "Mt/a").unwrap(), 1000.0);
        assert_close(reg.convert(1.0, "a", "h").unwrap(), 8760.0);
    }

    #[test]
    fn builtin_families_are_registered_in_order() {
        let reg = UnitRegistry::energy_system();
        let names: Vec<&str> = reg.families().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Energy", "Power", "Power per Hour", "Mass", "Mass per year"]
        );
        assert_eq!(reg.family("Energy").map(|f| f.default.as_str()), Some("GWh"));
        assert_eq!(reg.family_of("TW/h").map(|f| f.name.as_str()), Some("Power per Hour"));
    }

    #[test]
    fn energy_and_power_are_not_compatible() {
        let reg = UnitRegistry::energy_system();
        assert!(!reg.are_compatible("GWh", "GW"));
        assert!(!reg.are_compatible("GW/h", "GW"));
        assert!(!reg.are_compatible("Mt", "Mt/a"));
        assert!(reg.are_compatible("Wh", "TWh"));
    }
}
