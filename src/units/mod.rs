//! Unit registry: unit definitions, compatibility and conversion factors.
//!
//! Units are defined as scale chains on top of base units (`W`, `s`, `t`) and as products or
//! quotients of known units. Compatibility is decided by comparing dimensions, so `kWh` (`kW · h`)
//! converts to `TWh` but never to `GW`.
//!
//! ```rust
//! use scenario_comparison::units::UnitRegistry;
//!
//! let registry = UnitRegistry::energy_system();
//! let mwh = registry.convert(1.0, "kWh", "MWh").unwrap();
//! assert!((mwh - 0.001).abs() < 1e-15);
//! assert!(registry.convert(1.0, "kWh", "MW").is_err());
//! ```

pub mod families;
pub mod registry;

pub use families::{default_families, define_energy_system_units};
pub use registry::{Dimension, UnitFamily, UnitRegistry};
