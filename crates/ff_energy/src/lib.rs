//! The ff_energy crate.
//!
//! Nearest-neighbor thermodynamics for RNA secondary structure:
//!  - the nucleotide alphabet and sequence parsing,
//!  - parameter tables (`ParamSet`) with JSON persistence,
//!  - a temperature-scaled `EnergyModel` answering loop energy lookups.
//!
//! All `EnergyModel` results are in units of kT, so that a structure's
//! Boltzmann weight is `exp(-energy)`.
//!

pub mod parameter_parsing;
pub mod coaxial_stacking;

mod nucleotides;
mod energy_tables;
mod energy_model;

pub use nucleotides::*;
pub use energy_tables::*;
pub use energy_model::*;
pub use parameter_parsing::ParamError;

/// Minimum number of unpaired bases in a hairpin loop.
pub const LOOP_MIN: usize = 3;

/// Largest tabulated loop size, also the maximum internal loop span.
pub const LOOP_MAX: usize = 30;

/// Gas constant in kcal/(mol·K).
pub const GAS_CONSTANT: f64 = 1.987204e-3;

/// Zero Celsius in Kelvin.
pub const KELVIN: f64 = 273.15;

/// Stand-in for an impossible structure. Large but finite, so that sums of
/// a few of them never overflow and the soft-min never sees an actual infinity.
pub const INF: f64 = 1.0e30;
