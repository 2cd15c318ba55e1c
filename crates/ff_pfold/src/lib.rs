//! Partition function folding with base pair probabilities.
//!
//! The tables are filled along anti-diagonals of a circular view of the
//! sequence, which gives every pair's inside and outside free energy in
//! one pass. Pair probabilities and ProbKnot structures are derived from
//! those.
//!
//! ```
//! use ff_energy::ParamSet;
//! use ff_pfold::{FoldConfig, PartitionFunction};
//!
//! let pf = PartitionFunction::fold("GGGGAAACCCC", &ParamSet::default(), &FoldConfig::default()).unwrap();
//! assert!(pf.pair_probability(0, 10) > 0.5);
//! ```

mod wavefront;
mod rolling;

pub mod free_energy;
pub mod constraints;
pub mod probknot;
pub mod output;

mod error;
mod config;
mod partition;

pub use error::*;
pub use config::*;
pub use partition::*;
pub use constraints::{PairingConstraints, TriangularTable};
pub use free_energy::{combine, INF};
