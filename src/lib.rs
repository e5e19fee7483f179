// First, import the modules and re-export the types for Rust usage
mod config;
mod error;
mod utilities;

pub mod angular;
pub mod arithmetic;
pub mod distribution;
pub mod distribution_grid;
pub mod grid;
pub mod identifiers;
pub mod interpolation;
pub mod legendre;
pub mod linearise;
pub mod reaction;
pub mod reaction_product;
pub mod tabulated;

pub use angular::AngularDistribution;
pub use config::{Config, CONFIG};
pub use distribution::{Distribution, TabulatedDistribution};
pub use distribution_grid::TabulatedDistributions;
pub use error::{DryadError, Result};
pub use identifiers::ParticleID;
pub use interpolation::InterpolationType;
pub use legendre::LegendreSeries;
pub use linearise::{linearise_function, ToleranceConvergence};
pub use reaction::{summed_cross_section, Reaction};
pub use reaction_product::{AngleEnergyDistribution, Multiplicity, ReactionProduct};
pub use tabulated::TabulatedFunction;
