use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::angular::AngularDistribution;
use crate::distribution::TabulatedDistribution;
use crate::distribution_grid::TabulatedDistributions;
use crate::error::Result;
use crate::identifiers::ParticleID;
use crate::linearise::ToleranceConvergence;
use crate::tabulated::TabulatedFunction;

/// Number of particles emitted per reaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Multiplicity {
    Constant { value: f64 },
    Tabulated { table: TabulatedFunction },
}

impl Multiplicity {
    /// Multiplicity at the incident `energy`
    pub fn evaluate(&self, energy: f64) -> f64 {
        match self {
            Multiplicity::Constant { value } => *value,
            Multiplicity::Tabulated { table } => table.evaluate(energy),
        }
    }

    pub fn is_linearised(&self) -> bool {
        match self {
            Multiplicity::Constant { .. } => true,
            Multiplicity::Tabulated { table } => table.is_linearised(),
        }
    }

    pub fn linearise(&self, tolerance: &ToleranceConvergence) -> Result<Self> {
        match self {
            Multiplicity::Constant { value } => Ok(Multiplicity::Constant { value: *value }),
            Multiplicity::Tabulated { table } => Ok(Multiplicity::Tabulated {
                table: table.linearise(tolerance)?,
            }),
        }
    }
}

/// Angle-energy distribution of an outgoing particle, tabulated over the
/// incident energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AngleEnergyDistribution {
    /// Angle and outgoing energy are sampled independently. Without an energy
    /// distribution the outgoing energy equals the incident energy.
    UncorrelatedAngleEnergy {
        angle: TabulatedDistributions<AngularDistribution>,
        #[serde(default)]
        energy: Option<TabulatedDistributions<TabulatedDistribution>>,
    },
}

impl AngleEnergyDistribution {
    pub fn is_linearised(&self) -> bool {
        match self {
            AngleEnergyDistribution::UncorrelatedAngleEnergy { angle, energy } => {
                let angle_linear = angle.distributions().iter().all(|distribution| match distribution {
                    AngularDistribution::Tabulated(tabulated) => tabulated.pdf().is_linearised(),
                    _ => false,
                });
                let energy_linear = energy.as_ref().map_or(true, |energy| {
                    energy
                        .distributions()
                        .iter()
                        .all(|distribution| distribution.pdf().is_linearised())
                });
                angle_linear && energy_linear
            }
        }
    }

    pub fn linearise(&self, tolerance: &ToleranceConvergence) -> Result<Self> {
        match self {
            AngleEnergyDistribution::UncorrelatedAngleEnergy { angle, energy } => {
                Ok(AngleEnergyDistribution::UncorrelatedAngleEnergy {
                    angle: angle.linearise(tolerance)?,
                    energy: energy
                        .as_ref()
                        .map(|energy| energy.linearise(tolerance))
                        .transpose()?,
                })
            }
        }
    }

    /// Sample `(outgoing energy, mu)` for the incident `energy`.
    ///
    /// Between two tabulated incident energies one of the neighbouring
    /// distributions is picked with a probability given by the interpolation
    /// fraction.
    pub fn sample<R: Rng + ?Sized>(&self, incident_energy: f64, rng: &mut R) -> Result<(f64, f64)> {
        match self {
            AngleEnergyDistribution::UncorrelatedAngleEnergy { angle, energy } => {
                let mu = pick(angle, incident_energy, rng).sample(rng)?.clamp(-1.0, 1.0);
                let energy_out = match energy {
                    Some(energy) => {
                        let distribution = pick(energy, incident_energy, rng);
                        distribution.check_sampling()?;
                        distribution.sample(rng)
                    }
                    None => incident_energy,
                };
                Ok((energy_out, mu))
            }
        }
    }
}

// stochastic interpolation between the bracketing entries
fn pick<'a, D, R: Rng + ?Sized>(table: &'a TabulatedDistributions<D>, outer: f64, rng: &mut R) -> &'a D {
    let (lower, upper, fraction) = table.bracket(outer);
    if fraction > 0.0 && rng.gen::<f64>() < fraction {
        upper
    } else {
        lower
    }
}

/// A particle emitted by a reaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionProduct {
    /// Type of particle (e.g., neutron, photon)
    pub particle: ParticleID,
    /// Number of emitted particles as a function of the incident energy
    pub multiplicity: Multiplicity,
    /// Distributions of energy and angle of product
    #[serde(default)]
    pub distribution: Option<AngleEnergyDistribution>,
}

impl ReactionProduct {
    pub fn new(particle: ParticleID, multiplicity: Multiplicity) -> Self {
        ReactionProduct {
            particle,
            multiplicity,
            distribution: None,
        }
    }

    /// Same product with the given angle-energy distribution
    pub fn with_distribution(mut self, distribution: AngleEnergyDistribution) -> Self {
        self.distribution = Some(distribution);
        self
    }

    /// Multiplicity at the incident `energy`
    pub fn multiplicity_at(&self, energy: f64) -> f64 {
        self.multiplicity.evaluate(energy)
    }

    pub fn is_linearised(&self) -> bool {
        self.multiplicity.is_linearised()
            && self
                .distribution
                .as_ref()
                .map_or(true, AngleEnergyDistribution::is_linearised)
    }

    pub fn linearise(&self, tolerance: &ToleranceConvergence) -> Result<Self> {
        Ok(ReactionProduct {
            particle: self.particle,
            multiplicity: self.multiplicity.linearise(tolerance)?,
            distribution: self
                .distribution
                .as_ref()
                .map(|distribution| distribution.linearise(tolerance))
                .transpose()?,
        })
    }
}
