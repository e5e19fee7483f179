// Angular distributions of the scattering cosine mu

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distribution::{Distribution, TabulatedDistribution};
use crate::error::{DryadError, Result};
use crate::legendre::LegendreSeries;
use crate::linearise::ToleranceConvergence;

/// Distribution of the cosine `mu` on `[-1, 1]`.
///
/// Equality ignores a uniform scale factor of the underlying data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AngularDistribution {
    Isotropic,
    Legendre(LegendreSeries),
    Tabulated(TabulatedDistribution),
}

impl AngularDistribution {
    pub fn is_isotropic(&self) -> bool {
        matches!(self, AngularDistribution::Isotropic)
    }

    /// Sample a scattering cosine.
    ///
    /// Legendre series are sampled by rejection against the bound
    /// `sum |c_l|`, which requires a positive `c_0`. Tabulated shapes with
    /// negative values cannot be sampled.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64> {
        match self {
            AngularDistribution::Isotropic => Ok(2.0 * rng.gen::<f64>() - 1.0),
            AngularDistribution::Tabulated(distribution) => {
                distribution.check_sampling()?;
                Ok(distribution.sample(rng))
            }
            AngularDistribution::Legendre(series) => {
                if !(series.coefficients()[0] > 0.0) {
                    return Err(DryadError::UnsupportedOperation(
                        "cannot sample a Legendre series without a positive order 0 coefficient"
                            .to_string(),
                    ));
                }
                let bound: f64 = series.coefficients().iter().map(|c| c.abs()).sum();
                loop {
                    let mu = 2.0 * rng.gen::<f64>() - 1.0;
                    if bound * rng.gen::<f64>() <= series.evaluate(mu) {
                        return Ok(mu);
                    }
                }
            }
        }
    }
}

impl Distribution for AngularDistribution {
    fn evaluate(&self, mu: f64) -> f64 {
        match self {
            AngularDistribution::Isotropic => {
                if (-1.0..=1.0).contains(&mu) {
                    0.5
                } else {
                    0.0
                }
            }
            AngularDistribution::Legendre(series) => series.evaluate(mu),
            AngularDistribution::Tabulated(distribution) => distribution.evaluate(mu),
        }
    }

    /// Every shape linearises to the tabulated variant
    fn linearise(&self, tolerance: &ToleranceConvergence) -> Result<Self> {
        let distribution = match self {
            AngularDistribution::Isotropic => TabulatedDistribution::from_values(vec![-1.0, 1.0], vec![0.5, 0.5])?,
            AngularDistribution::Legendre(series) => TabulatedDistribution::new(series.linearise(tolerance)?)?,
            AngularDistribution::Tabulated(distribution) => distribution.linearise(tolerance)?,
        };
        Ok(AngularDistribution::Tabulated(distribution))
    }

    fn normalise(&mut self) -> Result<()> {
        match self {
            AngularDistribution::Isotropic => Ok(()),
            AngularDistribution::Legendre(series) => series.normalise(),
            AngularDistribution::Tabulated(distribution) => distribution.normalise(),
        }
    }

    fn average(&self) -> Result<f64> {
        match self {
            AngularDistribution::Isotropic => Ok(0.0),
            AngularDistribution::Legendre(series) => series.average(),
            AngularDistribution::Tabulated(distribution) => distribution.average(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn forward() -> AngularDistribution {
        AngularDistribution::Legendre(LegendreSeries::new(vec![0.5, 0.25]).unwrap())
    }

    #[test]
    fn test_isotropic() {
        let isotropic = AngularDistribution::Isotropic;
        assert!(isotropic.is_isotropic());
        assert_eq!(isotropic.evaluate(-1.0), 0.5);
        assert_eq!(isotropic.evaluate(0.3), 0.5);
        assert_eq!(isotropic.evaluate(1.5), 0.0);
        assert_eq!(isotropic.average().unwrap(), 0.0);

        let linear = isotropic.linearise(&ToleranceConvergence::default()).unwrap();
        match &linear {
            AngularDistribution::Tabulated(distribution) => {
                assert_eq!(distribution.pdf().x(), &[-1.0, 1.0]);
                assert_eq!(distribution.integral(), 1.0);
            }
            other => panic!("expected a tabulated distribution, found {:?}", other),
        }
    }

    #[test]
    fn test_legendre() {
        let mut distribution = forward();
        assert_eq!(distribution.evaluate(1.0), 0.75);
        assert!((distribution.average().unwrap() - 1.0 / 6.0).abs() < 1e-15);
        distribution.normalise().unwrap();
        assert_eq!(distribution, forward());

        let linear = distribution.linearise(&ToleranceConvergence::default()).unwrap();
        assert!(!linear.is_isotropic());
        for mu in [-0.75, 0.0, 0.8] {
            assert!((linear.evaluate(mu) - distribution.evaluate(mu)).abs() < 1e-12);
        }
        assert!((linear.average().unwrap() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale_insensitive_equality() {
        let scaled = AngularDistribution::Legendre(LegendreSeries::new(vec![2.0, 1.0]).unwrap());
        assert_eq!(forward(), scaled);
        assert_ne!(forward(), AngularDistribution::Isotropic);

        let tabulated = AngularDistribution::Tabulated(
            TabulatedDistribution::from_values(vec![-1.0, 0.0, 1.0], vec![1.0, 2.0, 3.0]).unwrap(),
        );
        let rescaled = AngularDistribution::Tabulated(
            TabulatedDistribution::from_values(vec![-1.0, 0.0, 1.0], vec![0.5, 1.0, 1.5]).unwrap(),
        );
        assert_eq!(tabulated, rescaled);
    }

    #[test]
    fn test_sample() {
        let mut rng = StdRng::seed_from_u64(42);
        for distribution in [AngularDistribution::Isotropic, forward()] {
            let samples: Vec<f64> = (0..4000).map(|_| distribution.sample(&mut rng).unwrap()).collect();
            assert!(samples.iter().all(|mu| (-1.0..=1.0).contains(mu)));
            let mean = samples.iter().sum::<f64>() / samples.len() as f64;
            assert!((mean - distribution.average().unwrap()).abs() < 0.05);
        }

        let negative = AngularDistribution::Legendre(LegendreSeries::new(vec![0.0, 1.0]).unwrap());
        assert!(negative.sample(&mut rng).is_err());
    }

    #[test]
    fn test_linearise_series_with_negative_values() {
        // 0.5 + 0.75 mu is -0.25 at mu = -1
        let series = AngularDistribution::Legendre(LegendreSeries::new(vec![0.5, 0.75]).unwrap());
        let linear = series.linearise(&ToleranceConvergence::default()).unwrap();
        assert!((linear.evaluate(-1.0) + 0.25).abs() < 1e-12);
        assert!((linear.evaluate(1.0) - 1.25).abs() < 1e-12);
        assert!((linear.average().unwrap() - 0.5).abs() < 1e-12);
        assert!((series.average().unwrap() - 0.5).abs() < 1e-12);

        let mut rng = StdRng::seed_from_u64(42);
        assert!(matches!(linear.sample(&mut rng), Err(DryadError::UnsupportedOperation(_))));
        assert!(series.sample(&mut rng).is_ok());
    }
}
