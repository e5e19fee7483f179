// Legendre series for angular distributions in the cosine mu

use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{DryadError, Result};
use crate::linearise::{linearise_function, ToleranceConvergence};
use crate::tabulated::TabulatedFunction;
use crate::utilities::is_close;

/// Function `f(mu) = sum_l c_l P_l(mu)` on `[-1, 1]`.
///
/// A normalised series has `c_0 = 0.5`, which makes its integral over
/// `[-1, 1]` equal to 1. Outside `[-1, 1]` the series evaluates to 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct LegendreSeries {
    coefficients: Vec<f64>,
}

impl TryFrom<Vec<f64>> for LegendreSeries {
    type Error = DryadError;

    fn try_from(coefficients: Vec<f64>) -> Result<Self> {
        LegendreSeries::new(coefficients)
    }
}

impl From<LegendreSeries> for Vec<f64> {
    fn from(series: LegendreSeries) -> Self {
        series.coefficients
    }
}

impl LegendreSeries {
    pub fn new(coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(DryadError::InvalidParameter(
                "a Legendre series needs at least one coefficient".to_string(),
            ));
        }
        if let Some(index) = coefficients.iter().position(|c| !c.is_finite()) {
            return Err(DryadError::InvalidParameter(format!(
                "Legendre coefficient {} is not finite",
                index
            )));
        }
        Ok(LegendreSeries { coefficients })
    }

    /// The isotropic series `f(mu) = 0.5`
    pub fn isotropic() -> Self {
        LegendreSeries {
            coefficients: vec![0.5],
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Highest Legendre order in the series
    pub fn order(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Evaluate the series using the Bonnet recurrence
    /// `(n + 1) P_{n+1} = (2n + 1) mu P_n - n P_{n-1}`.
    pub fn evaluate(&self, mu: f64) -> f64 {
        if !(-1.0..=1.0).contains(&mu) {
            return 0.0;
        }
        let mut previous = 1.0;
        let mut current = mu;
        let mut sum = self.coefficients[0];
        for (n, &c) in self.coefficients.iter().enumerate().skip(1) {
            sum += c * current;
            let n = n as f64;
            let next = ((2.0 * n + 1.0) * mu * current - n * previous) / (n + 1.0);
            previous = current;
            current = next;
        }
        sum
    }

    /// Integral over `[-1, 1]`; only `P_0` contributes
    pub fn integral(&self) -> f64 {
        2.0 * self.coefficients[0]
    }

    /// Rescale so that `c_0 = 0.5`
    pub fn normalise(&mut self) -> Result<()> {
        let c0 = self.coefficients[0];
        if c0 == 0.0 {
            return Err(DryadError::UnsupportedOperation(
                "cannot normalise a Legendre series with a zero order 0 coefficient".to_string(),
            ));
        }
        let factor = 0.5 / c0;
        self.coefficients.iter_mut().for_each(|c| *c *= factor);
        Ok(())
    }

    /// Average cosine, `(c_1 / 3) / c_0`
    pub fn average(&self) -> Result<f64> {
        let c0 = self.coefficients[0];
        if c0 == 0.0 {
            return Err(DryadError::UnsupportedOperation(
                "cannot average a Legendre series with a zero order 0 coefficient".to_string(),
            ));
        }
        let c1 = self.coefficients.get(1).copied().unwrap_or(0.0);
        Ok(c1 / 3.0 / c0)
    }

    /// Linear-linear table of the series on `[-1, 1]`.
    ///
    /// The seed grid is uniform with `2 (order + 1)` intervals so that every
    /// zero of the highest order polynomial is resolved.
    pub fn linearise(&self, tolerance: &ToleranceConvergence) -> Result<TabulatedFunction> {
        let intervals = 2 * (self.order() + 1);
        let mut seed: Vec<f64> = (0..intervals)
            .map(|i| -1.0 + 2.0 * i as f64 / intervals as f64)
            .collect();
        seed.push(1.0);
        linearise_function(|mu| self.evaluate(mu), &seed, tolerance)
    }

    fn combine(&self, other: &LegendreSeries, sign: f64) -> LegendreSeries {
        let size = self.coefficients.len().max(other.coefficients.len());
        let coefficients = (0..size)
            .map(|l| {
                let left = self.coefficients.get(l).copied().unwrap_or(0.0);
                let right = other.coefficients.get(l).copied().unwrap_or(0.0);
                left + sign * right
            })
            .collect();
        LegendreSeries { coefficients }
    }

    fn scale(&self, factor: f64) -> LegendreSeries {
        LegendreSeries {
            coefficients: self.coefficients.iter().map(|c| c * factor).collect(),
        }
    }
}

/// Equality up to a uniform scale factor, using the configured comparison
/// epsilon. Trailing zero coefficients are ignored.
impl PartialEq for LegendreSeries {
    fn eq(&self, other: &Self) -> bool {
        let epsilon = Config::snapshot().comparison_epsilon;
        let left_scale = if self.coefficients[0] != 0.0 { self.coefficients[0] } else { 1.0 };
        let right_scale = if other.coefficients[0] != 0.0 { other.coefficients[0] } else { 1.0 };
        if (self.coefficients[0] == 0.0) != (other.coefficients[0] == 0.0) {
            return false;
        }
        let size = self.coefficients.len().max(other.coefficients.len());
        (0..size).all(|l| {
            let left = self.coefficients.get(l).copied().unwrap_or(0.0) / left_scale;
            let right = other.coefficients.get(l).copied().unwrap_or(0.0) / right_scale;
            is_close(left, right, epsilon)
        })
    }
}

impl Neg for &LegendreSeries {
    type Output = LegendreSeries;

    fn neg(self) -> LegendreSeries {
        self.scale(-1.0)
    }
}

impl Add for &LegendreSeries {
    type Output = LegendreSeries;

    fn add(self, other: &LegendreSeries) -> LegendreSeries {
        self.combine(other, 1.0)
    }
}

impl Sub for &LegendreSeries {
    type Output = LegendreSeries;

    fn sub(self, other: &LegendreSeries) -> LegendreSeries {
        self.combine(other, -1.0)
    }
}

impl Mul<f64> for &LegendreSeries {
    type Output = LegendreSeries;

    fn mul(self, factor: f64) -> LegendreSeries {
        self.scale(factor)
    }
}

impl Div<f64> for &LegendreSeries {
    type Output = Result<LegendreSeries>;

    fn div(self, divisor: f64) -> Result<LegendreSeries> {
        if divisor == 0.0 || !divisor.is_finite() {
            return Err(DryadError::InvalidParameter(format!(
                "cannot divide a Legendre series by {}",
                divisor
            )));
        }
        Ok(self.scale(1.0 / divisor))
    }
}
