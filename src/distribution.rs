// Distribution operations on tabulated functions: integration, normalisation,
// cumulative distributions, first moments and inverse-CDF sampling

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{DryadError, Result};
use crate::interpolation::InterpolationType;
use crate::linearise::ToleranceConvergence;
use crate::tabulated::TabulatedFunction;
use crate::utilities::{is_close, lower_bound, region_of_segment};

/// Capabilities shared by every one-dimensional distribution shape.
pub trait Distribution: Sized {
    /// Value of the distribution at `x` (0 outside its domain)
    fn evaluate(&self, x: f64) -> f64;

    /// Linear-linear tabulated approximation of the distribution
    fn linearise(&self, tolerance: &ToleranceConvergence) -> Result<Self>;

    /// Rescale the distribution so that it integrates to 1
    fn normalise(&mut self) -> Result<()>;

    /// Mean value of the independent variable
    fn average(&self) -> Result<f64>;
}

/// Integral of a tabulated function over its whole domain.
pub fn integral(table: &TabulatedFunction) -> f64 {
    let x = table.x();
    let y = table.y();
    table
        .segments()
        .map(|(i, law)| law.integral(x[i], y[i], x[i + 1], y[i + 1]))
        .sum()
}

/// First moment `∫ x f(x) dx` of a tabulated function.
pub fn first_moment(table: &TabulatedFunction) -> f64 {
    let x = table.x();
    let y = table.y();
    table
        .segments()
        .map(|(i, law)| law.first_moment(x[i], y[i], x[i + 1], y[i + 1]))
        .sum()
}

/// Rescale `table` in place so that its integral is 1.
///
/// Nothing changes when the integral already equals 1 within the configured
/// normalisation epsilon. A zero or non-finite integral cannot be normalised.
pub fn normalise(table: &mut TabulatedFunction) -> Result<()> {
    let epsilon = Config::snapshot().normalisation_epsilon;
    let area = integral(table);
    if area == 0.0 || !area.is_finite() {
        warn!(area, "cannot normalise a tabulated function");
        return Err(DryadError::UnsupportedOperation(format!(
            "cannot normalise a function with integral {}",
            area
        )));
    }
    if (area - 1.0).abs() <= epsilon {
        return Ok(());
    }

    let factor = 1.0 / area;
    table.values_mut().iter_mut().for_each(|value| *value *= factor);
    debug!(area, "normalised tabulated function");
    Ok(())
}

/// Cumulative distribution of `pdf` tabulated on the same grid.
///
/// The value at grid point `i` is the analytic integral of the pdf from the
/// lower limit up to `x[i]`. The result keeps the region boundaries of the pdf
/// with linear-linear interpolation in every region.
pub fn cdf(pdf: &TabulatedFunction) -> Result<TabulatedFunction> {
    let x = pdf.x();
    let y = pdf.y();
    let mut cumulative = Vec::with_capacity(x.len());
    cumulative.push(0.0);
    let mut running = 0.0;
    for (i, law) in pdf.segments() {
        running += law.integral(x[i], y[i], x[i + 1], y[i + 1]);
        cumulative.push(running);
    }
    let interpolants = vec![InterpolationType::LinearLinear; pdf.number_regions()];
    TabulatedFunction::with_regions(x.to_vec(), cumulative, pdf.boundaries().to_vec(), interpolants)
}

/// Mean value of x weighted by the function, independent of its normalisation.
pub fn average(table: &TabulatedFunction) -> Result<f64> {
    let area = integral(table);
    if area == 0.0 || !area.is_finite() {
        return Err(DryadError::UnsupportedOperation(format!(
            "cannot average a function with integral {}",
            area
        )));
    }
    Ok(first_moment(table) / area)
}

/// True when both functions share their grid and regions and their values are
/// proportional, comparing the normalised values within `epsilon`.
pub fn equal_up_to_scale(left: &TabulatedFunction, right: &TabulatedFunction, epsilon: f64) -> bool {
    if left.x() != right.x()
        || left.boundaries() != right.boundaries()
        || left.interpolants() != right.interpolants()
    {
        return false;
    }
    let left_area = integral(left);
    let right_area = integral(right);
    if left_area == 0.0 || right_area == 0.0 || !left_area.is_finite() || !right_area.is_finite() {
        return left.y() == right.y();
    }
    left.y()
        .iter()
        .zip(right.y())
        .all(|(a, b)| is_close(a / left_area, b / right_area, epsilon))
}

impl Distribution for TabulatedFunction {
    fn evaluate(&self, x: f64) -> f64 {
        TabulatedFunction::evaluate(self, x)
    }

    fn linearise(&self, tolerance: &ToleranceConvergence) -> Result<Self> {
        TabulatedFunction::linearise(self, tolerance)
    }

    fn normalise(&mut self) -> Result<()> {
        normalise(self)
    }

    fn average(&self) -> Result<f64> {
        average(self)
    }
}

/// A tabulated probability density together with its cumulative distribution.
///
/// The pdf does not need to be normalised; sampling and averages account for
/// its total integral, and equality ignores a uniform scale factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TabulatedFunction", into = "TabulatedFunction")]
pub struct TabulatedDistribution {
    pdf: TabulatedFunction,
    cdf: TabulatedFunction,
}

impl TryFrom<TabulatedFunction> for TabulatedDistribution {
    type Error = DryadError;

    fn try_from(pdf: TabulatedFunction) -> Result<Self> {
        TabulatedDistribution::new(pdf)
    }
}

impl From<TabulatedDistribution> for TabulatedFunction {
    fn from(distribution: TabulatedDistribution) -> Self {
        distribution.pdf
    }
}

impl TabulatedDistribution {
    /// Wrap a pdf.
    ///
    /// Negative values are kept (truncated Legendre expansions dip below
    /// zero) but such a distribution cannot be sampled.
    pub fn new(pdf: TabulatedFunction) -> Result<Self> {
        if let Some(index) = pdf.y().iter().position(|&value| value < 0.0) {
            warn!(index, value = pdf.y()[index], "probability density with negative values");
        }
        let cdf = cdf(&pdf)?;
        Ok(TabulatedDistribution { pdf, cdf })
    }

    /// Linear-linear pdf from raw values
    pub fn from_values(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        Self::new(TabulatedFunction::new(x, y)?)
    }

    pub fn pdf(&self) -> &TabulatedFunction {
        &self.pdf
    }

    pub fn cdf(&self) -> &TabulatedFunction {
        &self.cdf
    }

    pub fn lower_limit(&self) -> f64 {
        self.pdf.lower_limit()
    }

    pub fn upper_limit(&self) -> f64 {
        self.pdf.upper_limit()
    }

    /// Total integral of the pdf
    pub fn integral(&self) -> f64 {
        let values = self.cdf.y();
        values[values.len() - 1]
    }

    pub fn is_non_negative(&self) -> bool {
        self.pdf.y().iter().all(|&value| value >= 0.0)
    }

    /// Error unless the pdf can be sampled by inverting its cdf
    pub fn check_sampling(&self) -> Result<()> {
        match self.pdf.y().iter().position(|&value| value < 0.0) {
            Some(index) => Err(DryadError::UnsupportedOperation(format!(
                "cannot sample a probability density with negative values (y[{}] = {})",
                index,
                self.pdf.y()[index]
            ))),
            None => Ok(()),
        }
    }

    /// Sample a value of the independent variable by inverting the cdf.
    ///
    /// The pdf must be non-negative, see [`TabulatedDistribution::check_sampling`].
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let xi: f64 = rng.gen();
        self.sample_with(xi)
    }

    /// Inverse of the cdf at the cumulative probability `xi` in `[0, 1]`
    pub fn sample_with(&self, xi: f64) -> f64 {
        let x = self.pdf.x();
        let y = self.pdf.y();
        let cumulative = self.cdf.y();
        let target = xi.clamp(0.0, 1.0) * self.integral();

        let end = lower_bound(cumulative, target).clamp(1, x.len() - 1);
        let start = end - 1;
        let law = self.pdf.interpolants()[region_of_segment(self.pdf.boundaries(), end)];
        law.inverse_integral(x[start], y[start], x[end], y[end], target - cumulative[start])
    }
}

impl PartialEq for TabulatedDistribution {
    fn eq(&self, other: &Self) -> bool {
        equal_up_to_scale(&self.pdf, &other.pdf, Config::snapshot().comparison_epsilon)
    }
}

impl Distribution for TabulatedDistribution {
    fn evaluate(&self, x: f64) -> f64 {
        self.pdf.evaluate(x)
    }

    fn linearise(&self, tolerance: &ToleranceConvergence) -> Result<Self> {
        if self.pdf.is_linearised() {
            return Ok(self.clone());
        }
        TabulatedDistribution::new(self.pdf.linearise(tolerance)?)
    }

    fn normalise(&mut self) -> Result<()> {
        normalise(&mut self.pdf)?;
        self.cdf = cdf(&self.pdf)?;
        Ok(())
    }

    fn average(&self) -> Result<f64> {
        average(&self.pdf)
    }
}
