use serde::{Deserialize, Serialize};

use crate::distribution;
use crate::error::Result;
use crate::grid;
use crate::interpolation::InterpolationType;
use crate::linearise::{self, ToleranceConvergence};
use crate::utilities::{locate, lower_bound};

/// A tabulated function of one variable.
///
/// The function is defined by its grid `x`, the values `y` at every grid
/// point, and a partition of the grid into interpolation regions. Region `i`
/// spans the grid indices `[boundaries[i-1], boundaries[i]]` (region 0 starts
/// at index 0) and is governed by `interpolants[i]`.
///
/// An immediate duplicate x value represents a jump (discontinuity). Outside
/// `[lower_limit, upper_limit]` the function is zero.
///
/// Instances are always valid: every constructor runs the grid verification
/// and either returns a complete table or an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TabulatedFunctionData", into = "TabulatedFunctionData")]
pub struct TabulatedFunction {
    x: Vec<f64>,
    y: Vec<f64>,
    boundaries: Vec<usize>,
    interpolants: Vec<InterpolationType>,
}

/// Serialized form of a [`TabulatedFunction`], close to the ENDF TAB1 layout.
///
/// When both `boundaries` and `interpolants` are omitted the function has a
/// single linear-linear region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabulatedFunctionData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(default)]
    pub boundaries: Vec<usize>,
    #[serde(default)]
    pub interpolants: Vec<InterpolationType>,
}

impl TryFrom<TabulatedFunctionData> for TabulatedFunction {
    type Error = crate::error::DryadError;

    fn try_from(data: TabulatedFunctionData) -> Result<Self> {
        if data.boundaries.is_empty() && data.interpolants.is_empty() {
            TabulatedFunction::new(data.x, data.y)
        } else {
            TabulatedFunction::with_regions(data.x, data.y, data.boundaries, data.interpolants)
        }
    }
}

impl From<TabulatedFunction> for TabulatedFunctionData {
    fn from(table: TabulatedFunction) -> Self {
        TabulatedFunctionData {
            x: table.x,
            y: table.y,
            boundaries: table.boundaries,
            interpolants: table.interpolants,
        }
    }
}

impl TabulatedFunction {
    /// Create a function with a single linear-linear region
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        Self::with_interpolation(x, y, InterpolationType::LinearLinear)
    }

    /// Create a function with a single region governed by `interpolant`
    pub fn with_interpolation(x: Vec<f64>, y: Vec<f64>, interpolant: InterpolationType) -> Result<Self> {
        let last = x.len().saturating_sub(1);
        Self::with_regions(x, y, vec![last], vec![interpolant])
    }

    /// Create a function with explicit interpolation regions
    pub fn with_regions(
        x: Vec<f64>,
        y: Vec<f64>,
        boundaries: Vec<usize>,
        interpolants: Vec<InterpolationType>,
    ) -> Result<Self> {
        grid::verify_grid(&x, y.len(), &boundaries, &interpolants)?;
        Ok(TabulatedFunction {
            x,
            y,
            boundaries,
            interpolants,
        })
    }

    /// Create a linear-linear function whose regions are split at every jump.
    ///
    /// The boundary of each split points at the second x value of the jump.
    pub(crate) fn linear_split_at_jumps(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        let mut boundaries = grid::jump_indices(&x);
        boundaries.push(x.len().saturating_sub(1));
        let interpolants = vec![InterpolationType::LinearLinear; boundaries.len()];
        Self::with_regions(x, y, boundaries, interpolants)
    }

    /// The grid (independent variable)
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// The values at every grid point
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Last grid index of every interpolation region
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Interpolation law of every region
    pub fn interpolants(&self) -> &[InterpolationType] {
        &self.interpolants
    }

    pub fn number_points(&self) -> usize {
        self.x.len()
    }

    pub fn number_regions(&self) -> usize {
        self.boundaries.len()
    }

    pub fn lower_limit(&self) -> f64 {
        self.x[0]
    }

    pub fn upper_limit(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// `(lower_limit, upper_limit)`
    pub fn domain_limits(&self) -> (f64, f64) {
        (self.lower_limit(), self.upper_limit())
    }

    /// True when every region uses linear-linear interpolation
    pub fn is_linearised(&self) -> bool {
        self.interpolants.iter().all(InterpolationType::is_linear)
    }

    /// The x values at which the function jumps
    pub fn jumps(&self) -> Vec<f64> {
        grid::jump_indices(&self.x)
            .into_iter()
            .map(|index| self.x[index])
            .collect()
    }

    /// Evaluate the function at `x`.
    ///
    /// Returns 0 outside the domain. At a grid point the tabulated value is
    /// returned; at a jump this is the value approached from the left.
    pub fn evaluate(&self, x: f64) -> f64 {
        // written so that NaN also lands outside the domain
        if !(x >= self.lower_limit() && x <= self.upper_limit()) {
            return 0.0;
        }

        let (region, i) = locate(&self.x, &self.boundaries, x);
        if self.x[i] == x {
            return self.y[i];
        }
        self.interpolants[region].interpolate(self.x[i - 1], self.y[i - 1], self.x[i], self.y[i], x)
    }

    /// Evaluate the function at every value of `x`
    pub fn evaluate_many(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&value| self.evaluate(value)).collect()
    }

    /// Limits of the function at `x` approached from the left and the right,
    /// with zero-extension outside the domain.
    pub(crate) fn one_sided_limits(&self, x: f64) -> (f64, f64) {
        let (lower, upper) = self.domain_limits();
        if x < lower || x > upper {
            return (0.0, 0.0);
        }
        let first = lower_bound(&self.x, x);
        if self.x[first] != x {
            let value = self.evaluate(x);
            return (value, value);
        }
        let mut last = first;
        if first + 1 < self.x.len() && self.x[first + 1] == x {
            last = first + 1;
        }
        let left = if first == 0 { 0.0 } else { self.y[first] };
        let right = if last == self.x.len() - 1 { 0.0 } else { self.y[last] };
        (left, right)
    }

    /// Every segment of the grid as `(start index, law)`; the segment spans
    /// `[start, start + 1]`.
    pub(crate) fn segments(&self) -> impl Iterator<Item = (usize, InterpolationType)> + '_ {
        self.boundaries
            .iter()
            .zip(&self.interpolants)
            .enumerate()
            .flat_map(move |(region, (&end, &law))| {
                let start = if region == 0 { 0 } else { self.boundaries[region - 1] };
                (start..end).map(move |i| (i, law))
            })
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.y
    }

    /// Linear-linear approximation of the function within `tolerance`.
    ///
    /// An already linearised function is returned as an identical copy.
    pub fn linearise(&self, tolerance: &ToleranceConvergence) -> Result<Self> {
        if self.is_linearised() {
            return Ok(self.clone());
        }
        linearise::linearise_table(self, tolerance)
    }

    /// Replace the function by its linear-linear approximation
    pub fn linearise_inplace(&mut self, tolerance: &ToleranceConvergence) -> Result<()> {
        if !self.is_linearised() {
            *self = linearise::linearise_table(self, tolerance)?;
        }
        Ok(())
    }

    /// Integral over the whole domain
    pub fn integral(&self) -> f64 {
        distribution::integral(self)
    }

    /// Rescale the function so that its integral equals 1
    pub fn normalise(&mut self) -> Result<()> {
        distribution::normalise(self)
    }

    /// Mean value of x weighted by the function
    pub fn average(&self) -> Result<f64> {
        distribution::average(self)
    }

    /// Running integral of the function at every grid point
    pub fn cdf(&self) -> Result<Self> {
        distribution::cdf(self)
    }
}
