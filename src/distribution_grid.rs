// Distributions tabulated over an outer grid (typically the incident energy)

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distribution::Distribution;
use crate::error::{DryadError, Result};
use crate::grid;
use crate::interpolation::InterpolationType;
use crate::linearise::ToleranceConvergence;
use crate::tabulated::TabulatedFunction;
use crate::utilities::locate;

/// One distribution per outer grid point, interpolated between neighbours
/// with the law of the owning outer region.
///
/// The outer grid follows the same rules as the grid of a
/// [`TabulatedFunction`] (sorted, jumps allowed, regions and laws).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "TabulatedDistributionsData<D>",
    into = "TabulatedDistributionsData<D>",
    bound(serialize = "D: Serialize + Clone", deserialize = "D: Deserialize<'de>")
)]
pub struct TabulatedDistributions<D> {
    grid: Vec<f64>,
    distributions: Vec<D>,
    boundaries: Vec<usize>,
    interpolants: Vec<InterpolationType>,
}

/// Serialized form of [`TabulatedDistributions`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabulatedDistributionsData<D> {
    pub grid: Vec<f64>,
    pub distributions: Vec<D>,
    #[serde(default)]
    pub boundaries: Vec<usize>,
    #[serde(default)]
    pub interpolants: Vec<InterpolationType>,
}

impl<D> TryFrom<TabulatedDistributionsData<D>> for TabulatedDistributions<D> {
    type Error = DryadError;

    fn try_from(data: TabulatedDistributionsData<D>) -> Result<Self> {
        if data.boundaries.is_empty() && data.interpolants.is_empty() {
            TabulatedDistributions::new(data.grid, data.distributions)
        } else {
            TabulatedDistributions::with_regions(data.grid, data.distributions, data.boundaries, data.interpolants)
        }
    }
}

impl<D> From<TabulatedDistributions<D>> for TabulatedDistributionsData<D> {
    fn from(table: TabulatedDistributions<D>) -> Self {
        TabulatedDistributionsData {
            grid: table.grid,
            distributions: table.distributions,
            boundaries: table.boundaries,
            interpolants: table.interpolants,
        }
    }
}

impl<D> TabulatedDistributions<D> {
    /// Single linear-linear outer region
    pub fn new(grid: Vec<f64>, distributions: Vec<D>) -> Result<Self> {
        let last = grid.len().saturating_sub(1);
        Self::with_regions(grid, distributions, vec![last], vec![InterpolationType::LinearLinear])
    }

    pub fn with_regions(
        grid: Vec<f64>,
        distributions: Vec<D>,
        boundaries: Vec<usize>,
        interpolants: Vec<InterpolationType>,
    ) -> Result<Self> {
        grid::verify_grid(&grid, distributions.len(), &boundaries, &interpolants)?;
        Ok(TabulatedDistributions {
            grid,
            distributions,
            boundaries,
            interpolants,
        })
    }

    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    pub fn distributions(&self) -> &[D] {
        &self.distributions
    }

    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    pub fn interpolants(&self) -> &[InterpolationType] {
        &self.interpolants
    }

    pub fn number_points(&self) -> usize {
        self.grid.len()
    }

    pub fn lower_limit(&self) -> f64 {
        self.grid[0]
    }

    pub fn upper_limit(&self) -> f64 {
        self.grid[self.grid.len() - 1]
    }

    /// Entries bracketing `outer` as `(lower, upper, fraction)` where the
    /// fraction is the linear position of `outer` inside the bracket.
    ///
    /// Outside the outer grid the closest entry is returned on both sides.
    /// In a histogram region the fraction is 0 since the lower entry holds
    /// over the whole interval.
    pub fn bracket(&self, outer: f64) -> (&D, &D, f64) {
        let last = self.grid.len() - 1;
        if !(outer > self.lower_limit()) {
            return (&self.distributions[0], &self.distributions[0], 0.0);
        }
        if outer >= self.upper_limit() {
            return (&self.distributions[last], &self.distributions[last], 0.0);
        }
        let (region, i) = locate(&self.grid, &self.boundaries, outer);
        if self.grid[i] == outer {
            return (&self.distributions[i], &self.distributions[i], 0.0);
        }
        if self.interpolants[region] == InterpolationType::Histogram {
            return (&self.distributions[i - 1], &self.distributions[i], 0.0);
        }
        let fraction = (outer - self.grid[i - 1]) / (self.grid[i] - self.grid[i - 1]);
        (&self.distributions[i - 1], &self.distributions[i], fraction)
    }
}

impl<D: Distribution> TabulatedDistributions<D> {
    /// Value of the distribution at `inner` for the outer value `outer`.
    ///
    /// Both neighbouring entries are evaluated at `inner` and combined with
    /// the law of the owning outer region. Outside the outer grid the result
    /// is 0.
    pub fn evaluate(&self, outer: f64, inner: f64) -> f64 {
        if !(outer >= self.lower_limit() && outer <= self.upper_limit()) {
            return 0.0;
        }
        let (region, i) = locate(&self.grid, &self.boundaries, outer);
        if self.grid[i] == outer {
            return self.distributions[i].evaluate(inner);
        }
        self.interpolants[region].interpolate(
            self.grid[i - 1],
            self.distributions[i - 1].evaluate(inner),
            self.grid[i],
            self.distributions[i].evaluate(inner),
            outer,
        )
    }

    /// Linearise every entry; the outer grid and its laws are kept
    pub fn linearise(&self, tolerance: &ToleranceConvergence) -> Result<Self> {
        let distributions = self
            .distributions
            .iter()
            .map(|distribution| distribution.linearise(tolerance))
            .collect::<Result<Vec<_>>>()?;
        debug!(entries = distributions.len(), "linearised grid of distributions");
        Ok(TabulatedDistributions {
            grid: self.grid.clone(),
            distributions,
            boundaries: self.boundaries.clone(),
            interpolants: self.interpolants.clone(),
        })
    }

    /// Normalise every entry in place
    pub fn normalise(&mut self) -> Result<()> {
        self.distributions
            .iter_mut()
            .try_for_each(|distribution| distribution.normalise())
    }

    /// Average of every entry tabulated over the outer grid
    pub fn average_values(&self) -> Result<TabulatedFunction> {
        let averages = self
            .distributions
            .iter()
            .map(|distribution| distribution.average())
            .collect::<Result<Vec<_>>>()?;
        TabulatedFunction::with_regions(
            self.grid.clone(),
            averages,
            self.boundaries.clone(),
            self.interpolants.clone(),
        )
    }
}
