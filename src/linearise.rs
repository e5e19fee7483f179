// Adaptive linearisation of tabulated and analytic functions
//
// Every source segment is refined by midpoint bisection: the true value at the
// midpoint is compared with the linear estimate obtained from the two accepted
// neighbours and the midpoint is inserted when they disagree. The refinement
// uses an explicit work-stack so the subdivision depth stays bounded.

use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{DryadError, Result};
use crate::grid;
use crate::interpolation::InterpolationType;
use crate::tabulated::TabulatedFunction;

/// Convergence criterion of the linearizer.
///
/// A midpoint is accepted when `|true - estimate| <= max(relative * |true|,
/// absolute)`. No interval is bisected more than `max_depth` times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceConvergence {
    relative: f64,
    absolute: f64,
    max_depth: usize,
}

impl Default for ToleranceConvergence {
    /// Tolerances taken from the global [`Config`]
    fn default() -> Self {
        let config = Config::snapshot();
        ToleranceConvergence {
            relative: config.linearisation_tolerance,
            absolute: config.absolute_tolerance,
            max_depth: config.max_depth,
        }
    }
}

impl ToleranceConvergence {
    /// Relative tolerance with the default absolute tolerance and depth
    pub fn new(relative: f64) -> Result<Self> {
        let defaults = Self::default();
        Self::with_absolute(relative, defaults.absolute)
    }

    pub fn with_absolute(relative: f64, absolute: f64) -> Result<Self> {
        if !(relative > 0.0 && relative.is_finite()) {
            return Err(DryadError::InvalidParameter(format!(
                "the relative tolerance must be positive and finite, found {}",
                relative
            )));
        }
        if !(absolute >= 0.0 && absolute.is_finite()) {
            return Err(DryadError::InvalidParameter(format!(
                "the absolute tolerance must be non-negative and finite, found {}",
                absolute
            )));
        }
        Ok(ToleranceConvergence {
            relative,
            absolute,
            max_depth: Config::snapshot().max_depth,
        })
    }

    /// Same tolerances with a different maximum bisection depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn relative(&self) -> f64 {
        self.relative
    }

    pub fn absolute(&self) -> f64 {
        self.absolute
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// True when the linear estimate is close enough to the true value
    pub fn converged(&self, trial: f64, reference: f64) -> bool {
        (trial - reference).abs() <= (self.relative * trial.abs()).max(self.absolute)
    }
}

/// Refine the segment between `start` and `end`, appending every accepted
/// point after `start` (including `end`) to `points`.
fn refine<F>(function: &F, start: (f64, f64), end: (f64, f64), tolerance: &ToleranceConvergence, points: &mut Vec<(f64, f64)>)
where
    F: Fn(f64) -> f64,
{
    let mut left = start;
    // right end point of every pending interval with its bisection depth
    let mut stack = vec![(end, 0usize)];
    while let Some((right, depth)) = stack.pop() {
        let middle = 0.5 * (left.0 + right.0);
        let splittable = depth < tolerance.max_depth && middle > left.0 && middle < right.0;
        if splittable {
            let trial = function(middle);
            let estimate = 0.5 * (left.1 + right.1);
            if !tolerance.converged(trial, estimate) {
                stack.push((right, depth + 1));
                stack.push(((middle, trial), depth + 1));
                continue;
            }
        }
        points.push(right);
        left = right;
    }
}

/// Remove repeated points and collapse runs of three or more equal x values
/// to their first and last point.
fn compress(points: Vec<(f64, f64)>) -> (Vec<f64>, Vec<f64>) {
    let mut result: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    for point in points {
        let n = result.len();
        if n > 0 && result[n - 1] == point {
            continue;
        }
        if n > 1 && result[n - 1].0 == point.0 && result[n - 2].0 == point.0 {
            result[n - 1] = point;
            if result[n - 2] == point {
                result.pop();
            }
            continue;
        }
        result.push(point);
    }
    result.into_iter().unzip()
}

/// Linearise a tabulated function region by region.
///
/// Linear-linear segments are copied, jumps are kept and histogram segments
/// become flat steps. The result is split into regions at every jump.
pub(crate) fn linearise_table(table: &TabulatedFunction, tolerance: &ToleranceConvergence) -> Result<TabulatedFunction> {
    let x = table.x();
    let y = table.y();
    let mut points = vec![(x[0], y[0])];

    for (i, law) in table.segments() {
        let start = (x[i], y[i]);
        let end = (x[i + 1], y[i + 1]);
        if points.last() != Some(&start) {
            points.push(start);
        }
        if start.0 == end.0 {
            points.push(end);
            continue;
        }
        match law {
            InterpolationType::LinearLinear => points.push(end),
            // the trailing value of a histogram segment is the next step
            InterpolationType::Histogram => points.push((end.0, start.1)),
            _ => {
                let segment = |value: f64| law.interpolate(start.0, start.1, end.0, end.1, value);
                refine(&segment, start, end, tolerance, &mut points);
            }
        }
        trace!(segment = i, ?law, points = points.len(), "linearised segment");
    }

    let (x, y) = compress(points);
    debug!(
        source_points = table.number_points(),
        points = x.len(),
        "linearised tabulated function"
    );
    TabulatedFunction::linear_split_at_jumps(x, y)
}

/// Linearise an analytic function starting from the seed grid `grid`.
///
/// Every interval of the seed grid is refined independently, so the seed
/// should resolve features that a single midpoint test could miss (e.g. the
/// zeros of an odd polynomial).
pub fn linearise_function<F>(function: F, grid: &[f64], tolerance: &ToleranceConvergence) -> Result<TabulatedFunction>
where
    F: Fn(f64) -> f64,
{
    grid::verify_points(grid)?;

    let mut points = vec![(grid[0], function(grid[0]))];
    for pair in grid.windows(2) {
        let start = points[points.len() - 1];
        let end = (pair[1], function(pair[1]));
        if start.0 == end.0 {
            points.push(end);
        } else {
            refine(&function, start, end, tolerance, &mut points);
        }
    }

    let (x, y) = compress(points);
    debug!(seed_points = grid.len(), points = x.len(), "linearised function");
    TabulatedFunction::linear_split_at_jumps(x, y)
}
