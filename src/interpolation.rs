// Interpolation laws for tabulated data
// The numbering follows the ENDF interpolation scheme codes

use serde::{Deserialize, Serialize};

use crate::error::DryadError;

/// Interpolation law governing one region of a tabulated function.
///
/// | law            | ENDF code | y                | x      |
/// |----------------|-----------|------------------|--------|
/// | `Histogram`    | 1         | constant         |        |
/// | `LinearLinear` | 2         | linear           | linear |
/// | `LinearLog`    | 3         | linear           | log    |
/// | `LogLinear`    | 4         | log              | linear |
/// | `LogLog`       | 5         | log              | log    |
///
/// All segment functions expect `x0 <= x <= x1`. Logarithmic axes need strictly
/// positive data; a segment that has non-positive values on a logarithmic axis
/// is handled with the law that is linear on that axis instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum InterpolationType {
    Histogram,
    LinearLinear,
    LinearLog,
    LogLinear,
    LogLog,
}

// exponents closer than this to a singular value use the analytic limit
const DEGENERATE: f64 = 1e-12;

impl TryFrom<i32> for InterpolationType {
    type Error = DryadError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(InterpolationType::Histogram),
            2 => Ok(InterpolationType::LinearLinear),
            3 => Ok(InterpolationType::LinearLog),
            4 => Ok(InterpolationType::LogLinear),
            5 => Ok(InterpolationType::LogLog),
            _ => Err(DryadError::InvalidParameter(format!(
                "unknown interpolation code: {}",
                code
            ))),
        }
    }
}

impl From<InterpolationType> for i32 {
    fn from(law: InterpolationType) -> i32 {
        law.code()
    }
}

impl InterpolationType {
    /// ENDF interpolation scheme code of the law
    pub fn code(&self) -> i32 {
        match self {
            InterpolationType::Histogram => 1,
            InterpolationType::LinearLinear => 2,
            InterpolationType::LinearLog => 3,
            InterpolationType::LogLinear => 4,
            InterpolationType::LogLog => 5,
        }
    }

    /// True for the only law that supports arithmetic combination
    pub fn is_linear(&self) -> bool {
        *self == InterpolationType::LinearLinear
    }

    fn log_x(&self) -> bool {
        matches!(self, InterpolationType::LinearLog | InterpolationType::LogLog)
    }

    fn log_y(&self) -> bool {
        matches!(self, InterpolationType::LogLinear | InterpolationType::LogLog)
    }

    /// Law actually applied to a segment once non-positive data on a
    /// logarithmic axis has been accounted for.
    fn effective(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> InterpolationType {
        let linear_x = self.log_x() && (x0 <= 0.0 || x1 <= 0.0);
        let linear_y = self.log_y() && (y0 <= 0.0 || y1 <= 0.0);
        match (self, linear_x, linear_y) {
            (InterpolationType::LinearLog, true, _) => InterpolationType::LinearLinear,
            (InterpolationType::LogLinear, _, true) => InterpolationType::LinearLinear,
            (InterpolationType::LogLog, true, true) => InterpolationType::LinearLinear,
            (InterpolationType::LogLog, true, false) => InterpolationType::LogLinear,
            (InterpolationType::LogLog, false, true) => InterpolationType::LinearLog,
            _ => *self,
        }
    }

    /// Interpolate between `(x0, y0)` and `(x1, y1)` at `x`.
    pub fn interpolate(&self, x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
        if x1 == x0 || x == x0 {
            return y0;
        }
        if x == x1 {
            return y1;
        }
        match self.effective(x0, y0, x1, y1) {
            InterpolationType::Histogram => y0,
            InterpolationType::LinearLinear => y0 + (y1 - y0) * (x - x0) / (x1 - x0),
            InterpolationType::LinearLog => y0 + (y1 - y0) * (x / x0).ln() / (x1 / x0).ln(),
            InterpolationType::LogLinear => y0 * (y1 / y0).powf((x - x0) / (x1 - x0)),
            InterpolationType::LogLog => {
                y0 * (y1 / y0).powf((x / x0).ln() / (x1 / x0).ln())
            }
        }
    }

    /// Definite integral of the segment over `[x0, x1]`.
    pub fn integral(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
        let width = x1 - x0;
        if width == 0.0 {
            return 0.0;
        }
        match self.effective(x0, y0, x1, y1) {
            InterpolationType::Histogram => y0 * width,
            InterpolationType::LinearLinear => 0.5 * (y0 + y1) * width,
            InterpolationType::LinearLog => {
                let log_ratio = (x1 / x0).ln();
                let slope = (y1 - y0) / log_ratio;
                y0 * width + slope * (x1 * log_ratio - width)
            }
            InterpolationType::LogLinear => {
                let log_ratio = (y1 / y0).ln();
                if log_ratio.abs() < DEGENERATE {
                    y0 * width
                } else {
                    (y1 - y0) * width / log_ratio
                }
            }
            InterpolationType::LogLog => {
                let log_x = (x1 / x0).ln();
                let exponent = (y1 / y0).ln() / log_x;
                if (exponent + 1.0).abs() < DEGENERATE {
                    y0 * x0 * log_x
                } else {
                    (x1 * y1 - x0 * y0) / (exponent + 1.0)
                }
            }
        }
    }

    /// First moment `∫ x f(x) dx` of the segment over `[x0, x1]`.
    pub fn first_moment(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
        let width = x1 - x0;
        if width == 0.0 {
            return 0.0;
        }
        let squares = 0.5 * (x1 * x1 - x0 * x0);
        match self.effective(x0, y0, x1, y1) {
            InterpolationType::Histogram => y0 * squares,
            InterpolationType::LinearLinear => {
                let slope = (y1 - y0) / width;
                (y0 - slope * x0) * squares + slope * (x1.powi(3) - x0.powi(3)) / 3.0
            }
            InterpolationType::LinearLog => {
                let log_ratio = (x1 / x0).ln();
                let slope = (y1 - y0) / log_ratio;
                y0 * squares + slope * (0.5 * x1 * x1 * log_ratio - 0.5 * squares)
            }
            InterpolationType::LogLinear => {
                let log_ratio = (y1 / y0).ln();
                if log_ratio.abs() < DEGENERATE {
                    y0 * squares
                } else {
                    let k = log_ratio / width;
                    (x1 * y1 - x0 * y0) / k - (y1 - y0) / (k * k)
                }
            }
            InterpolationType::LogLog => {
                let log_x = (x1 / x0).ln();
                let exponent = (y1 / y0).ln() / log_x;
                if (exponent + 2.0).abs() < DEGENERATE {
                    y0 * x0 * x0 * log_x
                } else {
                    (x1 * x1 * y1 - x0 * x0 * y0) / (exponent + 2.0)
                }
            }
        }
    }

    /// Integral of the segment from `x0` up to `x`.
    pub fn partial_integral(&self, x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
        let y = self.interpolate(x0, y0, x1, y1, x);
        match self.effective(x0, y0, x1, y1) {
            InterpolationType::Histogram => y0 * (x - x0),
            law => law.integral(x0, y0, x, y),
        }
    }

    /// Abscissa `x` in `[x0, x1]` at which the running segment integral
    /// reaches `area` (the inverse-CDF helper used for sampling).
    pub fn inverse_integral(&self, x0: f64, y0: f64, x1: f64, y1: f64, area: f64) -> f64 {
        if x1 == x0 || area <= 0.0 {
            return x0;
        }
        if area >= self.integral(x0, y0, x1, y1) {
            return x1;
        }
        let x = match self.effective(x0, y0, x1, y1) {
            InterpolationType::Histogram => {
                if y0 == 0.0 {
                    x0
                } else {
                    x0 + area / y0
                }
            }
            InterpolationType::LinearLinear => {
                let slope = (y1 - y0) / (x1 - x0);
                let denominator = y0 + (y0 * y0 + 2.0 * slope * area).max(0.0).sqrt();
                if denominator == 0.0 {
                    self.bisect_inverse(x0, y0, x1, y1, area)
                } else {
                    x0 + 2.0 * area / denominator
                }
            }
            InterpolationType::LogLinear => {
                let log_ratio = (y1 / y0).ln();
                if log_ratio.abs() < DEGENERATE {
                    x0 + area / y0
                } else {
                    let k = log_ratio / (x1 - x0);
                    x0 + (1.0 + k * area / y0).ln() / k
                }
            }
            InterpolationType::LogLog => {
                let exponent = (y1 / y0).ln() / (x1 / x0).ln();
                if (exponent + 1.0).abs() < DEGENERATE {
                    x0 * (area / (y0 * x0)).exp()
                } else {
                    let power = exponent + 1.0;
                    x0 * (1.0 + area * power / (y0 * x0)).powf(1.0 / power)
                }
            }
            InterpolationType::LinearLog => self.bisect_inverse(x0, y0, x1, y1, area),
        };
        x.clamp(x0, x1)
    }

    fn bisect_inverse(&self, x0: f64, y0: f64, x1: f64, y1: f64, area: f64) -> f64 {
        let mut low = x0;
        let mut high = x1;
        for _ in 0..200 {
            let middle = 0.5 * (low + high);
            if middle <= low || middle >= high {
                break;
            }
            if self.partial_integral(x0, y0, x1, y1, middle) < area {
                low = middle;
            } else {
                high = middle;
            }
        }
        0.5 * (low + high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InterpolationType::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-10 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_codes() {
        for code in 1..=5 {
            let law = InterpolationType::try_from(code).unwrap();
            assert_eq!(law.code(), code);
            assert_eq!(i32::from(law), code);
        }
        assert!(InterpolationType::try_from(0).is_err());
        assert!(InterpolationType::try_from(6).is_err());
    }

    #[test]
    fn test_interpolate() {
        assert_eq!(Histogram.interpolate(1.0, 4.0, 2.0, 3.0, 1.5), 4.0);
        assert_eq!(LinearLinear.interpolate(1.0, 4.0, 2.0, 3.0, 1.5), 3.5);
        assert!(close(LinearLog.interpolate(2.0, 3.0, 3.0, 2.0, 2.5), 2.44966028678679));
        assert!(close(LogLinear.interpolate(1.0, 1.0, 2.0, 4.0, 1.5), 2.0));
        assert!(close(LogLog.interpolate(1.0, 1.0, 4.0, 16.0, 2.0), 4.0));
        // end points are returned verbatim
        assert_eq!(LogLog.interpolate(1.0, 1.0, 4.0, 16.0, 4.0), 16.0);
    }

    #[test]
    fn test_non_positive_values_on_log_axis() {
        // log-y with a zero falls back to linear-linear
        assert_eq!(LogLinear.interpolate(1.0, 0.0, 2.0, 2.0, 1.5), 1.0);
        // log-log with a zero y falls back to linear-log
        let value = LogLog.interpolate(1.0, 0.0, 2.0, 2.0, 1.5);
        assert!(close(value, LinearLog.interpolate(1.0, 0.0, 2.0, 2.0, 1.5)));
        assert!(value.is_finite());
    }

    #[test]
    fn test_integrals() {
        assert_eq!(Histogram.integral(1.0, 2.0, 3.0, 5.0), 4.0);
        assert_eq!(LinearLinear.integral(1.0, 2.0, 3.0, 4.0), 6.0);
        // y = ln(x) on [1, e]: integral is 1
        let e = std::f64::consts::E;
        assert!(close(LinearLog.integral(1.0, 0.0, e, 1.0), 1.0));
        // y = exp(x) on [0, 1]
        assert!(close(LogLinear.integral(0.0, 1.0, 1.0, e), e - 1.0));
        // y = x^2 on [1, 2]
        assert!(close(LogLog.integral(1.0, 1.0, 2.0, 4.0), 7.0 / 3.0));
        // y = 1/x on [1, 2]
        assert!(close(LogLog.integral(1.0, 1.0, 2.0, 0.5), 2f64.ln()));
        // zero width
        assert_eq!(LinearLinear.integral(2.0, 1.0, 2.0, 3.0), 0.0);
    }

    #[test]
    fn test_first_moments() {
        assert_eq!(Histogram.first_moment(0.0, 1.0, 2.0, 7.0), 2.0);
        // y = x on [0, 1]: integral of x^2 is 1/3
        assert!(close(LinearLinear.first_moment(0.0, 0.0, 1.0, 1.0), 1.0 / 3.0));
        // y = ln(x) on [1, e]: integral of x ln x is (e^2 + 1) / 4
        let e = std::f64::consts::E;
        assert!(close(LinearLog.first_moment(1.0, 0.0, e, 1.0), (e * e + 1.0) / 4.0));
        // y = exp(x) on [0, 1]: integral of x exp(x) is 1
        assert!(close(LogLinear.first_moment(0.0, 1.0, 1.0, e), 1.0));
        // y = x^2 on [1, 2]: integral of x^3 is 15/4
        assert!(close(LogLog.first_moment(1.0, 1.0, 2.0, 4.0), 15.0 / 4.0));
        // y = 1/x^2 on [1, 2]: integral of 1/x is ln 2
        assert!(close(LogLog.first_moment(1.0, 1.0, 2.0, 0.25), 2f64.ln()));
    }

    #[test]
    fn test_inverse_integral() {
        for law in [Histogram, LinearLinear, LinearLog, LogLinear, LogLog] {
            let (x0, y0, x1, y1) = (1.0, 2.0, 3.0, 5.0);
            let total = law.integral(x0, y0, x1, y1);
            for fraction in [0.1, 0.25, 0.5, 0.9] {
                let x = law.inverse_integral(x0, y0, x1, y1, fraction * total);
                assert!(x >= x0 && x <= x1);
                let area = law.partial_integral(x0, y0, x1, y1, x);
                assert!(
                    (area - fraction * total).abs() < 1e-8 * total,
                    "{:?} fraction {}",
                    law,
                    fraction
                );
            }
            assert_eq!(law.inverse_integral(x0, y0, x1, y1, 0.0), x0);
            assert_eq!(law.inverse_integral(x0, y0, x1, y1, 2.0 * total), x1);
        }
    }
}
