// Global numerical configuration for the tabulated function engine
use once_cell::sync::Lazy;
use std::sync::Mutex;

use crate::error::{DryadError, Result};

// Global configuration holding the default tolerances
pub static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::new()));

/// Default relative tolerance used when linearising.
pub const DEFAULT_LINEARISATION_TOLERANCE: f64 = 1e-3;
/// Default absolute tolerance used by the linearizer near zero.
pub const DEFAULT_ABSOLUTE_TOLERANCE: f64 = 1e-10;
/// Default maximum number of bisections applied to one source segment.
pub const DEFAULT_MAX_DEPTH: usize = 32;
/// Default tolerance on `|integral - 1|` below which a pdf counts as normalised.
pub const DEFAULT_NORMALISATION_EPSILON: f64 = 1e-10;
/// Default relative tolerance when comparing distributions up to a scale factor.
pub const DEFAULT_COMPARISON_EPSILON: f64 = 1e-7;

/// Global numerical configuration.
///
/// The values here are the defaults picked up by
/// [`ToleranceConvergence::default`](crate::ToleranceConvergence) and by the
/// normalisation and scale-insensitive comparison routines. A single global
/// instance is exposed via the `CONFIG` static; obtain a guard with
/// [`Config::global`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Relative tolerance of the linearizer convergence test.
    pub linearisation_tolerance: f64,
    /// Absolute fallback of the linearizer convergence test near zero.
    pub absolute_tolerance: f64,
    /// Maximum bisection depth per source segment.
    pub max_depth: usize,
    /// Tolerance on the integral when deciding whether to rescale a pdf.
    pub normalisation_epsilon: f64,
    /// Relative tolerance for scale-insensitive distribution equality.
    pub comparison_epsilon: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Config {
            linearisation_tolerance: DEFAULT_LINEARISATION_TOLERANCE,
            absolute_tolerance: DEFAULT_ABSOLUTE_TOLERANCE,
            max_depth: DEFAULT_MAX_DEPTH,
            normalisation_epsilon: DEFAULT_NORMALISATION_EPSILON,
            comparison_epsilon: DEFAULT_COMPARISON_EPSILON,
        }
    }

    /// Set the default linearisation tolerances
    pub fn set_linearisation_tolerance(&mut self, relative: f64, absolute: f64) -> Result<()> {
        if !(relative > 0.0 && relative.is_finite()) {
            return Err(DryadError::InvalidParameter(format!(
                "relative tolerance must be positive and finite, found {}",
                relative
            )));
        }
        if !(absolute >= 0.0 && absolute.is_finite()) {
            return Err(DryadError::InvalidParameter(format!(
                "absolute tolerance must be non-negative and finite, found {}",
                absolute
            )));
        }
        self.linearisation_tolerance = relative;
        self.absolute_tolerance = absolute;
        Ok(())
    }

    /// Set the epsilon used to decide whether a pdf is already normalised
    pub fn set_normalisation_epsilon(&mut self, epsilon: f64) -> Result<()> {
        check_epsilon("normalisation", epsilon)?;
        self.normalisation_epsilon = epsilon;
        Ok(())
    }

    /// Set the epsilon used by scale-insensitive comparisons
    pub fn set_comparison_epsilon(&mut self, epsilon: f64) -> Result<()> {
        check_epsilon("comparison", epsilon)?;
        self.comparison_epsilon = epsilon;
        Ok(())
    }

    /// Restore every default
    pub fn reset(&mut self) {
        *self = Config::new();
    }

    /// Get the global configuration instance
    pub fn global() -> std::sync::MutexGuard<'static, Self> {
        CONFIG
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the global configuration, releasing the lock immediately
    pub fn snapshot() -> Self {
        Self::global().clone()
    }
}

fn check_epsilon(name: &str, epsilon: f64) -> Result<()> {
    if epsilon >= 0.0 && epsilon.is_finite() {
        Ok(())
    } else {
        Err(DryadError::InvalidParameter(format!(
            "{} epsilon must be non-negative and finite, found {}",
            name, epsilon
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::new();
        assert_eq!(config.linearisation_tolerance, 1e-3);
        assert_eq!(config.absolute_tolerance, 1e-10);
        assert_eq!(config.max_depth, 32);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_set_linearisation_tolerance() {
        let mut config = Config::new();
        config.set_linearisation_tolerance(1e-4, 1e-12).unwrap();
        assert_eq!(config.linearisation_tolerance, 1e-4);
        assert_eq!(config.absolute_tolerance, 1e-12);
    }

    #[test]
    fn test_invalid_tolerances_are_rejected() {
        let mut config = Config::new();
        assert!(config.set_linearisation_tolerance(0.0, 1e-10).is_err());
        assert!(config.set_linearisation_tolerance(1e-3, -1.0).is_err());
        assert!(config.set_normalisation_epsilon(f64::NAN).is_err());
        assert!(config.set_comparison_epsilon(-1e-3).is_err());
        // a failed update leaves the configuration untouched
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_reset() {
        let mut config = Config::new();
        config.set_comparison_epsilon(1e-3).unwrap();
        config.max_depth = 4;
        config.reset();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_global_snapshot_is_a_copy() {
        let snapshot = Config::snapshot();
        assert!(snapshot.linearisation_tolerance > 0.0);
        assert!(snapshot.max_depth > 0);
    }
}
