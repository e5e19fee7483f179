use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DryadError, Result};
use crate::linearise::ToleranceConvergence;
use crate::reaction_product::ReactionProduct;
use crate::tabulated::TabulatedFunction;

/// A single reaction channel identified by its ENDF/MT number.
///
/// The cross section is tabulated over the incident energy and starts at the
/// reaction threshold. Below the threshold and above the last tabulated
/// energy the cross section is zero.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Reaction {
    /// ENDF/MT reaction identifier.
    pub mt_number: i32,
    /// Q-value of the reaction in eV (energy released/absorbed in the reaction)
    #[serde(default)]
    pub q_value: f64,
    /// Cross section in barns as a function of the incident energy in eV.
    pub cross_section: TabulatedFunction,
    /// Products emitted by this reaction (e.g., neutrons, photons, fragments)
    #[serde(default)]
    pub products: Vec<ReactionProduct>,
}

impl Reaction {
    pub fn new(mt_number: i32, q_value: f64, cross_section: TabulatedFunction) -> Self {
        Reaction {
            mt_number,
            q_value,
            cross_section,
            products: Vec::new(),
        }
    }

    /// Same reaction with the given products
    pub fn with_products(mut self, products: Vec<ReactionProduct>) -> Self {
        self.products = products;
        self
    }

    /// Cross section at the incident `energy`, 0 outside the tabulated range
    #[inline]
    pub fn cross_section_at(&self, energy: f64) -> f64 {
        self.cross_section.evaluate(energy)
    }

    /// Lowest tabulated incident energy
    pub fn threshold(&self) -> f64 {
        self.cross_section.lower_limit()
    }

    /// True when the cross section and every product are linear-linear
    pub fn is_linearised(&self) -> bool {
        self.cross_section.is_linearised() && self.products.iter().all(ReactionProduct::is_linearised)
    }

    /// Linear-linear copy of the reaction and its products
    pub fn linearise(&self, tolerance: &ToleranceConvergence) -> Result<Self> {
        let products = self
            .products
            .iter()
            .map(|product| product.linearise(tolerance))
            .collect::<Result<Vec<_>>>()?;
        let cross_section = self.cross_section.linearise(tolerance)?;
        debug!(
            mt = self.mt_number,
            points = cross_section.number_points(),
            "linearised reaction"
        );
        Ok(Reaction {
            mt_number: self.mt_number,
            q_value: self.q_value,
            cross_section,
            products,
        })
    }

    pub fn linearise_inplace(&mut self, tolerance: &ToleranceConvergence) -> Result<()> {
        *self = self.linearise(tolerance)?;
        Ok(())
    }
}

/// Sum of the cross sections of `reactions` on their union energy grid.
///
/// All cross sections must be linearised.
pub fn summed_cross_section(reactions: &[Reaction]) -> Result<TabulatedFunction> {
    let (first, rest) = reactions.split_first().ok_or_else(|| {
        DryadError::InvalidParameter("cannot sum the cross sections of zero reactions".to_string())
    })?;
    let mut total = first.cross_section.clone();
    for reaction in rest {
        total.add_assign_function(&reaction.cross_section)?;
    }
    debug!(
        reactions = reactions.len(),
        points = total.number_points(),
        "summed cross sections"
    );
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::InterpolationType;

    fn elastic() -> Reaction {
        Reaction::new(
            2,
            0.0,
            TabulatedFunction::new(vec![1e-5, 1.0, 2.0e7], vec![20.0, 10.0, 1.0]).unwrap(),
        )
    }

    fn inelastic() -> Reaction {
        Reaction::new(
            4,
            -1.0e6,
            TabulatedFunction::new(vec![1.0e6, 1.0e7, 2.0e7], vec![0.0, 0.5, 1.0]).unwrap(),
        )
    }

    #[test]
    fn test_cross_section_at() {
        let reaction = elastic();
        assert_eq!(reaction.cross_section_at(1.0), 10.0);
        assert_eq!(reaction.cross_section_at(2.0e7), 1.0);
        // outside the tabulated range
        assert_eq!(reaction.cross_section_at(1e-6), 0.0);
        assert_eq!(reaction.cross_section_at(3.0e7), 0.0);
        assert_eq!(inelastic().threshold(), 1.0e6);
        assert_eq!(inelastic().cross_section_at(5.5e6), 0.25);
    }

    #[test]
    fn test_summed_cross_section() {
        let total = summed_cross_section(&[elastic(), inelastic()]).unwrap();
        assert_eq!(total.domain_limits(), (1e-5, 2.0e7));
        assert_eq!(total.x(), &[1e-5, 1.0, 1.0e6, 1.0e7, 2.0e7]);
        assert_eq!(total.evaluate(2.0e7), 2.0);
        assert!(total.is_linearised());
        assert!(summed_cross_section(&[]).is_err());
    }

    #[test]
    fn test_summed_cross_section_requires_linear_data() {
        let log_log = Reaction::new(
            102,
            6.5e6,
            TabulatedFunction::with_interpolation(vec![1e-5, 2.0e7], vec![100.0, 1e-4], InterpolationType::LogLog).unwrap(),
        );
        let result = summed_cross_section(&[elastic(), log_log.clone()]);
        assert!(matches!(result, Err(DryadError::UnsupportedOperation(_))));

        let linear = log_log.linearise(&ToleranceConvergence::default()).unwrap();
        assert!(linear.is_linearised());
        assert_eq!(linear.mt_number, 102);
        assert_eq!(linear.threshold(), 1e-5);
        assert!(summed_cross_section(&[elastic(), linear]).is_ok());
    }

    #[test]
    fn test_serde_round_trip() {
        let reaction = elastic();
        let json = serde_json::to_string(&reaction).unwrap();
        let back: Reaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reaction);
    }
}
