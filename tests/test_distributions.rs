use dryad::{
    AngleEnergyDistribution, AngularDistribution, Distribution, InterpolationType, LegendreSeries,
    Multiplicity, ParticleID, Reaction, ReactionProduct, TabulatedDistribution, TabulatedDistributions,
    TabulatedFunction, ToleranceConvergence,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn maxwellian_like() -> TabulatedDistribution {
    TabulatedDistribution::new(
        TabulatedFunction::with_interpolation(
            vec![1e3, 1e5, 1e6, 1e7],
            vec![1e-8, 5e-7, 2e-7, 1e-9],
            InterpolationType::LogLog,
        )
        .unwrap(),
    )
    .unwrap()
}

#[test]
fn test_distribution_normalisation_is_scale_insensitive() {
    let original = maxwellian_like();
    let mut normalised = original.clone();
    normalised.normalise().unwrap();

    assert!((normalised.integral() - 1.0).abs() < 1e-10);
    assert_eq!(normalised, original);
    assert!((normalised.average().unwrap() - original.average().unwrap()).abs() < 1e-6 * original.average().unwrap());

    let cdf = normalised.cdf();
    assert!(cdf.y().windows(2).all(|pair| pair[0] <= pair[1]));
    assert!((cdf.y()[cdf.number_points() - 1] - 1.0).abs() < 1e-10);
}

#[test]
fn test_samples_stay_in_the_domain() {
    let distribution = maxwellian_like();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let energy = distribution.sample(&mut rng);
        assert!(energy >= distribution.lower_limit() && energy <= distribution.upper_limit());
    }
}

#[test]
fn test_average_cosine_over_energy() {
    let angles = TabulatedDistributions::new(
        vec![1e5, 1e6, 2e7],
        vec![
            AngularDistribution::Isotropic,
            AngularDistribution::Legendre(LegendreSeries::new(vec![1.0, 0.6]).unwrap()),
            AngularDistribution::Tabulated(
                TabulatedDistribution::from_values(vec![-1.0, 1.0], vec![0.0, 1.0]).unwrap(),
            ),
        ],
    )
    .unwrap();

    let average_cosine = angles.average_values().unwrap();
    assert_eq!(average_cosine.x(), &[1e5, 1e6, 2e7]);
    assert_eq!(average_cosine.y()[0], 0.0);
    assert!((average_cosine.y()[1] - 0.2).abs() < 1e-12);
    assert!((average_cosine.y()[2] - 1.0 / 3.0).abs() < 1e-12);

    // two-dimensional evaluation interpolates the neighbouring values
    let value = angles.evaluate(5.5e5, 0.0);
    assert!((value - 0.75).abs() < 1e-12);
    assert_eq!(angles.evaluate(1e4, 0.0), 0.0);

    let mut normalised = angles.clone();
    normalised.normalise().unwrap();
    assert_eq!(normalised, angles);

    let linear = angles.linearise(&ToleranceConvergence::default()).unwrap();
    for distribution in linear.distributions() {
        assert!(matches!(distribution, AngularDistribution::Tabulated(_)));
    }
}

#[test]
fn test_reaction_with_products() {
    let angle = TabulatedDistributions::new(
        vec![1e-5, 2e7],
        vec![AngularDistribution::Isotropic, AngularDistribution::Isotropic],
    )
    .unwrap();
    let neutron = ReactionProduct::new(ParticleID::new("n").unwrap(), Multiplicity::Constant { value: 1.0 })
        .with_distribution(AngleEnergyDistribution::UncorrelatedAngleEnergy { angle, energy: None });
    let reaction = Reaction::new(
        2,
        0.0,
        TabulatedFunction::with_interpolation(vec![1e-5, 2e7], vec![20.0, 2.0], InterpolationType::LogLog).unwrap(),
    )
    .with_products(vec![neutron]);

    assert!(!reaction.is_linearised());
    let linear = reaction.linearise(&ToleranceConvergence::default()).unwrap();
    assert!(linear.is_linearised());
    assert_eq!(linear.products.len(), 1);
    assert_eq!(linear.products[0].particle.to_string(), "n");
    let energy = 1e3;
    let exact = reaction.cross_section_at(energy);
    assert!((linear.cross_section_at(energy) - exact).abs() <= 2e-3 * exact);
}

#[test]
fn test_reaction_json() {
    let json = r#"{
        "mt_number": 102,
        "q_value": 6.5e6,
        "cross_section": {"x": [1e-5, 1.0, 2e7], "y": [100.0, 1.0, 1e-4], "boundaries": [2], "interpolants": [5]},
        "products": [
            {"particle": "g", "multiplicity": {"type": "Constant", "value": 1.0}}
        ]
    }"#;
    let reaction: Reaction = serde_json::from_str(json).unwrap();
    assert_eq!(reaction.mt_number, 102);
    assert_eq!(reaction.products[0].particle, ParticleID::photon());
    assert!(reaction.products[0].distribution.is_none());
    assert_eq!(reaction.cross_section_at(1.0), 1.0);
}
