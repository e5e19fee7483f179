use dryad::{linearise_function, InterpolationType, TabulatedFunction, ToleranceConvergence};

fn linear_log_table() -> TabulatedFunction {
    TabulatedFunction::with_regions(
        vec![1.0, 2.0, 3.0, 4.0],
        vec![4.0, 3.0, 2.0, 1.0],
        vec![1, 3],
        vec![InterpolationType::LinearLinear, InterpolationType::LinearLog],
    )
    .unwrap()
}

#[test]
fn test_linear_log_region_bisection_pattern() {
    let table = linear_log_table();
    let linear = table.linearise(&ToleranceConvergence::default()).unwrap();

    assert!(linear.is_linearised());
    assert_eq!(linear.number_points(), 18);
    assert_eq!(linear.domain_limits(), (1.0, 4.0));
    assert_eq!(linear.x()[0], 1.0);
    for (i, x) in linear.x()[1..].iter().enumerate() {
        assert_eq!(*x, 2.0 + 0.125 * i as f64);
    }
    for (x, y) in linear.x().iter().zip(linear.y()) {
        assert!((table.evaluate(*x) - y).abs() < 1e-12);
    }
    assert!((linear.evaluate(2.5) - 2.44966028678679).abs() < 1e-12);
}

#[test]
fn test_linearise_is_idempotent() {
    let table = linear_log_table();
    let tolerance = ToleranceConvergence::default();
    let once = table.linearise(&tolerance).unwrap();
    let twice = once.linearise(&tolerance).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_tighter_tolerance_adds_points() {
    let table = TabulatedFunction::with_interpolation(
        vec![1.0, 1000.0],
        vec![1000.0, 1.0],
        InterpolationType::LogLog,
    )
    .unwrap();
    let coarse = table.linearise(&ToleranceConvergence::new(1e-2).unwrap()).unwrap();
    let fine = table.linearise(&ToleranceConvergence::new(1e-4).unwrap()).unwrap();
    assert!(fine.number_points() > coarse.number_points());

    for x in [1.5, 10.0, 123.0, 777.0] {
        let exact = table.evaluate(x);
        assert!((fine.evaluate(x) - exact).abs() <= 1e-3 * exact);
    }
}

#[test]
fn test_every_law_linearises() {
    let laws = [
        InterpolationType::Histogram,
        InterpolationType::LinearLinear,
        InterpolationType::LinearLog,
        InterpolationType::LogLinear,
        InterpolationType::LogLog,
    ];
    for law in laws {
        let table = TabulatedFunction::with_interpolation(vec![1.0, 2.0, 4.0], vec![1.0, 3.0, 2.0], law).unwrap();
        let linear = table.linearise(&ToleranceConvergence::default()).unwrap();
        assert!(linear.is_linearised(), "{:?}", law);
        assert_eq!(linear.domain_limits(), table.domain_limits());
        for (x, y) in linear.x().iter().zip(linear.y()) {
            // histogram steps create jumps whose right value belongs to the next step
            if law != InterpolationType::Histogram {
                assert!((table.evaluate(*x) - y).abs() < 1e-12, "{:?} at {}", law, x);
            }
        }
        assert!((linear.integral() - table.integral()).abs() < 1e-2 * table.integral());
    }
}

#[test]
fn test_linearise_function_with_seed_grid() {
    let tolerance = ToleranceConvergence::with_absolute(1e-4, 1e-12).unwrap();
    let seed: Vec<f64> = (0..=8).map(|i| i as f64 * std::f64::consts::PI / 8.0).collect();
    let linear = linearise_function(f64::sin, &seed, &tolerance).unwrap();
    assert!(linear.is_linearised());
    for x in [0.1, 0.9, 1.5, 2.2, 3.0] {
        assert!((linear.evaluate(x) - x.sin()).abs() < 1e-3);
    }
}
