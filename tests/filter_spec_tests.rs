mod common;

use gcm_filters_rs::filter::response::{impulse_response, WaveNumbers};
use gcm_filters_rs::filter::spec::{compute_filter_spec, MAX_STEPS};
use gcm_filters_rs::{Filter, FilterArgs, FilterError, FilterShape, FilterSpec, GridType, GridVars, PI};
use rustfft::num_complex::Complex;

fn check_equal_filter_spec(spec: &FilterSpec, expected: &FilterSpec) {
    assert_eq!(spec.n_lap_steps, expected.n_lap_steps);
    assert_eq!(spec.n_bih_steps, expected.n_bih_steps);
    for (a, b) in spec.s_l.iter().zip(&expected.s_l) {
        assert!((a - b).abs() < 1E-7 * b.abs(), "{} != {}", a, b);
    }
    for (a, b) in spec.s_b.iter().zip(&expected.s_b) {
        assert!((a - b).norm() < 1E-7 * b.norm(), "{} != {}", a, b);
    }
}

#[test]
fn known_filter_specs() {
    let cases = vec![
        (
            FilterArgs::new(10.0, 1.0, FilterShape::Gaussian).n_steps(4),
            FilterSpec {
                n_lap_steps: 4,
                s_l: vec![2.56046256, 8.47349198, 15.22333438, 19.7392088],
                n_bih_steps: 0,
                s_b: vec![],
            },
        ),
        (
            FilterArgs::new(2.0, 1.0, FilterShape::Taper).ndim(1),
            FilterSpec {
                n_lap_steps: 1,
                s_l: vec![9.8696044],
                n_bih_steps: 4,
                s_b: vec![
                    Complex::new(-0.74638043, -1.24167777),
                    Complex::new(3.06062496, -3.94612205),
                    Complex::new(7.80242999, -3.18038659),
                    Complex::new(9.81491354, -0.44874939),
                ],
            },
        ),
    ];
    for (args, expected) in cases {
        let filter = Filter::new(GridType::Cartesian, &GridVars::new(), &args).unwrap();
        check_equal_filter_spec(filter.filter_spec(), &expected);
    }
}

#[test]
fn spec_is_deterministic() {
    let args = FilterArgs::new(6.0, 1.5, FilterShape::Taper).transition_width(2.5);
    assert_eq!(args.filter_spec().unwrap(), args.filter_spec().unwrap());
}

#[test]
fn step_counts_add_up() {
    for &shape in [FilterShape::Gaussian, FilterShape::Taper].iter() {
        for &ndim in [1, 2].iter() {
            for &scale in [1.5, 3.0, 8.0].iter() {
                let spec = FilterArgs::new(scale, 1.0, shape)
                    .ndim(ndim)
                    .filter_spec()
                    .unwrap();
                assert_eq!(spec.s_l.len(), spec.n_lap_steps);
                assert_eq!(spec.s_b.len(), spec.n_bih_steps);
                assert_eq!(spec.n_stages(), spec.n_lap_steps + spec.n_bih_steps);
                assert!(spec.n_steps() >= shape.heuristic_n_steps(scale, 1.0));
                assert!(spec.s_b.iter().all(|s| s.im < 0.0));
                // unit response at the largest scales
                assert!((spec.transfer(0.0) - 1.0).abs() < 1E-10);
            }
        }
    }
}

#[test]
fn fixed_step_count_sets_the_degree() {
    for n in 3..12 {
        let spec = compute_filter_spec(4.0, 1.0, FilterShape::Taper, PI, 2, Some(n)).unwrap();
        assert_eq!(spec.n_steps(), n);
    }
}

#[test]
fn invalid_parameters_are_rejected() {
    let cases = [
        FilterArgs::new(1.0, 1.0, FilterShape::Taper),
        FilterArgs::new(4.0, -1.0, FilterShape::Taper),
        FilterArgs::new(4.0, 1.0, FilterShape::Taper).transition_width(0.5),
        FilterArgs::new(4.0, 1.0, FilterShape::Gaussian).ndim(0),
        FilterArgs::new(4.0, 1.0, FilterShape::Gaussian).n_steps(1),
        FilterArgs::new(4.0, 1.0, FilterShape::Gaussian).n_steps(MAX_STEPS + 1),
    ];
    for args in cases.iter() {
        match Filter::new(GridType::Cartesian, &GridVars::new(), args) {
            Err(FilterError::InvalidParameter(_)) => {}
            Err(other) => panic!("{:?} gave {:?}", args, other),
            Ok(_) => panic!("{:?} was accepted", args),
        }
    }
}

#[test]
fn adaptive_search_is_bounded() {
    // the heuristic alone needs 4500 steps
    let args = FilterArgs::new(1000.0, 1.0, FilterShape::Taper);
    match args.filter_spec() {
        Err(FilterError::InvalidParameter(msg)) => assert!(msg.contains("limit of 1000"), "{}", msg),
        other => panic!("expected InvalidParameter, got {:?}", other),
    }

    // a very narrow taper never reaches the tolerance
    let args = FilterArgs::new(2.0, 1.0, FilterShape::Taper).transition_width(1.01);
    match args.filter_spec() {
        Err(err @ FilterError::NonConvergence { .. }) => {
            assert!(err.to_string().contains("after 64 candidates"), "{}", err);
        }
        other => panic!("expected NonConvergence, got {:?}", other),
    }
}

#[test]
fn narrow_tapers_need_more_steps() {
    for &scale in [2.0, 4.0].iter() {
        let heuristic = FilterShape::Taper.heuristic_n_steps(scale, 1.0);
        let args = FilterArgs::new(scale, 1.0, FilterShape::Taper).transition_width(1.1);
        let filter = Filter::new(GridType::Cartesian, &GridVars::new(), &args).unwrap();
        let spec = filter.filter_spec();
        assert!(spec.n_steps() > heuristic, "{} <= {}", spec.n_steps(), heuristic);
        assert_eq!(spec.s_l.len() + 2 * spec.s_b.len(), spec.n_steps());
        assert!((spec.transfer(0.0) - 1.0).abs() < 1E-8);
    }
}

#[test]
fn unresolved_taper_is_rejected() {
    let args = FilterArgs::new(1.5, 1.0, FilterShape::Taper)
        .transition_width(1.1)
        .ndim(1);
    for args in [args, args.n_steps(8)].iter() {
        match Filter::new(GridType::Cartesian, &GridVars::new(), args) {
            Err(FilterError::InvalidParameter(msg)) => assert!(msg.contains("identity"), "{}", msg),
            Err(other) => panic!("{:?} gave {:?}", args, other),
            Ok(_) => panic!("{:?} was accepted", args),
        }
    }
}

#[test]
fn realised_response_matches_spec() {
    let args = FilterArgs::new(3.0, 1.0, FilterShape::Taper).n_steps(14);
    let filter = Filter::new(GridType::Cartesian, &GridVars::new(), &args).unwrap();
    let (ny, nx) = (32, 48);
    let response = impulse_response(&filter, ny, nx).unwrap();
    let wn = WaveNumbers::new(common::dim(ny, nx));
    let spec = filter.filter_spec();
    for (r, &eig) in response.iter().zip(&wn.lap_eigen) {
        let expected = spec.transfer(eig as f64);
        assert!((r.re as f64 - expected).abs() < 1E-8);
        assert!(r.im.abs() < 1E-8);
    }
}
