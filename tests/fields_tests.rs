mod common;

use gcm_filters_rs::{Field, FilterError, Float, NamedArray, Pos};

fn init_array() -> NamedArray {
    // (time, y, x) stack of three random 12 x 24 fields
    let mut data = Vec::new();
    for t in 0..3 {
        data.extend(common::random_field(12, 24, t).spatial);
    }
    let dims = ["time", "y", "x"].iter().map(|s| s.to_string()).collect();
    NamedArray::new(dims, vec![3, 12, 24], data).unwrap()
}

#[test]
fn test_field_init() {
    let fld = Field::new(common::dim(12, 24));
    assert_eq!(fld.spatial.len(), 12 * 24);
    assert!(fld.spatial.iter().all(|&v| v == 0.0));
    assert_eq!(fld.dim().size_x, 24);
    assert_eq!(fld.dim().size_y, 12);
}

#[test]
fn random_fields_are_reproducible() {
    let a = common::random_field(12, 24, 42);
    let b = common::random_field(12, 24, 42);
    let c = common::random_field(12, 24, 43);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.spatial.iter().all(|&v| (0.0..1.0).contains(&v)));
}

#[test]
fn named_array_slices_follow_the_batch_axis() {
    let arr = init_array();
    let (ay, ax) = arr.spatial_axes(&["y", "x"]).unwrap();
    assert_eq!((ay, ax), (1, 2));
    assert_eq!(arr.n_slices(ay, ax), 3);
    let offsets = arr.slice_offsets(ay, ax);
    assert_eq!(offsets, vec![0, 288, 576]);
    for (t, &offset) in offsets.iter().enumerate() {
        assert_eq!(
            arr.gather(offset, ay, ax).unwrap(),
            common::random_field(12, 24, t as u64)
        );
    }
    let total: Float = (0..3).map(|t| common::random_field(12, 24, t).sum()).sum();
    assert!((arr.sum() - total).abs() < 1E-9);
}

#[test]
fn swapped_filter_dims_transpose_the_slice() {
    let arr = init_array();
    let (ay, ax) = arr.spatial_axes(&["x", "y"]).unwrap();
    let slice = arr.gather(0, ay, ax).unwrap();
    let orig = common::random_field(12, 24, 0);
    assert_eq!(slice.dim(), common::dim(24, 12));
    assert_eq!(
        slice.get(Pos { row: 5, col: 3 }),
        orig.get(Pos { row: 3, col: 5 })
    );
}

#[test]
fn unknown_dims_are_reported() {
    let arr = init_array();
    match arr.spatial_axes(&["lat", "lon"]) {
        Err(FilterError::Dimension(msg)) => assert!(msg.contains("lat")),
        other => panic!("expected a dimension error, got {:?}", other),
    }
}
