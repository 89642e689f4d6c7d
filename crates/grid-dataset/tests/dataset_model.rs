//! Dataset model behaviour on generated ocean fields.

use chrono::{TimeZone, Utc};
use grid_dataset::{DatasetError, Variable};
use test_utils::{field_dataset, field_value, mask_dataset, regular_axis};

#[test]
fn test_field_dataset_layout() {
    let lons = regular_axis(-10.0, 0.5, 4);
    let lats = regular_axis(40.0, 0.5, 3);
    let ds = field_dataset("thetao", &lons, &lats, 2, Some(&[0.5, 5.0]));

    assert_eq!(ds.dimension_len("time"), Some(2));
    assert_eq!(ds.dimension_len("depth"), Some(2));
    assert_eq!(ds.dimension_len("latitude"), Some(3));
    assert_eq!(ds.dimension_len("longitude"), Some(4));

    let var = ds.variable("thetao").unwrap();
    assert_eq!(var.dims(), &["time", "depth", "latitude", "longitude"]);
    assert_eq!(var.values()[&[1, 1, 2, 3][..]], field_value(1, 1, 2, 3));
}

#[test]
fn test_time_decoding() {
    let ds = field_dataset("zos", &[0.0, 1.0], &[0.0, 1.0], 3, None);
    let times = ds.time_values("time").unwrap();
    assert_eq!(
        times,
        vec![
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2020, 1, 3, 0, 0, 0).unwrap(),
        ]
    );

    // latitude carries no units
    assert!(matches!(
        ds.time_values("latitude"),
        Err(DatasetError::InvalidTimeUnits(_))
    ));
}

#[test]
fn test_slice_to_spatial_plane() {
    let ds = field_dataset("so", &[0.0, 1.0, 2.0], &[5.0, 6.0], 2, Some(&[1.0]));
    let plane = ds
        .variable("so")
        .unwrap()
        .isel("time", 1)
        .unwrap()
        .squeeze_except(&["latitude", "longitude"]);
    assert_eq!(plane.dims(), &["latitude", "longitude"]);

    let flipped = plane.transpose(&["longitude", "latitude"]).unwrap();
    let arr = flipped.into_2d().unwrap();
    assert_eq!(arr.dim(), (3, 2));
    assert_eq!(arr[[2, 1]], field_value(1, 0, 1, 2));
}

#[test]
fn test_conflicting_dimension_rejected() {
    let mut ds = field_dataset("so", &[0.0, 1.0, 2.0], &[5.0, 6.0], 1, None);
    let wrong = Variable::from_vec("uo", &["time", "latitude", "longitude"], &[1, 3, 3], vec![0.0; 9]).unwrap();
    assert!(matches!(
        ds.add_variable(wrong),
        Err(DatasetError::ShapeMismatch { .. })
    ));
    assert!(!ds.contains("uo"));
}

#[test]
fn test_mask_attributes() {
    let ds = mask_dataset(&[0.0, 1.0], &[0.0], &[vec![1.0, 0.0]], "1 = sea ; 0 = land");
    let mask = ds.variable("mask").unwrap();
    assert_eq!(mask.attr("long_name").and_then(|a| a.as_str()), Some("1 = sea ; 0 = land"));
    assert!(matches!(
        ds.variable("deptho"),
        Err(DatasetError::VariableNotFound(_))
    ));
}
