//! Per-day tile summaries of assigned hauls.

use chrono::{TimeZone, Utc};
use test_utils::sea_mask;
use tile_catalog::{Column, PointTable, PointTileAssigner, SeaMaskBuilder, TileError};
use tile_frames::{FrameError, TileDaysBuilder, DEEPEST_DEPTH};

fn assigned(tile_ids: Vec<i64>, times: Vec<&str>, depths: Vec<f64>) -> PointTable {
    let n = tile_ids.len();
    PointTable::new()
        .with_column("tile_id", Column::Int(tile_ids.clone()))
        .unwrap()
        .with_column(
            "tile_lon_center",
            Column::Float(tile_ids.iter().map(|&t| t as f64 * 0.25).collect()),
        )
        .unwrap()
        .with_column("tile_lat_center", Column::Float(vec![45.0; n]))
        .unwrap()
        .with_column("time", Column::Text(times.into_iter().map(String::from).collect()))
        .unwrap()
        .with_column("depth", Column::Float(depths))
        .unwrap()
}

#[test]
fn test_build_per_day() {
    let points = assigned(
        vec![2, 0, 2, 2, 0, -1],
        vec![
            "2021-03-04 05:00:00",
            "2021-03-04",
            "04/03/2021",
            "2021-03-05T01:00:00Z",
            "garbage",
            "2021-03-04",
        ],
        vec![10.0, 5.0, 30.0, f64::NAN, 50.0, 2.0],
    );

    let out = TileDaysBuilder::new().build_per_day(&points).unwrap();
    let day = |d| Utc.with_ymd_and_hms(2021, 3, d, 0, 0, 0).unwrap();

    assert_eq!(out.i64_column("tile_id").unwrap(), &[-1, 0, 2, 2]);
    assert_eq!(
        out.column("time").unwrap(),
        &Column::Time(vec![day(4), day(4), day(4), day(5)])
    );
    // the unparseable row does not count towards tile 0's depth
    assert_eq!(out.f64_column(DEEPEST_DEPTH).unwrap(), vec![2.0, 5.0, 30.0, 30.0]);
    assert_eq!(out.f64_column("tile_lon_center").unwrap(), vec![-0.25, 0.0, 0.5, 0.5]);
    assert_eq!(
        out.column_names().collect::<Vec<_>>(),
        vec!["tile_id", "tile_lon_center", "tile_lat_center", "time", DEEPEST_DEPTH]
    );
}

#[test]
fn test_all_nan_depths_is_error() {
    let points = assigned(
        vec![1, 3, 1],
        vec!["2021-01-01"; 3],
        vec![f64::NAN, 4.0, f64::NAN],
    );
    let err = TileDaysBuilder::new().build_per_day(&points).unwrap_err();
    assert!(matches!(err, FrameError::MissingDepths(ref tiles) if tiles == &[1]));
}

#[test]
fn test_missing_column() {
    let points = PointTable::new()
        .with_column("tile_id", Column::Int(vec![0]))
        .unwrap();
    let err = TileDaysBuilder::new().build_per_day(&points).unwrap_err();
    assert!(matches!(err, FrameError::Tile(TileError::ColumnNotFound(_))));
}

#[test]
fn test_from_assigner_output() {
    let ds = sea_mask::bitfield_dataset();
    let assigner = PointTileAssigner::from_dataset(&ds, &SeaMaskBuilder::bitfield("mask", 1), None).unwrap();

    let t = Utc.with_ymd_and_hms(2021, 6, 1, 14, 30, 0).unwrap();
    let hauls = PointTable::new()
        .with_column("lon", Column::Float(vec![0.02, 0.74, 0.01]))
        .unwrap()
        .with_column("lat", Column::Float(vec![45.01, 45.05, 45.02]))
        .unwrap()
        .with_column("time", Column::Time(vec![t; 3]))
        .unwrap()
        .with_column("depth", Column::Int(vec![12, 40, 25]))
        .unwrap();

    let enriched = assigner.assign(&hauls, Some(1.0)).unwrap();
    let days = TileDaysBuilder::new().build_per_day(&enriched).unwrap();

    assert_eq!(days.i64_column("tile_id").unwrap(), &[0, 3]);
    assert_eq!(days.f64_column(DEEPEST_DEPTH).unwrap(), vec![25.0, 40.0]);
    assert_eq!(
        days.column("time").unwrap(),
        &Column::Time(vec![Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap(); 2])
    );
}
