//! Point assignment against a static mask layer, driven by configuration.

use std::io::Write;

use chrono::{TimeZone, Utc};
use test_utils::{assert_approx_eq, mask_dataset, sea_mask, EnvGuard};
use tile_catalog::{
    Column, MaskDecoding, PointColumns, PointTable, PointTileAssigner, SeaMaskBuilder, TileError,
    TilingConfig,
};

fn hauls() -> PointTable {
    PointTable::new()
        .with_column("lon", Column::Float(vec![0.02, 0.74, 0.55, 30.0]))
        .unwrap()
        .with_column("lat", Column::Float(vec![45.01, 45.05, 45.02, -10.0]))
        .unwrap()
        .with_column(
            "time",
            Column::Time(vec![Utc.with_ymd_and_hms(2021, 3, 4, 5, 0, 0).unwrap(); 4]),
        )
        .unwrap()
}

#[test]
fn test_assign_appends_tile_and_center() {
    let ds = sea_mask::bitfield_dataset();
    let assigner = PointTileAssigner::from_dataset(&ds, &SeaMaskBuilder::bitfield("mask", 1), None).unwrap();
    assert_eq!(assigner.catalog().len(), 7);
    // median of [45.0, 45.25]
    assert_approx_eq!(assigner.index().lat0(), 45.125, 1e-12);

    let out = assigner.assign(&hauls(), Some(1.0)).unwrap();
    // sea cells: row 0 -> ids 0..4 at lons 0, .25, .5, .75; row 1 -> 4, 5 at 0, .25 and 6 at 1.0
    let ids = out.i64_column("tile_id").unwrap();
    assert_eq!(ids, &[0, 3, 2, -1]);

    let lon_c = out.f64_column("tile_lon_center").unwrap();
    let lat_c = out.f64_column("tile_lat_center").unwrap();
    assert_approx_eq!(lon_c[1], 0.75, 1e-12);
    assert_approx_eq!(lat_c[1], 45.0, 1e-12);
    assert!(lon_c[3].is_nan() && lat_c[3].is_nan());

    // input columns survive untouched, new ones are appended
    let names: Vec<&str> = out.column_names().collect();
    assert_eq!(
        names,
        vec!["lon", "lat", "time", "tile_id", "tile_lon_center", "tile_lat_center"]
    );
}

#[test]
fn test_assign_requires_coordinate_columns() {
    let ds = sea_mask::bitfield_dataset();
    let assigner = PointTileAssigner::from_dataset(&ds, &SeaMaskBuilder::bitfield("mask", 1), None)
        .unwrap()
        .with_columns(PointColumns {
            lon: "longitude".into(),
            ..PointColumns::default()
        });
    let err = assigner.assign(&hauls(), None).unwrap_err();
    assert!(matches!(err, TileError::ColumnNotFound(ref c) if c == "longitude"));
}

#[test]
fn test_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
mask:
  variable: mask
  decoding:
    mode: categorical
index:
  lat0: 0.0
  tolerance_deg: 0.5
columns:
  lon: x
  lat: y
  tile_id: cell
"#
    )
    .unwrap();
    let config = TilingConfig::from_file(file.path()).unwrap();

    let ds = mask_dataset(
        &[0.0, 1.0],
        &[0.0, 1.0],
        &[vec![2.0, 1.0], vec![1.0, 1.0]],
        "2 = sea, 1 = land",
    );
    let assigner = PointTileAssigner::from_config(&ds, &config).unwrap();
    assert_eq!(assigner.catalog().len(), 1);
    assert_eq!(assigner.tolerance_deg(), Some(0.5));

    let points = PointTable::new()
        .with_column("x", Column::Int(vec![0, 1]))
        .unwrap()
        .with_column("y", Column::Int(vec![0, 1]))
        .unwrap();
    // (1, 1) is sqrt(2) away from the only sea tile
    let out = assigner.assign_configured(&points).unwrap();
    assert_eq!(out.i64_column("cell").unwrap(), &[0, -1]);

    let out = assigner.assign(&points, None).unwrap();
    assert_eq!(out.i64_column("cell").unwrap(), &[0, 0]);
}

#[test]
fn test_spelled_out_coordinates_preferred() {
    let mut ds = sea_mask::bitfield_dataset();
    // auxiliary axes that do not describe the mask grid
    ds.add_coordinate("lon", vec![-1.0, 1.0, 3.0]).unwrap();
    ds.add_coordinate("lat", vec![0.0]).unwrap();

    let assigner = PointTileAssigner::from_dataset(&ds, &SeaMaskBuilder::bitfield("mask", 1), None).unwrap();
    assert_eq!(assigner.catalog().grid().lon_name(), "longitude");
    assert_eq!(assigner.catalog().grid().lat_name(), "latitude");
    assert_eq!(assigner.catalog().len(), 7);
}

#[test]
fn test_from_config_rejects_invalid() {
    let mut config = TilingConfig::default();
    config.mask.decoding = MaskDecoding::Bitfield { sea_bit: 0 };
    let err = PointTileAssigner::from_config(&sea_mask::bitfield_dataset(), &config).unwrap_err();
    assert!(matches!(err, TileError::Config(_)));
}

#[test]
fn test_env_overrides() {
    let _env = EnvGuard::set(&[
        ("TILE_MASK_VAR", "lsm"),
        ("TILE_SEA_VALUE", "4"),
        ("TILE_LAT0", "not-a-number"),
        ("TILE_TOLERANCE_DEG", "0.1"),
    ]);

    let config = TilingConfig::from_env();
    assert_eq!(config.mask.variable, "lsm");
    assert_eq!(config.mask.decoding, MaskDecoding::Bitfield { sea_bit: 4 });
    assert_eq!(config.index.lat0, None);
    assert_eq!(config.index.tolerance_deg, Some(0.1));
}
