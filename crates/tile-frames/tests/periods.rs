//! Monthly files converted against one catalog built from a static mask.

use grid_dataset::Dataset;
use test_utils::{add_field, field_dataset, mask_dataset, numbering, temp_test_dir};
use tile_catalog::{SeaMaskBuilder, TileError};
use tile_frames::{FrameConfig, FrameError, PeriodFrameConverter};

fn static_mask() -> Dataset {
    let rows: Vec<Vec<f64>> = numbering::MASK
        .iter()
        .map(|r| r.iter().map(|&sea| if sea { 1.0 } else { 0.0 }).collect())
        .collect();
    mask_dataset(&numbering::LONS, &numbering::LATS, &rows, "Land-sea mask: 1 = sea ; 0 = land")
}

fn monthly(lons: &[f64], n_times: usize) -> Dataset {
    let mut ds = field_dataset("thetao", lons, &numbering::LATS, n_times, None);
    add_field(&mut ds, "so", 0.5);
    ds
}

fn config() -> FrameConfig {
    FrameConfig {
        variables: vec!["thetao".into(), "so".into()],
        bbox_id: Some(1),
        ..FrameConfig::default()
    }
}

fn converter() -> PeriodFrameConverter {
    PeriodFrameConverter::from_static(&static_mask(), &SeaMaskBuilder::categorical("mask", None), config())
        .unwrap()
}

#[test]
fn test_convert_months() {
    let jan = monthly(&numbering::LONS, 2);
    let feb = monthly(&numbering::LONS, 3);

    let conv = converter();
    assert!(!jan.contains("mask"));
    let frames = conv
        .convert([("glo_thetao_so_2021-01.nc", &jan), ("glo_thetao_so_202102.nc", &feb)])
        .unwrap();

    assert_eq!(conv.catalog().len(), 5);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].period, "2021-01");
    assert_eq!(frames[0].stem, "2021-01__thetao_so");
    assert_eq!(frames[1].period, "2021-02");
    assert_eq!(frames[1].source, "glo_thetao_so_202102.nc");
    assert_eq!(frames[0].frame.len(), 10);
    assert_eq!(frames[1].frame.len(), 15);
    assert_eq!(frames[1].frame.bbox_id(), Some(1));
}

#[test]
fn test_write_period_csv() {
    let jan = monthly(&numbering::LONS, 1);
    let frames = converter().convert([("2021-01.nc", &jan)]).unwrap();

    let dir = temp_test_dir();
    let path = frames[0].write_csv(dir.path().join("csv")).unwrap();
    assert_eq!(path.file_name().unwrap(), "2021-01__thetao_so.csv");

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "time,depth_idx,depth_value,tile_id,tile_lon,tile_lat,bbox_id,thetao,so"
    );
    assert_eq!(lines.len(), 1 + 5);
    // tile 2 is the center cell (row 1, col 1)
    assert_eq!(lines[3], "2020-01-01T00:00:00Z,-1,,2,200,20,1,101,101.5");
}

#[test]
fn test_first_period_checked_against_static_grid() {
    let mut lons = numbering::LONS.to_vec();
    lons[2] += 0.5;
    let jan = monthly(&lons, 1);

    let err = converter().convert([("2021-01.nc", &jan)]).unwrap_err();
    assert!(matches!(err, FrameError::Tile(TileError::GridMismatch { .. })));
}

#[test]
fn test_prebuilt_catalog() {
    let conv = converter();
    let shared = PeriodFrameConverter::new(conv.catalog().clone(), config());
    let jan = monthly(&numbering::LONS, 1);

    let frames = shared.convert([("2021-01.nc", &jan)]).unwrap();
    assert_eq!(frames[0].frame.tile_ids(), &[0, 1, 2, 3, 4]);
}

#[test]
fn test_static_mask_variable_required() {
    let err = PeriodFrameConverter::from_static(
        &monthly(&numbering::LONS, 1),
        &SeaMaskBuilder::categorical("mask", None),
        config(),
    )
    .unwrap_err();
    assert!(matches!(err, FrameError::Tile(_)));
}

#[test]
fn test_grid_mismatch_aborts() {
    let jan = monthly(&numbering::LONS, 1);
    let mut lons = numbering::LONS.to_vec();
    lons[1] += 0.001;
    let feb = monthly(&lons, 1);

    let err = converter()
        .convert([("2021-01.nc", &jan), ("2021-02.nc", &feb)])
        .unwrap_err();
    assert!(matches!(err, FrameError::Tile(TileError::GridMismatch { .. })));
}

#[test]
fn test_empty_frame_is_error() {
    let jan = monthly(&numbering::LONS, 1);
    let feb = monthly(&numbering::LONS, 0);

    let err = converter()
        .convert([("2021-01.nc", &jan), ("2021-02.nc", &feb)])
        .unwrap_err();
    assert!(matches!(err, FrameError::EmptyFrame(ref name) if name == "2021-02.nc"));
}

#[test]
fn test_period_key_required() {
    let jan = monthly(&numbering::LONS, 1);
    let err = converter().convert([("latest.nc", &jan)]).unwrap_err();
    assert!(matches!(err, FrameError::PeriodKey(_)));
}

#[test]
fn test_invalid_inputs() {
    let none: Vec<(&str, &Dataset)> = Vec::new();
    assert!(matches!(converter().convert(none), Err(FrameError::Config(_))));

    let jan = monthly(&numbering::LONS, 1);
    let bare = PeriodFrameConverter::new(converter().catalog().clone(), FrameConfig::default());
    assert!(matches!(bare.convert([("2021-01.nc", &jan)]), Err(FrameError::Config(_))));
}
