//! Common test fixtures for sea-tiles tests.
//!
//! Small grids whose tile numbering and nearest-neighbour answers have been
//! worked out by hand.

use grid_dataset::{Dataset, Variable};

use crate::generators::{add_time_axis, grid_dataset};

/// 3x3 checkerboard used to pin down row-major tile numbering.
pub mod numbering {
    pub const LONS: [f64; 3] = [100.0, 200.0, 300.0];
    pub const LATS: [f64; 3] = [10.0, 20.0, 30.0];

    /// `MASK[row][col]`, rows follow `LATS`.
    pub const MASK: [[bool; 3]; 3] = [
        [true, false, true],
        [false, true, false],
        [true, false, true],
    ];

    /// (row, col) of tile ids 0..5.
    pub const EXPECTED_CELLS: [(usize, usize); 5] = [(0, 0), (0, 2), (1, 1), (2, 0), (2, 2)];

    /// (lon, lat) of tile ids 0..5.
    pub const EXPECTED_COORDS: [(f64, f64); 5] = [
        (100.0, 10.0),
        (300.0, 10.0),
        (200.0, 20.0),
        (100.0, 30.0),
        (300.0, 30.0),
    ];

    pub fn mask_rows() -> Vec<Vec<bool>> {
        MASK.iter().map(|r| r.to_vec()).collect()
    }
}

/// 4x4 all-sea grid with corner and center query points.
pub mod five_points {
    pub const LONS: [f64; 4] = [0.0, 1.0, 2.0, 3.0];
    pub const LATS: [f64; 4] = [10.0, 11.0, 12.0, 13.0];

    /// A query point and the tile it must land on.
    #[derive(Debug, Clone, Copy)]
    pub struct QueryCase {
        pub name: &'static str,
        pub lon: f64,
        pub lat: f64,
        pub tile_id: i64,
        pub tile_lon: f64,
        pub tile_lat: f64,
    }

    pub const POINTS: [QueryCase; 5] = [
        QueryCase { name: "top_left", lon: 0.1, lat: 12.9, tile_id: 12, tile_lon: 0.0, tile_lat: 13.0 },
        QueryCase { name: "top_right", lon: 2.9, lat: 12.9, tile_id: 15, tile_lon: 3.0, tile_lat: 13.0 },
        QueryCase { name: "bottom_left", lon: 0.1, lat: 10.1, tile_id: 0, tile_lon: 0.0, tile_lat: 10.0 },
        QueryCase { name: "bottom_right", lon: 2.9, lat: 10.1, tile_id: 3, tile_lon: 3.0, tile_lat: 10.0 },
        QueryCase { name: "center", lon: 1.6, lat: 11.7, tile_id: 10, tile_lon: 2.0, tile_lat: 12.0 },
    ];

    pub fn mask_rows() -> Vec<Vec<bool>> {
        vec![vec![true; LONS.len()]; LATS.len()]
    }
}

/// Two sea cells on a diagonal where the projection decides the answer.
///
/// At `lat0 = 60.225` a degree of longitude is about half a degree of
/// latitude, so (0.5, 60.0) is closer to the (1.0, 60.0) sea cell than to
/// (0.5, 60.45) even though the raw degree distances say otherwise.
pub mod counterexample {
    pub const LONS: [f64; 2] = [0.5, 1.0];
    pub const LATS: [f64; 2] = [60.0, 60.45];

    pub const MASK: [[bool; 2]; 2] = [[false, true], [true, false]];

    pub const QUERY: (f64, f64) = (0.5, 60.0);
    pub const EXPECTED_TILE: i64 = 0;

    pub fn mask_rows() -> Vec<Vec<bool>> {
        MASK.iter().map(|r| r.to_vec()).collect()
    }
}

/// 2x5 raw mask variables for the two decoding strategies.
pub mod sea_mask {
    use super::*;

    pub const LONS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];
    pub const LATS: [f64; 2] = [45.0, 45.25];

    pub const FILL_VALUE: i64 = -128;

    /// Bit 0 marks sea. `[1][3]` holds the fill value.
    pub const BITFIELD_RAW: [[f64; 5]; 2] = [
        [3.0, 1.0, 1.0, 1.0, 2.0],
        [1.0, 1.0, 4.0, -128.0, 1.0],
    ];

    pub const EXPECTED: [[bool; 5]; 2] = [
        [true, true, true, true, false],
        [true, true, false, false, true],
    ];

    pub const CATEGORICAL_LONG_NAME: &str = "Land-sea mask: 1 = sea ; 0 = land";

    /// `(time=1, latitude, longitude)` bitfield mask named `mask` with a
    /// `_FillValue` attribute.
    pub fn bitfield_dataset() -> Dataset {
        let mut ds = grid_dataset(&LONS, &LATS);
        add_time_axis(&mut ds, 1, 1.0);
        let values: Vec<f64> = BITFIELD_RAW.iter().flatten().copied().collect();
        let var = Variable::from_vec("mask", &["time", "latitude", "longitude"], &[1, 2, 5], values)
            .expect("bitfield mask")
            .with_attr("_FillValue", FILL_VALUE)
            .with_attr("flag_masks", 1_i64);
        ds.add_variable(var).expect("bitfield mask");
        ds
    }

    /// `(time=1, depth=2, latitude, longitude)` categorical mask.
    ///
    /// The depth coordinate is descending, so the shallowest level is the
    /// second one: it carries the 0/1 classes, the deeper level is all land.
    pub fn categorical_dataset() -> Dataset {
        let mut ds = grid_dataset(&LONS, &LATS);
        add_time_axis(&mut ds, 1, 1.0);
        ds.add_variable(Variable::coordinate("depth", vec![5.0, 0.5]).with_attr("units", "m"))
            .expect("depth coordinate");

        let mut values = vec![0.0; 10];
        values.extend(
            EXPECTED
                .iter()
                .flatten()
                .map(|&sea| if sea { 1.0 } else { 0.0 }),
        );
        let var = Variable::from_vec(
            "mask",
            &["time", "depth", "latitude", "longitude"],
            &[1, 2, 2, 5],
            values,
        )
        .expect("categorical mask")
        .with_attr("long_name", CATEGORICAL_LONG_NAME);
        ds.add_variable(var).expect("categorical mask");
        ds
    }

    pub fn expected_rows() -> Vec<Vec<bool>> {
        EXPECTED.iter().map(|r| r.to_vec()).collect()
    }
}
