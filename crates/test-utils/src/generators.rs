//! Synthetic dataset generators.
//!
//! These build small in-memory datasets with predictable values so tests can
//! recompute the expected output by hand.

use grid_dataset::{Dataset, Variable};

/// Units used for every generated time axis.
pub const TIME_UNITS: &str = "hours since 2020-01-01 00:00:00";

/// Evenly spaced axis values: `start, start + step, ...` (`n` values).
pub fn regular_axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Value of a generated field at (time, depth, row, col).
///
/// Encodes every index in its own decimal band so any misplaced value is
/// obvious: `t * 1_000_000 + d * 10_000 + col * 100 + row`.
pub fn field_value(t: usize, d: usize, row: usize, col: usize) -> f64 {
    (t * 1_000_000 + d * 10_000 + col * 100 + row) as f64
}

/// Dataset holding only `longitude`/`latitude` coordinates.
pub fn grid_dataset(lons: &[f64], lats: &[f64]) -> Dataset {
    let mut ds = Dataset::new();
    ds.add_coordinate("latitude", lats.to_vec())
        .expect("latitude coordinate");
    ds.add_coordinate("longitude", lons.to_vec())
        .expect("longitude coordinate");
    ds
}

/// Add an hourly `time` coordinate with CF units.
pub fn add_time_axis(ds: &mut Dataset, n_times: usize, step_hours: f64) {
    let var = Variable::coordinate("time", regular_axis(0.0, step_hours, n_times))
        .with_attr("units", TIME_UNITS);
    ds.add_variable(var).expect("time coordinate");
}

/// Add a `depth` coordinate.
pub fn add_depth_axis(ds: &mut Dataset, depths: &[f64]) {
    let var = Variable::coordinate("depth", depths.to_vec()).with_attr("units", "m");
    ds.add_variable(var).expect("depth coordinate");
}

/// Dataset with a single variable filled by [`field_value`].
///
/// Dimensions are `(time, depth, latitude, longitude)` when `depths` is given
/// and `(time, latitude, longitude)` otherwise.
pub fn field_dataset(
    var_name: &str,
    lons: &[f64],
    lats: &[f64],
    n_times: usize,
    depths: Option<&[f64]>,
) -> Dataset {
    let mut ds = grid_dataset(lons, lats);
    add_time_axis(&mut ds, n_times, 24.0);
    if let Some(depths) = depths {
        add_depth_axis(&mut ds, depths);
    }
    add_field(&mut ds, var_name, 0.0);
    ds
}

/// Add another field on the dataset's existing axes, shifted by `offset`.
pub fn add_field(ds: &mut Dataset, var_name: &str, offset: f64) {
    let nx = ds.dimension_len("longitude").expect("longitude axis");
    let ny = ds.dimension_len("latitude").expect("latitude axis");
    let nt = ds.dimension_len("time").expect("time axis");
    let nd = ds.dimension_len("depth");

    let mut values = Vec::new();
    for t in 0..nt {
        for d in 0..nd.unwrap_or(1) {
            for row in 0..ny {
                for col in 0..nx {
                    values.push(field_value(t, d, row, col) + offset);
                }
            }
        }
    }

    let var = match nd {
        Some(nd) => Variable::from_vec(
            var_name,
            &["time", "depth", "latitude", "longitude"],
            &[nt, nd, ny, nx],
            values,
        ),
        None => Variable::from_vec(
            var_name,
            &["time", "latitude", "longitude"],
            &[nt, ny, nx],
            values,
        ),
    }
    .expect("field variable");

    ds.add_variable(var).expect("field variable");
}

/// Dataset carrying a `(time=1, latitude, longitude)` mask variable.
///
/// `rows[j][i]` is the value at latitude index `j`, longitude index `i`.
pub fn mask_dataset(lons: &[f64], lats: &[f64], rows: &[Vec<f64>], long_name: &str) -> Dataset {
    let ny = lats.len();
    let nx = lons.len();
    let values: Vec<f64> = rows.iter().flatten().copied().collect();
    assert_eq!(values.len(), nx * ny, "mask rows do not match the grid");

    let mut ds = grid_dataset(lons, lats);
    add_time_axis(&mut ds, 1, 1.0);
    let var = Variable::from_vec("mask", &["time", "latitude", "longitude"], &[1, ny, nx], values)
        .expect("mask variable")
        .with_attr("long_name", long_name);
    ds.add_variable(var).expect("mask variable");
    ds
}
