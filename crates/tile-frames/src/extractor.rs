//! Flattening of gridded variables into per-tile rows.

use grid_dataset::{Dataset, Variable};
use ndarray::Array2;
use tile_catalog::{TileCatalog, TileError};
use tracing::debug;

use crate::config::FrameConfig;
use crate::error::{FrameError, Result};
use crate::frame::TileFrame;

/// Depth index used for variables without a depth axis.
pub const NO_DEPTH: i64 = -1;

/// Extracts sea-cell values of dataset variables in tile id order.
#[derive(Debug, Clone)]
pub struct DatasetTileFrameExtractor<'a> {
    catalog: &'a TileCatalog,
    time_dim: String,
    depth_dim: Option<String>,
    bbox_id: Option<i64>,
}

impl<'a> DatasetTileFrameExtractor<'a> {
    /// Extractor with `time` and `depth` dimensions and no partition id.
    pub fn new(catalog: &'a TileCatalog) -> Self {
        Self {
            catalog,
            time_dim: "time".to_string(),
            depth_dim: Some("depth".to_string()),
            bbox_id: None,
        }
    }

    pub fn from_config(catalog: &'a TileCatalog, config: &FrameConfig) -> Self {
        Self {
            catalog,
            time_dim: config.time_dim.clone(),
            depth_dim: config.depth_dim.clone(),
            bbox_id: config.bbox_id,
        }
    }

    pub fn with_time_dim(mut self, time_dim: impl Into<String>) -> Self {
        self.time_dim = time_dim.into();
        self
    }

    /// `None` treats every variable as depth-less.
    pub fn with_depth_dim(mut self, depth_dim: Option<&str>) -> Self {
        self.depth_dim = depth_dim.map(str::to_string);
        self
    }

    /// Partition label attached to rows that carry coordinates.
    pub fn with_bbox_id(mut self, bbox_id: Option<i64>) -> Self {
        self.bbox_id = bbox_id;
        self
    }

    pub fn catalog(&self) -> &TileCatalog {
        self.catalog
    }

    /// One row per (time, depth, sea tile) for a single variable.
    ///
    /// Each `(time, depth)` slice yields exactly K values in ascending tile
    /// id order. With `with_coords` the frame also carries the depth value,
    /// tile center and partition id.
    pub fn to_frame_single(&self, ds: &Dataset, var_name: &str, with_coords: bool) -> Result<TileFrame> {
        let var = ds.variable(var_name)?;
        var.axis_of(&self.time_dim)?;
        let times = ds.time_values(&self.time_dim)?;

        let depth_dim = self.depth_dim.as_deref().filter(|d| var.has_dim(d));
        let depth_values = match depth_dim {
            Some(dim) => Some(depth_axis(ds, var, dim)?),
            None => None,
        };

        let fills = var.fill_values();
        let sea = self.catalog.sea_flat_indices();
        let (tile_lons, tile_lats) = self.catalog.sea_tile_coords();
        let mut frame = TileFrame::new(var_name, with_coords);

        for (t, &time) in times.iter().enumerate() {
            let at_time = var.isel(&self.time_dim, t)?;

            match (depth_dim, depth_values.as_ref()) {
                (Some(dim), Some(depths)) => {
                    for (d, &depth) in depths.iter().enumerate() {
                        let slice = self.slice_2d(at_time.isel(dim, d)?)?;
                        let values = pick(&slice, &sea, &fills);
                        frame.push_block(time, d as i64, depth, tile_lons, tile_lats, values);
                    }
                }
                _ => {
                    let slice = self.slice_2d(at_time)?;
                    let values = pick(&slice, &sea, &fills);
                    frame.push_block(time, NO_DEPTH, f64::NAN, tile_lons, tile_lats, values);
                }
            }
        }

        if with_coords {
            frame.set_bbox_id(self.bbox_id);
        }
        debug!(
            variable = var_name,
            times = times.len(),
            depths = depth_values.as_ref().map_or(0, Vec::len),
            tiles = self.catalog.len(),
            rows = frame.len(),
            "Extracted tile frame"
        );
        Ok(frame)
    }

    /// Wide frame of several variables joined one-to-one on
    /// `(time, depth_idx, tile_id)`. The first variable carries coordinates.
    pub fn to_frame_multi<S: AsRef<str>>(&self, ds: &Dataset, var_names: &[S]) -> Result<TileFrame> {
        let (first, rest) = var_names.split_first().ok_or(FrameError::NoVariables)?;

        for (i, name) in var_names.iter().enumerate() {
            if var_names[..i].iter().any(|prev| prev.as_ref() == name.as_ref()) {
                return Err(FrameError::DuplicateVariable(name.as_ref().to_string()));
            }
        }

        let mut frame = self.to_frame_single(ds, first.as_ref(), true)?;
        for name in rest {
            let other = self.to_frame_single(ds, name.as_ref(), false)?;
            frame = frame.join_one_to_one(&other)?;
        }
        Ok(frame)
    }

    /// Orient a spatial slice to the catalog's `(ny, nx)`.
    ///
    /// Slices carrying the grid's named dimensions are transposed by name.
    /// Anonymous slices keep their trailing two axes, losing only leading
    /// singleton dimensions, and are accepted as `(ny, nx)` or transposed
    /// once from `(nx, ny)`.
    fn slice_2d(&self, slice: Variable) -> Result<Array2<f64>> {
        let grid = self.catalog.grid();
        let (ny, nx) = grid.shape();
        let (lat, lon) = (grid.lat_name(), grid.lon_name());
        let context = format!("slice of '{}'", slice.name());

        let arr = if slice.has_dim(lat) && slice.has_dim(lon) {
            let slice = slice.squeeze_except(&[lat, lon]);
            if slice.ndim() != 2 {
                return Err(TileError::shape_mismatch(context, &[ny, nx], slice.shape()).into());
            }
            slice.transpose(&[lat, lon])?.into_2d()?
        } else {
            let slice = squeeze_leading(slice)?;
            if slice.ndim() != 2 {
                return Err(TileError::shape_mismatch(context, &[ny, nx], slice.shape()).into());
            }
            let arr = slice.into_2d()?;
            if arr.dim() == (nx, ny) && nx != ny {
                arr.reversed_axes()
            } else {
                arr
            }
        };

        if arr.dim() != (ny, nx) {
            return Err(TileError::shape_mismatch(context, &[ny, nx], arr.shape()).into());
        }
        Ok(arr)
    }
}

/// Depth coordinate values, or level indices when there is no coordinate.
fn depth_axis(ds: &Dataset, var: &Variable, dim: &str) -> Result<Vec<f64>> {
    let n = var.dim_len(dim)?;
    if ds.contains(dim) {
        let values = ds.coordinate_values(dim)?;
        if values.len() != n {
            return Err(TileError::shape_mismatch(format!("depth coordinate '{}'", dim), &[n], &[values.len()]).into());
        }
        Ok(values)
    } else {
        Ok((0..n).map(|d| d as f64).collect())
    }
}

/// Drop length-1 axes in front of the trailing two.
fn squeeze_leading(mut slice: Variable) -> Result<Variable> {
    while slice.ndim() > 2 {
        let leading = slice.ndim() - 2;
        let Some(axis) = slice.shape()[..leading].iter().position(|&n| n == 1) else {
            break;
        };
        let dim = slice.dims()[axis].clone();
        slice = slice.isel(&dim, 0)?;
    }
    Ok(slice)
}

/// Values at the sea positions, in tile id order. Fill markers become NaN.
fn pick(slice: &Array2<f64>, sea_flat: &[usize], fills: &[f64]) -> Vec<f64> {
    let nx = slice.ncols();
    sea_flat
        .iter()
        .map(|&f| slice[[f / nx, f % nx]])
        .map(|v| if fills.contains(&v) { f64::NAN } else { v })
        .collect()
}
