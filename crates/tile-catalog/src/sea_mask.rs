//! Decoding of raw land/sea mask variables into boolean sea masks.
//!
//! Static ocean products ship the mask either as a bitfield (one bit of an
//! integer flag word marks sea) or as categories (`1 = sea`, `0 = land`,
//! with the convention spelled out in `long_name`). Both reduce to the same
//! `(latitude, longitude)` boolean array.

use std::sync::OnceLock;

use grid_dataset::{Dataset, Variable};
use ndarray::Array2;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TileError};

/// How raw mask values map to sea/land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MaskDecoding {
    /// Sea iff `value & sea_bit != 0`, with the value read as `u16`.
    ///
    /// Missing cells (non-finite or equal to `_FillValue`) are never sea.
    Bitfield { sea_bit: i64 },

    /// Sea iff `value == sea_value`.
    ///
    /// When `sea_value` is `None` it is parsed from the variable's
    /// `long_name` (`"... 1 = sea ..."`). No missing-value handling.
    Categorical {
        #[serde(default)]
        sea_value: Option<i64>,
    },
}

impl Default for MaskDecoding {
    fn default() -> Self {
        Self::Categorical { sea_value: None }
    }
}

/// Dimension names consulted while reducing the mask to 2-D.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskDims {
    pub time: String,
    /// Depth-like dimensions; the first one present is reduced.
    pub depth: Vec<String>,
    pub latitude: String,
    pub longitude: String,
}

impl Default for MaskDims {
    fn default() -> Self {
        Self {
            time: "time".to_string(),
            depth: vec!["depth".to_string()],
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
        }
    }
}

/// Builds a `(ny, nx)` boolean sea mask from a static dataset.
#[derive(Debug, Clone)]
pub struct SeaMaskBuilder {
    mask_var: String,
    decoding: MaskDecoding,
    dims: MaskDims,
}

impl SeaMaskBuilder {
    pub fn new(mask_var: impl Into<String>, decoding: MaskDecoding) -> Self {
        Self {
            mask_var: mask_var.into(),
            decoding,
            dims: MaskDims::default(),
        }
    }

    pub fn bitfield(mask_var: impl Into<String>, sea_bit: i64) -> Self {
        Self::new(mask_var, MaskDecoding::Bitfield { sea_bit })
    }

    pub fn categorical(mask_var: impl Into<String>, sea_value: Option<i64>) -> Self {
        Self::new(mask_var, MaskDecoding::Categorical { sea_value })
    }

    pub fn with_dims(mut self, dims: MaskDims) -> Self {
        self.dims = dims;
        self
    }

    pub fn mask_var(&self) -> &str {
        &self.mask_var
    }

    pub fn decoding(&self) -> MaskDecoding {
        self.decoding
    }

    /// Decode the mask. `true` marks sea; rows follow latitude.
    pub fn build(&self, ds: &Dataset) -> Result<Array2<bool>> {
        if let MaskDecoding::Bitfield { sea_bit } = self.decoding {
            if sea_bit <= 0 {
                return Err(TileError::InvalidSeaBit(sea_bit));
            }
        }

        let reduced = self.reduce(ds)?;
        let sea = match self.decoding {
            MaskDecoding::Bitfield { sea_bit } => decode_bitfield(&reduced, sea_bit)?,
            MaskDecoding::Categorical { sea_value } => {
                let sea_value = match sea_value {
                    Some(v) => v,
                    None => sea_value_from_long_name(&reduced)?,
                };
                decode_categorical(&reduced, sea_value)?
            }
        };

        debug!(
            mask = %self.mask_var,
            shape = ?sea.dim(),
            sea_cells = sea.iter().filter(|&&s| s).count(),
            "Decoded sea mask"
        );
        Ok(sea)
    }

    /// Reduce the mask variable to `(latitude, longitude)`.
    ///
    /// Takes the first time step and the shallowest depth level, then drops
    /// remaining singleton dimensions.
    pub fn reduce(&self, ds: &Dataset) -> Result<Variable> {
        let mut var = ds.variable(&self.mask_var)?.clone();

        for dim in [&self.dims.latitude, &self.dims.longitude] {
            if !var.has_dim(dim) {
                return Err(TileError::MissingMaskDimension {
                    variable: self.mask_var.clone(),
                    dim: dim.clone(),
                });
            }
        }

        if var.has_dim(&self.dims.time) {
            var = var.isel(&self.dims.time, 0)?;
        }

        if let Some(depth_dim) = self.dims.depth.iter().find(|d| var.has_dim(d)) {
            let level = shallowest_level(ds, depth_dim)?;
            var = var.isel(depth_dim, level)?;
        }

        let lat = self.dims.latitude.as_str();
        let lon = self.dims.longitude.as_str();
        let var = var.squeeze_except(&[lat, lon]);
        if var.ndim() != 2 {
            return Err(TileError::shape_mismatch(
                format!("mask '{}' with dims {:?}", self.mask_var, var.dims()),
                &[2],
                &[var.ndim()],
            ));
        }
        Ok(var.transpose(&[lat, lon])?)
    }
}

/// Index of the smallest depth, or 0 without a depth coordinate.
fn shallowest_level(ds: &Dataset, depth_dim: &str) -> Result<usize> {
    if !ds.contains(depth_dim) {
        return Ok(0);
    }
    let depths = ds.coordinate_values(depth_dim)?;
    let mut best = 0;
    for (i, &d) in depths.iter().enumerate() {
        if d < depths[best] || !depths[best].is_finite() {
            best = i;
        }
    }
    Ok(best)
}

fn decode_bitfield(var: &Variable, sea_bit: i64) -> Result<Array2<bool>> {
    let fill = var.attr("_FillValue").and_then(|a| a.as_f64());
    let values = var.clone().into_2d()?;
    Ok(values.mapv(|v| {
        let missing = !v.is_finite() || fill.map_or(false, |f| v == f);
        let raw = if missing { 0.0 } else { v };
        let word = (raw as i64) as u16;
        (i64::from(word) & sea_bit) != 0
    }))
}

fn decode_categorical(var: &Variable, sea_value: i64) -> Result<Array2<bool>> {
    let target = sea_value as f64;
    let values = var.clone().into_2d()?;
    Ok(values.mapv(|v| v == target))
}

fn sea_value_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)(\d+)\s*=\s*sea").expect("sea value pattern is valid"))
}

fn sea_value_from_long_name(var: &Variable) -> Result<i64> {
    let unresolved = || TileError::UnresolvedSeaValue(var.name().to_string());
    let long_name = var
        .attr("long_name")
        .and_then(|a| a.as_str())
        .ok_or_else(unresolved)?;
    let caps = sea_value_pattern().captures(long_name).ok_or_else(unresolved)?;
    caps[1].parse::<i64>().map_err(|_| unresolved())
}
