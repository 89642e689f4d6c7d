//! Configuration for tiling and point assignment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assigner::PointColumns;
use crate::error::{Result, TileError};
use crate::grid_spec::{DEFAULT_LAT_CANDIDATES, DEFAULT_LON_CANDIDATES};
use crate::sea_mask::{MaskDecoding, MaskDims, SeaMaskBuilder};

/// Coordinate names tried when deriving a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateConfig {
    pub lon_candidates: Vec<String>,
    pub lat_candidates: Vec<String>,
}

impl Default for CoordinateConfig {
    fn default() -> Self {
        Self {
            lon_candidates: DEFAULT_LON_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            lat_candidates: DEFAULT_LAT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Which variable holds the mask and how to decode it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    pub variable: String,
    pub decoding: MaskDecoding,
    pub dims: MaskDims,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            variable: "mask".to_string(),
            decoding: MaskDecoding::Bitfield { sea_bit: 1 },
            dims: MaskDims::default(),
        }
    }
}

impl MaskConfig {
    pub fn builder(&self) -> SeaMaskBuilder {
        SeaMaskBuilder::new(self.variable.clone(), self.decoding).with_dims(self.dims.clone())
    }
}

/// Nearest-tile index parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Reference latitude; the default depends on the caller.
    pub lat0: Option<f64>,

    /// Maximum projected distance for a match, in degrees.
    pub tolerance_deg: Option<f64>,
}

/// Configuration for building catalogs and assigning points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilingConfig {
    pub coordinates: CoordinateConfig,
    pub mask: MaskConfig,
    pub index: IndexConfig,
    pub columns: PointColumns,
}

impl TilingConfig {
    /// Parse a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| TileError::config(e.to_string()))
    }

    /// Load a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| TileError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from environment variables that are set and parse.
    ///
    /// `TILE_SEA_VALUE` sets the sea bit in bitfield mode and the sea class
    /// in categorical mode.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("TILE_MASK_VAR") {
            if !val.trim().is_empty() {
                self.mask.variable = val.trim().to_string();
            }
        }

        if let Ok(val) = std::env::var("TILE_SEA_VALUE") {
            if let Ok(v) = val.trim().parse::<i64>() {
                self.mask.decoding = match self.mask.decoding {
                    MaskDecoding::Bitfield { .. } => MaskDecoding::Bitfield { sea_bit: v },
                    MaskDecoding::Categorical { .. } => MaskDecoding::Categorical { sea_value: Some(v) },
                };
            }
        }

        if let Ok(val) = std::env::var("TILE_LAT0") {
            if let Ok(lat0) = val.trim().parse() {
                self.index.lat0 = Some(lat0);
            }
        }

        if let Ok(val) = std::env::var("TILE_TOLERANCE_DEG") {
            if let Ok(tol) = val.trim().parse() {
                self.index.tolerance_deg = Some(tol);
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.coordinates.lon_candidates.is_empty() || self.coordinates.lat_candidates.is_empty() {
            return Err(TileError::config("coordinate candidate lists must not be empty"));
        }

        if self.mask.variable.is_empty() {
            return Err(TileError::config("mask variable name must not be empty"));
        }

        if let MaskDecoding::Bitfield { sea_bit } = self.mask.decoding {
            if sea_bit <= 0 {
                return Err(TileError::config("sea_bit must be > 0"));
            }
        }

        if self.mask.dims.latitude == self.mask.dims.longitude {
            return Err(TileError::config("latitude and longitude dimensions must differ"));
        }

        if let Some(lat0) = self.index.lat0 {
            if !(-90.0..=90.0).contains(&lat0) {
                return Err(TileError::config("lat0 must be within [-90, 90]"));
            }
        }

        if let Some(tol) = self.index.tolerance_deg {
            if !(tol.is_finite() && tol > 0.0) {
                return Err(TileError::config("tolerance_deg must be a positive number"));
            }
        }

        Ok(())
    }

    pub fn lon_candidates(&self) -> Vec<&str> {
        self.coordinates.lon_candidates.iter().map(|s| s.as_str()).collect()
    }

    pub fn lat_candidates(&self) -> Vec<&str> {
        self.coordinates.lat_candidates.iter().map(|s| s.as_str()).collect()
    }
}
