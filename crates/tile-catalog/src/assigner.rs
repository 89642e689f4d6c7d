//! Nearest-sea-tile assignment of ground-truth points.

use grid_dataset::Dataset;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::TileCatalog;
use crate::config::TilingConfig;
use crate::error::Result;
use crate::grid_spec::GridSpec;
use crate::kd_index::KdIndex;
use crate::mapper::CoordinatesToTileMapper;
use crate::sea_mask::SeaMaskBuilder;
use crate::table::{Column, PointTable};

/// Longitude names tried on static products, spelled-out name first.
pub const STATIC_LON_CANDIDATES: [&str; 3] = ["longitude", "lon", "x"];

/// Latitude names tried on static products, spelled-out name first.
pub const STATIC_LAT_CANDIDATES: [&str; 3] = ["latitude", "lat", "y"];

/// Column names read and written by [`PointTileAssigner`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointColumns {
    pub lon: String,
    pub lat: String,
    pub tile_id: String,
    pub tile_lon_center: String,
    pub tile_lat_center: String,
}

impl Default for PointColumns {
    fn default() -> Self {
        Self {
            lon: "lon".to_string(),
            lat: "lat".to_string(),
            tile_id: "tile_id".to_string(),
            tile_lon_center: "tile_lon_center".to_string(),
            tile_lat_center: "tile_lat_center".to_string(),
        }
    }
}

/// Grid, sea mask, catalog and index derived from one static dataset.
#[derive(Debug)]
pub struct PointTileAssigner {
    catalog: TileCatalog,
    index: KdIndex,
    columns: PointColumns,
    tolerance_deg: Option<f64>,
}

impl PointTileAssigner {
    /// Build everything from a static dataset.
    ///
    /// `lat0_hint` defaults to the median of the grid's latitude axis.
    pub fn from_dataset(ds: &Dataset, mask: &SeaMaskBuilder, lat0_hint: Option<f64>) -> Result<Self> {
        let grid = GridSpec::from_dataset(ds, &STATIC_LON_CANDIDATES, &STATIC_LAT_CANDIDATES)?;
        Self::build(ds, grid, mask, lat0_hint)
    }

    /// Build from a validated [`TilingConfig`]: its coordinate candidates,
    /// mask spec, `lat0`, tolerance and column names.
    pub fn from_config(ds: &Dataset, config: &TilingConfig) -> Result<Self> {
        config.validate()?;
        let grid = GridSpec::from_dataset(ds, &config.lon_candidates(), &config.lat_candidates())?;
        let assigner = Self::build(ds, grid, &config.mask.builder(), config.index.lat0)?;
        Ok(assigner
            .with_columns(config.columns.clone())
            .with_tolerance(config.index.tolerance_deg))
    }

    fn build(ds: &Dataset, grid: GridSpec, mask: &SeaMaskBuilder, lat0_hint: Option<f64>) -> Result<Self> {
        let sea = mask.build(ds)?;
        let lat0 = lat0_hint.or_else(|| median(grid.lats()));
        let catalog = TileCatalog::new(grid, sea)?;
        let index = KdIndex::with_lat0(&catalog, lat0);

        info!(
            tiles = catalog.len(),
            lat0 = index.lat0(),
            mask = mask.mask_var(),
            "Static layer ready for point assignment"
        );
        Ok(Self {
            catalog,
            index,
            columns: PointColumns::default(),
            tolerance_deg: None,
        })
    }

    pub fn with_columns(mut self, columns: PointColumns) -> Self {
        self.columns = columns;
        self
    }

    /// Tolerance used by [`PointTileAssigner::assign_configured`].
    pub fn with_tolerance(mut self, tolerance_deg: Option<f64>) -> Self {
        self.tolerance_deg = tolerance_deg;
        self
    }

    pub fn tolerance_deg(&self) -> Option<f64> {
        self.tolerance_deg
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    pub fn index(&self) -> &KdIndex {
        &self.index
    }

    pub fn columns(&self) -> &PointColumns {
        &self.columns
    }

    /// Copy of `points` with the tile id and the tile center coordinates
    /// appended. Unmatched points get id `-1` and NaN centers.
    pub fn assign(&self, points: &PointTable, tolerance_deg: Option<f64>) -> Result<PointTable> {
        let cols = &self.columns;
        let mut out = CoordinatesToTileMapper::new(&self.index).map(
            points,
            &cols.lon,
            &cols.lat,
            tolerance_deg,
            &cols.tile_id,
        )?;

        let (sea_lons, sea_lats) = self.catalog.sea_tile_coords();
        let ids = out.i64_column(&cols.tile_id)?;
        let center = |coords: &[f64]| -> Vec<f64> {
            ids.iter()
                .map(|&id| {
                    usize::try_from(id)
                        .ok()
                        .and_then(|i| coords.get(i).copied())
                        .unwrap_or(f64::NAN)
                })
                .collect()
        };
        let lon_center = center(sea_lons);
        let lat_center = center(sea_lats);
        let matched = ids.iter().filter(|&&id| id >= 0).count();

        out.insert(cols.tile_lon_center.as_str(), Column::Float(lon_center))?;
        out.insert(cols.tile_lat_center.as_str(), Column::Float(lat_center))?;
        debug!(points = out.n_rows(), matched, "Assigned points to tiles");
        Ok(out)
    }

    /// [`PointTileAssigner::assign`] with the stored tolerance.
    pub fn assign_configured(&self, points: &PointTable) -> Result<PointTable> {
        self.assign(points, self.tolerance_deg)
    }
}

/// Median of the finite values, `None` when there are none.
fn median(values: &[f64]) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(f64::total_cmp);
    let mid = finite.len() / 2;
    Some(if finite.len() % 2 == 0 {
        (finite[mid - 1] + finite[mid]) / 2.0
    } else {
        finite[mid]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, f64::NAN, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[f64::NAN]), None);
    }

    #[test]
    fn test_custom_columns_default_fill() {
        let cols: PointColumns = serde_yaml::from_str("lon: longitude\n").unwrap();
        assert_eq!(cols.lon, "longitude");
        assert_eq!(cols.tile_id, "tile_id");
    }
}
