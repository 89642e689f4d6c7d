//! Nearest-tile search in a local planar projection.
//!
//! Tile centers are projected to `(lon * cos(lat0), lat)` with a single
//! reference latitude `lat0`, and nearest neighbours are Euclidean in that
//! plane. This is only a local approximation: it degrades as the latitude
//! span of the catalog grows. Queries always use the same `lat0` as the
//! build.
//!
//! Points lying exactly on a boundary between two tile centers resolve to
//! whichever tile the tree visits first; ties are not normalized.

use kd_tree::KdTree2;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::catalog::{TileCatalog, LAND};
use crate::error::{Result, TileError};

/// Sentinel returned for unmatched queries.
pub const UNMATCHED: i64 = LAND;

type Entry = (i64, [f64; 2]);

/// Spatial index over the sea tiles of one catalog.
pub struct KdIndex {
    tree: KdTree2<Entry>,
    lat0: f64,
    scale: f64,
    len: usize,
}

impl KdIndex {
    /// Build with `lat0` = mean latitude of the sea tiles.
    pub fn new(catalog: &TileCatalog) -> Self {
        Self::with_lat0(catalog, None)
    }

    /// Build with an explicit reference latitude, or the mean sea latitude
    /// when `lat0` is `None`.
    pub fn with_lat0(catalog: &TileCatalog, lat0: Option<f64>) -> Self {
        let (lons, lats) = catalog.sea_tile_coords();
        let lat0 = lat0.unwrap_or_else(|| mean(lats));
        let scale = lat0.to_radians().cos();

        let entries: Vec<Entry> = lons
            .iter()
            .zip(lats)
            .enumerate()
            .map(|(id, (&lon, &lat))| (id as i64, [lon * scale, lat]))
            .collect();
        let len = entries.len();
        if len == 0 {
            warn!("Building nearest-tile index over an empty catalog");
        }

        let tree = KdTree2::build_by_key(entries, |item, k| OrderedFloat(item.1[k]));
        debug!(tiles = len, lat0, scale, "Built nearest-tile index");

        Self {
            tree,
            lat0,
            scale,
            len,
        }
    }

    pub fn lat0(&self) -> f64 {
        self.lat0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Project a point into the index plane.
    pub fn project(&self, lon: f64, lat: f64) -> [f64; 2] {
        [lon * self.scale, lat]
    }

    /// Nearest tile and its projected distance, `None` when nothing matches.
    pub fn query_with_distance(&self, lon: f64, lat: f64) -> Option<(i64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let q = self.project(lon, lat);
        self.tree
            .nearest_by(&q, |item, k| item.1[k])
            .map(|found| (found.item.0, found.squared_distance.sqrt()))
    }

    /// Nearest tile of one point.
    pub fn query_one(&self, lon: f64, lat: f64, tolerance_deg: Option<f64>) -> i64 {
        match self.query_with_distance(lon, lat) {
            Some((id, dist)) if tolerance_deg.map_or(true, |tol| dist <= tol) => id,
            _ => UNMATCHED,
        }
    }

    /// Nearest tile of every `(lons[i], lats[i])`, in input order.
    ///
    /// Matches farther than `tolerance_deg` (in projected degrees) become
    /// [`UNMATCHED`], as do non-finite queries.
    pub fn query_many(&self, lons: &[f64], lats: &[f64], tolerance_deg: Option<f64>) -> Result<Vec<i64>> {
        if lons.len() != lats.len() {
            return Err(TileError::LengthMismatch(format!(
                "{} longitudes vs {} latitudes",
                lons.len(),
                lats.len()
            )));
        }

        let ids: Vec<i64> = lons
            .par_iter()
            .zip(lats.par_iter())
            .map(|(&lon, &lat)| self.query_one(lon, lat, tolerance_deg))
            .collect();

        let unmatched = ids.iter().filter(|&&id| id == UNMATCHED).count();
        if unmatched > 0 {
            warn!(unmatched, total = ids.len(), "Points without a tile");
        }
        Ok(ids)
    }
}

impl std::fmt::Debug for KdIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KdIndex")
            .field("lat0", &self.lat0)
            .field("len", &self.len)
            .finish()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
