//! Identity of a rectilinear longitude/latitude grid.

use grid_dataset::Dataset;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Result, TileError};

/// Longitude coordinate names tried in order.
pub const DEFAULT_LON_CANDIDATES: [&str; 3] = ["lon", "longitude", "x"];

/// Latitude coordinate names tried in order.
pub const DEFAULT_LAT_CANDIDATES: [&str; 3] = ["lat", "latitude", "y"];

/// 1-D longitude and latitude axes plus a content hash.
///
/// The hash is SHA-256 over, for each axis in turn (longitude first), the
/// ASCII tag `lon`/`lat`, the coordinate name and the values as
/// little-endian `f64`. It only depends on those bytes, so it is stable
/// across runs and platforms. Two specs are equal iff their hashes are.
#[derive(Debug, Clone)]
pub struct GridSpec {
    lon_name: String,
    lat_name: String,
    lons: Vec<f64>,
    lats: Vec<f64>,
    hash: String,
}

impl GridSpec {
    /// Build a spec from explicit axes.
    pub fn from_coords(
        lon_name: impl Into<String>,
        lons: Vec<f64>,
        lat_name: impl Into<String>,
        lats: Vec<f64>,
    ) -> Self {
        let lon_name = lon_name.into();
        let lat_name = lat_name.into();
        let hash = grid_hash(&lon_name, &lons, &lat_name, &lats);
        Self {
            lon_name,
            lat_name,
            lons,
            lats,
            hash,
        }
    }

    /// Derive the spec from a dataset's coordinate variables.
    ///
    /// The first candidate name present in the dataset is used for each
    /// axis. Both axes must resolve and both must be 1-D.
    pub fn from_dataset(ds: &Dataset, lon_candidates: &[&str], lat_candidates: &[&str]) -> Result<Self> {
        let lon_name = pick_coordinate(ds, "longitude", lon_candidates)?;
        let lat_name = pick_coordinate(ds, "latitude", lat_candidates)?;
        let lons = read_axis(ds, lon_name)?;
        let lats = read_axis(ds, lat_name)?;

        let spec = Self::from_coords(lon_name, lons, lat_name, lats);
        debug!(
            lon = %spec.lon_name,
            lat = %spec.lat_name,
            nx = spec.nx(),
            ny = spec.ny(),
            hash = %spec.hash,
            "Derived grid spec"
        );
        Ok(spec)
    }

    /// [`GridSpec::from_dataset`] with the default candidate names.
    pub fn from_dataset_default(ds: &Dataset) -> Result<Self> {
        Self::from_dataset(ds, &DEFAULT_LON_CANDIDATES, &DEFAULT_LAT_CANDIDATES)
    }

    /// Check that `ds` carries exactly this grid, under the same coordinate names.
    pub fn validate(&self, ds: &Dataset) -> Result<()> {
        let other = Self::from_dataset(ds, &[self.lon_name.as_str()], &[self.lat_name.as_str()])?;
        if other.hash != self.hash {
            return Err(TileError::grid_mismatch(&self.hash, &other.hash));
        }
        Ok(())
    }

    pub fn lon_name(&self) -> &str {
        &self.lon_name
    }

    pub fn lat_name(&self) -> &str {
        &self.lat_name
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn nx(&self) -> usize {
        self.lons.len()
    }

    pub fn ny(&self) -> usize {
        self.lats.len()
    }

    /// `(ny, nx)`, the shape of masks and slices on this grid.
    pub fn shape(&self) -> (usize, usize) {
        (self.ny(), self.nx())
    }

    /// Lowercase hex SHA-256 of the canonical coordinate bytes.
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl PartialEq for GridSpec {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for GridSpec {}

fn pick_coordinate<'a>(ds: &Dataset, axis: &str, candidates: &[&'a str]) -> Result<&'a str> {
    candidates
        .iter()
        .copied()
        .find(|name| ds.contains(name))
        .ok_or_else(|| TileError::MissingCoordinate {
            axis: axis.to_string(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        })
}

fn read_axis(ds: &Dataset, name: &str) -> Result<Vec<f64>> {
    let var = ds.variable(name)?;
    if var.ndim() != 1 {
        return Err(TileError::CurvilinearGrid(name.to_string()));
    }
    Ok(var.to_vec_1d()?)
}

fn grid_hash(lon_name: &str, lons: &[f64], lat_name: &str, lats: &[f64]) -> String {
    let mut hasher = Sha256::new();
    for (tag, name, values) in [("lon", lon_name, lons), ("lat", lat_name, lats)] {
        hasher.update(tag.as_bytes());
        hasher.update(name.as_bytes());
        for v in values {
            hasher.update(v.to_le_bytes());
        }
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
