//! Dense, stable numbering of sea cells.

use grid_dataset::Dataset;
use ndarray::Array2;
use tracing::{debug, warn};

use crate::error::{Result, TileError};
use crate::grid_spec::GridSpec;

/// Marker stored in the id map for land cells.
pub const LAND: i64 = -1;

/// Binds a grid and a sea mask, numbering every sea cell.
///
/// Sea cells are numbered `0..K` in row-major order (latitude rows, then
/// longitude columns). The numbering only depends on the (grid, mask) pair.
#[derive(Debug, Clone)]
pub struct TileCatalog {
    grid: GridSpec,
    mask: Array2<bool>,
    tile_id_map: Array2<i64>,
    sea_rows: Vec<usize>,
    sea_cols: Vec<usize>,
    sea_lons: Vec<f64>,
    sea_lats: Vec<f64>,
}

impl TileCatalog {
    /// Number the sea cells of `mask`, which must have shape `(ny, nx)`.
    pub fn new(grid: GridSpec, mask: Array2<bool>) -> Result<Self> {
        let (ny, nx) = grid.shape();
        if mask.dim() != (ny, nx) {
            return Err(TileError::shape_mismatch(
                "sea mask",
                &[ny, nx],
                mask.shape(),
            ));
        }

        let mut tile_id_map = Array2::from_elem((ny, nx), LAND);
        let mut sea_rows = Vec::new();
        let mut sea_cols = Vec::new();
        let mut sea_lons = Vec::new();
        let mut sea_lats = Vec::new();

        for ((row, col), &is_sea) in mask.indexed_iter() {
            if !is_sea {
                continue;
            }
            tile_id_map[[row, col]] = sea_rows.len() as i64;
            sea_rows.push(row);
            sea_cols.push(col);
            sea_lons.push(grid.lons()[col]);
            sea_lats.push(grid.lats()[row]);
        }

        if sea_rows.is_empty() {
            warn!(hash = %grid.hash(), "Sea mask has no sea cells");
        }
        debug!(ny, nx, sea_cells = sea_rows.len(), "Built tile catalog");

        Ok(Self {
            grid,
            mask,
            tile_id_map,
            sea_rows,
            sea_cols,
            sea_lons,
            sea_lats,
        })
    }

    /// Derive the grid from `ds` (default coordinate names) and number `mask`.
    pub fn from_dataset(ds: &Dataset, mask: Array2<bool>) -> Result<Self> {
        let grid = GridSpec::from_dataset_default(ds)?;
        Self::new(grid, mask)
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn sea_mask(&self) -> &Array2<bool> {
        &self.mask
    }

    /// `(ny, nx)` ids, [`LAND`] on land.
    pub fn tile_id_map(&self) -> &Array2<i64> {
        &self.tile_id_map
    }

    /// Number of sea tiles (K).
    pub fn len(&self) -> usize {
        self.sea_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sea_rows.is_empty()
    }

    /// All tile ids, `0..K` ascending.
    pub fn sea_tile_ids(&self) -> Vec<i64> {
        (0..self.len() as i64).collect()
    }

    /// Longitudes and latitudes of every tile, indexed by tile id.
    pub fn sea_tile_coords(&self) -> (&[f64], &[f64]) {
        (&self.sea_lons, &self.sea_lats)
    }

    /// Row-major flat positions of the sea cells, in tile id order.
    pub fn sea_flat_indices(&self) -> Vec<usize> {
        let nx = self.grid.nx();
        self.sea_rows
            .iter()
            .zip(&self.sea_cols)
            .map(|(&r, &c)| r * nx + c)
            .collect()
    }

    /// Grid position `(row, col)` of a tile.
    pub fn sea_cell_ids(&self, tile_id: i64) -> Result<(usize, usize)> {
        let i = self.check(tile_id)?;
        Ok((self.sea_rows[i], self.sea_cols[i]))
    }

    /// Cell center `(lon, lat)` of a tile.
    pub fn sea_cell_coords(&self, tile_id: i64) -> Result<(f64, f64)> {
        let i = self.check(tile_id)?;
        Ok((self.sea_lons[i], self.sea_lats[i]))
    }

    /// Tile id at a grid position, `None` for land or out-of-grid positions.
    pub fn tile_id_at(&self, row: usize, col: usize) -> Option<i64> {
        self.tile_id_map
            .get((row, col))
            .copied()
            .filter(|&id| id != LAND)
    }

    /// Sea tiles among the 8 cells surrounding `tile_id`, ascending.
    pub fn neighbors(&self, tile_id: i64) -> Result<Vec<i64>> {
        let (row, col) = self.sea_cell_ids(tile_id)?;
        let (ny, nx) = self.grid.shape();

        let mut out = Vec::with_capacity(8);
        for r in row.saturating_sub(1)..=(row + 1).min(ny - 1) {
            for c in col.saturating_sub(1)..=(col + 1).min(nx - 1) {
                if (r, c) == (row, col) {
                    continue;
                }
                if let Some(id) = self.tile_id_at(r, c) {
                    out.push(id);
                }
            }
        }
        // row-major scan already yields ascending ids
        Ok(out)
    }

    fn check(&self, tile_id: i64) -> Result<usize> {
        if tile_id < 0 || tile_id as usize >= self.len() {
            return Err(TileError::TileOutOfRange {
                tile_id,
                count: self.len(),
            });
        }
        Ok(tile_id as usize)
    }
}
