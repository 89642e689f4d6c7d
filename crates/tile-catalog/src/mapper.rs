//! Batch assignment of table rows to tiles.

use tracing::debug;

use crate::error::Result;
use crate::kd_index::KdIndex;
use crate::table::{Column, PointTable};

/// Applies a [`KdIndex`] to the coordinate columns of a [`PointTable`].
#[derive(Debug, Clone, Copy)]
pub struct CoordinatesToTileMapper<'a> {
    index: &'a KdIndex,
}

impl<'a> CoordinatesToTileMapper<'a> {
    pub fn new(index: &'a KdIndex) -> Self {
        Self { index }
    }

    /// Copy of `table` with an `Int` column `out_col` of matched tile ids
    /// (`-1` when unmatched). An existing `out_col` is replaced.
    pub fn map(
        &self,
        table: &PointTable,
        lon_col: &str,
        lat_col: &str,
        tolerance_deg: Option<f64>,
        out_col: &str,
    ) -> Result<PointTable> {
        let lons = table.f64_column(lon_col)?;
        let lats = table.f64_column(lat_col)?;
        let ids = self.index.query_many(&lons, &lats, tolerance_deg)?;
        debug!(rows = ids.len(), column = out_col, "Mapped coordinates to tiles");

        let mut out = table.clone();
        out.insert(out_col, Column::Int(ids))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TileCatalog;
    use crate::error::TileError;
    use crate::grid_spec::GridSpec;
    use ndarray::Array2;

    fn index() -> KdIndex {
        let grid = GridSpec::from_coords("lon", vec![0.0, 1.0], "lat", vec![0.0, 1.0]);
        let cat = TileCatalog::new(grid, Array2::from_elem((2, 2), true)).unwrap();
        KdIndex::new(&cat)
    }

    #[test]
    fn test_map_adds_column_without_touching_input() {
        let idx = index();
        let table = PointTable::new()
            .with_column("x", Column::Float(vec![0.9, 0.1, 40.0]))
            .unwrap()
            .with_column("y", Column::Float(vec![0.1, 0.9, 40.0]))
            .unwrap();

        let out = CoordinatesToTileMapper::new(&idx)
            .map(&table, "x", "y", Some(0.5), "tile_id")
            .unwrap();
        assert_eq!(out.i64_column("tile_id").unwrap(), &[1, 2, -1]);
        assert!(!table.contains("tile_id"));
        assert_eq!(out.n_columns(), 3);
    }

    #[test]
    fn test_missing_column() {
        let idx = index();
        let table = PointTable::new()
            .with_column("x", Column::Float(vec![0.0]))
            .unwrap();
        let err = CoordinatesToTileMapper::new(&idx)
            .map(&table, "x", "y", None, "tile_id")
            .unwrap_err();
        assert!(matches!(err, TileError::ColumnNotFound(ref c) if c == "y"));
    }
}
