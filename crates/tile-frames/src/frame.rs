//! Tidy per-tile rows in columnar form.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tile_catalog::TileError;

use crate::error::{FrameError, Result};

/// Join key of a tidy row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub time: DateTime<Utc>,
    pub depth_idx: i64,
    pub tile_id: i64,
}

/// Per-row tile and depth coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameCoords {
    pub depth_value: Vec<f64>,
    pub tile_lon: Vec<f64>,
    pub tile_lat: Vec<f64>,
}

/// Rows of `(time, depth_idx, tile_id)` keys with one value column per
/// variable, optionally carrying coordinates and a partition id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileFrame {
    time: Vec<DateTime<Utc>>,
    depth_idx: Vec<i64>,
    tile_id: Vec<i64>,
    coords: Option<FrameCoords>,
    bbox_id: Option<i64>,
    values: IndexMap<String, Vec<f64>>,
}

/// One row of a [`TileFrame`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TidyRow {
    pub time: DateTime<Utc>,
    pub depth_idx: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_value: Option<f64>,
    pub tile_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox_id: Option<i64>,
    #[serde(flatten)]
    pub values: IndexMap<String, f64>,
}

impl TileFrame {
    /// Empty frame holding a single value column.
    pub(crate) fn new(var_name: &str, with_coords: bool) -> Self {
        let mut values = IndexMap::new();
        values.insert(var_name.to_string(), Vec::new());
        Self {
            coords: with_coords.then(FrameCoords::default),
            values,
            ..Self::default()
        }
    }

    /// Append one block of rows sharing a time and depth.
    pub(crate) fn push_block(
        &mut self,
        time: DateTime<Utc>,
        depth_idx: i64,
        depth_value: f64,
        tile_lons: &[f64],
        tile_lats: &[f64],
        values: Vec<f64>,
    ) {
        let n = values.len();
        self.time.extend(std::iter::repeat(time).take(n));
        self.depth_idx.extend(std::iter::repeat(depth_idx).take(n));
        self.tile_id.extend(0..n as i64);
        if let Some(coords) = self.coords.as_mut() {
            coords.depth_value.extend(std::iter::repeat(depth_value).take(n));
            coords.tile_lon.extend_from_slice(tile_lons);
            coords.tile_lat.extend_from_slice(tile_lats);
        }
        if let Some(column) = self.values.values_mut().next() {
            column.extend(values);
        }
    }

    pub(crate) fn set_bbox_id(&mut self, bbox_id: Option<i64>) {
        self.bbox_id = bbox_id;
    }

    pub fn len(&self) -> usize {
        self.tile_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tile_id.is_empty()
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.time
    }

    pub fn depth_idx(&self) -> &[i64] {
        &self.depth_idx
    }

    pub fn tile_ids(&self) -> &[i64] {
        &self.tile_id
    }

    pub fn coords(&self) -> Option<&FrameCoords> {
        self.coords.as_ref()
    }

    pub fn bbox_id(&self) -> Option<i64> {
        self.bbox_id
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn values(&self, var_name: &str) -> Option<&[f64]> {
        self.values.get(var_name).map(|v| v.as_slice())
    }

    pub fn key(&self, row: usize) -> RowKey {
        RowKey {
            time: self.time[row],
            depth_idx: self.depth_idx[row],
            tile_id: self.tile_id[row],
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = RowKey> + '_ {
        (0..self.len()).map(|i| self.key(i))
    }

    /// Keep only the rows whose key satisfies `keep`.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&RowKey) -> bool) {
        let mask: Vec<bool> = self.keys().map(|k| keep(&k)).collect();
        retain_by(&mask, &mut self.time);
        retain_by(&mask, &mut self.depth_idx);
        retain_by(&mask, &mut self.tile_id);
        if let Some(coords) = self.coords.as_mut() {
            retain_by(&mask, &mut coords.depth_value);
            retain_by(&mask, &mut coords.tile_lon);
            retain_by(&mask, &mut coords.tile_lat);
        }
        for column in self.values.values_mut() {
            retain_by(&mask, column);
        }
    }

    /// Add `other`'s value columns, matching rows on [`RowKey`].
    ///
    /// The join is strictly one-to-one: a duplicate key on either side, a
    /// key present on one side only or a repeated variable name fails.
    /// Row order follows `self`.
    pub fn join_one_to_one(mut self, other: &TileFrame) -> Result<TileFrame> {
        let label = other.variable_names().collect::<Vec<_>>().join(",");

        for name in other.variable_names() {
            if self.values.contains_key(name) {
                return Err(FrameError::DuplicateVariable(name.to_string()));
            }
        }

        let left = index_keys(&self, &label, "left")?;
        let right = index_keys(other, &label, "right")?;

        if left.len() != right.len() {
            return Err(TileError::join_cardinality(
                &label,
                format!("{} keys on the left, {} on the right", left.len(), right.len()),
            )
            .into());
        }

        let mut order = Vec::with_capacity(self.len());
        for key in self.keys() {
            match right.get(&key) {
                Some(&j) => order.push(j),
                None => {
                    return Err(TileError::join_cardinality(
                        &label,
                        format!(
                            "key (time={}, depth_idx={}, tile_id={}) missing on the right",
                            key.time.to_rfc3339(),
                            key.depth_idx,
                            key.tile_id
                        ),
                    )
                    .into())
                }
            }
        }

        for (name, column) in &other.values {
            let joined = order.iter().map(|&j| column[j]).collect();
            self.values.insert(name.clone(), joined);
        }
        Ok(self)
    }

    /// Materialize the rows.
    pub fn rows(&self) -> Vec<TidyRow> {
        (0..self.len())
            .map(|i| TidyRow {
                time: self.time[i],
                depth_idx: self.depth_idx[i],
                depth_value: self.coords.as_ref().map(|c| c.depth_value[i]),
                tile_id: self.tile_id[i],
                tile_lon: self.coords.as_ref().map(|c| c.tile_lon[i]),
                tile_lat: self.coords.as_ref().map(|c| c.tile_lat[i]),
                bbox_id: self.bbox_id,
                values: self
                    .values
                    .iter()
                    .map(|(name, column)| (name.clone(), column[i]))
                    .collect(),
            })
            .collect()
    }
}

fn retain_by<T>(mask: &[bool], values: &mut Vec<T>) {
    let mut it = mask.iter();
    values.retain(|_| it.next().copied().unwrap_or(false));
}

fn index_keys(frame: &TileFrame, label: &str, side: &str) -> Result<HashMap<RowKey, usize>> {
    let mut index = HashMap::with_capacity(frame.len());
    for (i, key) in frame.keys().enumerate() {
        if index.insert(key, i).is_some() {
            return Err(TileError::join_cardinality(
                label,
                format!(
                    "duplicate key (time={}, depth_idx={}, tile_id={}) on the {}",
                    key.time.to_rfc3339(),
                    key.depth_idx,
                    key.tile_id,
                    side
                ),
            )
            .into());
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap()
    }

    fn frame(var: &str, with_coords: bool, offset: f64) -> TileFrame {
        frame_days(var, with_coords, offset, &[1, 2])
    }

    fn frame_days(var: &str, with_coords: bool, offset: f64, days: &[u32]) -> TileFrame {
        let mut f = TileFrame::new(var, with_coords);
        for &day in days {
            f.push_block(
                t(day),
                -1,
                f64::NAN,
                &[10.0, 11.0, 12.0],
                &[50.0, 50.0, 51.0],
                vec![offset + day as f64, offset + 10.0, offset + 20.0],
            );
        }
        f
    }

    #[test]
    fn test_push_block_numbers_tiles() {
        let f = frame("thetao", true, 0.0);
        assert_eq!(f.len(), 6);
        assert_eq!(f.tile_ids(), &[0, 1, 2, 0, 1, 2]);
        assert_eq!(f.coords().unwrap().tile_lon[4], 11.0);
        assert_eq!(f.values("thetao").unwrap()[3], 2.0);
    }

    #[test]
    fn test_join_one_to_one() {
        // right side in a different row order; rows are matched by key
        let right = frame_days("so", false, 100.0, &[2, 1]);
        let joined = frame("thetao", true, 0.0).join_one_to_one(&right).unwrap();
        assert_eq!(joined.len(), 6);
        assert_eq!(joined.variable_names().collect::<Vec<_>>(), vec!["thetao", "so"]);
        assert_eq!(joined.values("so").unwrap()[3], 102.0);
        assert!(joined.coords().is_some());
    }

    #[test]
    fn test_join_rejects_missing_key() {
        let mut right = frame("so", false, 0.0);
        right.retain_rows(|k| !(k.tile_id == 1 && k.time == t(2)));
        let err = frame("thetao", true, 0.0).join_one_to_one(&right).unwrap_err();
        assert!(matches!(err, FrameError::Tile(TileError::JoinCardinality { .. })));
    }

    #[test]
    fn test_join_rejects_duplicate_keys() {
        let mut right = frame("so", false, 0.0);
        right.push_block(t(2), -1, f64::NAN, &[], &[], vec![0.0]);
        let err = frame("thetao", true, 0.0).join_one_to_one(&right).unwrap_err();
        assert!(matches!(err, FrameError::Tile(TileError::JoinCardinality { .. })));
    }

    #[test]
    fn test_join_rejects_same_variable() {
        let err = frame("so", true, 0.0)
            .join_one_to_one(&frame("so", false, 0.0))
            .unwrap_err();
        assert!(matches!(err, FrameError::DuplicateVariable(_)));
    }

    #[test]
    fn test_rows_serialize_flat() {
        let mut f = frame("thetao", true, 0.0);
        f.set_bbox_id(Some(3));
        let rows = f.rows();
        let json = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(json["tile_id"], 1);
        assert_eq!(json["bbox_id"], 3);
        assert_eq!(json["thetao"], 10.0);
        assert!(json["depth_value"].is_null());

        let bare = frame("so", false, 0.0).rows();
        let json = serde_json::to_value(&bare[0]).unwrap();
        assert!(json.get("tile_lon").is_none());
    }
}
