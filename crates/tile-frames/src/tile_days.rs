//! Per-tile, per-day summaries of assigned point observations.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tile_catalog::{Column, PointTable, TileError};
use tracing::{debug, warn};

use crate::error::{FrameError, Result};

/// Name of the depth summary column in the output.
pub const DEEPEST_DEPTH: &str = "deepest_depth";

/// Input column names. The output reuses them, plus [`DEEPEST_DEPTH`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileDayColumns {
    pub tile_id: String,
    pub lon_center: String,
    pub lat_center: String,
    pub time: String,
    pub depth: String,
}

impl Default for TileDayColumns {
    fn default() -> Self {
        Self {
            tile_id: "tile_id".to_string(),
            lon_center: "tile_lon_center".to_string(),
            lat_center: "tile_lat_center".to_string(),
            time: "time".to_string(),
            depth: "depth".to_string(),
        }
    }
}

/// Collapses assigned points to one row per `(tile_id, day)`.
#[derive(Debug, Clone, Default)]
pub struct TileDaysBuilder {
    columns: TileDayColumns,
}

impl TileDaysBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(columns: TileDayColumns) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &TileDayColumns {
        &self.columns
    }

    /// Build the per-day table.
    ///
    /// Rows whose time does not parse are dropped; the rest are floored to
    /// the UTC day. The first row seen for a `(tile_id, day)` pair supplies
    /// its tile center. `deepest_depth` is the maximum finite depth over
    /// all rows of the tile, whatever the day. Output rows are sorted by
    /// tile id, then day.
    pub fn build_per_day(&self, points: &PointTable) -> Result<PointTable> {
        let cols = &self.columns;
        let required = [&cols.tile_id, &cols.lon_center, &cols.lat_center, &cols.time, &cols.depth];
        let missing: Vec<&str> = required
            .iter()
            .filter(|c| !points.contains(c))
            .map(|c| c.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(TileError::ColumnNotFound(missing.join(", ")).into());
        }

        let tile_ids = points.i64_column(&cols.tile_id)?;
        let lon_c = points.f64_column(&cols.lon_center)?;
        let lat_c = points.f64_column(&cols.lat_center)?;
        let depths = points.f64_column(&cols.depth)?;
        let days = parse_days(points.column(&cols.time)?, &cols.time)?;

        let dropped = days.iter().filter(|d| d.is_none()).count();
        if dropped > 0 {
            warn!(dropped, column = %cols.time, "Dropped rows with unparseable times");
        }

        let mut deepest: BTreeMap<i64, f64> = BTreeMap::new();
        let mut seen: HashSet<(i64, DateTime<Utc>)> = HashSet::new();
        let mut rows: Vec<(i64, DateTime<Utc>, usize)> = Vec::new();

        for (i, day) in days.iter().enumerate() {
            let Some(day) = *day else { continue };
            let tile = tile_ids[i];

            let entry = deepest.entry(tile).or_insert(f64::NAN);
            if depths[i].is_finite() && !(entry.is_finite() && *entry >= depths[i]) {
                *entry = depths[i];
            }

            if seen.insert((tile, day)) {
                rows.push((tile, day, i));
            }
        }

        let bad: Vec<i64> = deepest
            .iter()
            .filter(|(_, d)| !d.is_finite())
            .map(|(&t, _)| t)
            .collect();
        if !bad.is_empty() {
            return Err(FrameError::MissingDepths(bad));
        }

        // stable, so ties keep first-seen order
        rows.sort_by_key(|&(tile, day, _)| (tile, day));

        let out = PointTable::new()
            .with_column(cols.tile_id.as_str(), Column::Int(rows.iter().map(|r| r.0).collect()))?
            .with_column(cols.lon_center.as_str(), Column::Float(rows.iter().map(|r| lon_c[r.2]).collect()))?
            .with_column(cols.lat_center.as_str(), Column::Float(rows.iter().map(|r| lat_c[r.2]).collect()))?
            .with_column(cols.time.as_str(), Column::Time(rows.iter().map(|r| r.1).collect()))?
            .with_column(
                DEEPEST_DEPTH,
                Column::Float(rows.iter().map(|r| deepest.get(&r.0).copied().unwrap_or(f64::NAN)).collect()),
            )?;

        debug!(
            points = points.n_rows(),
            tiles = deepest.len(),
            rows = out.n_rows(),
            "Built tile days"
        );
        Ok(out)
    }
}

/// Day of each row, `None` where the time is missing or unparseable.
fn parse_days(column: &Column, name: &str) -> Result<Vec<Option<DateTime<Utc>>>> {
    match column {
        Column::Time(values) => Ok(values.iter().map(|t| Some(floor_day(*t))).collect()),
        Column::Text(values) => Ok(values.iter().map(|s| parse_time(s).map(floor_day)).collect()),
        _ => Err(TileError::column_type(name, "a time or text column").into()),
    }
}

/// Parse a timestamp in one of the accepted layouts. Naive values are UTC.
pub fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(Utc.from_utc_datetime(&t));
        }
    }
    for layout in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(text, layout) {
            return Some(Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)));
        }
    }
    None
}

fn floor_day(t: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&t.date_naive().and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_layouts() {
        let day = Utc.with_ymd_and_hms(2021, 3, 4, 0, 0, 0).unwrap();
        assert_eq!(parse_time("2021-03-04"), Some(day));
        assert_eq!(parse_time("04/03/2021"), Some(day));
        assert_eq!(
            parse_time("2021-03-04 05:06:07"),
            Some(Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap())
        );
        assert_eq!(
            parse_time("2021-03-04T23:30:00+02:00"),
            Some(Utc.with_ymd_and_hms(2021, 3, 4, 21, 30, 0).unwrap())
        );
        assert_eq!(parse_time("yesterday"), None);
        assert_eq!(parse_time(""), None);
    }

    #[test]
    fn test_floor_day() {
        let t = Utc.with_ymd_and_hms(2021, 3, 4, 23, 59, 59).unwrap();
        assert_eq!(floor_day(t), Utc.with_ymd_and_hms(2021, 3, 4, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_numeric_time_column_rejected() {
        let err = parse_days(&Column::Float(vec![1.0]), "time").unwrap_err();
        assert!(matches!(err, FrameError::Tile(TileError::ColumnType { .. })));
    }
}
