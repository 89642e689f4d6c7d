//! CF-convention time coordinate decoding.
//!
//! Time axes in NetCDF files are stored as offsets from a reference instant,
//! described by a `units` attribute such as `"hours since 1950-01-01 00:00:00"`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{DatasetError, DatasetResult};

/// Decode numeric offsets into UTC timestamps using a CF `units` string.
///
/// Offsets are rounded to the nearest millisecond.
pub fn decode_cf_times(values: &[f64], units: &str) -> DatasetResult<Vec<DateTime<Utc>>> {
    let (unit_ms, reference) = parse_cf_units(units)?;

    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return Err(DatasetError::InvalidTimeUnits(format!(
                    "non-finite time offset {} for units '{}'",
                    v, units
                )));
            }
            let ms = (v * unit_ms).round();
            let offset = if ms.abs() < i64::MAX as f64 {
                Duration::try_milliseconds(ms as i64)
            } else {
                None
            };
            offset
                .and_then(|offset| reference.checked_add_signed(offset))
                .ok_or_else(|| {
                    DatasetError::InvalidTimeUnits(format!(
                        "time offset {} '{}' is out of range",
                        v, units
                    ))
                })
        })
        .collect()
}

/// Split a CF units string into (milliseconds per unit, reference instant).
pub fn parse_cf_units(units: &str) -> DatasetResult<(f64, DateTime<Utc>)> {
    let lowered = units.trim().to_lowercase();
    let (unit, reference) = lowered
        .split_once(" since ")
        .ok_or_else(|| DatasetError::InvalidTimeUnits(units.to_string()))?;

    let unit_ms = match unit.trim() {
        "milliseconds" | "millisecond" | "ms" => 1.0,
        "seconds" | "second" | "secs" | "sec" | "s" => 1_000.0,
        "minutes" | "minute" | "mins" | "min" => 60_000.0,
        "hours" | "hour" | "hrs" | "hr" | "h" => 3_600_000.0,
        "days" | "day" | "d" => 86_400_000.0,
        other => {
            return Err(DatasetError::InvalidTimeUnits(format!(
                "unsupported time unit '{}' in '{}'",
                other, units
            )))
        }
    };

    let reference = parse_reference(reference)
        .ok_or_else(|| DatasetError::InvalidTimeUnits(format!("bad reference time in '{}'", units)))?;

    Ok((unit_ms, reference))
}

fn parse_reference(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw
        .trim()
        .trim_end_matches("utc")
        .trim_end_matches('z')
        .trim();

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dt%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
