//! CSV output of tidy frames.

use std::borrow::Cow;
use std::io::Write;

use chrono::SecondsFormat;

use crate::error::Result;
use crate::frame::TileFrame;

/// Write `frame` as CSV with a header row.
///
/// Columns are `time,depth_idx,depth_value,tile_id,tile_lon,tile_lat`, then
/// `bbox_id` when the frame has one, then one column per variable. Frames
/// without coordinates leave the coordinate cells empty, as do NaN values.
pub fn write_csv<W: Write>(frame: &TileFrame, mut out: W) -> Result<()> {
    let names: Vec<&str> = frame.variable_names().collect();
    let with_bbox = frame.bbox_id().is_some();

    let mut header: Vec<Cow<'_, str>> = ["time", "depth_idx", "depth_value", "tile_id", "tile_lon", "tile_lat"]
        .into_iter()
        .map(Cow::Borrowed)
        .collect();
    if with_bbox {
        header.push(Cow::Borrowed("bbox_id"));
    }
    header.extend(names.iter().map(|n| quote(n)));
    writeln!(out, "{}", header.join(","))?;

    let columns: Vec<&[f64]> = names.iter().filter_map(|n| frame.values(n)).collect();
    let coords = frame.coords();
    let bbox = frame.bbox_id().map(|b| b.to_string()).unwrap_or_default();

    let mut cells: Vec<String> = Vec::with_capacity(header.len());
    for i in 0..frame.len() {
        cells.clear();
        cells.push(frame.times()[i].to_rfc3339_opts(SecondsFormat::AutoSi, true));
        cells.push(frame.depth_idx()[i].to_string());
        cells.push(float_cell(coords.map(|c| c.depth_value[i])));
        cells.push(frame.tile_ids()[i].to_string());
        cells.push(float_cell(coords.map(|c| c.tile_lon[i])));
        cells.push(float_cell(coords.map(|c| c.tile_lat[i])));
        if with_bbox {
            cells.push(bbox.clone());
        }
        cells.extend(columns.iter().map(|column| float_cell(Some(column[i]))));
        writeln!(out, "{}", cells.join(","))?;
    }
    out.flush()?;
    Ok(())
}

fn float_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}

fn quote(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
