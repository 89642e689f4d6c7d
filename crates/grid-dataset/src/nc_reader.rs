//! NetCDF loading using the netcdf library.
//!
//! Every variable is read in full as `f64`. Packed variables (those carrying
//! `scale_factor`/`add_offset`) are unpacked and their `_FillValue` cells
//! become NaN; unpacked variables keep raw values and their `_FillValue`
//! attribute so that callers such as the sea-mask decoder can apply their
//! own missing-value rules.

use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use tracing::debug;

use crate::attrs::AttrValue;
use crate::dataset::Dataset;
use crate::error::{DatasetError, DatasetResult};
use crate::variable::Variable;

/// Open a NetCDF file and load it fully into memory.
pub fn open_dataset<P: AsRef<Path>>(path: P) -> DatasetResult<Dataset> {
    let path = path.as_ref();
    let file = netcdf::open(path).map_err(|e| {
        DatasetError::invalid_format(format!("failed to open NetCDF {}: {}", path.display(), e))
    })?;

    let mut ds = Dataset::new();

    for attr in file.attributes() {
        if let Some(value) = attr.value().ok().and_then(convert_attr) {
            ds.set_attr(attr.name(), value);
        }
    }

    for nc_var in file.variables() {
        let name = nc_var.name();
        let dim_names: Vec<String> = nc_var.dimensions().iter().map(|d| d.name()).collect();
        let shape: Vec<usize> = nc_var.dimensions().iter().map(|d| d.len()).collect();

        let raw: Vec<f64> = nc_var
            .get_values::<f64, _>(..)
            .map_err(|e| DatasetError::invalid_format(format!("failed to read '{}': {}", name, e)))?;

        let mut attrs = Vec::new();
        for attr in nc_var.attributes() {
            if let Some(value) = attr.value().ok().and_then(convert_attr) {
                attrs.push((attr.name().to_string(), value));
            }
        }

        let is_coordinate = dim_names.len() == 1 && dim_names[0] == name;
        let values = if is_coordinate { raw } else { unpack(raw, &attrs) };

        let data = ArrayD::from_shape_vec(IxDyn(&shape), values)?;
        let dims: Vec<&str> = dim_names.iter().map(|d| d.as_str()).collect();
        let mut var = Variable::new(name.as_str(), &dims, data)?;
        for (key, value) in attrs {
            var.set_attr(key, value);
        }

        debug!(variable = %name, dims = ?dim_names, shape = ?shape, "Loaded NetCDF variable");
        ds.add_variable(var)?;
    }

    Ok(ds)
}

/// Apply CF packing attributes, mapping fill cells to NaN.
fn unpack(raw: Vec<f64>, attrs: &[(String, AttrValue)]) -> Vec<f64> {
    let scale_factor = get_f64_attr(attrs, "scale_factor");
    let add_offset = get_f64_attr(attrs, "add_offset");
    if scale_factor.is_none() && add_offset.is_none() {
        return raw;
    }

    let scale = scale_factor.unwrap_or(1.0);
    let offset = add_offset.unwrap_or(0.0);
    let fill_value = get_f64_attr(attrs, "_FillValue");

    raw.into_iter()
        .map(|val| {
            if Some(val) == fill_value {
                f64::NAN
            } else {
                val * scale + offset
            }
        })
        .collect()
}

/// Helper to get a numeric attribute by name.
fn get_f64_attr(attrs: &[(String, AttrValue)], name: &str) -> Option<f64> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .and_then(|(_, value)| value.as_f64())
}

fn convert_attr(value: netcdf::AttributeValue) -> Option<AttrValue> {
    use netcdf::AttributeValue as A;

    match value {
        A::Str(s) => Some(AttrValue::Text(s)),
        A::Double(v) => Some(AttrValue::Float(v)),
        A::Float(v) => Some(AttrValue::Float(v as f64)),
        A::Longlong(v) => Some(AttrValue::Int(v)),
        A::Ulonglong(v) => i64::try_from(v).ok().map(AttrValue::Int),
        A::Int(v) => Some(AttrValue::Int(v as i64)),
        A::Uint(v) => Some(AttrValue::Int(v as i64)),
        A::Short(v) => Some(AttrValue::Int(v as i64)),
        A::Ushort(v) => Some(AttrValue::Int(v as i64)),
        A::Schar(v) => Some(AttrValue::Int(v as i64)),
        A::Uchar(v) => Some(AttrValue::Int(v as i64)),
        // Array-valued attributes (e.g. flag_masks) are not consulted.
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_applies_scale_offset_and_fill() {
        let attrs = vec![
            ("scale_factor".to_string(), AttrValue::Float(0.5)),
            ("add_offset".to_string(), AttrValue::Float(10.0)),
            ("_FillValue".to_string(), AttrValue::Int(-32767)),
        ];
        let out = unpack(vec![2.0, -32767.0], &attrs);
        assert_eq!(out[0], 11.0);
        assert!(out[1].is_nan());
    }

    #[test]
    fn test_unpack_leaves_unpacked_variables_raw() {
        let attrs = vec![("_FillValue".to_string(), AttrValue::Float(-128.0))];
        let out = unpack(vec![1.0, -128.0], &attrs);
        assert_eq!(out, vec![1.0, -128.0]);
    }
}
