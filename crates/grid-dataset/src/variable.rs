//! Named n-dimensional variables.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, ArrayD, Axis, Ix2, IxDyn};

use crate::attrs::AttrValue;
use crate::error::{DatasetError, DatasetResult};

/// A named array with labelled dimensions and attributes.
///
/// Values are held as `f64` regardless of the on-disk type; integer masks
/// and flags survive the widening exactly.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    dims: Vec<String>,
    data: ArrayD<f64>,
    attrs: BTreeMap<String, AttrValue>,
}

impl Variable {
    /// Create a variable from an array whose rank matches `dims`.
    pub fn new(name: impl Into<String>, dims: &[&str], data: ArrayD<f64>) -> DatasetResult<Self> {
        let name = name.into();
        if data.ndim() != dims.len() {
            return Err(DatasetError::invalid_format(format!(
                "variable '{}' declares {} dimensions but its array has rank {}",
                name,
                dims.len(),
                data.ndim()
            )));
        }
        Ok(Self {
            name,
            dims: dims.iter().map(|d| d.to_string()).collect(),
            data,
            attrs: BTreeMap::new(),
        })
    }

    /// Create a variable from row-major values and an explicit shape.
    pub fn from_vec(
        name: impl Into<String>,
        dims: &[&str],
        shape: &[usize],
        values: Vec<f64>,
    ) -> DatasetResult<Self> {
        let name = name.into();
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(DatasetError::shape_mismatch(name, shape, &[values.len()]));
        }
        let data = ArrayD::from_shape_vec(IxDyn(shape), values)?;
        Self::new(name, dims, data)
    }

    /// Create a 1-D coordinate variable named after its own dimension.
    pub fn coordinate(name: impl Into<String>, values: Vec<f64>) -> Self {
        let name = name.into();
        let data = Array1::from(values).into_dyn();
        Self {
            dims: vec![name.clone()],
            name,
            data,
            attrs: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Set an attribute in place.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn values(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn attrs(&self) -> &BTreeMap<String, AttrValue> {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Raw `_FillValue`/`missing_value` markers of an unpacked variable.
    ///
    /// Empty for packed variables (`scale_factor`/`add_offset`), whose fill
    /// cells are already NaN after loading.
    pub fn fill_values(&self) -> Vec<f64> {
        if self.attrs.contains_key("scale_factor") || self.attrs.contains_key("add_offset") {
            return Vec::new();
        }
        ["_FillValue", "missing_value"]
            .iter()
            .filter_map(|key| self.attr(key).and_then(AttrValue::as_f64))
            .filter(|v| !v.is_nan())
            .collect()
    }

    pub fn has_dim(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }

    /// Axis position of a named dimension.
    pub fn axis_of(&self, dim: &str) -> DatasetResult<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .ok_or_else(|| DatasetError::DimensionNotFound(format!("{} (on '{}')", dim, self.name)))
    }

    /// Length of a named dimension.
    pub fn dim_len(&self, dim: &str) -> DatasetResult<usize> {
        let axis = self.axis_of(dim)?;
        Ok(self.data.len_of(Axis(axis)))
    }

    /// Select one position along `dim`, dropping that dimension.
    pub fn isel(&self, dim: &str, index: usize) -> DatasetResult<Variable> {
        let axis = self.axis_of(dim)?;
        let len = self.data.len_of(Axis(axis));
        if index >= len {
            return Err(DatasetError::IndexOutOfRange {
                dim: dim.to_string(),
                index,
                len,
            });
        }

        let data = self.data.index_axis(Axis(axis), index).to_owned();
        let mut dims = self.dims.clone();
        dims.remove(axis);

        Ok(Variable {
            name: self.name.clone(),
            dims,
            data,
            attrs: self.attrs.clone(),
        })
    }

    /// Drop every length-1 dimension except the ones named in `keep`.
    pub fn squeeze_except(&self, keep: &[&str]) -> Variable {
        let mut data = self.data.clone();
        let mut dims = self.dims.clone();

        // Walk backwards so earlier axis positions stay valid.
        for axis in (0..dims.len()).rev() {
            if data.len_of(Axis(axis)) == 1 && !keep.contains(&dims[axis].as_str()) {
                data = data.index_axis_move(Axis(axis), 0);
                dims.remove(axis);
            }
        }

        Variable {
            name: self.name.clone(),
            dims,
            data,
            attrs: self.attrs.clone(),
        }
    }

    /// Drop every length-1 dimension.
    pub fn squeeze(&self) -> Variable {
        self.squeeze_except(&[])
    }

    /// Reorder dimensions by name. `order` must name every dimension exactly once.
    pub fn transpose(&self, order: &[&str]) -> DatasetResult<Variable> {
        if order.len() != self.dims.len() {
            return Err(DatasetError::invalid_format(format!(
                "cannot transpose '{}' with dims {:?} to {:?}",
                self.name, self.dims, order
            )));
        }

        let mut perm = Vec::with_capacity(order.len());
        for dim in order {
            let axis = self.axis_of(dim)?;
            if perm.contains(&axis) {
                return Err(DatasetError::invalid_format(format!(
                    "dimension '{}' repeated in transpose order",
                    dim
                )));
            }
            perm.push(axis);
        }

        let data = self
            .data
            .clone()
            .permuted_axes(IxDyn(&perm))
            .as_standard_layout()
            .into_owned();

        Ok(Variable {
            name: self.name.clone(),
            dims: order.iter().map(|d| d.to_string()).collect(),
            data,
            attrs: self.attrs.clone(),
        })
    }

    /// Convert to a 2-D array in the current dimension order.
    pub fn into_2d(self) -> DatasetResult<Array2<f64>> {
        if self.data.ndim() != 2 {
            return Err(DatasetError::invalid_format(format!(
                "variable '{}' is {}-D with dims {:?}, expected 2-D",
                self.name,
                self.data.ndim(),
                self.dims
            )));
        }
        Ok(self.data.into_dimensionality::<Ix2>()?)
    }

    /// Flattened values of a 1-D variable.
    pub fn to_vec_1d(&self) -> DatasetResult<Vec<f64>> {
        if self.data.ndim() != 1 {
            return Err(DatasetError::invalid_format(format!(
                "variable '{}' is {}-D, expected 1-D",
                self.name,
                self.data.ndim()
            )));
        }
        Ok(self.data.iter().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_values() {
        let v = Variable::from_vec("thetao", &["x"], &[2], vec![1.0, 1e20])
            .unwrap()
            .with_attr("_FillValue", 1e20)
            .with_attr("missing_value", -999);
        assert_eq!(v.fill_values(), vec![1e20, -999.0]);

        let packed = v.with_attr("scale_factor", 0.01);
        assert!(packed.fill_values().is_empty());
    }

    fn cube() -> Variable {
        // time=2, lat=2, lon=3; value = t*100 + j*10 + i
        let mut values = Vec::new();
        for t in 0..2 {
            for j in 0..2 {
                for i in 0..3 {
                    values.push((t * 100 + j * 10 + i) as f64);
                }
            }
        }
        Variable::from_vec("v", &["time", "lat", "lon"], &[2, 2, 3], values).unwrap()
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let err = Variable::from_vec("v", &["x"], &[3], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, DatasetError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_new_rejects_rank_mismatch() {
        let data = ArrayD::zeros(IxDyn(&[2, 2]));
        assert!(Variable::new("v", &["x"], data).is_err());
    }

    #[test]
    fn test_isel_drops_dimension() {
        let v = cube().isel("time", 1).unwrap();
        assert_eq!(v.dims(), &["lat".to_string(), "lon".to_string()]);
        assert_eq!(v.shape(), &[2, 3]);
        assert_eq!(v.values()[&[1, 2][..]], 112.0);
    }

    #[test]
    fn test_isel_out_of_range() {
        let err = cube().isel("time", 5).unwrap_err();
        assert!(matches!(err, DatasetError::IndexOutOfRange { index: 5, len: 2, .. }));
    }

    #[test]
    fn test_transpose_by_name() {
        let v = cube().isel("time", 0).unwrap().transpose(&["lon", "lat"]).unwrap();
        assert_eq!(v.shape(), &[3, 2]);
        assert_eq!(v.values()[&[2, 1][..]], 12.0);
    }

    #[test]
    fn test_transpose_requires_all_dims() {
        assert!(cube().transpose(&["lat", "lon"]).is_err());
        assert!(cube().transpose(&["lat", "lat", "lon"]).is_err());
    }

    #[test]
    fn test_squeeze_except_keeps_named_singletons() {
        let v = Variable::from_vec("m", &["time", "lat", "lon"], &[1, 1, 3], vec![1.0, 2.0, 3.0])
            .unwrap();
        let kept = v.squeeze_except(&["lat", "lon"]);
        assert_eq!(kept.dims(), &["lat".to_string(), "lon".to_string()]);

        let all = v.squeeze();
        assert_eq!(all.dims(), &["lon".to_string()]);
    }

    #[test]
    fn test_into_2d() {
        let arr = cube().isel("time", 0).unwrap().into_2d().unwrap();
        assert_eq!(arr.dim(), (2, 3));
        assert!(cube().into_2d().is_err());
    }
}
