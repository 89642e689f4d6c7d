//! A collection of variables sharing named dimensions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::attrs::AttrValue;
use crate::error::{DatasetError, DatasetResult};
use crate::time::decode_cf_times;
use crate::variable::Variable;

/// An in-memory gridded dataset.
///
/// Dimensions and variables keep insertion order. A coordinate is simply a
/// 1-D variable whose name equals its dimension, as in CF/NetCDF files.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    dims: IndexMap<String, usize>,
    variables: IndexMap<String, Variable>,
    attrs: BTreeMap<String, AttrValue>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dimension. Re-registering with the same length is a no-op.
    pub fn add_dimension(&mut self, name: impl Into<String>, len: usize) -> DatasetResult<()> {
        let name = name.into();
        match self.dims.get(&name) {
            Some(&existing) if existing != len => {
                Err(DatasetError::shape_mismatch(name, &[existing], &[len]))
            }
            Some(_) => Ok(()),
            None => {
                self.dims.insert(name, len);
                Ok(())
            }
        }
    }

    /// Add (or replace) a variable, registering any new dimensions it uses.
    ///
    /// Every dimension the variable shares with the dataset must have the
    /// same length.
    pub fn add_variable(&mut self, var: Variable) -> DatasetResult<()> {
        for (dim, &len) in var.dims().iter().zip(var.shape()) {
            if let Some(&existing) = self.dims.get(dim) {
                if existing != len {
                    return Err(DatasetError::ShapeMismatch {
                        name: format!("{} (dimension '{}')", var.name(), dim),
                        expected: vec![existing],
                        actual: vec![len],
                    });
                }
            }
        }
        for (dim, &len) in var.dims().iter().zip(var.shape()) {
            self.dims.entry(dim.clone()).or_insert(len);
        }
        self.variables.insert(var.name().to_string(), var);
        Ok(())
    }

    /// Builder-style variant of [`Dataset::add_variable`].
    pub fn with_variable(mut self, var: Variable) -> DatasetResult<Self> {
        self.add_variable(var)?;
        Ok(self)
    }

    /// Add a 1-D coordinate variable named after its dimension.
    pub fn add_coordinate(&mut self, name: impl Into<String>, values: Vec<f64>) -> DatasetResult<()> {
        self.add_variable(Variable::coordinate(name, values))
    }

    /// Remove a variable, returning it if it was present.
    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        self.variables.shift_remove(name)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Whether a variable (data or coordinate) with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variable(&self, name: &str) -> DatasetResult<&Variable> {
        self.variables
            .get(name)
            .ok_or_else(|| DatasetError::VariableNotFound(name.to_string()))
    }

    pub fn variable_mut(&mut self, name: &str) -> DatasetResult<&mut Variable> {
        self.variables
            .get_mut(name)
            .ok_or_else(|| DatasetError::VariableNotFound(name.to_string()))
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(|k| k.as_str())
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn dimension_len(&self, name: &str) -> Option<usize> {
        self.dims.get(name).copied()
    }

    pub fn dimensions(&self) -> impl Iterator<Item = (&str, usize)> {
        self.dims.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Values of a 1-D variable (typically a coordinate).
    pub fn coordinate_values(&self, name: &str) -> DatasetResult<Vec<f64>> {
        self.variable(name)?.to_vec_1d()
    }

    /// Decoded timestamps of the coordinate variable `dim`.
    ///
    /// The coordinate must carry a CF `units` attribute.
    pub fn time_values(&self, dim: &str) -> DatasetResult<Vec<DateTime<Utc>>> {
        let var = self.variable(dim)?;
        let units = var
            .attr("units")
            .and_then(|u| u.as_str())
            .ok_or_else(|| {
                DatasetError::InvalidTimeUnits(format!("time coordinate '{}' has no units attribute", dim))
            })?;
        decode_cf_times(&var.to_vec_1d()?, units)
    }
}
