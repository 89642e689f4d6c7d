//! In-memory gridded datasets.
//!
//! This crate models the subset of the NetCDF/CF data model the tiling
//! pipeline needs: named dimensions, n-dimensional `f64` variables with
//! attributes, 1-D coordinate variables and CF time decoding.
//!
//! # Example
//!
//! ```
//! use grid_dataset::{Dataset, Variable};
//!
//! let mut ds = Dataset::new();
//! ds.add_coordinate("latitude", vec![10.0, 20.0]).unwrap();
//! ds.add_coordinate("longitude", vec![100.0, 200.0, 300.0]).unwrap();
//! let mask = Variable::from_vec(
//!     "mask",
//!     &["latitude", "longitude"],
//!     &[2, 3],
//!     vec![1.0, 0.0, 1.0, 1.0, 1.0, 0.0],
//! )
//! .unwrap()
//! .with_attr("long_name", "Land-sea mask: 1 = sea ; 0 = land");
//! ds.add_variable(mask).unwrap();
//!
//! assert_eq!(ds.dimension_len("longitude"), Some(3));
//! ```
//!
//! With the `netcdf` feature enabled, `open_dataset` loads a file from disk.

pub mod attrs;
pub mod dataset;
pub mod error;
#[cfg(feature = "netcdf")]
pub mod nc_reader;
pub mod time;
pub mod variable;

pub use attrs::AttrValue;
pub use dataset::Dataset;
pub use error::{DatasetError, DatasetResult};
#[cfg(feature = "netcdf")]
pub use nc_reader::open_dataset;
pub use time::decode_cf_times;
pub use variable::Variable;
