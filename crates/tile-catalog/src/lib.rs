//! Sea-tile catalog and nearest-tile assignment.
//!
//! Every sea cell of a rectilinear lon/lat grid becomes a tile with a
//! dense integer id. The same ids are used to assign point observations
//! to their nearest sea cell and to flatten gridded fields into per-tile
//! rows, so the catalog is the single source of truth for which id means
//! which cell.
//!
//! # Example
//!
//! ```
//! use grid_dataset::{Dataset, Variable};
//! use tile_catalog::{GridSpec, KdIndex, SeaMaskBuilder, TileCatalog};
//!
//! let mut ds = Dataset::new();
//! ds.add_coordinate("latitude", vec![10.0, 20.0]).unwrap();
//! ds.add_coordinate("longitude", vec![100.0, 200.0]).unwrap();
//! ds.add_variable(
//!     Variable::from_vec("mask", &["latitude", "longitude"], &[2, 2], vec![1.0, 0.0, 1.0, 1.0])
//!         .unwrap()
//!         .with_attr("long_name", "1 = sea ; 0 = land"),
//! )
//! .unwrap();
//!
//! let grid = GridSpec::from_dataset_default(&ds).unwrap();
//! let sea = SeaMaskBuilder::categorical("mask", None).build(&ds).unwrap();
//! let catalog = TileCatalog::new(grid, sea).unwrap();
//! assert_eq!(catalog.len(), 3);
//!
//! let index = KdIndex::new(&catalog);
//! let ids = index.query_many(&[199.0], &[21.0], None).unwrap();
//! assert_eq!(ids, vec![2]);
//! ```

pub mod assigner;
pub mod catalog;
pub mod config;
pub mod error;
pub mod grid_spec;
pub mod kd_index;
pub mod mapper;
pub mod sea_mask;
pub mod table;

pub use assigner::{PointColumns, PointTileAssigner, STATIC_LAT_CANDIDATES, STATIC_LON_CANDIDATES};
pub use catalog::{TileCatalog, LAND};
pub use config::{CoordinateConfig, IndexConfig, MaskConfig, TilingConfig};
pub use error::{ErrorCategory, Result, TileError};
pub use grid_spec::{GridSpec, DEFAULT_LAT_CANDIDATES, DEFAULT_LON_CANDIDATES};
pub use kd_index::{KdIndex, UNMATCHED};
pub use mapper::CoordinatesToTileMapper;
pub use sea_mask::{MaskDecoding, MaskDims, SeaMaskBuilder};
pub use table::{Column, PointTable};
