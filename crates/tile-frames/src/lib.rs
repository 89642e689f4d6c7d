//! Tidy per-tile frames from gridded datasets.
//!
//! A [`TileCatalog`](tile_catalog::TileCatalog) fixes which grid cells are
//! sea tiles. [`DatasetTileFrameExtractor`] walks every `(time, depth)`
//! slice of a variable and emits one row per sea tile, in tile id order,
//! so frames of different variables line up on
//! `(time, depth_idx, tile_id)` and join one-to-one.
//!
//! # Example
//!
//! ```
//! use grid_dataset::{Dataset, Variable};
//! use ndarray::array;
//! use tile_catalog::{GridSpec, TileCatalog};
//! use tile_frames::DatasetTileFrameExtractor;
//!
//! let mut ds = Dataset::new();
//! ds.add_coordinate("latitude", vec![10.0, 20.0]).unwrap();
//! ds.add_coordinate("longitude", vec![100.0, 200.0]).unwrap();
//! ds.add_variable(Variable::coordinate("time", vec![0.0]).with_attr("units", "days since 2021-01-01"))
//!     .unwrap();
//! ds.add_variable(
//!     Variable::from_vec("sst", &["time", "latitude", "longitude"], &[1, 2, 2], vec![1.0, 2.0, 3.0, 4.0])
//!         .unwrap(),
//! )
//! .unwrap();
//!
//! let grid = GridSpec::from_dataset_default(&ds).unwrap();
//! let catalog = TileCatalog::new(grid, array![[true, false], [true, true]]).unwrap();
//!
//! let frame = DatasetTileFrameExtractor::new(&catalog)
//!     .to_frame_single(&ds, "sst", true)
//!     .unwrap();
//! assert_eq!(frame.tile_ids(), &[0, 1, 2]);
//! assert_eq!(frame.values("sst").unwrap(), &[1.0, 3.0, 4.0]);
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod extractor;
pub mod frame;
pub mod tile_days;
pub mod writer;

pub use config::FrameConfig;
pub use converter::{period_key, vars_slug, PeriodFrame, PeriodFrameConverter};
pub use error::{FrameError, Result};
pub use extractor::{DatasetTileFrameExtractor, NO_DEPTH};
pub use frame::{FrameCoords, RowKey, TidyRow, TileFrame};
pub use tile_days::{parse_time, TileDayColumns, TileDaysBuilder, DEEPEST_DEPTH};
pub use writer::write_csv;
