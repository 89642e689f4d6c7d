//! Per-period conversion of gridded files into tidy tile frames.
//!
//! Inputs are usually one file per month. The catalog is built once from
//! the static mask product and every dataset must share its grid exactly,
//! so the tile ids of all outputs refer to the same cells.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use grid_dataset::Dataset;
use regex::Regex;
use tile_catalog::{GridSpec, SeaMaskBuilder, TileCatalog};
use tracing::{debug, info};

use crate::config::FrameConfig;
use crate::error::{FrameError, Result};
use crate::extractor::DatasetTileFrameExtractor;
use crate::frame::TileFrame;
use crate::writer::write_csv;

/// Tidy frame of one input file with its period labels.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodFrame {
    /// Name of the input the frame came from.
    pub source: String,
    /// `YYYY-MM`.
    pub period: String,
    /// `<period>__<vars-slug>`.
    pub stem: String,
    pub frame: TileFrame,
}

impl PeriodFrame {
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.stem)
    }

    /// Write the frame as `<dir>/<stem>.csv`, creating `dir` if needed.
    pub fn write_csv(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        write_csv(&self.frame, BufWriter::new(File::create(&path)?))?;
        debug!(path = %path.display(), rows = self.frame.len(), "Wrote period frame");
        Ok(path)
    }
}

/// Converts a sequence of named datasets into per-period frames.
///
/// The catalog comes from the static mask product, not from the data
/// files; every period must sit on the catalog's grid.
#[derive(Debug, Clone)]
pub struct PeriodFrameConverter {
    catalog: TileCatalog,
    config: FrameConfig,
}

impl PeriodFrameConverter {
    pub fn new(catalog: TileCatalog, config: FrameConfig) -> Self {
        Self { catalog, config }
    }

    /// Converter whose catalog is built from a static mask dataset.
    pub fn from_static(mask_ds: &Dataset, mask: &SeaMaskBuilder, config: FrameConfig) -> Result<Self> {
        let grid = GridSpec::from_dataset_default(mask_ds)?;
        let sea = mask.build(mask_ds)?;
        let catalog = TileCatalog::new(grid, sea)?;
        info!(tiles = catalog.len(), "Built catalog from static mask");
        Ok(Self::new(catalog, config))
    }

    /// [`PeriodFrameConverter::from_static`] reading the mask from a NetCDF file.
    #[cfg(feature = "netcdf")]
    pub fn from_static_file(path: impl AsRef<Path>, mask: &SeaMaskBuilder, config: FrameConfig) -> Result<Self> {
        let ds = grid_dataset::open_dataset(path)?;
        Self::from_static(&ds, mask, config)
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Convert `(name, dataset)` pairs in order.
    pub fn convert<'d, I, S>(&self, inputs: I) -> Result<Vec<PeriodFrame>>
    where
        I: IntoIterator<Item = (S, &'d Dataset)>,
        S: AsRef<str>,
    {
        self.config.validate()?;
        let frames = inputs
            .into_iter()
            .map(|(name, ds)| self.convert_one(name.as_ref(), ds))
            .collect::<Result<Vec<_>>>()?;
        if frames.is_empty() {
            return Err(FrameError::config("no input datasets"));
        }
        Ok(frames)
    }

    /// Convert one dataset against the catalog.
    pub fn convert_one(&self, name: &str, ds: &Dataset) -> Result<PeriodFrame> {
        self.catalog.grid().validate(ds)?;
        let period = period_key(name)?;

        let extractor = DatasetTileFrameExtractor::from_config(&self.catalog, &self.config);
        let frame = extractor.to_frame_multi(ds, &self.config.variables)?;
        if frame.is_empty() {
            return Err(FrameError::EmptyFrame(name.to_string()));
        }

        let stem = format!("{}__{}", period, vars_slug(&self.config.variables));
        info!(source = name, period = %period, rows = frame.len(), "Converted period");
        Ok(PeriodFrame {
            source: name.to_string(),
            period,
            stem,
            frame,
        })
    }

    /// Open and convert NetCDF files one at a time.
    #[cfg(feature = "netcdf")]
    pub fn convert_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<PeriodFrame>> {
        self.config.validate()?;
        if paths.is_empty() {
            return Err(FrameError::config("no input files"));
        }

        let mut frames = Vec::with_capacity(paths.len());
        for path in paths {
            let ds = grid_dataset::open_dataset(path)?;
            frames.push(self.convert_one(&file_label(path.as_ref()), &ds)?);
        }
        info!(files = paths.len(), tiles = self.catalog.len(), "Converted files");
        Ok(frames)
    }
}

#[cfg(feature = "netcdf")]
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn separated_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{4})[-_](\d{2})").expect("valid regex"))
}

fn compact_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{4})(\d{2})(?:\d{2})?").expect("valid regex"))
}

/// `YYYY-MM` period of a file name.
///
/// Accepts `YYYY-MM`, `YYYY_MM`, `YYYYMM` and `YYYYMMDD` anywhere in the
/// final path component; separated forms win over compact ones.
pub fn period_key(name: &str) -> Result<String> {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());

    for pattern in [separated_pattern(), compact_pattern()] {
        for caps in pattern.captures_iter(&base) {
            let month: u32 = caps[2].parse().unwrap_or(0);
            if (1..=12).contains(&month) {
                return Ok(format!("{}-{}", &caps[1], &caps[2]));
            }
        }
    }
    Err(FrameError::PeriodKey(name.to_string()))
}

/// Variable names reduced to `[A-Za-z0-9_]` and joined with `_`.
pub fn vars_slug<S: AsRef<str>>(vars: &[S]) -> String {
    vars.iter()
        .map(|v| {
            v.as_ref()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect::<String>()
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_key_forms() {
        assert_eq!(period_key("thetao_2021-03.nc").unwrap(), "2021-03");
        assert_eq!(period_key("data/2021_11_subset.nc").unwrap(), "2021-11");
        assert_eq!(period_key("mercator_202104.nc").unwrap(), "2021-04");
        assert_eq!(period_key("glo_20210517_p0.nc").unwrap(), "2021-05");
    }

    #[test]
    fn test_period_key_skips_invalid_month() {
        // 2021-13 is not a month, the compact form later in the name is
        assert_eq!(period_key("run2021-13_202102.nc").unwrap(), "2021-02");
    }

    #[test]
    fn test_period_key_missing() {
        assert!(matches!(period_key("static_mask.nc"), Err(FrameError::PeriodKey(_))));
    }

    #[test]
    fn test_vars_slug() {
        assert_eq!(vars_slug(&["thetao", "so"]), "thetao_so");
        assert_eq!(vars_slug(&["sea-floor temp", "", "so!"]), "seafloortemp_so");
    }
}
