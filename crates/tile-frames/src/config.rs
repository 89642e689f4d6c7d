//! Configuration for frame extraction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

/// Dimension names, variables and partition id used when flattening datasets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub time_dim: String,

    /// `None` treats every variable as depth-less.
    pub depth_dim: Option<String>,

    /// Variables to extract; the first one carries coordinates.
    pub variables: Vec<String>,

    /// Partition label copied to rows that carry coordinates.
    pub bbox_id: Option<i64>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            time_dim: "time".to_string(),
            depth_dim: Some("depth".to_string()),
            variables: Vec::new(),
            bbox_id: None,
        }
    }
}

impl FrameConfig {
    /// Parse a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| FrameError::config(e.to_string()))
    }

    /// Load a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| FrameError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from environment variables that are set and parse.
    ///
    /// An empty `FRAME_DEPTH_DIM` disables the depth axis.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("FRAME_TIME_DIM") {
            if !val.trim().is_empty() {
                self.time_dim = val.trim().to_string();
            }
        }

        if let Ok(val) = std::env::var("FRAME_DEPTH_DIM") {
            let val = val.trim();
            self.depth_dim = (!val.is_empty()).then(|| val.to_string());
        }

        if let Ok(val) = std::env::var("FRAME_VARIABLES") {
            let vars: Vec<String> = val
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();
            if !vars.is_empty() {
                self.variables = vars;
            }
        }

        if let Ok(val) = std::env::var("FRAME_BBOX_ID") {
            if let Ok(id) = val.trim().parse() {
                self.bbox_id = Some(id);
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.time_dim.is_empty() {
            return Err(FrameError::config("time_dim must not be empty"));
        }

        if self.depth_dim.as_deref() == Some(self.time_dim.as_str()) {
            return Err(FrameError::config("time and depth dimensions must differ"));
        }

        if self.variables.is_empty() {
            return Err(FrameError::config("at least one variable is required"));
        }

        for (i, var) in self.variables.iter().enumerate() {
            if var.is_empty() {
                return Err(FrameError::config("variable names must not be empty"));
            }
            if self.variables[..i].contains(var) {
                return Err(FrameError::DuplicateVariable(var.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FrameConfig::default();
        assert_eq!(config.time_dim, "time");
        assert_eq!(config.depth_dim.as_deref(), Some("depth"));
        // no variables yet
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml() {
        let yaml = r#"
depth_dim: null
variables: [thetao, so]
bbox_id: 7
"#;
        let config = FrameConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.time_dim, "time");
        assert_eq!(config.depth_dim, None);
        assert_eq!(config.variables, vec!["thetao", "so"]);
        assert_eq!(config.bbox_id, Some(7));
        config.validate().unwrap();
    }

    #[test]
    fn test_bad_yaml() {
        let err = FrameConfig::from_yaml_str("variables: 3").unwrap_err();
        assert!(matches!(err, FrameError::Config(_)));
    }

    #[test]
    fn test_validate_duplicates() {
        let config = FrameConfig {
            variables: vec!["so".into(), "so".into()],
            ..FrameConfig::default()
        };
        assert!(matches!(config.validate(), Err(FrameError::DuplicateVariable(_))));
    }

    #[test]
    fn test_env_overrides() {
        let _env = test_utils::EnvGuard::set(&[
            ("FRAME_TIME_DIM", "t"),
            ("FRAME_DEPTH_DIM", ""),
            ("FRAME_VARIABLES", "thetao, so,,uo"),
            ("FRAME_BBOX_ID", "x"),
        ]);

        let config = FrameConfig::from_env();
        assert_eq!(config.time_dim, "t");
        assert_eq!(config.depth_dim, None);
        assert_eq!(config.variables, vec!["thetao", "so", "uo"]);
        assert_eq!(config.bbox_id, None);
    }
}
