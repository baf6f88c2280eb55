use crate::cli::Args;
use crate::error::{DashboardError, Result};
use crate::types::NumericColumn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for a dashboard run. Every field has a default so a config file
/// only needs the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Pre-cleaned crop production CSV.
    pub data_path: PathBuf,
    /// State to keep, compared case-insensitively.
    pub state: String,
    /// Size of the district list and of every top-N view.
    pub top_k: usize,
    /// Numeric column whose per-district mean orders the district list.
    pub rank_by: String,
    /// Initial year range, clamped into the data's bounds.
    pub default_years: [i32; 2],
    pub log_scale: bool,
    /// Where exports go. Nothing is written when unset.
    pub out_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("processed_data.csv"),
            state: "tamil nadu".to_string(),
            top_k: 10,
            rank_by: "Production".to_string(),
            default_years: [2000, 2015],
            log_scale: true,
            out_dir: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: DashboardConfig =
            toml::from_str(s).map_err(|e| DashboardError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&s)
    }

    /// File (if any) first, then command-line flags on top.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(p) = &args.data {
            self.data_path = p.clone();
        }
        if let Some(s) = &args.state {
            self.state = s.clone();
        }
        if let Some(k) = args.top_k {
            self.top_k = k;
        }
        if let Some(from) = args.from {
            self.default_years[0] = from;
        }
        if let Some(to) = args.to {
            self.default_years[1] = to;
        }
        if args.no_log_scale {
            self.log_scale = false;
        }
        if let Some(dir) = &args.out_dir {
            self.out_dir = Some(dir.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(DashboardError::Config("top_k must be at least 1".into()));
        }
        if self.state.trim().is_empty() {
            return Err(DashboardError::Config("state must not be empty".into()));
        }
        self.rank_by.parse::<NumericColumn>()?;
        let [lo, hi] = self.default_years;
        if lo > hi {
            return Err(DashboardError::Config(format!(
                "default_years {lo}-{hi} is reversed"
            )));
        }
        Ok(())
    }

    pub fn default_years(&self) -> (i32, i32) {
        (self.default_years[0], self.default_years[1])
    }
}
