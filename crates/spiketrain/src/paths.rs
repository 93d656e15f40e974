//! Output locations for models and scalar logs.
//!
//! Default root (when `--out` is not given):
//! - Linux: ~/.local/share/spiketrain/
//! - Windows: %APPDATA%\spiketrain\
//! - MacOS: ~/Library/Application Support/spiketrain/

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Fixed artifact name; every run overwrites it.
pub const MODEL_FILE: &str = "model.snn";

#[derive(Debug, Clone)]
pub struct RunPaths {
    out_dir: PathBuf,
}

impl RunPaths {
    pub fn new(out_dir: Option<PathBuf>) -> Result<Self> {
        let out_dir = match out_dir {
            Some(dir) => dir,
            None => Self::default_dir()?,
        };

        // Ensure directory exists
        fs::create_dir_all(&out_dir)?;

        Ok(Self { out_dir })
    }

    fn default_dir() -> Result<PathBuf> {
        let base = dirs::data_dir().ok_or(Error::NoDataDir)?;
        Ok(base.join("spiketrain"))
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn model_file(&self) -> PathBuf {
        self.out_dir.join(MODEL_FILE)
    }

    /// Per-run log directory, e.g. `runs/000_rate-method1-shift`.
    pub fn run_dir(&self, index: usize, label: &str) -> PathBuf {
        let label = label.replace('+', "-");
        self.out_dir.join("runs").join(format!("{index:03}_{label}"))
    }
}
