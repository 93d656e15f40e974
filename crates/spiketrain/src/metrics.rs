//! Line-delimited JSON scalar log.
//!
//! One record per call: `{"tag":"reward","step":12,"value":-3.2}`.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const SCALAR_FILE: &str = "rewards.jsonl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    pub tag: String,
    pub step: u64,
    pub value: f32,
}

#[derive(Debug)]
pub struct ScalarWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl ScalarWriter {
    /// Create (or truncate) the scalar log inside `dir`.
    pub fn create(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(SCALAR_FILE);
        let out = BufWriter::new(File::create(&path)?);
        Ok(Self { path, out })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn add_scalar(&mut self, tag: &str, step: u64, value: f32) -> io::Result<()> {
        let record = ScalarRecord {
            tag: tag.to_string(),
            step,
            value,
        };
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")
    }

    /// Flush and release the file.
    pub fn close(mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Read every record back from a scalar log.
pub fn read_scalars(path: &Path) -> io::Result<Vec<ScalarRecord>> {
    let text = fs::read_to_string(path)?;
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(io::Error::from))
        .collect()
}
