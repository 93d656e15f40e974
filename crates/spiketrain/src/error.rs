use std::io;

use spike_envs::EnvError;
use spikecode::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("environment error: {0}")]
    Env(#[from] EnvError),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("config file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine a data directory; pass --out")]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, Error>;
