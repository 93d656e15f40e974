use thiserror::Error;

/// Configuration problems detected before (or instead of) running a simulation step.
///
/// Every variant is a caller mistake: an unrecognized strategy key, a zero-length
/// time window, or shapes that do not line up between encoder, network, decoder
/// and environment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown {kind} key {key:?}")]
    UnknownKey { kind: &'static str, key: String },

    #[error("time window must be at least one step")]
    ZeroWindow,

    #[error("spike tensor has {actual} time steps, expected {expected}")]
    WindowMismatch { expected: usize, actual: usize },

    #[error("{what}: expected {expected} channels, got {actual}")]
    ChannelMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("decoder produces {actual} action values, environment expects {expected}")]
    ActionDimMismatch { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

impl ConfigError {
    pub(crate) fn unknown(kind: &'static str, key: &str) -> Self {
        ConfigError::UnknownKey {
            kind,
            key: key.to_string(),
        }
    }
}
