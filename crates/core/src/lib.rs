//! # spikecode
//!
//! Spike coding for spiking-network controllers: encoders that turn a
//! continuous observation into a binary `(time, channel)` spike tensor, and
//! decoders that turn the network's output spikes back into an action.
//!
//! ## Quick Start
//!
//! ```
//! use spikecode::prelude::*;
//!
//! // Rate-code a fully positive signal over a 10-step window.
//! let spikes = ObservationEncoding::Rate.encode(1.0, 10).unwrap();
//! assert_eq!(spikes.channel_counts(), vec![10, 0]);
//!
//! // Two equally active output channels tie, so method1 takes channel 1.
//! let out = SpikeTensor::ones(10, 2);
//! let action = OutputDecoding::Method1.decode(&out, 10).unwrap();
//! assert_eq!(action.values(), &[-2.0]);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): serialization of configuration types
//!
//! ## Modules
//!
//! - [`spikes`]: the spike tensor
//! - [`encoding`]: observation encoders
//! - [`decoding`]: output decoders
//! - [`reward`]: reward shaping policies
//! - [`sweep`]: experiment sweep generation
//! - [`network`]: network contract and a reference LIF network

#[path = "core/error.rs"]
pub mod error;

#[path = "core/spikes.rs"]
pub mod spikes;

#[path = "core/encoding.rs"]
pub mod encoding;

#[path = "core/decoding.rs"]
pub mod decoding;

#[path = "core/reward.rs"]
pub mod reward;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/sweep.rs"]
pub mod sweep;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/storage.rs"]
pub mod storage;

#[path = "core/network.rs"]
pub mod network;

pub use error::ConfigError;

/// Prelude module for convenient imports.
///
/// ```
/// use spikecode::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::RunConfig;
    pub use crate::decoding::{Action, OutputDecoding};
    pub use crate::encoding::ObservationEncoding;
    pub use crate::error::ConfigError;
    pub use crate::network::{Forward, LifConfig, LifNetwork, SpikingNetwork};
    pub use crate::reward::{RewardRange, RewardShape};
    pub use crate::spikes::SpikeTensor;
    pub use crate::sweep::{generate, SweepConfig};
}
