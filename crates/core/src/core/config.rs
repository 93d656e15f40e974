#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::decoding::OutputDecoding;
use crate::encoding::ObservationEncoding;
use crate::error::ConfigError;
use crate::network::LifConfig;
use crate::reward::RewardShape;

/// One fully specified train + test cycle.
///
/// Built once per sweep combination and only read afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunConfig {
    pub observation_encoding: ObservationEncoding,
    pub output_decoding: OutputDecoding,
    pub reward_shape: RewardShape,

    /// Steps before an episode is truncated.
    pub episode_length: usize,
    pub train_episode_amount: usize,
    pub test_episode_amount: usize,

    /// Simulation steps per control decision (the spike window).
    pub time_steps_per_action: usize,

    /// Gravitational acceleration of the pendulum.
    pub gravity: f32,
    pub render_train: bool,
    pub seed: u64,

    pub hidden_units: usize,
    pub learning_rate: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            observation_encoding: ObservationEncoding::Rate,
            output_decoding: OutputDecoding::Method1,
            reward_shape: RewardShape::Shift,
            episode_length: 200,
            train_episode_amount: 10,
            test_episode_amount: 2,
            time_steps_per_action: 10,
            gravity: 10.0,
            render_train: false,
            seed: 7,
            hidden_units: 16,
            learning_rate: 0.01,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_steps_per_action == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.episode_length == 0 {
            return Err(ConfigError::Invalid("episode_length must be >= 1"));
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid("gravity must be finite"));
        }
        if self.hidden_units == 0 {
            return Err(ConfigError::Invalid("hidden_units must be >= 1"));
        }
        if !self.learning_rate.is_finite() {
            return Err(ConfigError::Invalid("learning_rate must be finite"));
        }
        Ok(())
    }

    /// Total control steps of the training phase.
    pub fn total_train_steps(&self) -> usize {
        self.episode_length.saturating_mul(self.train_episode_amount)
    }

    /// Short human-readable name, e.g. `rate+method1+shift`.
    pub fn label(&self) -> String {
        format!(
            "{}+{}+{}",
            self.observation_encoding, self.output_decoding, self.reward_shape
        )
    }

    /// Network shape implied by the chosen codecs for an actuator of `action_dim` values.
    pub fn lif_config(&self, action_dim: usize) -> LifConfig {
        LifConfig {
            input_channels: self.observation_encoding.channels(),
            hidden_units: self.hidden_units,
            output_channels: self.output_decoding.output_channels(action_dim),
            spike_time: self.time_steps_per_action,
            learning_rate: self.learning_rate,
            seed: self.seed,
            ..LifConfig::default()
        }
    }
}
