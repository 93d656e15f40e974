//! Control environments for spiking-network controllers.
//!
//! Environments speak plain `f32` vectors; spike coding happens elsewhere.

use thiserror::Error;

pub mod pendulum;
pub mod stats;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error("action has {actual} values, expected {expected}")]
    ActionShape { expected: usize, actual: usize },

    #[error("action contains a non-finite value")]
    NonFiniteAction,

    #[error("environment is closed")]
    Closed,
}

/// Result of one environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub observation: Vec<f32>,
    pub reward: f32,
    /// The task reached a terminal state.
    pub terminated: bool,
    /// The episode hit its step limit.
    pub truncated: bool,
}

impl Step {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

pub trait Environment {
    fn observation_dim(&self) -> usize;

    fn action_dim(&self) -> usize;

    /// Inclusive `(min, max)` bounds of the per-step reward.
    fn reward_range(&self) -> (f32, f32);

    /// Start a new episode and return its first observation.
    fn reset(&mut self) -> Result<Vec<f32>, EnvError>;

    fn step(&mut self, action: &[f32]) -> Result<Step, EnvError>;

    /// One-line text frame of the current state.
    fn render(&self) -> String;

    /// Release the environment. Further `reset`/`step` calls fail with [`EnvError::Closed`].
    fn close(&mut self);
}
