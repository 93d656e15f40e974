//! Spike-coded view of an [`Environment`].
//!
//! Observations are projected to one signed scalar and encoded into a spike
//! tensor; rewards are shaped against the environment's reward range. The
//! raw reward is kept alongside so evaluation can report unshaped returns.
//!
//! A decoded action may be wider than the actuator (the sign-split `rate`
//! and `temporal` decoders always emit two values); the environment is
//! driven by its leading `action_dim` values, the way Gymnasium's pendulum
//! reads `u[0]`.

use spike_envs::Environment;
use spikecode::prelude::*;

use crate::error::Result;

/// Reduces a raw observation to the scalar the encoder sees.
pub type Projection = fn(&[f32]) -> f32;

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedStep {
    pub observation: SpikeTensor,
    pub raw_reward: f32,
    pub reward: f32,
    pub done: bool,
}

pub struct EncodedEnv<E: Environment> {
    env: E,
    project: Projection,
    encoding: ObservationEncoding,
    window: usize,
    shape: RewardShape,
    range: RewardRange,
}

impl<E: Environment> EncodedEnv<E> {
    pub fn new(env: E, project: Projection, cfg: &RunConfig) -> Result<Self> {
        if cfg.time_steps_per_action == 0 {
            return Err(ConfigError::ZeroWindow.into());
        }
        let (min, max) = env.reward_range();
        let range = RewardRange::new(min, max)?;
        Ok(Self {
            env,
            project,
            encoding: cfg.observation_encoding,
            window: cfg.time_steps_per_action,
            shape: cfg.reward_shape,
            range,
        })
    }

    pub fn action_dim(&self) -> usize {
        self.env.action_dim()
    }

    pub fn input_channels(&self) -> usize {
        self.encoding.channels()
    }

    pub fn reward_range(&self) -> RewardRange {
        self.range
    }

    fn encode(&self, observation: &[f32]) -> Result<SpikeTensor> {
        let x = (self.project)(observation);
        Ok(self.encoding.encode(x, self.window)?)
    }

    pub fn reset(&mut self) -> Result<SpikeTensor> {
        let obs = self.env.reset()?;
        self.encode(&obs)
    }

    pub fn step(&mut self, action: &Action) -> Result<EncodedStep> {
        let values = action.values();
        let n = self.env.action_dim().min(values.len());
        let step = self.env.step(&values[..n])?;
        Ok(EncodedStep {
            observation: self.encode(&step.observation)?,
            raw_reward: step.reward,
            reward: self.shape.shape(step.reward, self.range),
            done: step.done(),
        })
    }

    pub fn render(&self) -> String {
        self.env.render()
    }

    pub fn close(&mut self) {
        self.env.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spike_envs::pendulum::{normalized_angle, Pendulum, PendulumParams};

    fn wrapped(shape: RewardShape) -> EncodedEnv<Pendulum> {
        let cfg = RunConfig {
            reward_shape: shape,
            time_steps_per_action: 6,
            ..Default::default()
        };
        EncodedEnv::new(Pendulum::new(PendulumParams::default(), 3), normalized_angle, &cfg)
            .unwrap()
    }

    #[test]
    fn observations_are_spike_tensors() {
        let mut env = wrapped(RewardShape::Shift);
        let obs = env.reset().unwrap();
        assert_eq!(obs.shape(), (6, 2));
        let step = env.step(&Action(vec![0.0])).unwrap();
        assert_eq!(step.observation.shape(), (6, 2));
    }

    #[test]
    fn shaped_reward_is_offset_by_range_midpoint() {
        let mut env = wrapped(RewardShape::Shift);
        env.reset().unwrap();
        let step = env.step(&Action(vec![0.5])).unwrap();
        let mid = env.reward_range().mid();
        assert!((step.reward - (step.raw_reward - mid)).abs() < 1e-5);
    }

    #[test]
    fn wide_action_drives_the_leading_dimension() {
        let mut wide = wrapped(RewardShape::Gauss);
        let mut narrow = wrapped(RewardShape::Gauss);
        wide.reset().unwrap();
        narrow.reset().unwrap();
        let a = wide.step(&Action(vec![0.7, 0.2])).unwrap();
        let b = narrow.step(&Action(vec![0.7])).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn short_action_is_an_env_error() {
        let mut env = wrapped(RewardShape::Gauss);
        env.reset().unwrap();
        assert!(matches!(
            env.step(&Action(vec![])),
            Err(crate::Error::Env(_))
        ));
    }
}
