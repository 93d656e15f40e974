//! Inverted pendulum swing-up.
//!
//! Dynamics and reward follow the classic `Pendulum-v1` task:
//! - state `(θ, θ̇)`, `θ = 0` is upright
//! - observation `[cos θ, sin θ, θ̇]`
//! - action: one torque value, clipped to `[-2, 2]`
//! - reward `-(norm(θ)² + 0.1·θ̇² + 0.001·u²)`, in `[-16.27, 0]`
//! - never terminates; truncated after `max_episode_steps`

use core::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{EnvError, Environment, Step};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumParams {
    pub gravity: f32,
    pub mass: f32,
    pub length: f32,
    pub dt: f32,
    pub max_speed: f32,
    pub max_torque: f32,
    pub max_episode_steps: usize,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            gravity: 10.0,
            mass: 1.0,
            length: 1.0,
            dt: 0.05,
            max_speed: 8.0,
            max_torque: 2.0,
            max_episode_steps: 200,
        }
    }
}

impl PendulumParams {
    /// Most negative reward a single step can produce.
    pub fn worst_reward(&self) -> f32 {
        -(PI * PI + 0.1 * self.max_speed * self.max_speed + 0.001 * self.max_torque * self.max_torque)
    }
}

#[derive(Debug, Clone)]
pub struct Pendulum {
    pub params: PendulumParams,
    theta: f32,
    theta_dot: f32,
    last_torque: f32,
    steps: usize,
    closed: bool,
    rng_seed: u64,
}

impl Pendulum {
    pub fn new(params: PendulumParams, seed: u64) -> Self {
        Self {
            params,
            theta: PI,
            theta_dot: 0.0,
            last_torque: 0.0,
            steps: 0,
            closed: false,
            rng_seed: seed,
        }
    }

    /// Current `(θ, θ̇)`.
    pub fn state(&self) -> (f32, f32) {
        (self.theta, self.theta_dot)
    }

    /// Place the pendulum at an exact state (testing and scripted starts).
    pub fn set_state(&mut self, theta: f32, theta_dot: f32) {
        self.theta = theta;
        self.theta_dot = theta_dot;
    }

    fn observation(&self) -> Vec<f32> {
        vec![self.theta.cos(), self.theta.sin(), self.theta_dot]
    }

    fn sample_uniform(&mut self, lo: f32, hi: f32) -> f32 {
        let u = self.rng_next_f32();
        lo + (hi - lo) * u
    }

    fn rng_next_u32(&mut self) -> u32 {
        self.rng_seed = self
            .rng_seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        (self.rng_seed >> 11) as u32
    }

    fn rng_next_f32(&mut self) -> f32 {
        let u = self.rng_next_u32();
        let mantissa = u >> 8; // 24 bits
        (mantissa as f32) / ((1u32 << 24) as f32)
    }
}

/// Wrap an angle into `[-π, π)`.
pub fn angle_normalize(x: f32) -> f32 {
    (x + PI).rem_euclid(2.0 * PI) - PI
}

/// Signed pole angle scaled to `[-1, 1]`, recovered from an observation.
pub fn normalized_angle(observation: &[f32]) -> f32 {
    match observation {
        [cos, sin, ..] => sin.atan2(*cos) / PI,
        _ => 0.0,
    }
}

impl Environment for Pendulum {
    fn observation_dim(&self) -> usize {
        3
    }

    fn action_dim(&self) -> usize {
        1
    }

    fn reward_range(&self) -> (f32, f32) {
        (self.params.worst_reward(), 0.0)
    }

    fn reset(&mut self) -> Result<Vec<f32>, EnvError> {
        if self.closed {
            return Err(EnvError::Closed);
        }
        self.theta = self.sample_uniform(-PI, PI);
        self.theta_dot = self.sample_uniform(-1.0, 1.0);
        self.last_torque = 0.0;
        self.steps = 0;
        Ok(self.observation())
    }

    fn step(&mut self, action: &[f32]) -> Result<Step, EnvError> {
        if self.closed {
            return Err(EnvError::Closed);
        }
        let &[torque] = action else {
            return Err(EnvError::ActionShape {
                expected: 1,
                actual: action.len(),
            });
        };
        if !torque.is_finite() {
            return Err(EnvError::NonFiniteAction);
        }

        let p = self.params;
        let u = torque.clamp(-p.max_torque, p.max_torque);
        let th = angle_normalize(self.theta);
        let cost = th * th + 0.1 * self.theta_dot * self.theta_dot + 0.001 * u * u;

        let accel = 3.0 * p.gravity / (2.0 * p.length) * self.theta.sin()
            + 3.0 / (p.mass * p.length * p.length) * u;
        self.theta_dot = (self.theta_dot + accel * p.dt).clamp(-p.max_speed, p.max_speed);
        self.theta += self.theta_dot * p.dt;
        self.last_torque = u;
        self.steps += 1;

        Ok(Step {
            observation: self.observation(),
            reward: -cost,
            terminated: false,
            truncated: self.steps >= p.max_episode_steps,
        })
    }

    fn render(&self) -> String {
        const WIDTH: usize = 41;
        let a = angle_normalize(self.theta) / PI;
        let col = (((a + 1.0) * 0.5) * (WIDTH - 1) as f32).round() as usize;
        let mut bar = vec![b'.'; WIDTH];
        bar[WIDTH / 2] = b'|';
        bar[col.min(WIDTH - 1)] = b'O';
        format!(
            "[{}] theta={:+.2} omega={:+.2} torque={:+.2}",
            String::from_utf8_lossy(&bar),
            angle_normalize(self.theta),
            self.theta_dot,
            self.last_torque
        )
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
