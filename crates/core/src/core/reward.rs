//! Reward shaping policies.
//!
//! Each policy is a pure, monotonically non-decreasing map over the
//! environment's reward range, so shaping never re-ranks two rewards
//! (`Bin` only merges neighbours into ties).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of quantization levels used by [`RewardShape::Bin`].
pub const REWARD_BINS: usize = 5;

/// Steepness of [`RewardShape::Sigmoid`] in units of the normalized reward.
pub const SIGMOID_GAIN: f32 = 4.0;

/// Known `[min, max]` range of an environment's per-step reward.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RewardRange {
    min: f32,
    max: f32,
}

impl RewardRange {
    pub fn new(min: f32, max: f32) -> Result<Self, ConfigError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ConfigError::Invalid("reward range must be finite"));
        }
        if max <= min {
            return Err(ConfigError::Invalid("reward range max must exceed min"));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn mid(&self) -> f32 {
        0.5 * (self.min + self.max)
    }

    pub fn half_width(&self) -> f32 {
        0.5 * (self.max - self.min)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RewardShape {
    /// Quantize into [`REWARD_BINS`] levels spread over `[-1, 1]`.
    Bin,
    /// Subtract the range midpoint so the reward is centered on zero.
    Shift,
    /// Gaussian bump peaking at the best reward, width a quarter of the range.
    Gauss,
    /// Logistic squash around the range midpoint.
    Sigmoid,
}

impl RewardShape {
    pub const ALL: [RewardShape; 4] = [
        RewardShape::Bin,
        RewardShape::Shift,
        RewardShape::Gauss,
        RewardShape::Sigmoid,
    ];

    pub fn parse(key: &str) -> Result<Self, ConfigError> {
        match key {
            "bin" => Ok(Self::Bin),
            "shift" => Ok(Self::Shift),
            "gauss" => Ok(Self::Gauss),
            "sigmoid" => Ok(Self::Sigmoid),
            other => Err(ConfigError::unknown("reward shape", other)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bin => "bin",
            Self::Shift => "shift",
            Self::Gauss => "gauss",
            Self::Sigmoid => "sigmoid",
        }
    }

    /// Shape one raw reward. `NaN` passes through unchanged.
    pub fn shape(self, reward: f32, range: RewardRange) -> f32 {
        if reward.is_nan() {
            return reward;
        }
        match self {
            Self::Shift => reward - range.mid(),
            Self::Gauss => {
                let sigma = 0.5 * range.half_width();
                let d = reward.min(range.max) - range.max;
                (-d * d / (2.0 * sigma * sigma)).exp()
            }
            Self::Sigmoid => {
                let z = (reward - range.mid()) / range.half_width();
                1.0 / (1.0 + (-SIGMOID_GAIN * z).exp())
            }
            Self::Bin => {
                let t = (reward.clamp(range.min, range.max) - range.min) / (range.max - range.min);
                let b = ((t * REWARD_BINS as f32).floor() as usize).min(REWARD_BINS - 1);
                2.0 * b as f32 / (REWARD_BINS - 1) as f32 - 1.0
            }
        }
    }
}

impl core::fmt::Display for RewardShape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for RewardShape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pendulum() -> RewardRange {
        let worst = core::f32::consts::PI.powi(2) + 0.1 * 8.0f32.powi(2) + 0.001 * 2.0f32.powi(2);
        RewardRange::new(-worst, 0.0).unwrap()
    }

    #[test]
    fn shift_matches_the_classic_pendulum_offset() {
        let r = pendulum();
        let offset = RewardShape::Shift.shape(0.0, r);
        assert!((offset - 8.1368).abs() < 1e-3, "offset={offset}");
        assert!((RewardShape::Shift.shape(-3.0, r) - (offset - 3.0)).abs() < 1e-5);
    }

    #[test]
    fn gauss_and_sigmoid_are_bounded() {
        let r = pendulum();
        assert!((RewardShape::Gauss.shape(0.0, r) - 1.0).abs() < 1e-6);
        assert!((RewardShape::Sigmoid.shape(r.mid(), r) - 0.5).abs() < 1e-6);
        for i in 0..=100 {
            let x = r.min() + (r.max() - r.min()) * i as f32 / 100.0;
            let g = RewardShape::Gauss.shape(x, r);
            let s = RewardShape::Sigmoid.shape(x, r);
            assert!(g > 0.0 && g <= 1.0);
            assert!(s > 0.0 && s <= 1.0);
        }
    }

    #[test]
    fn bin_levels_span_unit_interval() {
        let r = pendulum();
        assert_eq!(RewardShape::Bin.shape(r.min(), r), -1.0);
        assert_eq!(RewardShape::Bin.shape(r.max(), r), 1.0);
        assert_eq!(RewardShape::Bin.shape(r.mid(), r), 0.0);
        assert_eq!(RewardShape::Bin.shape(-100.0, r), -1.0);
    }

    #[test]
    fn every_shape_preserves_order() {
        let r = pendulum();
        for shape in RewardShape::ALL {
            let mut prev = f32::NEG_INFINITY;
            for i in 0..=200 {
                let x = r.min() + (r.max() - r.min()) * i as f32 / 200.0;
                let y = shape.shape(x, r);
                assert!(y >= prev, "{shape} not monotone at {x}");
                prev = y;
            }
        }
    }

    #[test]
    fn degenerate_range_is_rejected() {
        assert!(RewardRange::new(1.0, 1.0).is_err());
        assert!(RewardRange::new(f32::NEG_INFINITY, 0.0).is_err());
    }
}
