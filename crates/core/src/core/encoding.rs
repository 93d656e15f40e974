//! Observation encoders: scalar signal -> spike tensor.
//!
//! All encoders take a signal already projected into `[-1, 1]`; values outside
//! are clamped, `NaN` is treated as a silent input. Output shape is always
//! `(window, channels())` and every call is independent of the previous ones.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::spikes::SpikeTensor;

/// Tuning-curve centers used by population coding.
pub const POPULATION_CENTERS: [f32; 3] = [-1.0, 0.0, 1.0];

/// Width of each population tuning curve (half the spacing between centers).
pub const POPULATION_SIGMA: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ObservationEncoding {
    /// Sign-split firing rate: channel 0 for positive signal, channel 1 for negative.
    Rate,
    /// Gaussian receptive fields centered at -1, 0 and +1.
    Population,
    /// Sign-split single spike whose latency shrinks as |signal| grows.
    Temporal,
}

impl ObservationEncoding {
    pub const ALL: [ObservationEncoding; 3] = [
        ObservationEncoding::Rate,
        ObservationEncoding::Population,
        ObservationEncoding::Temporal,
    ];

    pub fn parse(key: &str) -> Result<Self, ConfigError> {
        match key {
            "rate" => Ok(Self::Rate),
            "population" => Ok(Self::Population),
            "temporal" => Ok(Self::Temporal),
            other => Err(ConfigError::unknown("observation encoding", other)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rate => "rate",
            Self::Population => "population",
            Self::Temporal => "temporal",
        }
    }

    /// Number of input channels the network must expose for this encoding.
    pub fn channels(self) -> usize {
        match self {
            Self::Rate | Self::Temporal => 2,
            Self::Population => POPULATION_CENTERS.len(),
        }
    }

    /// Encode one signal over a window of `window` simulation steps.
    pub fn encode(self, signal: f32, window: usize) -> Result<SpikeTensor, ConfigError> {
        if window == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        let x = sanitize(signal);
        let mut spikes = SpikeTensor::zeros(window, self.channels());

        match self {
            Self::Rate => {
                spikes.write_regular_train(0, x.max(0.0));
                spikes.write_regular_train(1, (-x).max(0.0));
            }
            Self::Population => {
                for (k, rate) in population_rates(x).into_iter().enumerate() {
                    spikes.write_regular_train(k, rate);
                }
            }
            Self::Temporal => {
                if let Some((channel, t)) = temporal_latency(x, window) {
                    spikes.set(t, channel, true);
                }
            }
        }

        Ok(spikes)
    }
}

impl core::fmt::Display for ObservationEncoding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ObservationEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn sanitize(signal: f32) -> f32 {
    if signal.is_nan() {
        0.0
    } else {
        signal.clamp(-1.0, 1.0)
    }
}

/// Firing rate of each population channel for a (clamped) signal.
pub fn population_rates(x: f32) -> [f32; 3] {
    let x = sanitize(x);
    let inv_2s2 = 1.0 / (2.0 * POPULATION_SIGMA * POPULATION_SIGMA);
    POPULATION_CENTERS.map(|c| {
        let d = x - c;
        (-d * d * inv_2s2).exp()
    })
}

/// Channel and step of the single temporal-code spike, or `None` for a zero signal.
fn temporal_latency(x: f32, window: usize) -> Option<(usize, usize)> {
    let mag = x.abs();
    if mag <= 0.0 {
        return None;
    }
    let channel = if x > 0.0 { 0 } else { 1 };
    let last = (window - 1) as f32;
    let t = ((1.0 - mag) * last).round() as usize;
    Some((channel, t.min(window - 1)))
}
