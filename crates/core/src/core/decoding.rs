//! Output decoders: spike tensor -> control action.
//!
//! Every decoder is a pure function of `(spikes, spike_time)`. The tensor must
//! span exactly `spike_time` steps; a zero `spike_time` is a configuration
//! error, never a division by zero.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::spikes::SpikeTensor;

/// Number of equal-width bins used by [`OutputDecoding::Binning`].
pub const BIN_COUNT: usize = 5;

/// Gain applied to the winning channel's rate by [`OutputDecoding::Method1`].
pub const METHOD1_GAIN: f32 = 2.0;

/// Decoded control signal, consumed as-is by the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Action(pub Vec<f32>);

impl Action {
    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[f32]> for Action {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OutputDecoding {
    /// Signed two-channel actuator: `+2·r0` if channel 0 wins, else `-2·r1`.
    Method1,
    /// Per-channel spike rate.
    Rate,
    /// Per-channel index of the first spike (`spike_time` when silent).
    Temporal,
    /// Per-channel rate across the output population.
    Population,
    /// Index of the highest-rate channel.
    Wta,
    /// Per-channel raw spike count.
    Vector,
    /// Recency-weighted mean of per-bin rates.
    Binning,
}

impl OutputDecoding {
    pub const ALL: [OutputDecoding; 7] = [
        OutputDecoding::Method1,
        OutputDecoding::Rate,
        OutputDecoding::Temporal,
        OutputDecoding::Population,
        OutputDecoding::Wta,
        OutputDecoding::Vector,
        OutputDecoding::Binning,
    ];

    pub fn parse(key: &str) -> Result<Self, ConfigError> {
        match key {
            "method1" => Ok(Self::Method1),
            "rate" => Ok(Self::Rate),
            "temporal" => Ok(Self::Temporal),
            "population" => Ok(Self::Population),
            "wta" => Ok(Self::Wta),
            "vector" => Ok(Self::Vector),
            "binning" => Ok(Self::Binning),
            other => Err(ConfigError::unknown("output decoding", other)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Method1 => "method1",
            Self::Rate => "rate",
            Self::Temporal => "temporal",
            Self::Population => "population",
            Self::Wta => "wta",
            Self::Vector => "vector",
            Self::Binning => "binning",
        }
    }

    /// Output channels the network must expose to drive an actuator of
    /// `action_dim` values.
    ///
    /// `rate` and `temporal` read a sign-split pair and `method1`/`wta` a
    /// two-way choice, so all four are fixed at 2. The remaining decoders
    /// emit one value per actuator dimension.
    pub fn output_channels(self, action_dim: usize) -> usize {
        match self {
            Self::Method1 | Self::Wta | Self::Rate | Self::Temporal => 2,
            Self::Population | Self::Vector | Self::Binning => action_dim,
        }
    }

    /// Length of the decoded action for a tensor with `channels` channels.
    pub fn action_len(self, channels: usize) -> usize {
        match self {
            Self::Method1 | Self::Wta => 1,
            Self::Rate | Self::Temporal | Self::Population | Self::Vector | Self::Binning => {
                channels
            }
        }
    }

    pub fn decode(self, spikes: &SpikeTensor, spike_time: usize) -> Result<Action, ConfigError> {
        if spike_time == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if spikes.time_steps() != spike_time {
            return Err(ConfigError::WindowMismatch {
                expected: spike_time,
                actual: spikes.time_steps(),
            });
        }

        let values = match self {
            Self::Method1 => method1(spikes, spike_time)?,
            Self::Wta if spikes.channels() == 0 => {
                return Err(ConfigError::ChannelMismatch {
                    what: "wta decoder",
                    expected: 1,
                    actual: 0,
                })
            }
            Self::Rate | Self::Population => rates(spikes, spike_time),
            Self::Temporal => first_spike_times(spikes, spike_time),
            Self::Wta => vec![argmax_first(&rates(spikes, spike_time)) as f32],
            Self::Vector => spikes.channel_counts().into_iter().map(|c| c as f32).collect(),
            Self::Binning => binned_rates(spikes),
        };
        Ok(Action(values))
    }
}

impl core::fmt::Display for OutputDecoding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OutputDecoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn rates(spikes: &SpikeTensor, spike_time: usize) -> Vec<f32> {
    let t = spike_time as f32;
    spikes
        .channel_counts()
        .into_iter()
        .map(|c| c as f32 / t)
        .collect()
}

fn method1(spikes: &SpikeTensor, spike_time: usize) -> Result<Vec<f32>, ConfigError> {
    if spikes.channels() != 2 {
        return Err(ConfigError::ChannelMismatch {
            what: "method1 decoder",
            expected: 2,
            actual: spikes.channels(),
        });
    }
    let r = rates(spikes, spike_time);
    // Strict comparison: a tie goes to channel 1.
    let act = if r[0] > r[1] {
        METHOD1_GAIN * r[0]
    } else {
        -METHOD1_GAIN * r[1]
    };
    Ok(vec![act])
}

/// First spike index per channel; silent channels decode to `spike_time`.
fn first_spike_times(spikes: &SpikeTensor, spike_time: usize) -> Vec<f32> {
    (0..spikes.channels())
        .map(|c| spikes.first_spike(c).unwrap_or(spike_time) as f32)
        .collect()
}

/// Index of the maximum; the first occurrence wins ties.
fn argmax_first(v: &[f32]) -> usize {
    let mut best_i = 0usize;
    let mut best = f32::NEG_INFINITY;
    for (i, &x) in v.iter().enumerate() {
        if x > best {
            best = x;
            best_i = i;
        }
    }
    best_i
}

/// Half-open step range covered by bin `b` of a `window`-step tensor.
pub fn bin_bounds(b: usize, window: usize) -> core::ops::Range<usize> {
    (b * window / BIN_COUNT)..((b + 1) * window / BIN_COUNT)
}

/// Spike count per bin for one channel.
pub fn bin_counts(spikes: &SpikeTensor, channel: usize) -> [u32; BIN_COUNT] {
    let window = spikes.time_steps();
    core::array::from_fn(|b| spikes.count_in(channel, bin_bounds(b, window)))
}

fn binned_rates(spikes: &SpikeTensor) -> Vec<f32> {
    let window = spikes.time_steps();
    (0..spikes.channels())
        .map(|c| {
            let counts = bin_counts(spikes, c);
            let mut acc = 0.0f32;
            let mut weight_sum = 0.0f32;
            for (b, &count) in counts.iter().enumerate() {
                let width = bin_bounds(b, window).len();
                if width == 0 {
                    continue;
                }
                let w = (b + 1) as f32;
                acc += w * count as f32 / width as f32;
                weight_sum += w;
            }
            if weight_sum > 0.0 {
                acc / weight_sum
            } else {
                0.0
            }
        })
        .collect()
}
