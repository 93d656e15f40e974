//! Dense binary spike tensors.
//!
//! A [`SpikeTensor`] is a `(time, channel)` grid of spike events. Storage is
//! row-major (one row per simulation step), one byte per cell. Cells are only
//! ever written through `bool` setters or validated constructors, so every
//! entry is 0 or 1.

use core::ops::Range;

use crate::error::ConfigError;

/// Added before flooring when laying out regular spike trains so that rates
/// which are exact multiples of `1/T` survive float rounding.
const TRAIN_EPS: f32 = 1.0e-6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpikeTensor {
    time_steps: usize,
    channels: usize,
    data: Vec<u8>,
}

impl SpikeTensor {
    /// A silent tensor of shape `(time_steps, channels)`.
    pub fn zeros(time_steps: usize, channels: usize) -> Self {
        Self {
            time_steps,
            channels,
            data: vec![0; time_steps * channels],
        }
    }

    /// A tensor where every channel fires on every step.
    pub fn ones(time_steps: usize, channels: usize) -> Self {
        Self {
            time_steps,
            channels,
            data: vec![1; time_steps * channels],
        }
    }

    /// Build a tensor from per-step rows.
    ///
    /// Rows must all have the same width and contain only 0 or 1.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, ConfigError> {
        let Some(first) = rows.first() else {
            return Err(ConfigError::ZeroWindow);
        };
        let channels = first.as_ref().len();

        let mut data = Vec::with_capacity(rows.len() * channels);
        for row in rows {
            let row = row.as_ref();
            if row.len() != channels {
                return Err(ConfigError::ChannelMismatch {
                    what: "spike row",
                    expected: channels,
                    actual: row.len(),
                });
            }
            if row.iter().any(|&v| v > 1) {
                return Err(ConfigError::Invalid("spike values must be 0 or 1"));
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            time_steps: rows.len(),
            channels,
            data,
        })
    }

    #[inline]
    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.time_steps, self.channels)
    }

    /// # Panics
    /// Panics if `t` or `channel` is out of bounds.
    #[inline]
    pub fn get(&self, t: usize, channel: usize) -> bool {
        assert!(channel < self.channels, "channel out of bounds");
        self.data[t * self.channels + channel] != 0
    }

    /// # Panics
    /// Panics if `t` or `channel` is out of bounds.
    #[inline]
    pub fn set(&mut self, t: usize, channel: usize, spike: bool) {
        assert!(channel < self.channels, "channel out of bounds");
        self.data[t * self.channels + channel] = u8::from(spike);
    }

    /// Spikes emitted at step `t`, one byte per channel.
    pub fn row(&self, t: usize) -> &[u8] {
        let start = t * self.channels;
        &self.data[start..start + self.channels]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn total_spikes(&self) -> u32 {
        self.data.iter().map(|&v| u32::from(v)).sum()
    }

    /// Spike count per channel, summed over the whole window.
    pub fn channel_counts(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.channels];
        for row in self.data.chunks_exact(self.channels.max(1)) {
            for (c, &v) in counts.iter_mut().zip(row) {
                *c += u32::from(v);
            }
        }
        counts
    }

    /// Spike count of one channel restricted to the time indices in `steps`.
    pub fn count_in(&self, channel: usize, steps: Range<usize>) -> u32 {
        let end = steps.end.min(self.time_steps);
        (steps.start..end)
            .map(|t| u32::from(self.data[t * self.channels + channel]))
            .sum()
    }

    /// Index of the first step at which `channel` fires.
    pub fn first_spike(&self, channel: usize) -> Option<usize> {
        (0..self.time_steps).find(|&t| self.data[t * self.channels + channel] != 0)
    }

    /// Lay out a regular spike train with firing probability `rate` per step.
    ///
    /// Step `t` fires iff `floor((t+1)·rate) > floor(t·rate)`, which yields
    /// `floor(T·rate)` evenly spaced spikes. `rate` is clamped to `[0, 1]`.
    pub(crate) fn write_regular_train(&mut self, channel: usize, rate: f32) {
        let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        if rate <= 0.0 {
            return;
        }
        for t in 0..self.time_steps {
            let before = (t as f32 * rate + TRAIN_EPS).floor();
            let after = ((t + 1) as f32 * rate + TRAIN_EPS).floor();
            if after > before {
                self.set(t, channel, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_rejects_non_binary_values() {
        let err = SpikeTensor::from_rows(&[[0u8, 2]]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("spike values must be 0 or 1"));
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let rows: Vec<Vec<u8>> = vec![vec![0, 1], vec![1]];
        assert!(matches!(
            SpikeTensor::from_rows(&rows),
            Err(ConfigError::ChannelMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn counts_and_first_spike() {
        let s = SpikeTensor::from_rows(&[[0u8, 0], [1, 0], [1, 0], [0, 0]]).unwrap();
        assert_eq!(s.shape(), (4, 2));
        assert_eq!(s.channel_counts(), vec![2, 0]);
        assert_eq!(s.first_spike(0), Some(1));
        assert_eq!(s.first_spike(1), None);
        assert_eq!(s.count_in(0, 2..4), 1);
        assert_eq!(s.total_spikes(), 2);
    }

    #[test]
    fn regular_train_emits_floor_of_rate_times_window() {
        for &(t, rate, expected) in &[(10usize, 1.0f32, 10u32), (10, 0.5, 5), (10, 0.3, 3), (7, 0.0, 0)] {
            let mut s = SpikeTensor::zeros(t, 1);
            s.write_regular_train(0, rate);
            assert_eq!(s.channel_counts()[0], expected, "t={t} rate={rate}");
        }
    }

    #[test]
    fn regular_train_spaces_spikes_evenly() {
        let mut s = SpikeTensor::zeros(4, 1);
        s.write_regular_train(0, 0.5);
        let fired: Vec<bool> = (0..4).map(|t| s.get(t, 0)).collect();
        assert_eq!(fired, vec![false, true, false, true]);
    }
}
