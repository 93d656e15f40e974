//! Network collaborator contract and a reference leaky integrate-and-fire model.
//!
//! The codec only needs [`SpikingNetwork`]: something that turns an input
//! spike tensor into an output spike tensor over the same window and accepts a
//! scalar reward. [`LifNetwork`] is a small two-layer implementation of that
//! contract:
//!
//! - input -> hidden -> output, dense weights, reset-by-subtraction LIF units
//! - low-pass presynaptic traces feed eligibility traces on every post spike
//! - `update(reward)` commits `lr * reward * eligibility` and decays eligibility
//!
//! Membrane potentials and presynaptic traces are reset at the start of every
//! forward pass, so a forward pass is a function of (input, weights).

use std::io::{self, Read, Write};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::prng::Prng;
use crate::spikes::SpikeTensor;
use crate::storage;

/// Output of one forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Forward {
    /// Output spikes, shape `(spike_time, output_channels)`.
    pub spikes: SpikeTensor,
    /// Output-layer membrane potentials after the last step.
    pub membrane: Vec<f32>,
}

pub trait SpikingNetwork {
    /// Simulation steps per control decision.
    fn spike_time(&self) -> usize;

    fn input_channels(&self) -> usize;

    fn output_channels(&self) -> usize;

    fn forward(&mut self, input: &SpikeTensor) -> Result<Forward, ConfigError>;

    /// Apply a reward-modulated update using the traces gathered so far.
    fn update(&mut self, reward: f32);

    /// Serialize the learnable state.
    fn save_state_to<W: Write>(&self, w: &mut W) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LifConfig {
    pub input_channels: usize,
    pub hidden_units: usize,
    pub output_channels: usize,
    pub spike_time: usize,

    /// Membrane decay per step, in (0, 1).
    pub beta: f32,
    pub threshold: f32,
    /// Constant input current added to every unit each step.
    pub bias: f32,

    pub learning_rate: f32,
    /// Presynaptic trace decay per step, in [0, 1).
    pub trace_decay: f32,
    /// Eligibility decay applied after every update, in [0, 1].
    pub eligibility_decay: f32,
    /// Weights are clamped to `[-weight_clip, weight_clip]`.
    pub weight_clip: f32,

    pub seed: u64,
}

impl Default for LifConfig {
    fn default() -> Self {
        Self {
            input_channels: 2,
            hidden_units: 16,
            output_channels: 2,
            spike_time: 10,
            beta: 0.9,
            threshold: 1.0,
            bias: 0.05,
            learning_rate: 0.01,
            trace_decay: 0.8,
            eligibility_decay: 0.9,
            weight_clip: 2.0,
            seed: 1,
        }
    }
}

impl LifConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spike_time == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.input_channels == 0 || self.output_channels == 0 || self.hidden_units == 0 {
            return Err(ConfigError::Invalid("layer sizes must be non-zero"));
        }
        if !(self.beta > 0.0 && self.beta < 1.0) {
            return Err(ConfigError::Invalid("beta must be in (0, 1)"));
        }
        if !(self.threshold > 0.0) || !self.threshold.is_finite() {
            return Err(ConfigError::Invalid("threshold must be positive"));
        }
        if !(0.0..1.0).contains(&self.trace_decay) {
            return Err(ConfigError::Invalid("trace_decay must be in [0, 1)"));
        }
        if !(0.0..=1.0).contains(&self.eligibility_decay) {
            return Err(ConfigError::Invalid("eligibility_decay must be in [0, 1]"));
        }
        if !self.learning_rate.is_finite() || !self.bias.is_finite() {
            return Err(ConfigError::Invalid("learning_rate and bias must be finite"));
        }
        if !(self.weight_clip > 0.0) {
            return Err(ConfigError::Invalid("weight_clip must be positive"));
        }
        Ok(())
    }
}

/// Dense `fan_in x fan_out` projection with its eligibility trace.
#[derive(Debug, Clone)]
struct Projection {
    fan_out: usize,
    weights: Vec<f32>,
    eligibility: Vec<f32>,
}

impl Projection {
    fn random(fan_in: usize, fan_out: usize, rng: &mut Prng) -> Self {
        // Slightly excitatory on average so binary inputs can drive the layer.
        let scale = 1.5 / (fan_in as f32).sqrt();
        let weights = (0..fan_in * fan_out)
            .map(|_| rng.gen_range_f32(-0.5 * scale, scale))
            .collect();
        Self {
            fan_out,
            weights,
            eligibility: vec![0.0; fan_in * fan_out],
        }
    }

    fn from_weights(fan_in: usize, fan_out: usize, weights: Vec<f32>) -> io::Result<Self> {
        if weights.len() != fan_in * fan_out {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "weight array does not match layer sizes",
            ));
        }
        Ok(Self {
            fan_out,
            weights,
            eligibility: vec![0.0; fan_in * fan_out],
        })
    }

    fn drive(&self, pre: &[u8], bias: f32, out: &mut [f32]) {
        out.fill(bias);
        for (i, &s) in pre.iter().enumerate() {
            if s == 0 {
                continue;
            }
            let row = &self.weights[i * self.fan_out..(i + 1) * self.fan_out];
            for (o, &w) in out.iter_mut().zip(row) {
                *o += w;
            }
        }
    }

    fn accumulate_eligibility(&mut self, pre_trace: &[f32], post: &[u8]) {
        for (j, &s) in post.iter().enumerate() {
            if s == 0 {
                continue;
            }
            for (i, &tr) in pre_trace.iter().enumerate() {
                self.eligibility[i * self.fan_out + j] += tr;
            }
        }
    }

    fn commit(&mut self, scale: f32, clip: f32, decay: f32) {
        for (w, e) in self.weights.iter_mut().zip(self.eligibility.iter_mut()) {
            *w = (*w + scale * *e).clamp(-clip, clip);
            *e *= decay;
        }
    }
}

/// Integrate one step of LIF dynamics; writes spikes into `fired`.
fn integrate(membrane: &mut [f32], current: &[f32], beta: f32, threshold: f32, fired: &mut [u8]) {
    for ((v, &i), s) in membrane.iter_mut().zip(current).zip(fired.iter_mut()) {
        *v = beta * *v + i;
        if *v >= threshold {
            *v -= threshold;
            *s = 1;
        } else {
            *s = 0;
        }
    }
}

fn decay_trace(trace: &mut [f32], spikes: &[u8], decay: f32) {
    for (tr, &s) in trace.iter_mut().zip(spikes) {
        *tr = *tr * decay + f32::from(s);
    }
}

#[derive(Debug, Clone)]
pub struct LifNetwork {
    cfg: LifConfig,
    input_hidden: Projection,
    hidden_output: Projection,
    updates: u64,
}

impl LifNetwork {
    pub fn new(cfg: LifConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        // Initial weights are a pure function of `seed`; the generator is
        // not kept, so images carry only config and weights.
        let mut rng = Prng::new(cfg.seed);
        let input_hidden = Projection::random(cfg.input_channels, cfg.hidden_units, &mut rng);
        let hidden_output = Projection::random(cfg.hidden_units, cfg.output_channels, &mut rng);
        Ok(Self {
            cfg,
            input_hidden,
            hidden_output,
            updates: 0,
        })
    }

    pub fn config(&self) -> &LifConfig {
        &self.cfg
    }

    /// Number of reward updates applied since construction (not persisted).
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn input_hidden_weights(&self) -> &[f32] {
        &self.input_hidden.weights
    }

    pub fn hidden_output_weights(&self) -> &[f32] {
        &self.hidden_output.weights
    }

    pub fn save_state_bytes(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.save_state_to(&mut buf)?;
        Ok(buf)
    }

    /// Load a network image written by [`SpikingNetwork::save_state_to`].
    ///
    /// Unknown chunks are skipped. Eligibility traces start at zero.
    pub fn load_state_from<R: Read>(r: &mut R) -> io::Result<Self> {
        storage::read_header(r)?;

        let mut cfg: Option<LifConfig> = None;
        let mut w_ih: Option<Vec<f32>> = None;
        let mut w_ho: Option<Vec<f32>> = None;

        while let Some((tag, payload)) = storage::read_chunk_lz4(r)? {
            let mut cursor = io::Cursor::new(payload);
            match &tag {
                b"CFG0" => cfg = Some(read_cfg_payload(&mut cursor)?),
                b"W_IH" => w_ih = Some(storage::read_f32_vec(&mut cursor)?),
                b"W_HO" => w_ho = Some(storage::read_f32_vec(&mut cursor)?),
                _ => {}
            }
        }

        let missing = |what: &str| {
            io::Error::new(io::ErrorKind::InvalidData, format!("missing {what} chunk"))
        };
        let cfg = cfg.ok_or_else(|| missing("CFG0"))?;
        cfg.validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

        let input_hidden = Projection::from_weights(
            cfg.input_channels,
            cfg.hidden_units,
            w_ih.ok_or_else(|| missing("W_IH"))?,
        )?;
        let hidden_output = Projection::from_weights(
            cfg.hidden_units,
            cfg.output_channels,
            w_ho.ok_or_else(|| missing("W_HO"))?,
        )?;

        Ok(Self {
            cfg,
            input_hidden,
            hidden_output,
            updates: 0,
        })
    }

    pub fn load_state_bytes(bytes: &[u8]) -> io::Result<Self> {
        Self::load_state_from(&mut io::Cursor::new(bytes))
    }

    fn write_cfg_payload(&self, w: &mut Vec<u8>) -> io::Result<()> {
        let c = &self.cfg;
        for n in [c.input_channels, c.hidden_units, c.output_channels, c.spike_time] {
            let n = u32::try_from(n)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "size too large"))?;
            storage::write_u32_le(w, n)?;
        }
        for v in [
            c.beta,
            c.threshold,
            c.bias,
            c.learning_rate,
            c.trace_decay,
            c.eligibility_decay,
            c.weight_clip,
        ] {
            storage::write_f32_le(w, v)?;
        }
        storage::write_u64_le(w, c.seed)
    }
}

fn read_cfg_payload<R: Read>(r: &mut R) -> io::Result<LifConfig> {
    Ok(LifConfig {
        input_channels: storage::read_u32_le(r)? as usize,
        hidden_units: storage::read_u32_le(r)? as usize,
        output_channels: storage::read_u32_le(r)? as usize,
        spike_time: storage::read_u32_le(r)? as usize,
        beta: storage::read_f32_le(r)?,
        threshold: storage::read_f32_le(r)?,
        bias: storage::read_f32_le(r)?,
        learning_rate: storage::read_f32_le(r)?,
        trace_decay: storage::read_f32_le(r)?,
        eligibility_decay: storage::read_f32_le(r)?,
        weight_clip: storage::read_f32_le(r)?,
        seed: storage::read_u64_le(r)?,
    })
}

impl SpikingNetwork for LifNetwork {
    fn spike_time(&self) -> usize {
        self.cfg.spike_time
    }

    fn input_channels(&self) -> usize {
        self.cfg.input_channels
    }

    fn output_channels(&self) -> usize {
        self.cfg.output_channels
    }

    fn forward(&mut self, input: &SpikeTensor) -> Result<Forward, ConfigError> {
        let c = self.cfg;
        if input.time_steps() != c.spike_time {
            return Err(ConfigError::WindowMismatch {
                expected: c.spike_time,
                actual: input.time_steps(),
            });
        }
        if input.channels() != c.input_channels {
            return Err(ConfigError::ChannelMismatch {
                what: "network input",
                expected: c.input_channels,
                actual: input.channels(),
            });
        }

        let mut v_hidden = vec![0.0f32; c.hidden_units];
        let mut v_out = vec![0.0f32; c.output_channels];
        let mut tr_in = vec![0.0f32; c.input_channels];
        let mut tr_hidden = vec![0.0f32; c.hidden_units];
        let mut current_hidden = vec![0.0f32; c.hidden_units];
        let mut current_out = vec![0.0f32; c.output_channels];
        let mut s_hidden = vec![0u8; c.hidden_units];
        let mut s_out = vec![0u8; c.output_channels];
        let mut out = SpikeTensor::zeros(c.spike_time, c.output_channels);

        for t in 0..c.spike_time {
            let x = input.row(t);
            decay_trace(&mut tr_in, x, c.trace_decay);

            self.input_hidden.drive(x, c.bias, &mut current_hidden);
            integrate(&mut v_hidden, &current_hidden, c.beta, c.threshold, &mut s_hidden);
            self.input_hidden.accumulate_eligibility(&tr_in, &s_hidden);
            decay_trace(&mut tr_hidden, &s_hidden, c.trace_decay);

            self.hidden_output.drive(&s_hidden, c.bias, &mut current_out);
            integrate(&mut v_out, &current_out, c.beta, c.threshold, &mut s_out);
            self.hidden_output.accumulate_eligibility(&tr_hidden, &s_out);

            for (k, &s) in s_out.iter().enumerate() {
                out.set(t, k, s != 0);
            }
        }

        Ok(Forward {
            spikes: out,
            membrane: v_out,
        })
    }

    fn update(&mut self, reward: f32) {
        if !reward.is_finite() {
            return;
        }
        let c = self.cfg;
        let scale = c.learning_rate * reward;
        self.input_hidden
            .commit(scale, c.weight_clip, c.eligibility_decay);
        self.hidden_output
            .commit(scale, c.weight_clip, c.eligibility_decay);
        self.updates = self.updates.wrapping_add(1);
    }

    fn save_state_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        storage::write_header(w)?;

        let mut payload = Vec::new();
        self.write_cfg_payload(&mut payload)?;
        storage::write_chunk_lz4(w, *b"CFG0", &payload)?;

        payload.clear();
        storage::write_f32_slice(&mut payload, &self.input_hidden.weights)?;
        storage::write_chunk_lz4(w, *b"W_IH", &payload)?;

        payload.clear();
        storage::write_f32_slice(&mut payload, &self.hidden_output.weights)?;
        storage::write_chunk_lz4(w, *b"W_HO", &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> LifConfig {
        LifConfig {
            input_channels: 2,
            hidden_units: 8,
            output_channels: 2,
            spike_time: 10,
            seed: 3,
            ..Default::default()
        }
    }

    #[test]
    fn forward_keeps_the_window_and_is_binary() {
        let mut net = LifNetwork::new(small()).unwrap();
        let f = net.forward(&SpikeTensor::ones(10, 2)).unwrap();
        assert_eq!(f.spikes.shape(), (10, 2));
        assert!(f.spikes.as_slice().iter().all(|&v| v <= 1));
        assert_eq!(f.membrane.len(), 2);
    }

    #[test]
    fn forward_rejects_wrong_shapes() {
        let mut net = LifNetwork::new(small()).unwrap();
        assert!(matches!(
            net.forward(&SpikeTensor::zeros(9, 2)),
            Err(ConfigError::WindowMismatch { expected: 10, actual: 9 })
        ));
        assert!(matches!(
            net.forward(&SpikeTensor::zeros(10, 3)),
            Err(ConfigError::ChannelMismatch { expected: 2, actual: 3, .. })
        ));
    }

    #[test]
    fn forward_without_update_is_repeatable() {
        let mut net = LifNetwork::new(small()).unwrap();
        let input = SpikeTensor::ones(10, 2);
        let a = net.forward(&input).unwrap();
        let b = net.forward(&input).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn reward_sign_controls_weight_direction() {
        let cfg = LifConfig {
            bias: 1.5,
            ..small()
        };
        let input = SpikeTensor::ones(10, 2);

        let mut up = LifNetwork::new(cfg).unwrap();
        let before: f32 = up.input_hidden_weights().iter().sum();
        up.forward(&input).unwrap();
        up.update(1.0);
        let after_up: f32 = up.input_hidden_weights().iter().sum();

        let mut down = LifNetwork::new(cfg).unwrap();
        down.forward(&input).unwrap();
        down.update(-1.0);
        let after_down: f32 = down.input_hidden_weights().iter().sum();

        assert!(after_up > before);
        assert!(after_down < before);
        assert_eq!(up.updates(), 1);
    }

    #[test]
    fn non_finite_reward_is_ignored() {
        let mut net = LifNetwork::new(small()).unwrap();
        let before = net.input_hidden_weights().to_vec();
        net.forward(&SpikeTensor::ones(10, 2)).unwrap();
        net.update(f32::NAN);
        assert_eq!(net.input_hidden_weights(), before.as_slice());
        assert_eq!(net.updates(), 0);
    }

    #[test]
    fn state_image_round_trips() {
        let mut net = LifNetwork::new(small()).unwrap();
        net.forward(&SpikeTensor::ones(10, 2)).unwrap();
        net.update(0.5);

        let bytes = net.save_state_bytes().unwrap();
        let mut loaded = LifNetwork::load_state_bytes(&bytes).unwrap();
        assert_eq!(loaded.config(), net.config());
        assert_eq!(loaded.input_hidden_weights(), net.input_hidden_weights());
        assert_eq!(loaded.hidden_output_weights(), net.hidden_output_weights());

        let input = SpikeTensor::ones(10, 2);
        assert_eq!(
            loaded.forward(&input).unwrap().spikes,
            net.forward(&input).unwrap().spikes
        );
    }

    #[test]
    fn image_holds_config_and_weights_only() {
        let net = LifNetwork::new(small()).unwrap();
        let bytes = net.save_state_bytes().unwrap();
        let mut r = io::Cursor::new(bytes);
        storage::read_header(&mut r).unwrap();
        let mut tags = Vec::new();
        while let Some((tag, _)) = storage::read_chunk_lz4(&mut r).unwrap() {
            tags.push(tag);
        }
        assert_eq!(tags, vec![*b"CFG0", *b"W_IH", *b"W_HO"]);
    }

    #[test]
    fn unknown_chunks_are_skipped_on_load() {
        let net = LifNetwork::new(small()).unwrap();
        let mut buf = net.save_state_bytes().unwrap();
        storage::write_chunk_lz4(&mut buf, *b"PRNG", &42u64.to_le_bytes()).unwrap();
        let loaded = LifNetwork::load_state_bytes(&buf).unwrap();
        assert_eq!(loaded.hidden_output_weights(), net.hidden_output_weights());
    }

    #[test]
    fn image_missing_weights_is_invalid() {
        let net = LifNetwork::new(small()).unwrap();
        let mut buf = Vec::new();
        storage::write_header(&mut buf).unwrap();
        let mut payload = Vec::new();
        net.write_cfg_payload(&mut payload).unwrap();
        storage::write_chunk_lz4(&mut buf, *b"CFG0", &payload).unwrap();

        let err = LifNetwork::load_state_bytes(&buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = LifConfig {
            spike_time: 0,
            ..small()
        };
        assert_eq!(LifNetwork::new(cfg).unwrap_err(), ConfigError::ZeroWindow);

        let cfg = LifConfig {
            beta: 1.0,
            ..small()
        };
        assert!(LifNetwork::new(cfg).is_err());
    }
}
