//! Experiment sweeps: every (encoding, decoding, reward shape) combination.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::decoding::OutputDecoding;
use crate::encoding::ObservationEncoding;
use crate::error::ConfigError;
use crate::reward::RewardShape;

/// Cartesian product of the three choice lists applied to `base`.
///
/// Order is lexicographic: observation encoding outermost, reward shape
/// innermost. Each run is a copy of `base` with exactly those three fields
/// replaced. No deduplication or compatibility filtering happens here.
pub fn generate(
    observation_encodings: &[ObservationEncoding],
    output_decodings: &[OutputDecoding],
    reward_shapes: &[RewardShape],
    base: &RunConfig,
) -> Vec<RunConfig> {
    let mut runs = Vec::with_capacity(
        observation_encodings.len() * output_decodings.len() * reward_shapes.len(),
    );
    for &observation_encoding in observation_encodings {
        for &output_decoding in output_decodings {
            for &reward_shape in reward_shapes {
                runs.push(RunConfig {
                    observation_encoding,
                    output_decoding,
                    reward_shape,
                    ..base.clone()
                });
            }
        }
    }
    runs
}

/// On-disk sweep description: string keys for the three axes plus the base run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SweepConfig {
    pub observation_encodings: Vec<String>,
    pub output_decodings: Vec<String>,
    pub reward_shapings: Vec<String>,
    pub base: RunConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            observation_encodings: vec!["rate".to_string()],
            output_decodings: vec!["rate".to_string()],
            reward_shapings: vec!["shift".to_string(), "gauss".to_string()],
            base: RunConfig::default(),
        }
    }
}

impl SweepConfig {
    /// Resolve all keys and expand into run configurations.
    ///
    /// Fails on the first unknown key or an invalid base configuration.
    pub fn runs(&self) -> Result<Vec<RunConfig>, ConfigError> {
        self.base.validate()?;
        let obs = parse_all(&self.observation_encodings, ObservationEncoding::parse)?;
        let dec = parse_all(&self.output_decodings, OutputDecoding::parse)?;
        let rew = parse_all(&self.reward_shapings, RewardShape::parse)?;
        Ok(generate(&obs, &dec, &rew, &self.base))
    }
}

fn parse_all<T>(
    keys: &[String],
    parse: impl Fn(&str) -> Result<T, ConfigError>,
) -> Result<Vec<T>, ConfigError> {
    keys.iter().map(|k| parse(k.as_str())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(r: &RunConfig) -> (ObservationEncoding, OutputDecoding, RewardShape) {
        (r.observation_encoding, r.output_decoding, r.reward_shape)
    }

    #[test]
    fn product_is_lexicographic() {
        let base = RunConfig {
            episode_length: 77,
            gravity: 3.5,
            ..Default::default()
        };
        let runs = generate(
            &[ObservationEncoding::Rate],
            &[OutputDecoding::Rate, OutputDecoding::Wta],
            &[RewardShape::Shift, RewardShape::Gauss],
            &base,
        );

        let got: Vec<_> = runs.iter().map(triple).collect();
        assert_eq!(
            got,
            vec![
                (ObservationEncoding::Rate, OutputDecoding::Rate, RewardShape::Shift),
                (ObservationEncoding::Rate, OutputDecoding::Rate, RewardShape::Gauss),
                (ObservationEncoding::Rate, OutputDecoding::Wta, RewardShape::Shift),
                (ObservationEncoding::Rate, OutputDecoding::Wta, RewardShape::Gauss),
            ]
        );

        for run in &runs {
            let restored = RunConfig {
                observation_encoding: base.observation_encoding,
                output_decoding: base.output_decoding,
                reward_shape: base.reward_shape,
                ..run.clone()
            };
            assert_eq!(restored, base);
        }
    }

    #[test]
    fn observation_is_outermost() {
        let runs = generate(
            &[ObservationEncoding::Temporal, ObservationEncoding::Rate],
            &[OutputDecoding::Method1],
            &[RewardShape::Bin, RewardShape::Sigmoid],
            &RunConfig::default(),
        );
        let got: Vec<_> = runs.iter().map(triple).collect();
        assert_eq!(got[0].0, ObservationEncoding::Temporal);
        assert_eq!(got[1], (ObservationEncoding::Temporal, OutputDecoding::Method1, RewardShape::Sigmoid));
        assert_eq!(got[2].0, ObservationEncoding::Rate);
    }

    #[test]
    fn empty_axis_yields_no_runs() {
        let runs = generate(&[], &OutputDecoding::ALL, &RewardShape::ALL, &RunConfig::default());
        assert!(runs.is_empty());
    }

    #[test]
    fn full_grid_has_every_combination() {
        let runs = generate(
            &ObservationEncoding::ALL,
            &OutputDecoding::ALL,
            &RewardShape::ALL,
            &RunConfig::default(),
        );
        assert_eq!(runs.len(), 3 * 7 * 4);
    }

    #[test]
    fn sweep_config_rejects_unknown_keys() {
        let sweep = SweepConfig {
            output_decodings: vec!["rate".into(), "method2".into()],
            ..Default::default()
        };
        assert_eq!(
            sweep.runs(),
            Err(ConfigError::UnknownKey {
                kind: "output decoding",
                key: "method2".into()
            })
        );
    }

    #[test]
    fn default_sweep_expands_to_two_runs() {
        let runs = SweepConfig::default().runs().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].label(), "rate+rate+shift");
        assert_eq!(runs[1].label(), "rate+rate+gauss");
    }
}
