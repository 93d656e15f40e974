use std::fs;
use std::path::PathBuf;

use spikecode::prelude::*;
use spiketrain::metrics::read_scalars;
use spiketrain::paths::RunPaths;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("spiketrain-it-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn tiny_base() -> RunConfig {
    RunConfig {
        episode_length: 5,
        train_episode_amount: 2,
        test_episode_amount: 1,
        time_steps_per_action: 4,
        hidden_units: 6,
        ..Default::default()
    }
}

#[test]
fn sweep_trains_and_evaluates_every_combination() {
    let dir = scratch("full");
    let paths = RunPaths::new(Some(dir.clone())).unwrap();
    let sweep = SweepConfig {
        observation_encodings: vec!["rate".into(), "population".into()],
        output_decodings: vec!["wta".into(), "binning".into()],
        reward_shapings: vec!["bin".into()],
        base: tiny_base(),
    };

    let outcomes = spiketrain::run_sweep(&sweep, &paths).unwrap();
    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes[0].label, "rate+wta+bin");
    assert_eq!(outcomes[3].label, "population+binning+bin");

    for (i, o) in outcomes.iter().enumerate() {
        let (trained, tested) = o.result.as_ref().unwrap();
        assert_eq!(trained.steps, 10);
        assert_eq!(trained.episodes, 2);
        assert_eq!(tested.returns.len(), 1);

        let scalars = read_scalars(&trained.scalar_path).unwrap();
        assert_eq!(scalars.iter().filter(|r| r.tag == "reward").count(), 10);
        assert!(trained.scalar_path.starts_with(paths.run_dir(i, &o.label)));
    }

    // One artifact, overwritten by each run; the last one must load.
    let bytes = fs::read(paths.model_file()).unwrap();
    let net = LifNetwork::load_state_bytes(&bytes).unwrap();
    assert_eq!(net.input_channels(), ObservationEncoding::Population.channels());
    assert_eq!(net.output_channels(), 1);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unknown_key_fails_the_sweep_up_front() {
    let dir = scratch("unknown");
    let paths = RunPaths::new(Some(dir.clone())).unwrap();
    let sweep = SweepConfig {
        output_decodings: vec!["rate".into(), "softmax".into()],
        base: tiny_base(),
        ..Default::default()
    };

    let err = spiketrain::run_sweep(&sweep, &paths).unwrap_err();
    assert!(matches!(
        err,
        spiketrain::Error::Config(ConfigError::UnknownKey { .. })
    ));
    assert!(!paths.model_file().exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn sweep_file_fills_missing_fields_with_defaults() {
    let json = r#"{
        "observation_encodings": ["temporal"],
        "output_decodings": ["temporal"],
        "reward_shapings": ["sigmoid"],
        "base": { "episode_length": 3, "train_episode_amount": 1 }
    }"#;
    let sweep: SweepConfig = serde_json::from_str(json).unwrap();
    assert_eq!(sweep.base.time_steps_per_action, 10);
    assert_eq!(sweep.base.test_episode_amount, 2);

    let dir = scratch("json");
    let paths = RunPaths::new(Some(dir.clone())).unwrap();
    let outcomes = spiketrain::run_sweep(&sweep, &paths).unwrap();
    assert_eq!(outcomes.len(), 1);
    let (_, tested) = outcomes[0].result.as_ref().unwrap();
    assert_eq!(tested.returns.len(), 2);

    let _ = fs::remove_dir_all(&dir);
}
