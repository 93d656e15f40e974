//! Training phase of one run.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use spike_envs::pendulum::{normalized_angle, Pendulum, PendulumParams};
use spike_envs::stats::EpisodeStats;
use spike_envs::Environment;
use spikecode::prelude::*;
use tracing::{debug, info};

use crate::env::EncodedEnv;
use crate::error::{Error, Result};
use crate::metrics::ScalarWriter;
use crate::paths::RunPaths;

/// Episodes between progress lines.
const PROGRESS_EVERY: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub steps: usize,
    pub episodes: u32,
    pub best_return: Option<f32>,
    pub recent_mean: Option<f32>,
    pub model_path: PathBuf,
    pub scalar_path: PathBuf,
}

/// Pendulum instance for a run.
pub fn pendulum_for(cfg: &RunConfig, seed: u64) -> Pendulum {
    let params = PendulumParams {
        gravity: cfg.gravity,
        max_episode_steps: cfg.episode_length,
        ..PendulumParams::default()
    };
    Pendulum::new(params, seed)
}

/// Reject a network/codec/environment combination that cannot run.
pub fn check_compatible<N: SpikingNetwork>(
    cfg: &RunConfig,
    net: &N,
    action_dim: usize,
) -> std::result::Result<(), ConfigError> {
    cfg.validate()?;

    if net.spike_time() != cfg.time_steps_per_action {
        return Err(ConfigError::WindowMismatch {
            expected: cfg.time_steps_per_action,
            actual: net.spike_time(),
        });
    }

    let enc_channels = cfg.observation_encoding.channels();
    if net.input_channels() != enc_channels {
        return Err(ConfigError::ChannelMismatch {
            what: "network input",
            expected: enc_channels,
            actual: net.input_channels(),
        });
    }

    let dec_channels = cfg.output_decoding.output_channels(action_dim);
    if net.output_channels() != dec_channels {
        return Err(ConfigError::ChannelMismatch {
            what: "network output",
            expected: dec_channels,
            actual: net.output_channels(),
        });
    }

    // Wider actions are reduced to their leading values by `EncodedEnv`.
    let width = cfg.output_decoding.action_len(net.output_channels());
    if width < action_dim {
        return Err(ConfigError::ActionDimMismatch {
            expected: action_dim,
            actual: width,
        });
    }
    Ok(())
}

/// Run `total_steps` control steps, updating `net` with each shaped reward.
///
/// The environment is reset whenever an episode terminates or truncates.
pub fn run_training<E: Environment, N: SpikingNetwork>(
    cfg: &RunConfig,
    env: &mut EncodedEnv<E>,
    net: &mut N,
    log: &mut ScalarWriter,
    total_steps: usize,
) -> Result<EpisodeStats> {
    check_compatible(cfg, net, env.action_dim())?;

    let mut stats = EpisodeStats::default();
    let mut obs = env.reset()?;

    for step in 0..total_steps {
        let out = net.forward(&obs)?;
        let action = cfg.output_decoding.decode(&out.spikes, net.spike_time())?;
        let s = env.step(&action)?;

        net.update(s.reward);
        log.add_scalar("reward", step as u64, s.reward)?;
        stats.record_step(s.raw_reward);

        if cfg.render_train {
            println!("{}", env.render());
        }

        obs = if s.done {
            let ret = stats.finish_episode();
            log.add_scalar("episode_return", u64::from(stats.episodes), ret)?;
            if stats.episodes % PROGRESS_EVERY == 0 {
                info!(
                    episode = stats.episodes,
                    ret,
                    recent_mean = stats.recent_mean().unwrap_or(ret),
                    "training progress"
                );
            } else {
                debug!(episode = stats.episodes, ret, "episode finished");
            }
            env.reset()?
        } else {
            s.observation
        };
    }

    Ok(stats)
}

/// Write the network image to `path`, replacing any previous file.
pub fn save_model<N: SpikingNetwork>(net: &N, path: &Path) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    net.save_state_to(&mut w)?;
    w.flush()?;
    Ok(())
}

/// Train `net` for the run's step budget and write it to `model_path`.
///
/// The scalar log is flushed and closed whether or not training succeeds.
pub fn train_with<E: Environment, N: SpikingNetwork>(
    cfg: &RunConfig,
    env: &mut EncodedEnv<E>,
    net: &mut N,
    model_path: &Path,
    run_dir: &Path,
) -> Result<(EpisodeStats, PathBuf)> {
    check_compatible(cfg, net, env.action_dim())?;

    let total_steps = cfg.total_train_steps();
    info!(run = %cfg.label(), total_steps, "training started");

    let mut log = ScalarWriter::create(run_dir)?;
    let trained = run_training(cfg, env, net, &mut log, total_steps)
        .and_then(|stats| save_model(&*net, model_path).map(|()| stats));

    let scalar_path = log.path().to_path_buf();
    let closed = log.close();
    let stats = trained?;
    closed?;
    Ok((stats, scalar_path))
}

/// Train a fresh reference network on the pendulum and persist it.
pub fn train(cfg: &RunConfig, paths: &RunPaths, run_dir: &Path) -> Result<TrainReport> {
    cfg.validate()?;

    let mut env = EncodedEnv::new(pendulum_for(cfg, cfg.seed), normalized_angle, cfg)?;
    let model_path = paths.model_file();
    let trained = LifNetwork::new(cfg.lif_config(env.action_dim()))
        .map_err(Error::from)
        .and_then(|mut net| train_with(cfg, &mut env, &mut net, &model_path, run_dir));
    env.close();
    let (stats, scalar_path) = trained?;

    info!(
        run = %cfg.label(),
        episodes = stats.episodes,
        model = %model_path.display(),
        "training finished"
    );

    Ok(TrainReport {
        steps: cfg.total_train_steps(),
        episodes: stats.episodes,
        best_return: stats.best_return,
        recent_mean: stats.recent_mean(),
        model_path,
        scalar_path,
    })
}
