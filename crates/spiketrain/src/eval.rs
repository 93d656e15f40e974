//! Evaluation phase: replay the persisted network without learning.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use spike_envs::pendulum::normalized_angle;
use spike_envs::Environment;
use spikecode::prelude::*;
use tracing::info;

use crate::env::EncodedEnv;
use crate::error::Result;
use crate::train::{check_compatible, pendulum_for};

#[derive(Debug, Clone, PartialEq)]
pub struct TestReport {
    /// Unshaped return of each episode.
    pub returns: Vec<f32>,
    pub mean_return: f32,
}

/// Run `episodes` full episodes with a frozen network.
pub fn run_episodes<E: Environment, N: SpikingNetwork>(
    cfg: &RunConfig,
    env: &mut EncodedEnv<E>,
    net: &mut N,
    episodes: usize,
) -> Result<TestReport> {
    check_compatible(cfg, net, env.action_dim())?;

    let mut returns = Vec::with_capacity(episodes);
    for _ in 0..episodes {
        let mut obs = env.reset()?;
        let mut ret = 0.0f32;
        loop {
            let out = net.forward(&obs)?;
            let action = cfg.output_decoding.decode(&out.spikes, net.spike_time())?;
            let s = env.step(&action)?;
            ret += s.raw_reward;
            if s.done {
                break;
            }
            obs = s.observation;
        }
        returns.push(ret);
    }

    let mean_return = if returns.is_empty() {
        0.0
    } else {
        returns.iter().sum::<f32>() / returns.len() as f32
    };
    Ok(TestReport {
        returns,
        mean_return,
    })
}

/// Reload the network from `model_path` and evaluate it on a fresh pendulum.
pub fn test(cfg: &RunConfig, model_path: &Path) -> Result<TestReport> {
    cfg.validate()?;

    let mut reader = BufReader::new(File::open(model_path)?);
    let mut net = LifNetwork::load_state_from(&mut reader)?;

    // Offset seed so evaluation starts differ from training starts.
    let env = pendulum_for(cfg, cfg.seed.wrapping_add(1));
    let mut env = EncodedEnv::new(env, normalized_angle, cfg)?;

    let report = run_episodes(cfg, &mut env, &mut net, cfg.test_episode_amount);
    env.close();
    let report = report?;

    info!(
        run = %cfg.label(),
        episodes = report.returns.len(),
        mean_return = report.mean_return,
        "evaluation finished"
    );
    Ok(report)
}
