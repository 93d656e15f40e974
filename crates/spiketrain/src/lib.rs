//! Sweep trainer: trains and evaluates one spiking controller per
//! encoder/decoder/reward-shape combination on the pendulum task.

pub mod env;
pub mod error;
pub mod eval;
pub mod metrics;
pub mod paths;
pub mod train;

pub use error::{Error, Result};

use spikecode::prelude::*;
use tracing::{error, info};

use crate::eval::TestReport;
use crate::paths::RunPaths;
use crate::train::TrainReport;

/// Outcome of one sweep entry.
#[derive(Debug)]
pub struct RunOutcome {
    pub label: String,
    pub result: Result<(TrainReport, TestReport)>,
}

impl RunOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Train then evaluate one configuration.
pub fn run_one(index: usize, cfg: &RunConfig, paths: &RunPaths) -> Result<(TrainReport, TestReport)> {
    let run_dir = paths.run_dir(index, &cfg.label());
    let trained = train::train(cfg, paths, &run_dir)?;
    let tested = eval::test(cfg, &trained.model_path)?;
    Ok((trained, tested))
}

/// Expand the sweep and run every configuration in order.
///
/// Unknown keys or an invalid base fail the whole sweep up front; a run that
/// fails afterwards is logged and the sweep moves on.
pub fn run_sweep(sweep: &SweepConfig, paths: &RunPaths) -> Result<Vec<RunOutcome>> {
    let runs = sweep.runs()?;
    info!(runs = runs.len(), out = %paths.out_dir().display(), "sweep started");

    let mut outcomes = Vec::with_capacity(runs.len());
    for (i, cfg) in runs.iter().enumerate() {
        let label = cfg.label();
        info!(index = i, run = %label, "training combination");

        let result = run_one(i, cfg, paths);
        match &result {
            Ok((_, tested)) => info!(run = %label, mean_return = tested.mean_return, "run complete"),
            Err(e) => error!(run = %label, error = %e, "run failed; continuing"),
        }
        outcomes.push(RunOutcome { label, result });
    }

    Ok(outcomes)
}
