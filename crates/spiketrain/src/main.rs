use std::fs;
use std::path::PathBuf;

use spikecode::sweep::SweepConfig;
use spiketrain::paths::RunPaths;
use tracing::{info, warn};

fn print_help() {
    println!(
        "spiketrain\n\n\
Usage:\n  spiketrain [run] [--config PATH] [--out DIR]\n  spiketrain print-config\n  spiketrain help\n\n\
Commands:\n  run           train and evaluate every sweep combination (default)\n  print-config  print the default sweep configuration as JSON\n\n\
Options:\n  --config PATH  sweep configuration (JSON); defaults are used when omitted\n  --out DIR      output directory for model.snn and run logs\n"
    );
}

struct RunArgs {
    config: Option<PathBuf>,
    out: Option<PathBuf>,
}

fn parse_run_args(args: &[String]) -> Result<RunArgs, String> {
    let mut out = RunArgs {
        config: None,
        out: None,
    };
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                let v = args.get(i + 1).ok_or("--config needs a path")?;
                out.config = Some(PathBuf::from(v));
                i += 2;
            }
            "--out" => {
                let v = args.get(i + 1).ok_or("--out needs a directory")?;
                out.out = Some(PathBuf::from(v));
                i += 2;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(out)
}

fn load_sweep(path: Option<&PathBuf>) -> spiketrain::Result<SweepConfig> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(SweepConfig::default()),
    }
}

fn run(args: RunArgs) -> spiketrain::Result<bool> {
    let sweep = load_sweep(args.config.as_ref())?;
    let paths = RunPaths::new(args.out)?;

    let outcomes = spiketrain::run_sweep(&sweep, &paths)?;
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        warn!(failed, total = outcomes.len(), "some runs failed");
    } else {
        info!(total = outcomes.len(), "all runs complete");
    }
    Ok(failed == 0)
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (cmd, rest) = match args.first().map(String::as_str) {
        None => ("run", &args[..]),
        Some(a) if a.starts_with("--") && a != "--help" => ("run", &args[..]),
        Some(a) => (a, &args[1..]),
    };

    match cmd {
        "help" | "-h" | "--help" => print_help(),
        "print-config" => match serde_json::to_string_pretty(&SweepConfig::default()) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        },
        "run" => {
            let run_args = match parse_run_args(rest) {
                Ok(a) => a,
                Err(msg) => {
                    eprintln!("{msg}");
                    print_help();
                    std::process::exit(2);
                }
            };
            match run(run_args) {
                Ok(true) => {}
                Ok(false) => std::process::exit(1),
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
        other => {
            eprintln!("unknown command: {other}");
            print_help();
            std::process::exit(2);
        }
    }
}
