use crate::conf::{ConfigError, TuningConfig};
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Validate a tuning file and exit
    Check {
        /// Path to the tuning file
        #[arg(default_value = "pipewatch.toml")]
        path: PathBuf,
    },

    /// Print the resolved tuning (defaults filled in) as TOML
    Dump {
        /// Path to the tuning file; defaults only when omitted
        path: Option<PathBuf>,
    },
}

pub fn run(cmd: ConfigCmd) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Check { path } => check(&path),
        ConfigCmd::Dump { path } => dump(path.as_deref()),
    }
}

pub fn check(path: &Path) -> anyhow::Result<()> {
    match TuningConfig::from_file(path) {
        Ok(cfg) => {
            println!("✔ Config loaded successfully");
            println!("✔ replay: yield every {} entries", cfg.replay.yield_every);
            println!(
                "✔ live: reconnect={} backoff {}..{}ms",
                cfg.live.reconnect, cfg.live.backoff_initial_ms, cfg.live.backoff_max_ms
            );
            Ok(())
        }
        Err(err) => {
            eprintln!("{err}");
            if let Some(hint) = config_error_hint(&err) {
                eprintln!();
                eprintln!("{hint}");
            }
            std::process::exit(1);
        }
    }
}

pub fn dump(path: Option<&Path>) -> anyhow::Result<()> {
    let cfg = match path {
        Some(path) => TuningConfig::from_file(path)?,
        None => TuningConfig::default(),
    };
    print!("{}", toml::to_string_pretty(&cfg)?);
    Ok(())
}

pub fn config_error_hint(err: &ConfigError) -> Option<&'static str> {
    match err {
        ConfigError::InvalidTuning { .. } => Some(
            "Tuning values must be positive and the backoff range ordered.\n\
             \n\
             Example:\n\
             \n\
             [replay]\n\
             yield_every = 50\n\
             \n\
             [live]\n\
             backoff_initial_ms = 1000\n\
             backoff_max_ms = 10000",
        ),
        ConfigError::Parse { .. } => {
            Some("Known sections are [replay], [live] and [render]; unknown keys are rejected.")
        }
        _ => None,
    }
}
