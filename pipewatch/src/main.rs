use anyhow::Result;
use clap::{Parser, Subcommand};
use pipewatch_core::cli::conf::{self, ConfigCmd};
use pipewatch_core::cli::watch::{WatchArgs, run_watch};
use pipewatch_core::conf::DEFAULT_PAGE_URL;
use pipewatch_core::ingest::{CancelHandle, Outcome};
use pipewatch_core::logging::init_logging;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser, Debug)]
#[command(
    name = "pipewatch",
    version,
    about = "pipewatch: live and replay viewer for the pipes simulation log"
)]
struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow the live log or replay a recorded one (default)
    Watch(WatchArgs),

    /// Tuning file tooling
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Some(Command::Config { cmd }) => conf::run(cmd).map(|()| ExitCode::SUCCESS),

        Some(Command::Watch(args)) => watch(args),

        None => watch(WatchArgs {
            page: DEFAULT_PAGE_URL.to_string(),
            ..Default::default()
        }),
    }
}

fn watch(args: WatchArgs) -> Result<ExitCode> {
    // One cooperative task per session: everything runs on this thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let report = runtime.block_on(async {
        let cancel = CancelHandle::new();
        let on_ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_ctrl_c.cancel();
            }
        });

        run_watch(args, cancel.token()).await
    })?;

    match &report.outcome {
        Outcome::Failed(err) => {
            error!(error = %err, folded = report.folded, "watch failed");
            eprintln!("pipewatch: {err} ({} entries folded)", report.folded);
            Ok(ExitCode::FAILURE)
        }
        Outcome::Truncated(err) => {
            eprintln!("pipewatch: replay truncated: {err}");
            Ok(ExitCode::SUCCESS)
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}
