use crate::conf::{
    DEFAULT_PAGE_URL, SourceSelection, StartupOptions, StartupOverrides, TuningConfig,
};
use crate::ingest::{
    CancelToken, FeedSource, IngestReport, LiveAdapter, LogRecorder, ReplayAdapter, ReplaySource,
    SeriesModel, Session, drive,
};
use crate::render::{RenderMode, Sink, default_render_mode, make_sink};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use url::Url;

#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Page URL whose query string carries replay, ws, client-ids and player-names
    #[arg(long, default_value = DEFAULT_PAGE_URL)]
    pub page: String,

    /// Replay a complete log from this URL instead of following the live feed
    #[arg(long, conflicts_with = "replay_file")]
    pub replay: Option<String>,

    /// Replay a local JSONL log file
    #[arg(long)]
    pub replay_file: Option<PathBuf>,

    /// Explicit live endpoint (ws:// or wss://)
    #[arg(long)]
    pub ws: Option<String>,

    /// Client id, paired by position with --player-name
    #[arg(long = "client-id")]
    pub client_ids: Vec<String>,

    /// Display name for the client id at the same position
    #[arg(long = "player-name")]
    pub player_names: Vec<String>,

    /// Tuning file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Line-oriented output even on a terminal
    #[arg(long)]
    pub plain: bool,

    /// Write every ingested entry to this JSONL file
    #[arg(long)]
    pub save_log: Option<PathBuf>,

    /// Write final scores per user id as JSON
    #[arg(long)]
    pub save_results: Option<PathBuf>,
}

impl WatchArgs {
    fn overrides(&self) -> StartupOverrides {
        StartupOverrides {
            replay: self.replay.clone(),
            ws: self.ws.clone(),
            client_ids: self.client_ids.clone(),
            player_names: self.player_names.clone(),
        }
    }

    fn render_mode(&self) -> RenderMode {
        if self.plain {
            RenderMode::Plain
        } else {
            default_render_mode()
        }
    }
}

/// Run one watch session and report how it went.
pub async fn run_watch(args: WatchArgs, cancel: CancelToken) -> Result<IngestReport> {
    let tuning = match &args.config {
        Some(path) => TuningConfig::from_file(path)?,
        None => TuningConfig::default(),
    };

    let page = Url::parse(&args.page).with_context(|| format!("invalid page URL {}", args.page))?;
    let mut options = StartupOptions::resolve(&page, &args.overrides())?;
    if let Some(path) = &args.replay_file {
        options.source = SourceSelection::Replay {
            source: ReplaySource::File(path.clone()),
        };
    }

    let sink = make_sink(args.render_mode(), tuning.render.sparkline_width);
    let model = SeriesModel::new(options.names);

    let (model, report) = match options.source {
        SourceSelection::Live { endpoint } => {
            info!(endpoint = %endpoint, "following live log");
            let adapter = LiveAdapter::new(endpoint)
                .with_reconnect(tuning.live.reconnect)
                .with_backoff(tuning.live.backoff_initial(), tuning.live.backoff_max());
            run_session(adapter, model, sink, &args, tuning.replay.queue_capacity, cancel).await?
        }
        SourceSelection::Replay { source } => {
            info!(source = %source, "replaying log");
            let adapter = ReplayAdapter::new(source).with_yield_every(tuning.replay.yield_every);
            run_session(adapter, model, sink, &args, tuning.replay.queue_capacity, cancel).await?
        }
    };

    let results = model.results();
    info!(?results, "results");
    if let Some(path) = &args.save_results {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create results file {}", path.display()))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &results)
            .context("failed to write results")?;
    }

    Ok(report)
}

async fn run_session<A: FeedSource>(
    adapter: A,
    model: SeriesModel,
    sink: Box<dyn Sink>,
    args: &WatchArgs,
    queue_capacity: usize,
    cancel: CancelToken,
) -> Result<(SeriesModel, IngestReport)> {
    let mut session = Session::new(model, sink, adapter.notify_policy());
    if let Some(path) = &args.save_log {
        let recorder = LogRecorder::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        session = session.with_recorder(recorder);
    }

    let report = drive(adapter, &mut session, queue_capacity, cancel).await;
    let (model, _sink) = session.into_parts();
    Ok((model, report))
}
