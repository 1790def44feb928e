//! CLI entrypoint for council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use council_application::{
    CompositeNotifier, ConveneRequest, CouncilOrchestrator, DecideRequest, Notifier,
    SummonRequest,
};
use council_domain::{ParticipantId, SessionId};
use council_infrastructure::{
    ConfigIssue, ConfigLoader, FileConfig, FileLoggingConfig, FileOutputFormat,
    JsonlEventNotifier, MarkdownScribe, TracingNotifier, build_registry,
};
use council_presentation::{Cli, ConsoleFormatter, OutputFormat};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_ref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    let config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_logging(&cli, &config.logging);

    let issues = config.validate();
    for issue in &issues {
        eprintln!("{}", issue);
    }
    if issues.iter().any(ConfigIssue::is_error) {
        bail!("Configuration has errors; see above");
    }

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    info!("Starting council");

    // === Dependency Injection ===
    let council = build_council(&config);

    let topic = cli.topic.clone().context("A topic is required")?;
    let request = ConveneRequest::new(
        cli.title.clone().unwrap_or_else(|| topic.clone()),
        topic,
        config.participants.iter().map(|p| p.to_spec()).collect(),
    )
    .with_agenda(cli.agenda.clone());
    let id = council.convene(request).await?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; adjourning");
                cancel.cancel();
            }
        });
    }

    let mut printer = TranscriptPrinter::new(cli.quiet);
    let run = run_session(&council, &id, &cli, &cancel, &mut printer).await;
    if let Err(e) = &run {
        eprintln!("Session stopped: {:#}", e);
    }

    // Adjourn whatever happened above, unless the session never started
    let status = council.status(&id).await?;
    if let Some(vote) = status.active_vote {
        council.close_vote(&id, &vote.id, true).await?;
    }
    if status.stage.is_active() {
        let outcome = council.adjourn(&id, cli.closing.as_deref()).await?;
        printer.flush(&council, &id).await?;
        if let Some(location) = &outcome.record.location {
            info!(location = %location, "Minutes recorded");
        }

        let snapshot = council.snapshot(&id).await?;
        let output = match output_format(&cli, &config) {
            OutputFormat::Text => ConsoleFormatter::format(&snapshot),
            OutputFormat::Json => ConsoleFormatter::format_json(&snapshot),
            OutputFormat::Summary => ConsoleFormatter::format_summary(&outcome.summary),
        };
        println!("{}", output);
    }

    run
}

/// Initialise tracing: stderr at the `-v` level (or `RUST_LOG`), plus a
/// daily-rotated file when `[logging] dir` is set.
fn init_logging(cli: &Cli, logging: &FileLoggingConfig) -> Option<WorkerGuard> {
    let filter = if cli.verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()))
    } else {
        EnvFilter::new(cli.log_level())
    };

    let (file_layer, guard) = match &logging.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "council.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

fn build_council(config: &FileConfig) -> CouncilOrchestrator {
    let (params, _) = config.engine.to_engine_params();
    let responders = Arc::new(build_registry(config));

    let mut notifier = CompositeNotifier::new(vec![Arc::new(TracingNotifier) as Arc<dyn Notifier>]);
    if let Some(path) = &config.logging.events_file {
        match JsonlEventNotifier::new(path) {
            Some(jsonl) => notifier.push(Arc::new(jsonl)),
            None => warn!(path = %path, "Event log disabled"),
        }
    }

    let mut council =
        CouncilOrchestrator::new(responders, params).with_notifier(Arc::new(notifier));
    if let Some(dir) = &config.logging.minutes_dir {
        council = council.with_scribe(Arc::new(MarkdownScribe::new(dir)));
    }
    council
}

fn output_format(cli: &Cli, config: &FileConfig) -> OutputFormat {
    cli.output.unwrap_or(match config.output.format {
        Some(FileOutputFormat::Json) => OutputFormat::Json,
        Some(FileOutputFormat::Summary) => OutputFormat::Summary,
        Some(FileOutputFormat::Text) | None => OutputFormat::Text,
    })
}

/// Drive one session as the Chair: start, summon, turns, vote, decide.
async fn run_session(
    council: &CouncilOrchestrator,
    id: &SessionId,
    cli: &Cli,
    cancel: &CancellationToken,
    printer: &mut TranscriptPrinter,
) -> Result<()> {
    let first = cli.first.as_deref().map(ParticipantId::new);
    let directive = council
        .start(id, cli.opening.as_deref(), first.as_ref())
        .await?;
    printer.flush(council, id).await?;
    info!(opener = %directive.next_speaker, "Session started");

    if let Some(newcomer) = &cli.summon {
        let question = cli
            .summon_question
            .clone()
            .or_else(|| cli.topic.clone())
            .unwrap_or_default();
        let request = SummonRequest::new(newcomer.as_str(), "requested by the Chair", question);
        let Some(result) = cancellable(cancel, council.summon(id, request)).await else {
            return Ok(());
        };
        result?;
        printer.flush(council, id).await?;
    }

    for _ in 0..cli.turns {
        let Some(result) = cancellable(cancel, council.next(id)).await else {
            return Ok(());
        };
        let directive = result?;
        printer.flush(council, id).await?;
        printer.directive(&ConsoleFormatter::format_directive(&directive));
    }

    if let Some(question) = &cli.vote {
        let vote = council.call_vote(id, question, cli.options.clone()).await?;
        printer.flush(council, id).await?;

        let Some(report) = cancellable(cancel, council.poll_vote(id, &vote)).await else {
            return Ok(());
        };
        let report = report?;
        for (participant, reason) in &report.failed {
            warn!(participant = %participant, reason = %reason, "No vote recorded");
        }
        let tally = council.close_vote(id, &vote, report.is_incomplete()).await?;
        printer.flush(council, id).await?;
        printer.directive(&ConsoleFormatter::format_tally(&tally));
    }

    if let Some(text) = &cli.decide {
        council.decide(id, DecideRequest::new(text.as_str())).await?;
        printer.flush(council, id).await?;
    }

    Ok(())
}

/// Await `operation` unless Ctrl-C arrives first
async fn cancellable<T>(
    cancel: &CancellationToken,
    operation: impl Future<Output = T>,
) -> Option<T> {
    tokio::select! {
        _ = cancel.cancelled() => None,
        result = operation => Some(result),
    }
}

/// Prints transcript entries as they are appended
struct TranscriptPrinter {
    quiet: bool,
    printed: usize,
}

impl TranscriptPrinter {
    fn new(quiet: bool) -> Self {
        Self { quiet, printed: 0 }
    }

    async fn flush(&mut self, council: &CouncilOrchestrator, id: &SessionId) -> Result<()> {
        let entries = council.transcript(id, self.printed).await?;
        self.printed += entries.len();
        if !self.quiet {
            for entry in &entries {
                eprint!("{}", ConsoleFormatter::format_entry(entry));
            }
        }
        Ok(())
    }

    fn directive(&self, text: &str) {
        if !self.quiet {
            eprint!("{}", text);
        }
    }
}
