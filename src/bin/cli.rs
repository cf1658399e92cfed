//! CLI binary for trendwatch.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use trendwatch::chat::RefreshOutcome;
use trendwatch::scheduler::plan;
use trendwatch::{
    AnalysisResult, ApiClient, AppConfig, ChatSession, ClientConfig, DataStore, SchedulePhase,
    ScheduleState, Sender, Session, SessionEvent, SessionHandle, SessionOptions, StatusSummary,
    SystemClock, ThemePreference,
};

/// Trendwatch: keeps a local view of a trending-repository analysis service
/// up to date.
#[derive(Parser)]
#[command(name = "trendwatch", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Follow the service, refreshing on its schedule. Lines typed on stdin
    /// are sent as chat messages; `/refresh`, `/reload` and `/quit` are
    /// handled locally.
    Watch,

    /// Load once and print the scheduling status and latest results.
    Status {
        /// Print the status and schedule as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Send one chat message, then refresh and print the new status.
    Chat {
        /// The instruction to send.
        message: String,
    },

    /// Show or set the theme preference (`light`, `dark` or `system`).
    Theme {
        /// New preference. Omit to print the current one.
        value: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays readable. Override with RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trendwatch=info,trendwatch_api=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(ClientConfig::default_config_path);
    let config = ClientConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => run_watch(config).await,
        Command::Status { json } => run_status(config, json).await,
        Command::Chat { message } => run_chat(config, &message).await,
        Command::Theme { value } => run_theme(config, &config_path, value.as_deref()),
    }
}

async fn run_watch(config: ClientConfig) -> anyhow::Result<()> {
    println!("trendwatch v{}", env!("CARGO_PKG_VERSION"));
    println!("watching {}", config.api.base_url);

    let client = ApiClient::new(config.api.clone())?;
    let (session, handle, mut events) = Session::new(
        client.clone(),
        client,
        SystemClock,
        SessionOptions::from(&config),
    );
    for line in session.transcript() {
        println!("bot> {}", line.text);
    }
    let task = session.spawn();

    // Handle Ctrl+C
    let ctrl_c_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            let _ = ctrl_c_handle.shutdown();
        }
    });

    tokio::spawn(forward_stdin(handle));

    while let Some(event) = events.recv().await {
        let stop = matches!(event, SessionEvent::Stopped);
        print_event(&event);
        if stop {
            break;
        }
    }

    task.await.context("session task panicked")?;
    Ok(())
}

/// Turn stdin lines into session commands. EOF stops the session.
async fn forward_stdin(handle: SessionHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let sent = match line.trim() {
            "" => continue,
            "/refresh" => handle.refresh(),
            "/reload" => handle.reload(),
            "/quit" => break,
            text => handle.send_chat(text),
        };
        if sent.is_err() {
            return;
        }
    }
    let _ = handle.shutdown();
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Loading => println!("loading..."),
        SessionEvent::Loaded { config, results } | SessionEvent::Refreshed { config, results } => {
            print_status(config, results);
        }
        SessionEvent::RefreshFailed { message } => {
            println!("refresh failed, showing last good data: {message}");
        }
        SessionEvent::LoadFailed { message } => {
            println!("could not load data: {message}");
            println!("type /reload to try again");
        }
        SessionEvent::Scheduled(state) => println!("{}", describe_schedule(state)),
        SessionEvent::ChatMessage(message) => match (message.sender, message.is_error) {
            (Sender::User, _) => println!("you> {}", message.text),
            (Sender::Bot, false) => println!("bot> {}", message.text),
            (Sender::Bot, true) => println!("bot! {}", message.text),
        },
        SessionEvent::ChatRejected(reason) => println!("not sent: {reason}"),
        SessionEvent::Stopped => println!("stopped"),
    }
}

fn describe_schedule(state: &ScheduleState) -> String {
    match (&state.phase, state.next_fire_at) {
        (SchedulePhase::Armed, Some(at)) => {
            format!("next refresh at {}", at.format("%H:%M:%S UTC"))
        }
        (SchedulePhase::CatchingUp, _) => {
            "refresh overdue, checking again shortly".to_owned()
        }
        (SchedulePhase::Idle(reason), _) => format!("not scheduled ({reason})"),
        (phase, _) => format!("scheduler {phase:?}"),
    }
}

fn print_status(config: &AppConfig, results: &[AnalysisResult]) {
    let summary = StatusSummary::from_store(Some(config), results, Utc::now());
    println!(
        "language: {}  interval: {}  updated: {}  next: {}",
        summary.language.as_deref().unwrap_or("unknown"),
        summary.interval,
        summary.last_updated_label,
        summary.next_update_label,
    );
    for result in results {
        println!("  {:<40} {}", result.repo_name, result.one_liner_summary);
    }
}

async fn run_status(config: ClientConfig, json: bool) -> anyhow::Result<()> {
    let catch_up_delay = config.schedule.catch_up_delay();
    let mut store = DataStore::new(ApiClient::new(config.api)?);
    let (app_config, results) = store.refresh(true).await?;

    if json {
        let now = Utc::now();
        let schedule = plan::recompute(&results, Some(&app_config), now, catch_up_delay);
        let report = serde_json::json!({
            "status": StatusSummary::from_store(Some(&app_config), &results, now),
            "schedule": schedule.state,
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_status(&app_config, &results);
    }
    Ok(())
}

async fn run_chat(config: ClientConfig, message: &str) -> anyhow::Result<()> {
    let client = ApiClient::new(config.api)?;
    let mut store = DataStore::new(client.clone());
    let mut chat = ChatSession::new(client);

    let exchange = chat.send(message, &mut store).await?;
    if exchange.reply.is_error {
        anyhow::bail!("{}", exchange.reply.text);
    }
    println!("{}", exchange.reply.text);

    match exchange.refresh {
        RefreshOutcome::Refreshed => {
            if let Some(config) = store.config() {
                print_status(config, store.results());
            }
        }
        RefreshOutcome::Failed(message) => println!("refresh failed: {message}"),
        RefreshOutcome::NotAttempted => {}
    }
    Ok(())
}

fn run_theme(mut config: ClientConfig, path: &Path, value: Option<&str>) -> anyhow::Result<()> {
    if let Some(value) = value {
        let theme: ThemePreference = value.parse()?;
        config.theme = theme;
        config
            .save_to_file(path)
            .with_context(|| format!("saving {}", path.display()))?;
    }
    println!("theme: {}", config.theme);
    Ok(())
}
