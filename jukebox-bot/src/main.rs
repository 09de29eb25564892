//! Jukebox Bot (jukebox-bot) - Console entry point
//!
//! Reads chat messages from stdin as a single console user, prints replies to
//! stdout and plays tracks on a simulated audio engine. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use jukebox_bot::console::{ConsoleChat, ConsoleVoice, SimulatedPlayer};
use jukebox_bot::platform::{AudioPlayer, MessageContext};
use jukebox_bot::playback::{OrchestratorConfig, PlaybackOrchestrator};
use jukebox_bot::playlist::MemoryPlaylistStore;
use jukebox_bot::resolver::{DirectUrlLoader, MediaResolver, TrackResolutionPipeline, YtDlpResolver};
use jukebox_bot::SharedState;
use jukebox_common::config::{load_config, resolve_config_path, CONFIG_ENV_VAR};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for jukebox-bot
#[derive(Parser, Debug)]
#[command(name = "jukebox-bot")]
#[command(about = "Chat-driven music bot (console runtime)")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (overrides config; RUST_LOG overrides both)
    #[arg(short, long, env = "JUKEBOX_LOG_LEVEL")]
    log_level: Option<String>,

    /// Never use the external resolver
    #[arg(long)]
    no_resolver: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Tracing goes first so config loading is logged; the config level is
    // applied later through the reload handle
    let env_filter = EnvFilter::try_from_default_env().ok();
    let env_filter_set = env_filter.is_some();
    let initial_filter = env_filter.unwrap_or_else(|| {
        EnvFilter::new(filter_directive(args.log_level.as_deref().unwrap_or("info")))
    });
    let (filter, filter_handle) = reload::Layer::new(initial_filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting jukebox-bot v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file, using defaults"),
    }

    if let Some(directive) =
        config_filter_override(env_filter_set, args.log_level.as_deref(), &config.logging.level)
    {
        match filter_handle.reload(EnvFilter::new(&directive)) {
            Ok(()) => debug!(filter = %directive, "Log filter taken from config"),
            Err(e) => warn!("Failed to apply configured log level: {}", e),
        }
    }

    // Source manager selection: enhanced when the resolver responds
    let resolver: Option<Arc<dyn MediaResolver>> = if config.resolver.enabled && !args.no_resolver {
        Some(Arc::new(YtDlpResolver::from_config(&config.resolver)))
    } else {
        None
    };
    let pipeline = TrackResolutionPipeline::select(
        Arc::new(DirectUrlLoader::new()),
        resolver,
        config.resolver.hosts.clone(),
    )
    .await;

    let state = Arc::new(SharedState::new(config.queue.event_capacity));
    let (player, track_end_rx) =
        SimulatedPlayer::new(Duration::from_secs(config.console.fallback_track_secs));
    let player: Arc<dyn AudioPlayer> = Arc::new(player);

    let orchestrator = PlaybackOrchestrator::new(
        Arc::clone(&state),
        Arc::new(pipeline),
        Arc::clone(&player),
        Arc::new(ConsoleVoice::new()),
        Arc::new(MemoryPlaylistStore::new()),
        OrchestratorConfig {
            display_limit: config.queue.display_limit,
        },
    );
    let track_end_listener = orchestrator.spawn_track_end_listener(track_end_rx);
    let event_logger = spawn_event_logger(&state);

    let ctx = MessageContext::new(
        config.console.user_name.clone(),
        config.console.user_name.clone(),
        config.console.voice_channel().map(str::to_string),
        Arc::new(ConsoleChat),
    );
    match &ctx.voice_channel {
        Some(channel) => info!(user = %ctx.user_name, channel = %channel, "Console user ready"),
        None => info!(user = %ctx.user_name, "Console user ready, not in a voice channel"),
    }
    println!("Type !help for commands. Ctrl+C or end of input quits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => {
                match line.context("Failed to read stdin")? {
                    Some(line) => {
                        // Background work reports to the channel on its own
                        let _ = orchestrator.handle_message(&ctx, &line).await;
                    }
                    None => {
                        info!("Input closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    player.stop();
    track_end_listener.abort();
    event_logger.abort();
    info!("Shutdown complete");
    Ok(())
}

/// Filter directive enabling `level` for both crates
fn filter_directive(level: &str) -> String {
    format!("jukebox_bot={level},jukebox_common={level}")
}

/// Directive from the config file, unless RUST_LOG or --log-level already set one
fn config_filter_override(
    env_filter_set: bool,
    cli_level: Option<&str>,
    config_level: &str,
) -> Option<String> {
    if env_filter_set || cli_level.is_some() {
        None
    } else {
        Some(filter_directive(config_level))
    }
}

/// Log every broadcast event at debug level
fn spawn_event_logger(state: &SharedState) -> tokio::task::JoinHandle<()> {
    let mut rx = state.events.subscribe();
    debug!(
        capacity = state.events.capacity(),
        subscribers = state.events.subscriber_count(),
        "Event logger subscribed"
    );
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => debug!(event = event.event_type(), "{:?}", event),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Event logger lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
