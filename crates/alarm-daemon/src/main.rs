//! alarm-daemon entry point.
//!
//! Thin: load config, set up logging, pick the event store, register the
//! bot, spawn the liveness monitor and serve the webhook. Handlers live in `routes.rs`;
//! shared state lives in `state.rs`.

use std::fs::OpenOptions;
use std::sync::Arc;

use alarm_config::AlarmConfig;
use alarm_daemon::log_forward::{self, LogForwardLayer, LOG_FORWARD_CAPACITY};
use alarm_daemon::{monitor, routes, state};
use alarm_db::{EventStore, MemoryEventStore, PgEventStore};
use alarm_notify::{templates, Notifier, TelegramClient};
use anyhow::Context;
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env");

    let cfg = AlarmConfig::from_env()?;

    let (forward, forwarded) = log_forward::channel(LOG_FORWARD_CAPACITY);
    init_tracing(&cfg, forward)?;
    info!(?cfg, "configuration loaded");

    let store: Arc<dyn EventStore> = match cfg.database_url.as_deref() {
        Some(url) => Arc::new(PgEventStore::connect_and_migrate(url).await?),
        None => {
            warn!("ALARM_DATABASE_URL not set; events are kept in memory only");
            Arc::new(MemoryEventStore::new())
        }
    };
    info!(backend = store.backend_name(), "event store ready");

    let telegram =
        Arc::new(TelegramClient::new(cfg.bot_token.clone()).with_request_timeout(cfg.io_timeout)?);
    let notifier: Arc<dyn Notifier> = telegram.clone();
    log_forward::spawn_log_forwarder(
        forwarded,
        Arc::clone(&notifier),
        Arc::new(cfg.recipients.clone()),
        cfg.io_timeout,
    );

    let bot_name = bootstrap_bot(&telegram, &cfg).await?;
    let shared = Arc::new(state::AppState::new(&cfg, store, notifier).with_bot_name(bot_name));

    monitor::spawn_liveness_monitor(Arc::clone(&shared));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CatchPanicLayer::new());

    info!("alarm-daemon listening on http://{}", cfg.listen_addr);

    axum::serve(tokio::net::TcpListener::bind(cfg.listen_addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    Ok(())
}

/// stdout, the optional log file, and WARN+ forwarding to the recipients.
fn init_tracing(cfg: &AlarmConfig, forward: LogForwardLayer) -> anyhow::Result<()> {
    let file_layer = match cfg.log_file.as_deref() {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer())
        .with(file_layer)
        .with(forward)
        .init();
    Ok(())
}

/// Register the command list and, when a public URL is configured, the
/// webhook. Returns the bot's display name for `/help`.
///
/// A failed webhook registration aborts startup; the other calls only warn.
async fn bootstrap_bot(telegram: &TelegramClient, cfg: &AlarmConfig) -> anyhow::Result<String> {
    if let Err(e) = telegram.set_my_commands(templates::COMMANDS).await {
        warn!(error = %format!("{e:#}"), "setMyCommands failed");
    }

    let bot_name = match telegram.get_me().await {
        Ok(me) => me.first_name,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "getMe failed; using default bot name");
            "AlarmBot".to_string()
        }
    };

    match cfg.webhook_url.as_deref() {
        Some(url) => {
            telegram
                .set_webhook(url)
                .await
                .context("webhook registration failed")?;
            info!("webhook registered");
        }
        None => warn!("WEBHOOK_HOST/WEBHOOK_PORT not set; webhook not registered"),
    }

    Ok(bot_name)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl_c handler failed");
        return;
    }
    info!("shutdown requested");
}
