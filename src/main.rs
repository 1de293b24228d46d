use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use kalshi_signal::config::Config;
use kalshi_signal::kalshi::KalshiRestClient;
use kalshi_signal::notify::{spawn_dispatcher, LogNotifier, Notifier, TelegramNotifier};
use kalshi_signal::order_manager::{DryRunExecutor, OrderExecutor, OrderManager};
use kalshi_signal::runtime::{MarketFeed, MarketRegistry, Monitor, MonitorSettings};
use kalshi_signal::tick_store::TickStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure .env file exists with KALSHI_EMAIL and KALSHI_PASSWORD");
            std::process::exit(1);
        }
    };

    let writer = match config.logging.file.as_deref() {
        Some(path) => BoxMakeWriter::new(
            std::fs::File::create(path).with_context(|| format!("failed to create {}", path))?,
        ),
        None => BoxMakeWriter::new(std::io::stdout),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                config
                    .logging
                    .level
                    .parse()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(writer)
        .with_ansi(false)
        .json()
        .init();

    tracing::info!(
        rest_url = %config.kalshi.rest_base_url,
        auto_trading = config.trading.auto_trading_enabled,
        volume_threshold = config.monitor.volume_threshold,
        price_source = config.monitor.price_source.as_str(),
        "Starting kalshi-signal"
    );

    let client = Arc::new(KalshiRestClient::new(
        &config.kalshi.rest_base_url,
        &config.kalshi.email,
        &config.kalshi.password,
        config.kalshi.page_limit,
        config.monitor.price_source,
    ));
    client.login().await.context("Kalshi login failed")?;

    let executor: Arc<dyn OrderExecutor> = if config.trading.auto_trading_enabled {
        client.clone()
    } else {
        tracing::info!("Auto trading disabled; orders are simulated");
        Arc::new(DryRunExecutor)
    };
    let orders = Arc::new(OrderManager::new(executor, config.trading.max_contracts));

    let notifier: Arc<dyn Notifier> = match config.notify.telegram_token.as_deref() {
        Some(token) if !config.notify.telegram_chat_id.is_empty() => Arc::new(
            TelegramNotifier::new(&config.notify.telegram_base_url, token, &config.notify.telegram_chat_id),
        ),
        _ => {
            tracing::info!("TELEGRAM_TOKEN or chat id missing; alerts go to the log only");
            Arc::new(LogNotifier)
        }
    };
    let (notify_tx, dispatcher) = spawn_dispatcher(notifier, config.notify.queue_capacity);

    let store = match TickStore::open(&config.storage.tick_log_path) {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::error!(error = %e, path = %config.storage.tick_log_path, "Tick log unavailable; continuing without persistence");
            None
        }
    };

    let feed: Arc<dyn MarketFeed> = client;
    let monitor = Monitor::new(
        feed,
        orders,
        notify_tx,
        MarketRegistry::new(config.engine_config()),
        store,
        MonitorSettings::from_config(&config)?,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = shutdown_tx.send(true);
    });

    monitor.run(shutdown_rx).await?;
    // Monitor dropped its sender; let queued alerts drain.
    let _ = dispatcher.await;
    tracing::info!("Shutdown complete");
    Ok(())
}
