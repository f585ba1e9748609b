// In app/src/main.rs

use anyhow::Result;
use api_client::MarketData;
use app_config::Settings;
use audit_log::AuditLog;
use clap::{Parser, Subcommand};
use core_types::{Interval, Symbol};
use engine::{CycleSettings, ManualDesk, TradingScheduler};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use strategies::MACrossover;
use tokio::sync::watch;
use tracing_subscriber::prelude::*;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "An SMA-crossover auto-trader for Binance spot markets.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the periodic trading cycle (and the front-end API when `server.enabled`).
    Run,

    /// Prints the most recent candle.
    Candle {
        /// The trading symbol (defaults to `trading.symbol`).
        #[arg(short, long)]
        symbol: Option<String>,

        /// The candle interval (defaults to `trading.interval`).
        #[arg(short, long)]
        interval: Option<String>,
    },

    /// Places a single manual market order.
    Trade {
        /// `buy` or `sell`.
        #[arg(short, long)]
        action: String,

        #[arg(short, long)]
        symbol: Option<String>,

        /// Order quantity (defaults to `trading.quantity`).
        #[arg(short, long)]
        quantity: Option<Decimal>,
    },

    /// Serves the front-end API without the trading cycle.
    Serve,
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = app_config::load_settings()?;
    init_tracing(&settings.app.log_level);

    tracing::info!(environment = %settings.app.environment, "Starting auto-trader");

    match cli.command {
        Commands::Run => run_app(settings).await?,
        Commands::Candle { symbol, interval } => handle_candle(settings, symbol, interval).await?,
        Commands::Trade {
            action,
            symbol,
            quantity,
        } => handle_trade(settings, action, symbol, quantity).await?,
        Commands::Serve => handle_serve(settings).await?,
    }

    tracing::info!("Auto-trader has finished successfully.");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let level = log_level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("hyper", tracing::Level::WARN)
            .with_target("reqwest", tracing::Level::WARN)
            .with_default(level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();
}

// --- "Run" Subcommand Logic ---

/// Runs trading cycles until SIGINT or SIGTERM.
async fn run_app(settings: Settings) -> Result<()> {
    // --- 1. Initialization ---
    // Missing credentials end the process before any cycle starts.
    settings.binance.require_credentials()?;
    let api_client = api_client::new(&settings.binance)?;
    let audit = Arc::new(AuditLog::new(&settings.app.audit_log_path));
    let executor = engine::executor_for(&settings.app, api_client.clone());
    let market_data = Arc::new(api_client);

    // --- 2. Component Instantiation ---
    let strategy = MACrossover::new(settings.trading.ma_crossover.clone())?;
    let scheduler = Arc::new(TradingScheduler::new(
        CycleSettings::from(&settings.trading),
        market_data.clone(),
        Box::new(strategy),
        executor.clone(),
        audit.clone(),
    )?);

    let shutdown = shutdown_signal();

    let server = if settings.server.enabled {
        let desk = Arc::new(ManualDesk::new(market_data, executor, audit.clone()));
        Some(tokio::spawn(web_server::run(
            settings.server.clone(),
            desk,
            wait_for_shutdown(shutdown.clone()),
        )))
    } else {
        None
    };

    // --- 3. Run until shutdown ---
    audit.append(format!(
        "Auto-trader started: symbol={}, interval={}, quantity={}, every {}s",
        settings.trading.symbol,
        settings.trading.interval,
        settings.trading.quantity.normalize(),
        settings.trading.cycle_period_secs
    ));
    scheduler
        .run(engine::interval_triggers(settings.trading.cycle_period()), shutdown)
        .await?;

    if let Some(server) = server {
        server.await??;
    }
    audit.append("Auto-trader stopped");
    Ok(())
}

// --- Manual Subcommands ---

async fn handle_candle(settings: Settings, symbol: Option<String>, interval: Option<String>) -> Result<()> {
    let symbol: Symbol = match symbol {
        Some(s) => s.parse()?,
        None => settings.trading.symbol.clone(),
    };
    let interval: Interval = match interval {
        Some(i) => i.parse()?,
        None => settings.trading.interval.clone(),
    };

    let api_client = api_client::new(&settings.binance)?;
    let candle = api_client.fetch_latest_candle(&symbol, &interval).await?;

    println!(
        "{symbol} {interval} @ {}: open={} high={} low={} close={}",
        candle.open_time, candle.open, candle.high, candle.low, candle.close
    );
    Ok(())
}

async fn handle_trade(settings: Settings, action: String, symbol: Option<String>, quantity: Option<Decimal>) -> Result<()> {
    let desk = build_desk(&settings)?;
    let symbol = symbol.unwrap_or_else(|| settings.trading.symbol.to_string());
    let quantity = quantity.unwrap_or(settings.trading.quantity);

    let result = desk.trigger_trade(&action, &symbol, quantity).await?;

    println!(
        "{} order placed: orderId={}, executedQty={}, price={}",
        result.side,
        result.order_id,
        result.executed_qty.normalize(),
        result.price
    );
    Ok(())
}

async fn handle_serve(settings: Settings) -> Result<()> {
    let desk = Arc::new(build_desk(&settings)?);
    web_server::run(settings.server.clone(), desk, wait_for_shutdown(shutdown_signal())).await?;
    Ok(())
}

fn build_desk(settings: &Settings) -> Result<ManualDesk> {
    settings.binance.require_credentials()?;
    let api_client = api_client::new(&settings.binance)?;
    let audit = Arc::new(AuditLog::new(&settings.app.audit_log_path));
    let executor = engine::executor_for(&settings.app, api_client.clone());
    Ok(ManualDesk::new(Arc::new(api_client), executor, audit))
}

// --- Shutdown Handling ---

/// Flips to `true` on the first SIGINT or SIGTERM.
fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Shutdown signal received.");
        let _ = tx.send(true);
    });
    rx
}

fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) -> impl Future<Output = ()> + Send + 'static {
    async move {
        let _ = shutdown.wait_for(|stop| *stop).await;
    }
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
            futures::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM.");
                futures::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = futures::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
