// In crates/engine/src/lib.rs

pub mod desk;
pub mod error;
pub mod scheduler;
pub mod triggers;

pub use desk::ManualDesk;
pub use error::{Error, Result};
pub use scheduler::{CycleOutcome, CyclePhase, CycleSettings, TradingScheduler};
pub use triggers::interval_triggers;

use api_client::ApiClient;
use app_config::AppSettings;
use execution::{Executor, LiveExecutor, PaperExecutor};
use std::sync::Arc;

/// Picks the order executor shared by the scheduler and the manual desk.
///
/// Paper trading unless `live_trading_enabled` is set.
pub fn executor_for(settings: &AppSettings, api_client: ApiClient) -> Arc<dyn Executor> {
    if settings.live_trading_enabled {
        tracing::warn!("LIVE TRADING IS ENABLED. REAL ORDERS WILL BE PLACED.");
        Arc::new(LiveExecutor::new(api_client))
    } else {
        tracing::info!("Live trading disabled; orders will be recorded by the paper executor.");
        Arc::new(PaperExecutor::new())
    }
}
