// In crates/app-config/src/types.rs

use crate::{Error, Result};
use core_types::{Interval, Symbol};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use strategies::types::MACrossoverSettings;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Settings {
    /// The application's general settings.
    #[serde(default)]
    pub app: AppSettings,
    /// Settings for the Binance API.
    #[serde(default)]
    pub binance: BinanceSettings,
    /// What to trade and how often.
    #[serde(default)]
    pub trading: TradingSettings,
    /// The manual-trading HTTP front-end.
    #[serde(default)]
    pub server: ServerSettings,
}

impl Settings {
    /// Checks everything except the exchange credentials.
    pub fn validate(&self) -> Result<()> {
        let trading = &self.trading;
        let ma = &trading.ma_crossover;

        if trading.quantity <= Decimal::ZERO {
            return Err(Error::Invalid(format!("trading.quantity must be positive, got {}", trading.quantity)));
        }
        if trading.cycle_period_secs == 0 {
            return Err(Error::Invalid("trading.cycle_period_secs must be greater than 0".into()));
        }
        if ma.fast_period == 0 || ma.fast_period >= ma.slow_period {
            return Err(Error::Invalid(format!(
                "trading.ma_crossover periods must satisfy 0 < fast ({}) < slow ({})",
                ma.fast_period, ma.slow_period
            )));
        }
        if (trading.lookback as usize) < ma.slow_period {
            return Err(Error::Invalid(format!(
                "trading.lookback ({}) must cover the slow period ({})",
                trading.lookback, ma.slow_period
            )));
        }
        if self.binance.request_timeout_secs == 0 {
            return Err(Error::Invalid("binance.request_timeout_secs must be greater than 0".into()));
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
    /// When false, orders are recorded locally instead of being sent to the exchange.
    pub live_trading_enabled: bool,
    /// Where the append-only audit log is written.
    pub audit_log_path: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            log_level: "info".into(),
            live_trading_enabled: false,
            audit_log_path: PathBuf::from("trading-log.txt"),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct BinanceSettings {
    /// The API key for Binance.
    pub api_key: String,
    /// The secret key for Binance.
    pub secret_key: String,
    /// The REST API base URL for Binance.
    pub rest_base_url: String,
    /// Upper bound for any single exchange request.
    pub request_timeout_secs: u64,
}

impl BinanceSettings {
    /// Both credentials must be present before any order can be signed.
    pub fn require_credentials(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::ConfigurationMissing("binance.api_key (or API_KEY)"));
        }
        if self.secret_key.trim().is_empty() {
            return Err(Error::ConfigurationMissing("binance.secret_key (or API_SECRET)"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for BinanceSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            rest_base_url: "https://api.binance.com".into(),
            request_timeout_secs: 10,
        }
    }
}

// Credentials stay out of debug output.
impl fmt::Debug for BinanceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinanceSettings")
            .field("api_key", &redact(&self.api_key))
            .field("secret_key", &redact(&self.secret_key))
            .field("rest_base_url", &self.rest_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "<unset>" } else { "<redacted>" }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TradingSettings {
    pub symbol: Symbol,
    pub interval: Interval,
    /// Fixed order size, in base asset units.
    pub quantity: Decimal,
    pub cycle_period_secs: u64,
    /// Number of candles fetched per cycle.
    pub lookback: u16,
    pub ma_crossover: MACrossoverSettings,
}

impl TradingSettings {
    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs(self.cycle_period_secs)
    }
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            symbol: Symbol("BTCUSDT".into()),
            interval: Interval::default(),
            quantity: Decimal::new(1, 3),
            cycle_period_secs: 300,
            lookback: 20,
            ma_crossover: MACrossoverSettings::default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerSettings {
    /// Whether `run` also starts the HTTP front-end.
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}
