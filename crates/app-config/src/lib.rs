// In crates/app-config/src/lib.rs

use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, BinanceSettings, ServerSettings, Settings, TradingSettings};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `config/base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `config/production.toml`).
/// 3. Merges settings from environment variables (e.g., `APP__TRADING__SYMBOL=ETHUSDT`).
/// 4. Applies the plain `API_KEY` / `API_SECRET` variables on top, if set.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let builder = Config::builder()
        .add_source(File::with_name("config/base"))
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"));

    let builder = with_credential_overrides(
        builder,
        std::env::var("API_KEY").ok(),
        std::env::var("API_SECRET").ok(),
    )?;

    from_builder(builder)
}

/// Applies credentials supplied outside the `APP__` namespace.
pub fn with_credential_overrides(
    builder: ConfigBuilder<DefaultState>,
    api_key: Option<String>,
    api_secret: Option<String>,
) -> Result<ConfigBuilder<DefaultState>> {
    let builder = builder
        .set_override_option("binance.api_key", api_key.filter(|k| !k.is_empty()))?
        .set_override_option("binance.secret_key", api_secret.filter(|s| !s.is_empty()))?;
    Ok(builder)
}

/// Builds, deserializes and validates the settings.
///
/// Credentials are not checked here; commands that sign requests call
/// [`BinanceSettings::require_credentials`] before doing anything else.
pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use rust_decimal_macros::dec;

    fn builder(toml: &str) -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(toml, FileFormat::Toml))
    }

    #[test]
    fn defaults_fill_in_an_empty_file() {
        let settings = from_builder(builder("")).unwrap();

        assert_eq!(settings.trading.symbol.as_str(), "BTCUSDT");
        assert_eq!(settings.trading.interval.as_str(), "5m");
        assert_eq!(settings.trading.quantity, dec!(0.001));
        assert_eq!(settings.trading.cycle_period_secs, 300);
        assert_eq!(settings.trading.lookback, 20);
        assert_eq!(settings.trading.ma_crossover.fast_period, 5);
        assert_eq!(settings.trading.ma_crossover.slow_period, 10);
        assert!(!settings.app.live_trading_enabled);
    }

    #[test]
    fn missing_credentials_are_reported_by_name() {
        let settings = from_builder(builder("")).unwrap();

        let err = settings.binance.require_credentials().unwrap_err();
        assert!(matches!(err, Error::ConfigurationMissing(name) if name.starts_with("binance.api_key")));
    }

    #[test]
    fn legacy_variables_override_file_credentials() {
        let toml = r#"
            [binance]
            api_key = "from-file"
            secret_key = "from-file"
        "#;
        let builder = with_credential_overrides(
            builder(toml),
            Some("env-key".into()),
            Some("env-secret".into()),
        )
        .unwrap();

        let settings = from_builder(builder).unwrap();
        assert_eq!(settings.binance.api_key, "env-key");
        assert_eq!(settings.binance.secret_key, "env-secret");
        assert!(settings.binance.require_credentials().is_ok());
    }

    #[test]
    fn empty_override_does_not_clobber_file_value() {
        let toml = r#"
            [binance]
            api_key = "from-file"
            secret_key = "from-file"
        "#;
        let builder = with_credential_overrides(builder(toml), Some(String::new()), None).unwrap();

        let settings = from_builder(builder).unwrap();
        assert_eq!(settings.binance.api_key, "from-file");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let toml = r#"
            [binance]
            api_key = "super-key"
            secret_key = "super-secret"
        "#;
        let settings = from_builder(builder(toml)).unwrap();

        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("super-key"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn lookback_shorter_than_slow_period_is_rejected() {
        let toml = r#"
            [trading]
            lookback = 8
        "#;
        assert!(matches!(from_builder(builder(toml)), Err(Error::Invalid(_))));
    }

    #[test]
    fn unsupported_interval_fails_to_load() {
        let toml = r#"
            [trading]
            interval = "7m"
        "#;
        assert!(matches!(from_builder(builder(toml)), Err(Error::LoadError(_))));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let toml = r#"
            [trading]
            quantity = "0"
        "#;
        assert!(matches!(from_builder(builder(toml)), Err(Error::Invalid(_))));
    }
}
