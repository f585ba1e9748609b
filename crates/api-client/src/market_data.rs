// In crates/api-client/src/market_data.rs

use crate::{ApiClient, Error, Result};
use async_trait::async_trait;
use core_types::{Interval, Kline, Symbol};
use rust_decimal::Decimal;

/// Read-only access to exchange candles.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetches up to `lookback` closes for `symbol`, oldest first.
    ///
    /// Every failure, including an empty series, is reported as
    /// [`Error::MarketDataUnavailable`]. A series shorter than `lookback` is returned as-is.
    async fn fetch_closes(&self, symbol: &Symbol, interval: &Interval, lookback: u16) -> Result<Vec<Decimal>>;

    /// Fetches the most recent candle.
    async fn fetch_latest_candle(&self, symbol: &Symbol, interval: &Interval) -> Result<Kline>;
}

#[async_trait]
impl MarketData for ApiClient {
    async fn fetch_closes(&self, symbol: &Symbol, interval: &Interval, lookback: u16) -> Result<Vec<Decimal>> {
        let klines = self.get_klines(symbol, interval, lookback).await?;
        Ok(klines.into_iter().map(|k| k.close).collect())
    }

    async fn fetch_latest_candle(&self, symbol: &Symbol, interval: &Interval) -> Result<Kline> {
        self.get_klines(symbol, interval, 1)
            .await?
            .pop()
            .ok_or_else(|| Error::MarketDataUnavailable("exchange returned no candles".into()))
    }
}
