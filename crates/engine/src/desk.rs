// In crates/engine/src/desk.rs

use crate::{Error, Result};
use api_client::MarketData;
use audit_log::AuditLog;
use core_types::{Interval, Kline, OrderResult, Side, Symbol};
use execution::Executor;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Manual, user-initiated access to market data and order placement.
///
/// Shares the executor and audit log with the scheduler, so a manual order goes
/// through exactly the same path as an automatic one.
#[derive(Clone)]
pub struct ManualDesk {
    market_data: Arc<dyn MarketData>,
    executor: Arc<dyn Executor>,
    audit: Arc<AuditLog>,
}

impl ManualDesk {
    pub fn new(market_data: Arc<dyn MarketData>, executor: Arc<dyn Executor>, audit: Arc<AuditLog>) -> Self {
        Self {
            market_data,
            executor,
            audit,
        }
    }

    pub async fn latest_candle(&self, symbol: &str, interval: &str) -> Result<Kline> {
        let symbol: Symbol = symbol.parse().map_err(|e| Error::InvalidRequest(format!("{e}")))?;
        let interval: Interval = interval.parse().map_err(|e| Error::InvalidRequest(format!("{e}")))?;

        let candle = self.market_data.fetch_latest_candle(&symbol, &interval).await?;
        tracing::debug!(%symbol, %interval, close = %candle.close, "Latest candle served.");
        Ok(candle)
    }

    /// Places a market order on behalf of the user.
    ///
    /// `action` is `buy` or `sell` in any case. Rejections carry the exchange's raw payload.
    pub async fn trigger_trade(&self, action: &str, symbol: &str, quantity: Decimal) -> Result<OrderResult> {
        let side: Side = action.parse().map_err(|e| Error::InvalidRequest(format!("{e}")))?;
        let symbol: Symbol = symbol.parse().map_err(|e| Error::InvalidRequest(format!("{e}")))?;
        if quantity <= Decimal::ZERO {
            return Err(Error::InvalidRequest(format!("Quantity must be positive, got {quantity}")));
        }

        tracing::info!(%symbol, %side, %quantity, executor = self.executor.name(), "Manual trade requested.");
        self.audit.append(format!(
            "Manual {side} requested: symbol={symbol}, quantity={}",
            quantity.normalize()
        ));

        match self.executor.submit(&symbol, side, quantity).await {
            Ok(result) => {
                self.audit.append(format!(
                    "Manual {} order placed: orderId={}, executedQty={}, price={}",
                    result.side,
                    result.order_id,
                    result.executed_qty.normalize(),
                    result.price
                ));
                Ok(result)
            }
            Err(e) => {
                let execution::Error::OrderRejected { payload } = &e;
                self.audit.append(format!("Manual order failed: {payload}"));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use execution::PaperExecutor;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn desk(base_url: &str) -> (ManualDesk, Arc<PaperExecutor>, Arc<AuditLog>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let audit = Arc::new(AuditLog::new(dir.path().join("trading-log.txt")));
        let settings = app_config::BinanceSettings {
            api_key: "key".into(),
            secret_key: "secret".into(),
            rest_base_url: base_url.into(),
            request_timeout_secs: 5,
        };
        let client = api_client::new(&settings).unwrap();
        let executor = Arc::new(PaperExecutor::new());
        let desk = ManualDesk::new(Arc::new(client), executor.clone(), audit.clone());
        (desk, executor, audit, dir)
    }

    #[tokio::test]
    async fn latest_candle_upper_cases_the_symbol() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v3/klines")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("symbol".into(), "ETHUSDT".into()),
                mockito::Matcher::UrlEncoded("interval".into(), "1h".into()),
                mockito::Matcher::UrlEncoded("limit".into(), "1".into()),
            ]))
            .with_body(r#"[[1700000000000,"10.0","12.0","9.0","11.5","3.2",1700003599999]]"#)
            .create_async()
            .await;
        let (desk, _, _, _dir) = desk(&server.url());

        let candle = desk.latest_candle("ethusdt", "1h").await.unwrap();

        mock.assert_async().await;
        assert_eq!(candle.open_time, 1700000000000);
        assert_eq!(candle.close, dec!(11.5));
    }

    #[tokio::test]
    async fn unknown_interval_is_an_invalid_request() {
        let (desk, _, _, _dir) = desk("http://127.0.0.1:1");

        let err = desk.latest_candle("BTCUSDT", "7m").await.unwrap_err();

        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn manual_trade_goes_through_the_shared_executor() {
        let (desk, executor, audit, _dir) = desk("http://127.0.0.1:1");

        let result = desk.trigger_trade("Sell", "btcusdt", dec!(0.002)).await.unwrap();

        assert_eq!(result.side, Side::Sell);
        assert_eq!(result.order_id, "paper-1");
        let orders = executor.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].symbol.as_str(), "BTCUSDT");
        assert_eq!(orders[0].quantity, dec!(0.002));

        let messages: Vec<_> = audit.entries().unwrap().into_iter().map(|e| e.message).collect();
        assert_eq!(
            messages,
            vec![
                "Manual SELL requested: symbol=BTCUSDT, quantity=0.002".to_string(),
                "Manual SELL order placed: orderId=paper-1, executedQty=0.002, price=market".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn bad_action_or_quantity_never_reaches_the_executor() {
        let (desk, executor, _, _dir) = desk("http://127.0.0.1:1");

        assert!(matches!(
            desk.trigger_trade("hold", "BTCUSDT", dec!(1)).await,
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            desk.trigger_trade("buy", "BTCUSDT", dec!(0)).await,
            Err(Error::InvalidRequest(_))
        ));
        assert!(executor.orders().is_empty());
    }
}
