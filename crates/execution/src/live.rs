// In crates/execution/src/live.rs

use crate::{Executor, Result};
use api_client::ApiClient;
use async_trait::async_trait;
use core_types::{OrderResult, Side, Symbol};
use rust_decimal::Decimal;

/// An executor that places real orders on the Binance exchange.
///
/// Signing and transport are delegated to the `ApiClient`; this type only maps the
/// exchange response into an `OrderResult` and failures into `OrderRejected`.
#[derive(Debug, Clone)]
pub struct LiveExecutor {
    /// The API client for communicating with Binance.
    api_client: ApiClient,
}

impl LiveExecutor {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }
}

#[async_trait]
impl Executor for LiveExecutor {
    fn name(&self) -> &'static str {
        "LiveExecutor"
    }

    async fn submit(&self, symbol: &Symbol, side: Side, quantity: Decimal) -> Result<OrderResult> {
        let order_response = match self.api_client.place_market_order(symbol, side, quantity).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(%symbol, %side, error = %e, "Failed to place market order.");
                return Err(e.into());
            }
        };

        let result = order_response.into_order_result();
        tracing::info!(
            %symbol,
            order_id = %result.order_id,
            executed_qty = %result.executed_qty,
            price = %result.price,
            "Market order placed."
        );
        Ok(result)
    }
}
