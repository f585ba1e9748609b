// In crates/execution/src/paper.rs

use crate::{Executor, Result};
use async_trait::async_trait;
use chrono::Utc;
use core_types::{FillPrice, OrderRequest, OrderResult, Side, Symbol};
use rust_decimal::Decimal;
use std::sync::Mutex;

/// An executor that records orders locally instead of sending them.
///
/// Used whenever live trading is disabled. Every order "fills" in full at an
/// unknown market price.
#[derive(Debug, Default)]
pub struct PaperExecutor {
    orders: Mutex<Vec<OrderRequest>>,
}

impl PaperExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every order submitted so far, in submission order.
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl Executor for PaperExecutor {
    fn name(&self) -> &'static str {
        "PaperExecutor"
    }

    async fn submit(&self, symbol: &Symbol, side: Side, quantity: Decimal) -> Result<OrderResult> {
        let request = OrderRequest::market(symbol.clone(), side, quantity, Utc::now().timestamp_millis());

        let order_id = {
            let mut orders = self.orders.lock().unwrap_or_else(|p| p.into_inner());
            orders.push(request);
            format!("paper-{}", orders.len())
        };

        tracing::info!(%symbol, %side, %quantity, %order_id, "Paper order recorded.");

        Ok(OrderResult {
            order_id,
            side,
            executed_qty: quantity,
            price: FillPrice::Market,
        })
    }
}
