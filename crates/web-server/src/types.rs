// In crates/web-server/src/types.rs

use core_types::{FillPrice, Kline, OrderResult, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Query parameters for `GET /api/candle` (e.g., ?symbol=ethusdt&interval=1h).
#[derive(Debug, Deserialize)]
pub struct CandleParams {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_interval")]
    pub interval: String,
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}
fn default_interval() -> String {
    "5m".to_string()
}

/// The most recent candle, as returned to the front-end.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CandleResponse {
    /// Open time in milliseconds since the epoch.
    pub time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl From<Kline> for CandleResponse {
    fn from(kline: Kline) -> Self {
        Self {
            time: kline.open_time,
            open: kline.open,
            high: kline.high,
            low: kline.low,
            close: kline.close,
        }
    }
}

/// Body of `POST /api/trade`. Every field is required; missing ones are reported as a 400.
#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub action: Option<String>,
    pub symbol: Option<String>,
    pub quantity: Option<QuantityInput>,
}

/// A quantity as the front-end sends it: a JSON number (`0.001`) or a string (`"0.001"`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum QuantityInput {
    Number(serde_json::Number),
    Text(String),
}

impl QuantityInput {
    /// The exact decimal value, or `None` if the input is not a number.
    pub fn to_decimal(&self) -> Option<Decimal> {
        let text = match self {
            QuantityInput::Number(n) => n.to_string(),
            QuantityInput::Text(s) => s.trim().to_string(),
        };
        text.parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(&text))
            .ok()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResponse {
    pub success: bool,
    pub order_id: String,
    pub side: Side,
    pub executed_qty: Decimal,
    pub price: FillPrice,
}

impl From<OrderResult> for TradeResponse {
    fn from(result: OrderResult) -> Self {
        Self {
            success: true,
            order_id: result.order_id,
            side: result.side,
            executed_qty: result.executed_qty,
            price: result.price,
        }
    }
}
