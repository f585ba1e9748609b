// In crates/api-client/src/types.rs

use core_types::{FillPrice, Kline, OrderRequest, OrderResult, Side};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// The main client for interacting with the Binance spot REST API.
#[derive(Clone)]
pub struct ApiClient {
    /// The persistent HTTP client, built with a request timeout.
    pub(crate) http_client: Client,
    /// The user's Binance API key.
    pub(crate) api_key: String,
    /// The user's Binance secret key.
    pub(crate) secret_key: String,
    /// The base URL for the Binance REST API.
    pub(crate) base_url: String,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// An order request together with its HMAC signature.
///
/// The signature is computed over `request.canonical_query()` and the transmitted
/// query string is built from the same call, so the two can never diverge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOrder {
    pub request: OrderRequest,
    pub signature: String,
}

impl SignedOrder {
    /// The full query string sent to the exchange: canonical parameters plus `&signature=<hex>`.
    pub fn query_string(&self) -> String {
        format!("{}&signature={}", self.request.canonical_query(), self.signature)
    }
}

/// A single fill reported in the order response.
#[derive(Debug, Deserialize, Clone)]
pub struct OrderFill {
    pub price: Decimal,
    #[serde(default)]
    pub qty: Option<Decimal>,
}

/// The subset of `POST /api/v3/order` response fields we consume.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderResponse {
    pub order_id: i64,
    pub side: Side,
    /// The actual filled quantity.
    pub executed_qty: Decimal,
    #[serde(default)]
    pub fills: Vec<OrderFill>,
}

impl NewOrderResponse {
    /// Converts the exchange response into our `OrderResult`.
    /// The first fill's price is reported; without fills the price is `Market`.
    pub fn into_order_result(self) -> OrderResult {
        let price = self
            .fills
            .first()
            .map(|fill| FillPrice::Fill(fill.price))
            .unwrap_or(FillPrice::Market);
        OrderResult {
            order_id: self.order_id.to_string(),
            side: self.side,
            executed_qty: self.executed_qty,
            price,
        }
    }
}

/// Parses one row of the klines response:
/// `[openTime, "open", "high", "low", "close", "volume", closeTime, ...]`.
///
/// Trailing fields are ignored. Returns `None` if any consumed field is missing or malformed.
pub(crate) fn parse_kline_row(row: &[Value]) -> Option<Kline> {
    let decimal = |index: usize| -> Option<Decimal> {
        match row.get(index)? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.to_string().parse().ok(),
            _ => None,
        }
    };
    Some(Kline {
        open_time: row.first()?.as_i64()?,
        open: decimal(1)?,
        high: decimal(2)?,
        low: decimal(3)?,
        close: decimal(4)?,
        volume: decimal(5).unwrap_or_default(),
        close_time: row.get(6).and_then(Value::as_i64).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn parses_a_full_exchange_row() {
        let row = json!([
            1499040000000i64, "0.01634790", "0.80000000", "0.01575800", "0.01577100",
            "148976.11427815", 1499644799999i64, "2434.19055334", 308, "1756.87402397",
            "28.46694368", "0"
        ]);

        let kline = parse_kline_row(row.as_array().unwrap()).unwrap();
        assert_eq!(kline.open_time, 1499040000000);
        assert_eq!(kline.close, dec!(0.01577100));
        assert_eq!(kline.close_time, 1499644799999);
    }

    #[test]
    fn rejects_a_row_without_close() {
        let row = json!([1499040000000i64, "1", "2", "0.5"]);
        assert!(parse_kline_row(row.as_array().unwrap()).is_none());
    }

    #[test]
    fn order_response_uses_first_fill_price() {
        let response: NewOrderResponse = serde_json::from_value(json!({
            "symbol": "BTCUSDT",
            "orderId": 28,
            "side": "BUY",
            "executedQty": "0.00100000",
            "fills": [
                { "price": "4000.00000000", "qty": "0.0005" },
                { "price": "3999.00000000", "qty": "0.0005" }
            ]
        }))
        .unwrap();

        let result = response.into_order_result();
        assert_eq!(result.order_id, "28");
        assert_eq!(result.side, Side::Buy);
        assert_eq!(result.executed_qty, dec!(0.001));
        assert_eq!(result.price, FillPrice::Fill(dec!(4000)));
    }

    #[test]
    fn order_response_without_fills_reports_market() {
        let response: NewOrderResponse = serde_json::from_value(json!({
            "symbol": "BTCUSDT",
            "orderId": 7,
            "side": "SELL",
            "executedQty": "0.001"
        }))
        .unwrap();

        assert_eq!(response.into_order_result().price, FillPrice::Market);
    }

    #[test]
    fn order_response_needs_only_the_fields_we_read() {
        let response: NewOrderResponse = serde_json::from_value(json!({
            "orderId": 8,
            "side": "BUY",
            "executedQty": "0.002",
            "fills": [{"price": "101.5"}]
        }))
        .unwrap();

        let result = response.into_order_result();
        assert_eq!(result.order_id, "8");
        assert_eq!(result.price, FillPrice::Fill(dec!(101.5)));
    }
}
