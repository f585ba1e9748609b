// In crates/api-client/src/lib.rs

use app_config::BinanceSettings;
use chrono::Utc;
use core_types::{Interval, Kline, OrderRequest, Side, Symbol};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde_json::Value;
use sha2::Sha256;

// Create a type alias for the HMAC-SHA256 implementation.
type HmacSha256 = Hmac<Sha256>;

pub mod error;
pub mod market_data;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use market_data::MarketData;
pub use types::{ApiClient, NewOrderResponse, OrderFill, SignedOrder};

use types::parse_kline_row;

/// Hex-encoded HMAC-SHA256 of `payload` keyed with `secret`.
pub fn sign_payload(secret: &str, payload: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::SigningFailed(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

impl ApiClient {
    /// Constructs a new ApiClient from BinanceSettings.
    ///
    /// The underlying HTTP client enforces `request_timeout_secs` on every call, so an
    /// unresponsive exchange surfaces as a transport error instead of a hang.
    pub fn new(settings: &BinanceSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        Ok(ApiClient {
            http_client,
            api_key: settings.api_key.clone(),
            secret_key: settings.secret_key.clone(),
            base_url: settings.rest_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Signs an order request with the configured secret.
    pub fn sign_order(&self, request: OrderRequest) -> Result<SignedOrder> {
        let signature = sign_payload(&self.secret_key, &request.canonical_query())?;
        Ok(SignedOrder { request, signature })
    }

    /// Fetches kline (candlestick) data, oldest first.
    ///
    /// This corresponds to the public `GET /api/v3/klines` endpoint. All failures are
    /// mapped to `MarketDataUnavailable`; no retry happens here.
    pub async fn get_klines(&self, symbol: &Symbol, interval: &Interval, limit: u16) -> Result<Vec<Kline>> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = limit.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("symbol", symbol.as_str()),
                ("interval", interval.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::MarketDataUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::MarketDataUnavailable(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Error::MarketDataUnavailable(format!("status {}: {}", status.as_u16(), body)));
        }

        let rows: Vec<Vec<Value>> = serde_json::from_str(&body)
            .map_err(|e| Error::MarketDataUnavailable(format!("unexpected klines payload: {e}")))?;

        if rows.is_empty() {
            return Err(Error::MarketDataUnavailable("exchange returned no candles".into()));
        }

        let klines = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                parse_kline_row(row)
                    .ok_or_else(|| Error::MarketDataUnavailable(format!("malformed kline at index {i}")))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(symbol = %symbol, interval = %interval, count = klines.len(), "Fetched klines.");
        Ok(klines)
    }

    /// Places a new market order with a fresh timestamp.
    /// Corresponds to `POST /api/v3/order`.
    pub async fn place_market_order(
        &self,
        symbol: &Symbol,
        side: Side,
        quantity: Decimal,
    ) -> Result<NewOrderResponse> {
        // The timestamp is taken now, at submission, never reused.
        let request = OrderRequest::market(symbol.clone(), side, quantity, Utc::now().timestamp_millis());
        let signed = self.sign_order(request)?;
        self.submit_order(&signed).await
    }

    /// Sends an already signed order. Parameters travel in the query string; the body is empty.
    pub async fn submit_order(&self, order: &SignedOrder) -> Result<NewOrderResponse> {
        tracing::info!(
            symbol = %order.request.symbol,
            side = %order.request.side,
            quantity = %order.request.quantity,
            "Submitting market order."
        );

        let url = format!("{}/api/v3/order?{}", self.base_url, order.query_string());

        let response = self
            .http_client
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::RequestFailed(e.without_url()))?;

        let status = response.status();
        // The URL carries the signature; it must not end up in error text.
        let text = response
            .text()
            .await
            .map_err(|e| Error::RequestFailed(e.without_url()))?;

        // Binance returns an error object on failure; keep it verbatim for the audit trail.
        if !status.is_success() {
            return Err(Error::ApiError {
                status: status.as_u16(),
                body: text,
            });
        }

        let order_response: NewOrderResponse = serde_json::from_str(&text).map_err(Error::DeserializationFailed)?;
        Ok(order_response)
    }
}

// Free function to allow api_client::new usage
pub fn new(settings: &BinanceSettings) -> Result<ApiClient> {
    ApiClient::new(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::FillPrice;
    use mockito::Matcher;
    use rust_decimal_macros::dec;

    fn settings(base_url: &str) -> BinanceSettings {
        BinanceSettings {
            api_key: "test-key".into(),
            secret_key: "test-secret".into(),
            rest_base_url: base_url.into(),
            request_timeout_secs: 5,
        }
    }

    fn kline_row(open_time: i64, close: &str) -> Value {
        serde_json::json!([
            open_time, "1.0", "2.0", "0.5", close, "10.0", open_time + 299_999,
            "0", 1, "0", "0", "0"
        ])
    }

    fn btc() -> Symbol {
        "BTCUSDT".parse().unwrap()
    }

    fn five_minutes() -> Interval {
        "5m".parse().unwrap()
    }

    #[test]
    fn signs_the_documented_exchange_example() {
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let payload = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";

        assert_eq!(
            sign_payload(secret, payload).unwrap(),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn signed_query_is_canonical_query_plus_signature() {
        let client = ApiClient::new(&settings("http://localhost")).unwrap();
        let request = OrderRequest::market(btc(), Side::Sell, dec!(0.5), 1_700_000_000_000);

        let signed = client.sign_order(request.clone()).unwrap();

        let expected_signature = sign_payload("test-secret", &request.canonical_query()).unwrap();
        assert_eq!(signed.signature, expected_signature);
        assert_eq!(
            signed.query_string(),
            format!("{}&signature={}", request.canonical_query(), expected_signature)
        );
    }

    #[test]
    fn debug_output_hides_credentials() {
        let client = ApiClient::new(&settings("http://localhost")).unwrap();
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("test-key"));
        assert!(!rendered.contains("test-secret"));
    }

    #[tokio::test]
    async fn fetch_closes_returns_oldest_first() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!([
            kline_row(1_000, "100.5"),
            kline_row(301_000, "101.5"),
            kline_row(601_000, "102.5"),
        ]);
        let mock = server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()),
                Matcher::UrlEncoded("interval".into(), "5m".into()),
                Matcher::UrlEncoded("limit".into(), "20".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = ApiClient::new(&settings(&server.url())).unwrap();
        let closes = client.fetch_closes(&btc(), &five_minutes(), 20).await.unwrap();

        assert_eq!(closes, vec![dec!(100.5), dec!(101.5), dec!(102.5)]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn latest_candle_requests_a_single_kline() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::UrlEncoded("limit".into(), "1".into()))
            .with_status(200)
            .with_body(serde_json::json!([kline_row(42, "123.45")]).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(&settings(&server.url())).unwrap();
        let candle = client.fetch_latest_candle(&btc(), &five_minutes()).await.unwrap();

        assert_eq!(candle.open_time, 42);
        assert_eq!(candle.close, dec!(123.45));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_market_data_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"code":-1121,"msg":"Invalid symbol."}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&settings(&server.url())).unwrap();
        let err = client.fetch_closes(&btc(), &five_minutes(), 20).await.unwrap_err();

        match err {
            Error::MarketDataUnavailable(msg) => assert!(msg.contains("Invalid symbol.")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_series_is_market_data_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = ApiClient::new(&settings(&server.url())).unwrap();
        let err = client.fetch_closes(&btc(), &five_minutes(), 20).await.unwrap_err();

        assert!(matches!(err, Error::MarketDataUnavailable(_)));
    }

    #[tokio::test]
    async fn unreachable_exchange_is_market_data_unavailable() {
        // Nothing listens on port 1.
        let client = ApiClient::new(&settings("http://127.0.0.1:1")).unwrap();
        let err = client.fetch_closes(&btc(), &five_minutes(), 20).await.unwrap_err();

        assert!(matches!(err, Error::MarketDataUnavailable(_)));
    }

    #[tokio::test]
    async fn submit_order_sends_exactly_what_was_signed() {
        let mut server = mockito::Server::new_async().await;
        let request = OrderRequest::market(btc(), Side::Buy, dec!(0.001), 1_700_000_000_123);
        // Recomputed independently of the client.
        let mut mac = HmacSha256::new_from_slice(b"test-secret").unwrap();
        mac.update(b"symbol=BTCUSDT&side=BUY&type=MARKET&quantity=0.001&timestamp=1700000000123");
        let expected_signature = hex::encode(mac.finalize().into_bytes());

        let mock = server
            .mock("POST", "/api/v3/order")
            .match_header("X-MBX-APIKEY", "test-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()),
                Matcher::UrlEncoded("side".into(), "BUY".into()),
                Matcher::UrlEncoded("type".into(), "MARKET".into()),
                Matcher::UrlEncoded("quantity".into(), "0.001".into()),
                Matcher::UrlEncoded("timestamp".into(), "1700000000123".into()),
                Matcher::UrlEncoded("signature".into(), expected_signature.clone()),
            ]))
            .with_status(200)
            .with_body(r#"{"symbol":"BTCUSDT","orderId":99,"side":"BUY","executedQty":"0.001","fills":[{"price":"65000.10","qty":"0.001"}]}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&settings(&server.url())).unwrap();
        let signed = client.sign_order(request).unwrap();
        assert_eq!(signed.signature, expected_signature);

        let response = client.submit_order(&signed).await.unwrap();
        mock.assert_async().await;

        let result = response.into_order_result();
        assert_eq!(result.order_id, "99");
        assert_eq!(result.price, FillPrice::Fill(dec!(65000.10)));
    }

    #[tokio::test]
    async fn rejected_order_keeps_raw_exchange_payload() {
        let mut server = mockito::Server::new_async().await;
        let payload = r#"{"code":-2010,"msg":"Account has insufficient balance for requested action."}"#;
        server
            .mock("POST", "/api/v3/order")
            .match_query(Matcher::Regex("signature=[0-9a-f]{64}$".into()))
            .with_status(400)
            .with_body(payload)
            .create_async()
            .await;

        let client = ApiClient::new(&settings(&server.url())).unwrap();
        let err = client.place_market_order(&btc(), Side::Sell, dec!(1)).await.unwrap_err();

        match err {
            Error::ApiError { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, payload);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Accepts connections and never answers.
    async fn silent_exchange() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn unresponsive_exchange_times_out_as_market_data_unavailable() {
        let client = ApiClient::new(&BinanceSettings {
            request_timeout_secs: 1,
            ..settings(&silent_exchange().await)
        })
        .unwrap();

        let err = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            client.fetch_closes(&btc(), &five_minutes(), 20),
        )
        .await
        .expect("request timeout was not enforced")
        .unwrap_err();

        assert!(matches!(err, Error::MarketDataUnavailable(_)));
    }

    #[tokio::test]
    async fn unresponsive_exchange_times_out_order_submission() {
        let client = ApiClient::new(&BinanceSettings {
            request_timeout_secs: 1,
            ..settings(&silent_exchange().await)
        })
        .unwrap();

        let err = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            client.place_market_order(&btc(), Side::Buy, dec!(1)),
        )
        .await
        .expect("request timeout was not enforced")
        .unwrap_err();

        match err {
            Error::RequestFailed(e) => assert!(e.is_timeout()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_never_exposes_the_signed_query() {
        let client = ApiClient::new(&settings("http://127.0.0.1:1")).unwrap();

        let err = client.place_market_order(&btc(), Side::Buy, dec!(1)).await.unwrap_err();

        assert!(matches!(err, Error::RequestFailed(_)));
        let text = format!("{err} {err:?}");
        assert!(!text.contains("signature="), "{text}");
        assert!(!text.contains("timestamp="), "{text}");
    }
}
