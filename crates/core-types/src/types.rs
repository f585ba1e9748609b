// In crates/core-types/src/types.rs

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A trading pair symbol as the exchange spells it (e.g., "BTCUSDT").
///
/// Only ASCII alphanumerics are accepted, so a symbol can be placed into a
/// query string without any escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(pub String);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidSymbol(s.to_string()));
        }
        Ok(Symbol(trimmed.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for Symbol {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kline granularities accepted by the exchange's market-data endpoint.
const SUPPORTED_INTERVALS: &[&str] = &[
    "1s", "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w",
    "1M",
];

/// A validated kline interval (e.g., "5m").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Interval(String);

impl Interval {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval("5m".to_string())
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if SUPPORTED_INTERVALS.contains(&trimmed) {
            Ok(Interval(trimmed.to_string()))
        } else {
            Err(Error::InvalidInterval(s.to_string()))
        }
    }
}

impl TryFrom<String> for Interval {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(interval: Interval) -> Self {
        interval.0
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single OHLC candle as returned by the klines endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: i64,
}

/// The direction of a market order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The exchange's wire spelling of the side.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(Error::InvalidSide(s.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The directional output of a strategy assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    /// No crossover happened; nothing to do this cycle.
    Hold,
}

impl Signal {
    /// The order side this signal asks for, if any.
    pub fn side(&self) -> Option<Side> {
        match self {
            Signal::Buy => Some(Side::Buy),
            Signal::Sell => Some(Side::Sell),
            Signal::Hold => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => f.write_str("BUY"),
            Signal::Sell => f.write_str("SELL"),
            Signal::Hold => f.write_str("NONE"),
        }
    }
}

/// The fast and slow moving averages computed from one close series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovingAveragePair {
    pub fast: Decimal,
    pub slow: Decimal,
}

impl MovingAveragePair {
    pub fn new(fast: Decimal, slow: Decimal) -> Self {
        Self { fast, slow }
    }
}

/// An unsigned market order.
///
/// The field order of [`OrderRequest::canonical_query`] is part of the
/// exchange contract: the signature is computed over exactly that string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: Decimal,
    /// Milliseconds since the Unix epoch at the time the request was built.
    pub timestamp: i64,
}

impl OrderRequest {
    pub const ORDER_TYPE: &'static str = "MARKET";

    pub fn market(symbol: Symbol, side: Side, quantity: Decimal, timestamp: i64) -> Self {
        Self {
            symbol,
            side,
            quantity,
            timestamp,
        }
    }

    /// `symbol=..&side=..&type=MARKET&quantity=..&timestamp=..`
    pub fn canonical_query(&self) -> String {
        format!(
            "symbol={}&side={}&type={}&quantity={}&timestamp={}",
            self.symbol,
            self.side,
            Self::ORDER_TYPE,
            self.quantity.normalize(),
            self.timestamp
        )
    }
}

/// The price at which an order was filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPrice {
    Fill(Decimal),
    /// The exchange response carried no fills.
    Market,
}

impl Serialize for FillPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FillPrice::Fill(price) => serializer.serialize_str(&price.normalize().to_string()),
            FillPrice::Market => serializer.serialize_str("market"),
        }
    }
}

impl fmt::Display for FillPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillPrice::Fill(price) => write!(f, "{}", price.normalize()),
            FillPrice::Market => f.write_str("market"),
        }
    }
}

/// The outcome of a successfully submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResult {
    pub order_id: String,
    pub side: Side,
    pub executed_qty: Decimal,
    pub price: FillPrice,
}
