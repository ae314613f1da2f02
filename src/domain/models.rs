// src/domain/models.rs
use chrono::NaiveDateTime;
use std::fmt;

/// Order submission reconstructed from an "Order added" log line
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub price: f64,
    pub quantity: u64,
}

/// Side as written by the engine.
///
/// The engine log is not validated against buy/sell, so anything else is
/// kept verbatim in `Other` and falls out of both side partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
    Other(String),
}

impl OrderSide {
    pub fn as_str(&self) -> &str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
            OrderSide::Other(raw) => raw,
        }
    }
}

impl From<&str> for OrderSide {
    fn from(raw: &str) -> Self {
        match raw {
            "buy" => OrderSide::Buy,
            "sell" => OrderSide::Sell,
            other => OrderSide::Other(other.to_string()),
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trade reported by a "Matched Order" log line.
///
/// Holds order ids only; the orders themselves are looked up by id and may
/// be missing from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub buy_order_id: String,
    pub sell_order_id: String,
    pub quantity: u64,
}

/// Synthetic candle built from one matched order
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvRow {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    /// Trailing mean of `close`; `None` until the window is full
    pub moving_average: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("buy", OrderSide::Buy)]
    #[case("sell", OrderSide::Sell)]
    #[case("Buy", OrderSide::Other("Buy".to_string()))]
    #[case("hold", OrderSide::Other("hold".to_string()))]
    fn side_from_raw_is_exact(#[case] raw: &str, #[case] expected: OrderSide) {
        let side = OrderSide::from(raw);
        assert_eq!(side, expected);
        assert_eq!(side.as_str(), raw);
    }
}
