// src/series.rs
use crate::config::SeriesConfig;
use crate::domain::models::{Match, OhlcvRow, Order, OrderSide};
use crate::ta::rolling_mean;
use chrono::Duration;
use std::collections::HashSet;

/// Lookup of the order ids present in the order sequence.
///
/// Matches resolve against it by id; ids it does not hold are dangling.
#[derive(Debug, Clone)]
pub struct OrderIndex<'a> {
    ids: HashSet<&'a str>,
}

impl<'a> OrderIndex<'a> {
    pub fn new(orders: &'a [Order]) -> Self {
        Self {
            ids: orders.iter().map(|order| order.order_id.as_str()).collect(),
        }
    }

    pub fn contains(&self, order_id: &str) -> bool {
        self.ids.contains(order_id)
    }

    /// Match-side ids with no order behind them, in match order
    pub fn dangling_ids<'m>(&self, matches: &'m [Match]) -> Vec<&'m str> {
        matches
            .iter()
            .flat_map(|m| [m.buy_order_id.as_str(), m.sell_order_id.as_str()])
            .filter(|id| !self.contains(id))
            .collect()
    }
}

/// Series behind the buy/sell/matched price comparison
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScatterSeries {
    pub buy_prices: Vec<f64>,
    pub sell_prices: Vec<f64>,
    pub matched_prices: Vec<f64>,
    pub matched_quantities: Vec<u64>,
}

/// Rows behind the candlestick and volume chart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandlestickSeries {
    pub rows: Vec<OhlcvRow>,
    pub moving_average_window: usize,
}

impl CandlestickSeries {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&OhlcvRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&OhlcvRow> {
        self.rows.last()
    }
}

/// Derives chart series from parsed orders and matches
#[derive(Debug, Clone, Default)]
pub struct SeriesBuilder {
    config: SeriesConfig,
}

impl SeriesBuilder {
    pub fn new(config: SeriesConfig) -> Self {
        Self { config }
    }

    pub fn buy_prices(orders: &[Order]) -> Vec<f64> {
        prices_for_side(orders, &OrderSide::Buy)
    }

    pub fn sell_prices(orders: &[Order]) -> Vec<f64> {
        prices_for_side(orders, &OrderSide::Sell)
    }

    /// Every id named on either side of any match
    pub fn matched_order_ids(matches: &[Match]) -> HashSet<&str> {
        matches
            .iter()
            .flat_map(|m| [m.buy_order_id.as_str(), m.sell_order_id.as_str()])
            .collect()
    }

    /// Orders whose id appears in any match, in order-sequence order.
    ///
    /// Each order appears at most once however many matches name it.
    pub fn matched_orders<'a>(orders: &'a [Order], matches: &[Match]) -> Vec<&'a Order> {
        let matched_ids = Self::matched_order_ids(matches);
        orders
            .iter()
            .filter(|order| matched_ids.contains(order.order_id.as_str()))
            .collect()
    }

    pub fn build_scatter(&self, orders: &[Order], matches: &[Match]) -> ScatterSeries {
        let matched = Self::matched_orders(orders, matches);

        ScatterSeries {
            buy_prices: Self::buy_prices(orders),
            sell_prices: Self::sell_prices(orders),
            matched_prices: matched.iter().map(|order| order.price).collect(),
            matched_quantities: matched.iter().map(|order| order.quantity).collect(),
        }
    }

    /// One synthetic candle per matched order.
    ///
    /// open == close == price, high/low sit `price_offset` away, timestamps
    /// advance one tick per row from `start`. Rows whose timestamp would fall
    /// outside the representable calendar are dropped from the end.
    pub fn build_candlesticks(&self, orders: &[Order], matches: &[Match]) -> CandlestickSeries {
        let matched = Self::matched_orders(orders, matches);
        let closes: Vec<f64> = matched.iter().map(|order| order.price).collect();
        let averages = rolling_mean(&closes, self.config.moving_average_window);
        let tick = Duration::try_seconds(self.config.tick_interval_secs);
        let offset = self.config.price_offset;

        let mut rows: Vec<OhlcvRow> = Vec::with_capacity(matched.len());
        for (order, moving_average) in matched.iter().zip(averages) {
            let next = match rows.last() {
                None => Some(self.config.start),
                Some(prev) => tick.and_then(|tick| prev.timestamp.checked_add_signed(tick)),
            };
            let Some(timestamp) = next else {
                log::warn!(
                    "Synthetic timestamps overflow after {} rows, dropping {} matched orders",
                    rows.len(),
                    matched.len() - rows.len()
                );
                break;
            };

            rows.push(OhlcvRow {
                timestamp,
                open: order.price,
                high: order.price + offset,
                low: order.price - offset,
                close: order.price,
                volume: order.quantity,
                moving_average,
            });
        }

        CandlestickSeries {
            rows,
            moving_average_window: self.config.moving_average_window,
        }
    }
}

fn prices_for_side(orders: &[Order], side: &OrderSide) -> Vec<f64> {
    orders
        .iter()
        .filter(|order| &order.side == side)
        .map(|order| order.price)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn order(id: &str, side: &str, price: f64, quantity: u64) -> Order {
        Order {
            order_id: id.to_string(),
            symbol: "AAPL".to_string(),
            side: OrderSide::from(side),
            price,
            quantity,
        }
    }

    fn matched(buy: &str, sell: &str, quantity: u64) -> Match {
        Match {
            buy_order_id: buy.to_string(),
            sell_order_id: sell.to_string(),
            quantity,
        }
    }

    #[fixture]
    fn builder() -> SeriesBuilder {
        SeriesBuilder::new(SeriesConfig::default())
    }

    #[rstest]
    fn scatter_for_single_match(builder: SeriesBuilder) {
        let orders = vec![order("A", "buy", 10.0, 5), order("B", "sell", 12.0, 3)];
        let matches = vec![matched("A", "B", 3)];

        let series = builder.build_scatter(&orders, &matches);

        assert_eq!(
            series,
            ScatterSeries {
                buy_prices: vec![10.0],
                sell_prices: vec![12.0],
                matched_prices: vec![10.0, 12.0],
                matched_quantities: vec![5, 3],
            }
        );
    }

    #[rstest]
    fn no_matches_gives_empty_matched_series(builder: SeriesBuilder) {
        let orders = vec![order("A", "buy", 10.0, 5)];

        let scatter = builder.build_scatter(&orders, &[]);
        assert!(scatter.matched_prices.is_empty());
        assert!(scatter.matched_quantities.is_empty());
        assert!(builder.build_candlesticks(&orders, &[]).is_empty());
    }

    #[rstest]
    fn empty_input_builds_empty_series(builder: SeriesBuilder) {
        assert_eq!(builder.build_scatter(&[], &[]), ScatterSeries::default());
        let candles = builder.build_candlesticks(&[], &[]);
        assert!(candles.rows.is_empty());
        assert!(candles.first().is_none() && candles.last().is_none());
    }

    #[rstest]
    fn dangling_ids_contribute_nothing(builder: SeriesBuilder) {
        let orders = vec![order("A", "buy", 10.0, 5), order("B", "sell", 12.0, 3)];
        let matches = vec![matched("A", "GHOST", 2)];

        let series = builder.build_scatter(&orders, &matches);
        assert_eq!(series.matched_prices, vec![10.0]);
        assert_eq!(series.matched_quantities, vec![5]);

        let index = OrderIndex::new(&orders);
        assert_eq!(index.dangling_ids(&matches), vec!["GHOST"]);
    }

    #[rstest]
    fn order_named_by_several_matches_appears_once(builder: SeriesBuilder) {
        let orders = vec![
            order("A", "buy", 10.0, 5),
            order("B", "sell", 9.0, 2),
            order("C", "sell", 9.5, 3),
        ];
        let matches = vec![matched("A", "B", 2), matched("A", "C", 3)];

        let series = builder.build_scatter(&orders, &matches);
        assert_eq!(series.matched_prices, vec![10.0, 9.0, 9.5]);
        assert_eq!(series.matched_quantities, vec![5, 2, 3]);
    }

    #[rstest]
    fn reused_id_keeps_every_submission(builder: SeriesBuilder) {
        let orders = vec![order("A", "buy", 10.0, 5), order("A", "buy", 11.0, 6)];
        let matches = vec![matched("A", "Z", 1)];

        let series = builder.build_scatter(&orders, &matches);
        assert_eq!(series.matched_prices, vec![10.0, 11.0]);

        let index = OrderIndex::new(&orders);
        assert!(index.contains("A"));
        assert_eq!(index.dangling_ids(&matches), vec!["Z"]);
    }

    #[test]
    fn unknown_side_is_in_neither_partition() {
        let orders = vec![
            order("A", "buy", 10.0, 1),
            order("B", "BUY", 11.0, 1),
            order("C", "sell", 12.0, 1),
            order("D", "hold", 13.0, 1),
        ];
        assert_eq!(SeriesBuilder::buy_prices(&orders), vec![10.0]);
        assert_eq!(SeriesBuilder::sell_prices(&orders), vec![12.0]);
    }

    #[test]
    fn matched_ids_are_a_set() {
        let matches = vec![matched("A", "B", 1), matched("A", "C", 1)];
        let ids = SeriesBuilder::matched_order_ids(&matches);
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("A") && ids.contains("B") && ids.contains("C"));
    }

    #[rstest]
    fn candles_use_offset_and_ticks(builder: SeriesBuilder) {
        let orders = vec![order("A", "buy", 10.0, 5), order("B", "sell", 12.0, 3)];
        let matches = vec![matched("A", "B", 3)];

        let series = builder.build_candlesticks(&orders, &matches);
        let start = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert_eq!(
            series.rows,
            vec![
                OhlcvRow {
                    timestamp: start,
                    open: 10.0,
                    high: 11.0,
                    low: 9.0,
                    close: 10.0,
                    volume: 5,
                    moving_average: None,
                },
                OhlcvRow {
                    timestamp: start + Duration::minutes(1),
                    open: 12.0,
                    high: 13.0,
                    low: 11.0,
                    close: 12.0,
                    volume: 3,
                    moving_average: None,
                },
            ]
        );
    }

    #[test]
    fn candles_follow_alternate_config() {
        let config = SeriesConfig {
            start: NaiveDate::from_ymd_opt(2023, 6, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            tick_interval_secs: 5,
            price_offset: 0.25,
            moving_average_window: 2,
        };
        let builder = SeriesBuilder::new(config.clone());
        let orders = vec![
            order("A", "buy", 10.0, 1),
            order("B", "sell", 12.0, 1),
            order("C", "buy", 14.0, 1),
        ];
        let matches = vec![matched("A", "B", 1), matched("C", "B", 1)];

        let series = builder.build_candlesticks(&orders, &matches);

        let times: Vec<_> = series.rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(
            times,
            vec![
                config.start,
                config.start + Duration::seconds(5),
                config.start + Duration::seconds(10),
            ]
        );
        let averages: Vec<_> = series.rows.iter().map(|r| r.moving_average).collect();
        assert_eq!(averages, vec![None, Some(11.0), Some(13.0)]);
        assert_eq!(series.rows[0].high, 10.25);
        assert_eq!(series.rows[0].low, 9.75);
        assert_eq!(series.moving_average_window, 2);
    }

    fn config_with(start: chrono::NaiveDateTime, tick_interval_secs: i64) -> SeriesConfig {
        SeriesConfig {
            start,
            tick_interval_secs,
            ..SeriesConfig::default()
        }
    }

    fn three_matched() -> (Vec<Order>, Vec<Match>) {
        let orders = vec![
            order("A", "buy", 10.0, 1),
            order("B", "sell", 11.0, 1),
            order("C", "buy", 12.0, 1),
        ];
        let matches = vec![matched("A", "B", 1), matched("C", "B", 1)];
        (orders, matches)
    }

    #[test]
    fn last_row_at_calendar_end_does_not_overflow() {
        let end = NaiveDate::MAX.and_hms_opt(23, 59, 0).unwrap();
        let builder = SeriesBuilder::new(config_with(end, 60));
        let orders = vec![order("A", "buy", 10.0, 1)];
        let matches = vec![matched("A", "Z", 1)];

        let series = builder.build_candlesticks(&orders, &matches);

        assert_eq!(series.rows.len(), 1);
        assert_eq!(series.rows[0].timestamp, end);
    }

    #[test]
    fn timestamp_overflow_truncates_series() {
        let near_end = NaiveDate::MAX.and_hms_opt(23, 58, 30).unwrap();
        let builder = SeriesBuilder::new(config_with(near_end, 60));
        let (orders, matches) = three_matched();

        let series = builder.build_candlesticks(&orders, &matches);

        let closes: Vec<f64> = series.rows.iter().map(|r| r.close).collect();
        assert_eq!(closes, vec![10.0, 11.0]);
        assert_eq!(series.rows[1].timestamp, NaiveDate::MAX.and_hms_opt(23, 59, 30).unwrap());
    }

    #[rstest]
    #[case::beyond_duration_range(i64::MAX)]
    #[case::beyond_calendar(10_000_000_000_000)]
    fn oversized_tick_keeps_first_row(#[case] tick: i64) {
        let builder = SeriesBuilder::new(config_with(SeriesConfig::default().start, tick));
        let (orders, matches) = three_matched();

        let series = builder.build_candlesticks(&orders, &matches);

        assert_eq!(series.rows.len(), 1);
        assert_eq!(series.rows[0].timestamp, SeriesConfig::default().start);
    }

    #[rstest]
    fn moving_average_matches_window_mean(builder: SeriesBuilder) {
        let orders: Vec<Order> = (0..45)
            .map(|i| order(&format!("O{}", i), "buy", 100.0 + (i as f64 * 0.37).sin() * 5.0, 1))
            .collect();
        let matches: Vec<Match> = orders
            .iter()
            .map(|o| matched(&o.order_id, "S", 1))
            .collect();

        let series = builder.build_candlesticks(&orders, &matches);
        let closes: Vec<f64> = series.rows.iter().map(|r| r.close).collect();
        assert_eq!(series.rows.len(), 45);

        for (i, row) in series.rows.iter().enumerate() {
            if i < 19 {
                assert!(row.moving_average.is_none(), "row {} should be warming up", i);
            } else {
                let expected = closes[i - 19..=i].iter().sum::<f64>() / 20.0;
                let actual = row.moving_average.unwrap();
                assert!((actual - expected).abs() < 1e-9, "row {}: {} vs {}", i, actual, expected);
            }
        }
    }
}
