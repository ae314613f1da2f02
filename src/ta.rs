// src/ta.rs
// Rolling statistics over price series

// Calculate Simple Moving Average (SMA) for every complete window
pub fn calculate_sma(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    prices
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / period as f64)
        .collect()
}

// Trailing SMA aligned with the input: one entry per price, `None` until
// `period` values are available
pub fn rolling_mean(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let sma = calculate_sma(prices, period);
    let warmup = prices.len() - sma.len();

    std::iter::repeat(None)
        .take(warmup)
        .chain(sma.into_iter().map(Some))
        .collect()
}
