// src/chart/mod.rs
pub mod html;

use crate::domain::errors::AppResult;
use crate::series::{CandlestickSeries, ScatterSeries};

pub use html::HtmlChartRenderer;

/// Finalized data handed to a renderer
#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Scatter(ScatterSeries),
    Candlestick(CandlestickSeries),
}

/// Chart output interface
pub trait ChartRenderer {
    /// Produce the artifact for `chart`. Empty series must yield an empty
    /// chart, not an error.
    fn render(&self, chart: &Chart) -> AppResult<()>;
}
