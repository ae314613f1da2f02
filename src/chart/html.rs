// src/chart/html.rs
// Plotly-backed HTML output

use super::{Chart, ChartRenderer};
use crate::domain::errors::{AppResult, RenderError, RenderResult};
use crate::domain::models::OhlcvRow;
use crate::series::{CandlestickSeries, ScatterSeries};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const PLOT_DIV_ID: &str = "order-plot";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Row heights and gap of the stacked candlestick layout
const PRICE_ROW_HEIGHT: f64 = 0.7;
const VERTICAL_SPACING: f64 = 0.02;

/// Writes a single HTML page that draws the chart with plotly.js
#[derive(Debug, Clone)]
pub struct HtmlChartRenderer {
    output_path: PathBuf,
}

impl HtmlChartRenderer {
    pub fn new<P: AsRef<Path>>(output_path: P) -> Self {
        Self {
            output_path: output_path.as_ref().to_path_buf(),
        }
    }

    /// Plotly figure (`data` + `layout`) for a chart
    pub fn figure(chart: &Chart) -> Value {
        match chart {
            Chart::Scatter(series) => scatter_figure(series),
            Chart::Candlestick(series) => candlestick_figure(series),
        }
    }

    /// Full HTML page for a chart
    pub fn to_html(chart: &Chart) -> RenderResult<String> {
        let figure = Self::figure(chart);
        let data = embed_json(&figure["data"])?;
        let layout = embed_json(&figure["layout"])?;

        Ok(format!(
            r#"<html>
<head><meta charset="utf-8" /><script src="{cdn}"></script></head>
<body>
<div id="{id}" style="height:100%; width:100%;"></div>
<script type="text/javascript">
Plotly.newPlot("{id}", {data}, {layout}, {{"responsive": true}});
</script>
</body>
</html>
"#,
            cdn = PLOTLY_CDN,
            id = PLOT_DIV_ID,
            data = data,
            layout = layout,
        ))
    }
}

impl ChartRenderer for HtmlChartRenderer {
    fn render(&self, chart: &Chart) -> AppResult<()> {
        let html = Self::to_html(chart)?;
        std::fs::write(&self.output_path, html).map_err(|source| RenderError::Output {
            path: self.output_path.display().to_string(),
            source,
        })?;
        log::info!("Chart written to {}", self.output_path.display());
        Ok(())
    }
}

// Keep embedded JSON from closing the surrounding script element
fn embed_json(value: &Value) -> RenderResult<String> {
    serde_json::to_string(value)
        .map(|raw| raw.replace("</", "<\\/"))
        .map_err(|e| RenderError::Template(e.to_string()))
}

fn index_axis(len: usize) -> Vec<usize> {
    (0..len).collect()
}

fn scatter_figure(series: &ScatterSeries) -> Value {
    let data = json!([
        {
            "type": "scatter",
            "x": index_axis(series.buy_prices.len()),
            "y": series.buy_prices,
            "mode": "markers",
            "name": "Buy Orders",
            "marker": {"color": "blue"},
            "xaxis": "x",
            "yaxis": "y",
        },
        {
            "type": "scatter",
            "x": index_axis(series.sell_prices.len()),
            "y": series.sell_prices,
            "mode": "markers",
            "name": "Sell Orders",
            "marker": {"color": "red"},
            "xaxis": "x",
            "yaxis": "y",
        },
        {
            "type": "scatter",
            "x": index_axis(series.matched_prices.len()),
            "y": series.matched_prices,
            "mode": "lines+markers",
            "name": "Matched Orders",
            "line": {"color": "green"},
            "xaxis": "x2",
            "yaxis": "y2",
        },
    ]);

    let layout = json!({
        "title": {"text": "Order Data"},
        "xaxis": {"domain": [0.0, 0.45], "anchor": "y", "title": {"text": "Order Index"}},
        "yaxis": {"domain": [0.0, 1.0], "anchor": "x", "title": {"text": "Price"}},
        "xaxis2": {"domain": [0.55, 1.0], "anchor": "y2"},
        "yaxis2": {"domain": [0.0, 1.0], "anchor": "x2"},
        "annotations": [
            subplot_title("Buy and Sell Orders", 0.225),
            subplot_title("Matched Order Prices", 0.775),
        ],
    });

    json!({"data": data, "layout": layout})
}

fn subplot_title(text: &str, x: f64) -> Value {
    json!({
        "text": text,
        "x": x,
        "y": 1.0,
        "xref": "paper",
        "yref": "paper",
        "xanchor": "center",
        "yanchor": "bottom",
        "showarrow": false,
    })
}

fn candlestick_figure(series: &CandlestickSeries) -> Value {
    let dates: Vec<String> = series
        .rows
        .iter()
        .map(|row| row.timestamp.format(TIMESTAMP_FORMAT).to_string())
        .collect();
    let volumes: Vec<u64> = series.rows.iter().map(|row| row.volume).collect();
    let averages: Vec<Option<f64>> = series.rows.iter().map(|row| row.moving_average).collect();
    let average_name = format!("MA{}", series.moving_average_window);

    let data = json!([
        {
            "type": "candlestick",
            "x": dates,
            "open": price_column(&series.rows, |row| row.open),
            "high": price_column(&series.rows, |row| row.high),
            "low": price_column(&series.rows, |row| row.low),
            "close": price_column(&series.rows, |row| row.close),
            "name": "Candlesticks",
            "xaxis": "x",
            "yaxis": "y",
        },
        {
            "type": "bar",
            "x": dates,
            "y": volumes,
            "name": "Volume",
            "xaxis": "x2",
            "yaxis": "y2",
        },
        {
            "type": "scatter",
            "x": dates,
            "y": averages,
            "mode": "lines",
            "name": average_name,
            "line": {"color": "orange"},
            "xaxis": "x",
            "yaxis": "y",
        },
    ]);

    // Start/End markers only make sense with at least one row
    let annotations: Vec<Value> = match (series.first(), series.last()) {
        (Some(first), Some(last)) => vec![
            arrow_annotation(&dates[0], first.close, "Start"),
            arrow_annotation(&dates[dates.len() - 1], last.close, "End"),
        ],
        _ => Vec::new(),
    };

    let half_gap = VERTICAL_SPACING / 2.0;
    let split = 1.0 - PRICE_ROW_HEIGHT;
    let layout = json!({
        "title": {"text": "Matched Orders Candlestick Chart"},
        "xaxis": {
            "domain": [0.0, 1.0],
            "anchor": "y",
            "matches": "x2",
            "showticklabels": false,
            "rangeslider": {"visible": false},
            "title": {"text": "Date"},
        },
        "yaxis": {"domain": [split + half_gap, 1.0], "anchor": "x", "title": {"text": "Price"}},
        "xaxis2": {"domain": [0.0, 1.0], "anchor": "y2", "title": {"text": "Date"}},
        "yaxis2": {"domain": [0.0, split - half_gap], "anchor": "x2", "title": {"text": "Volume"}},
        "annotations": annotations,
    });

    json!({"data": data, "layout": layout})
}

fn price_column(rows: &[OhlcvRow], field: impl Fn(&OhlcvRow) -> f64) -> Vec<f64> {
    rows.iter().map(field).collect()
}

fn arrow_annotation(x: &str, y: f64, text: &str) -> Value {
    json!({
        "x": x,
        "y": y,
        "xref": "x",
        "yref": "y",
        "text": text,
        "showarrow": true,
        "arrowhead": 1,
    })
}
