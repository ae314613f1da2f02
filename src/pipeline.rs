// src/pipeline.rs
// Log file -> series -> chart artifact

use crate::chart::{Chart, ChartRenderer, HtmlChartRenderer};
use crate::config::{ChartMode, Config};
use crate::domain::errors::AppResult;
use crate::log_parser::{LogParser, ParsedLog};
use crate::series::{OrderIndex, SeriesBuilder};

/// Build the chart data for `mode` from a parsed log
pub fn build_chart(mode: ChartMode, builder: &SeriesBuilder, parsed: &ParsedLog) -> Chart {
    let dangling = OrderIndex::new(&parsed.orders).dangling_ids(&parsed.matches);
    if !dangling.is_empty() {
        log::debug!("{} match ids have no order in the log", dangling.len());
    }

    match mode {
        ChartMode::Scatter => Chart::Scatter(builder.build_scatter(&parsed.orders, &parsed.matches)),
        ChartMode::Candlestick => {
            Chart::Candlestick(builder.build_candlesticks(&parsed.orders, &parsed.matches))
        }
    }
}

/// Parse the configured log and render it with `renderer`
pub fn run_with<R: ChartRenderer>(config: &Config, renderer: &R) -> AppResult<Chart> {
    config.validate()?;

    let parser = LogParser::new()?;
    let parsed = parser.read_log_file(&config.input.log_path)?;

    let builder = SeriesBuilder::new(config.series.clone());
    let chart = build_chart(config.chart.mode, &builder, &parsed);

    renderer.render(&chart)?;
    Ok(chart)
}

/// Parse the configured log and write the HTML chart to the configured path
pub fn run(config: &Config) -> AppResult<Chart> {
    let renderer = HtmlChartRenderer::new(&config.chart.output_path);
    run_with(config, &renderer)
}
