// src/main.rs
use order_plot::chart::Chart;
use order_plot::config::Config;
use order_plot::domain::errors::AppResult;
use order_plot::pipeline;

fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting order_plot v{}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Reading {} ({:?} chart)",
        config.input.log_path,
        config.chart.mode
    );

    let chart = pipeline::run(&config)?;

    match &chart {
        Chart::Scatter(series) => log::info!(
            "Plotted {} buy, {} sell and {} matched prices",
            series.buy_prices.len(),
            series.sell_prices.len(),
            series.matched_prices.len()
        ),
        Chart::Candlestick(series) => {
            log::info!("Plotted {} candlesticks", series.rows.len())
        }
    }

    log::info!("Done. Chart written to {}", config.chart.output_path);
    Ok(())
}
