// src/config.rs
use crate::domain::errors::{AppError, AppResult};
use chrono::{NaiveDate, NaiveDateTime};
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::path::Path;

const CONFIG_FILE_VAR: &str = "ORDER_PLOT_CONFIG";

// Upper bound on the synthetic tick (one day)
const MAX_TICK_INTERVAL_SECS: i64 = 86_400;

/// Order plot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Engine log input
    pub input: InputConfig,

    /// Chart output
    pub chart: ChartConfig,

    /// Synthetic series parameters
    pub series: SeriesConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Engine log input configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path of the engine event log
    pub log_path: String,
}

/// Which figure to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    Scatter,
    Candlestick,
}

impl std::str::FromStr for ChartMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scatter" => Ok(ChartMode::Scatter),
            "candlestick" => Ok(ChartMode::Candlestick),
            other => Err(AppError::Config(format!("Unknown chart mode: {}", other))),
        }
    }
}

/// Chart output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Figure layout
    pub mode: ChartMode,

    /// Path of the generated HTML page
    pub output_path: String,
}

/// Constants used to synthesize candlestick rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Timestamp of the first row
    pub start: NaiveDateTime,

    /// Seconds between consecutive rows
    pub tick_interval_secs: i64,

    /// Distance of high/low from the matched price
    pub price_offset: f64,

    /// Number of rows in the trailing moving average
    pub moving_average_window: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            start: default_series_start(),
            tick_interval_secs: 60,
            price_offset: 1.0,
            moving_average_window: 20,
        }
    }
}

fn default_series_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Config::default();

        let input_config = InputConfig {
            log_path: env::var("ORDER_LOG_PATH").unwrap_or(defaults.input.log_path),
        };

        let chart_config = ChartConfig {
            mode: match env::var("CHART_MODE") {
                Ok(raw) => raw.parse()?,
                Err(_) => defaults.chart.mode,
            },
            output_path: env::var("CHART_OUTPUT_PATH").unwrap_or(defaults.chart.output_path),
        };

        let series_config = SeriesConfig {
            start: env::var("SERIES_START")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.series.start),
            tick_interval_secs: env::var("SERIES_TICK_SECONDS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.series.tick_interval_secs),
            price_offset: env::var("SERIES_PRICE_OFFSET")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.series.price_offset),
            moving_average_window: env::var("SERIES_MA_WINDOW")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.series.moving_average_window),
        };

        let logging_config = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env::var("LOG_TO_FILE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        Ok(Config {
            input: input_config,
            chart: chart_config,
            series: series_config,
            logging: logging_config,
        })
    }

    /// Load from the JSON file named by `ORDER_PLOT_CONFIG`, or from the
    /// environment when it is unset
    pub fn load() -> AppResult<Self> {
        dotenv().ok();
        match env::var(CONFIG_FILE_VAR) {
            Ok(path) => Self::from_file(path),
            Err(_) => Self::from_env(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Reject series parameters that cannot produce a chart
    pub fn validate(&self) -> AppResult<()> {
        if self.series.moving_average_window == 0 {
            return Err(AppError::Config(
                "Moving average window must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_TICK_INTERVAL_SECS).contains(&self.series.tick_interval_secs) {
            return Err(AppError::Config(format!(
                "Tick interval must be between 1s and {}s, got {}s",
                MAX_TICK_INTERVAL_SECS, self.series.tick_interval_secs
            )));
        }
        if !self.series.price_offset.is_finite() || self.series.price_offset < 0.0 {
            return Err(AppError::Config(format!(
                "Price offset must be finite and non-negative, got {}",
                self.series.price_offset
            )));
        }
        Ok(())
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        let log_level = self
            .logging
            .level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info);

        builder.filter_level(log_level);

        // Configure output
        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path).map_err(|e| {
                    AppError::Config(format!("Failed to create log file: {}", e))
                })?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        builder
            .try_init()
            .map_err(|e| AppError::Config(format!("Failed to initialize logger: {}", e)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig {
                log_path: "order_log.txt".to_string(),
            },
            chart: ChartConfig {
                mode: ChartMode::Candlestick,
                output_path: "order_plot.html".to_string(),
            },
            series: SeriesConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}
