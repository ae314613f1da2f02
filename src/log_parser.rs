// src/log_parser.rs
use crate::domain::errors::AppResult;
use crate::domain::models::{Match, Order, OrderSide};
use regex::{Captures, Regex};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const ORDER_ADDED_MARKER: &str = "Order added";
const MATCHED_ORDER_MARKER: &str = "Matched Order";

const ORDER_ADDED_PATTERN: &str =
    r"Order added: (\w+), Symbol: (\w+), Side: (\w+), Price: ([\d.]+), Quantity: (\d+)";
const MATCHED_ORDER_PATTERN: &str =
    r"Matched Order! Buy Order ID: (\w+) Sell Order ID: (\w+) Quantity: (\d+)";

/// Record extracted from a single log line
#[derive(Debug, Clone, PartialEq)]
pub enum LogRecord {
    Order(Order),
    Match(Match),
}

/// Line shape selected by marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    OrderAdded,
    MatchedOrder,
}

/// What happened to one line of the log
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Marker present and all fields extracted
    Parsed(LogRecord),
    /// Marker present but the line did not fit its pattern
    Skipped(LineKind),
    /// No marker
    Ignored,
}

/// Counters gathered during a parse pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines: usize,
    pub orders: usize,
    pub matches: usize,
    pub skipped: usize,
}

/// Orders and matches in log order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    pub orders: Vec<Order>,
    pub matches: Vec<Match>,
    pub stats: ParseStats,
}

impl ParsedLog {
    fn record(&mut self, line_no: usize, outcome: LineOutcome) {
        self.stats.lines += 1;
        match outcome {
            LineOutcome::Parsed(LogRecord::Order(order)) => {
                self.stats.orders += 1;
                self.orders.push(order);
            }
            LineOutcome::Parsed(LogRecord::Match(matched)) => {
                self.stats.matches += 1;
                self.matches.push(matched);
            }
            LineOutcome::Skipped(kind) => {
                self.stats.skipped += 1;
                log::debug!("Skipping malformed {:?} line {}", kind, line_no);
            }
            LineOutcome::Ignored => {}
        }
    }
}

/// Extracts orders and matches from engine log lines
#[derive(Debug, Clone)]
pub struct LogParser {
    order_added: Regex,
    matched_order: Regex,
}

impl LogParser {
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            order_added: Regex::new(ORDER_ADDED_PATTERN)?,
            matched_order: Regex::new(MATCHED_ORDER_PATTERN)?,
        })
    }

    /// Classify a single line.
    ///
    /// A line carrying the "Order added" marker is only ever tried against
    /// the order pattern, even if it also mentions "Matched Order".
    pub fn classify(&self, line: &str) -> LineOutcome {
        if line.contains(ORDER_ADDED_MARKER) {
            self.order_added
                .captures(line)
                .and_then(|caps| order_from_captures(&caps))
                .map(|order| LineOutcome::Parsed(LogRecord::Order(order)))
                .unwrap_or(LineOutcome::Skipped(LineKind::OrderAdded))
        } else if line.contains(MATCHED_ORDER_MARKER) {
            self.matched_order
                .captures(line)
                .and_then(|caps| match_from_captures(&caps))
                .map(|matched| LineOutcome::Parsed(LogRecord::Match(matched)))
                .unwrap_or(LineOutcome::Skipped(LineKind::MatchedOrder))
        } else {
            LineOutcome::Ignored
        }
    }

    /// Parse already-read lines
    pub fn parse_lines<I, S>(&self, lines: I) -> ParsedLog
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = ParsedLog::default();
        for (idx, line) in lines.into_iter().enumerate() {
            parsed.record(idx + 1, self.classify(line.as_ref()));
        }
        parsed
    }

    /// Parse a reader in one pass; any read error aborts the parse
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> AppResult<ParsedLog> {
        let mut parsed = ParsedLog::default();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            parsed.record(idx + 1, self.classify(&line));
        }
        Ok(parsed)
    }

    /// Open and parse a log file
    pub fn read_log_file<P: AsRef<Path>>(&self, path: P) -> AppResult<ParsedLog> {
        let file = File::open(path.as_ref())?;
        let parsed = self.parse_reader(BufReader::new(file))?;

        log::info!(
            "Parsed {}: {} lines, {} orders, {} matches, {} skipped",
            path.as_ref().display(),
            parsed.stats.lines,
            parsed.stats.orders,
            parsed.stats.matches,
            parsed.stats.skipped
        );

        Ok(parsed)
    }
}

fn order_from_captures(caps: &Captures) -> Option<Order> {
    Some(Order {
        order_id: caps[1].to_string(),
        symbol: caps[2].to_string(),
        side: OrderSide::from(&caps[3]),
        price: caps[4].parse().ok()?,
        quantity: caps[5].parse().ok()?,
    })
}

fn match_from_captures(caps: &Captures) -> Option<Match> {
    Some(Match {
        buy_order_id: caps[1].to_string(),
        sell_order_id: caps[2].to_string(),
        quantity: caps[3].parse().ok()?,
    })
}
