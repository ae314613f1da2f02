// src/lib.rs
// Main library module declarations

pub mod chart;
pub mod config;
pub mod domain;
pub mod log_parser;
pub mod pipeline;
pub mod series;
pub mod ta;
