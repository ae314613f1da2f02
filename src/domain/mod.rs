// src/domain/mod.rs
pub mod errors;
pub mod models;

// Re-export common types for convenience
pub use errors::{AppError, AppResult, RenderError, RenderResult};
pub use models::{Match, OhlcvRow, Order, OrderSide};
