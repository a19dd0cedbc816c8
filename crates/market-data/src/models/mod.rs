//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `types` - Type aliases for common identifiers (Currency)
//! - `quote` - Latest price quotes (PriceQuote)
//! - `history` - Daily closing series (PricePoint, YearHistory)

mod history;
mod quote;
mod types;

pub use history::{PricePoint, YearHistory};
pub use quote::PriceQuote;
pub use types::Currency;
