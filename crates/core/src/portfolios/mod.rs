//! Named portfolios and the fixtures registry that loads them.

pub mod portfolio_model;
pub mod registry;

pub use portfolio_model::{Portfolio, PortfolioEntry, PortfolioInfo, LOCAL_FAMILY};
pub use registry::PortfolioRegistry;
