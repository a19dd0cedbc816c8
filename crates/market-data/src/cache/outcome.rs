//! Fallback policy for a single quote refresh.
//!
//! Kept apart from the cache mechanics so the policy can be read (and
//! tested) on its own: the cache only decides *when* to fetch, this module
//! decides *what the caller gets* once the fetch settles.

use crate::errors::MarketDataError;
use crate::models::PriceQuote;

/// Result of one refresh, before it is collapsed to `Option<f64>`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PriceOutcome {
    /// The provider returned a usable price.
    Live(f64),
    /// The provider could not be reached; this is the last good price.
    Stale(f64),
    /// No price is available. Cached as a negative entry.
    Unavailable,
}

impl PriceOutcome {
    /// Collapse to the public `number | false` contract.
    pub fn into_price(self) -> Option<f64> {
        match self {
            Self::Live(price) | Self::Stale(price) => Some(price),
            Self::Unavailable => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale(_))
    }
}

/// Decide what a refresh yields.
///
/// * usable price → [`PriceOutcome::Live`]
/// * transient failure with a previous successful value → [`PriceOutcome::Stale`]
/// * anything else → [`PriceOutcome::Unavailable`]
pub fn resolve_outcome(
    fetched: Result<PriceQuote, MarketDataError>,
    last_good: Option<f64>,
) -> PriceOutcome {
    match fetched {
        Ok(quote) if quote.price.is_finite() => PriceOutcome::Live(quote.price),
        Ok(_) => PriceOutcome::Unavailable,
        Err(e) if e.is_transient() => match last_good {
            Some(price) => PriceOutcome::Stale(price),
            None => PriceOutcome::Unavailable,
        },
        Err(_) => PriceOutcome::Unavailable,
    }
}
