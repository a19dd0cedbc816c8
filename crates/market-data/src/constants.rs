//! Cache policy and provider constants.

use std::time::Duration;

/// Source identifiers
pub const FINNHUB_SOURCE: &str = "FINNHUB";
pub const STOOQ_SOURCE: &str = "stooq";
pub const PROXY_SOURCE: &str = "PROXY";

/// How long a live quote is trusted.
pub const DEFAULT_QUOTE_TTL: Duration = Duration::from_secs(60);

/// Upper bound for a single quote fetch; exceeding it counts as a transient failure.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(4);

/// How long a history series (or a failed history lookup) is trusted.
pub const DEFAULT_HISTORY_TTL: Duration = Duration::from_secs(60 * 60);

/// How long an FX rate is trusted.
pub const DEFAULT_FX_TTL: Duration = Duration::from_secs(5 * 60);

/// Unfiltered history requests keep roughly one trading year.
pub const HISTORY_MAX_POINTS: usize = 260;

/// HTTP client timeout for provider requests.
pub const HTTP_CLIENT_TIMEOUT: Duration = Duration::from_secs(30);
