//! CSV payload parsing for Stooq responses.

use chrono::NaiveDate;

use crate::constants::{HISTORY_MAX_POINTS, STOOQ_SOURCE};
use crate::errors::MarketDataError;
use crate::models::PricePoint;
use crate::provider::parse_leading_float;

/// Column index of `Close` in a `Symbol,Date,Time,Open,High,Low,Close,Volume` line.
const QUOTE_CLOSE_COLUMN: usize = 6;

/// Column index of `Close` in a `Date,Open,High,Low,Close,Volume` row.
const HISTORY_CLOSE_COLUMN: usize = 4;

const NO_DATA: &str = "N/D";

/// Read the close price out of a latest-quote CSV payload.
///
/// The payload is one `Symbol,Date,Time,Open,High,Low,Close,Volume` line,
/// optionally preceded by that header. Unknown symbols come back with every
/// field set to `N/D`.
pub(crate) fn parse_quote_csv(symbol: &str, text: &str) -> Result<f64, MarketDataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let record = reader
        .records()
        .filter_map(|r| r.ok())
        .filter(|r| !r.get(0).is_some_and(|f| f.eq_ignore_ascii_case("symbol")))
        .last()
        .ok_or_else(|| MarketDataError::invalid_payload(STOOQ_SOURCE, "empty quote payload"))?;

    if record.get(1) == Some(NO_DATA) {
        return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
    }

    record
        .get(QUOTE_CLOSE_COLUMN)
        .and_then(parse_leading_float)
        .filter(|p| p.is_finite())
        .ok_or_else(|| {
            MarketDataError::invalid_payload(
                STOOQ_SOURCE,
                format!("no numeric close in quote line for {}", symbol),
            )
        })
}

/// Parse a daily history CSV into ascending closes.
///
/// Rows with fewer than five columns, unparseable dates or unparseable
/// closes are skipped. Rows dated before `since` are dropped; without
/// `since` only the most recent [`HISTORY_MAX_POINTS`] rows are kept.
pub(crate) fn parse_history_csv(text: &str, since: Option<NaiveDate>) -> Vec<PricePoint> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut prices: Vec<PricePoint> = reader
        .records()
        .filter_map(|r| r.ok())
        .filter(|r| r.len() > HISTORY_CLOSE_COLUMN)
        .filter_map(|r| {
            let date = NaiveDate::parse_from_str(r.get(0)?, "%Y-%m-%d").ok()?;
            if since.is_some_and(|s| date < s) {
                return None;
            }
            let close = parse_leading_float(r.get(HISTORY_CLOSE_COLUMN)?)?;
            close.is_finite().then(|| PricePoint::new(date, close))
        })
        .collect();

    prices.sort_by_key(|p| p.date);

    if since.is_none() && prices.len() > HISTORY_MAX_POINTS {
        prices.drain(..prices.len() - HISTORY_MAX_POINTS);
    }

    prices
}
