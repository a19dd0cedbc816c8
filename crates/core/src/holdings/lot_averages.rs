//! Weighted-average cost basis from purchase lots.

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::holdings_model::{parse_numeric, Lot};

/// Decimal places kept on an averaged cost basis.
pub const AVERAGE_COST_DP: u32 = 4;

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LotAverages {
    /// `None` when no lot was usable.
    pub average_cost: Option<f64>,
    pub total_shares: f64,
}

impl LotAverages {
    const EMPTY: Self = Self {
        average_cost: None,
        total_shares: 0.0,
    };
}

/// Total shares and share-weighted average price over the valid lots.
///
/// A lot counts when its share count parses to a finite number above zero
/// and its price parses to a finite number. Other lots are skipped.
pub fn compute_lot_averages(lots: &[Lot]) -> LotAverages {
    let (total_shares, total_cost) = lots
        .iter()
        .filter_map(|lot| {
            let shares = parse_numeric(lot.shares.as_ref());
            let price = parse_numeric(lot.price.as_ref());
            (shares.is_finite() && shares > 0.0 && price.is_finite()).then_some((shares, price))
        })
        .fold((0.0, 0.0), |(shares_acc, cost_acc), (shares, price)| {
            (shares_acc + shares, cost_acc + shares * price)
        });

    if total_shares <= 0.0 {
        return LotAverages::EMPTY;
    }

    LotAverages {
        average_cost: Some(round_cost(total_cost / total_shares)),
        total_shares,
    }
}

/// Round half away from zero to [`AVERAGE_COST_DP`] places.
fn round_cost(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(AVERAGE_COST_DP, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or_else(|| {
            let scale = 10f64.powi(AVERAGE_COST_DP as i32);
            (value * scale).round() / scale
        })
}
