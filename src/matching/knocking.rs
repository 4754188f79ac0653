//! Three-draw knocking.
//!
//! A query number knocks when it recurs in all three draws of a consecutive
//! triple: `vertical` requires one shared index, `diagonal` (zebra) accepts
//! any index in each draw.

use crate::core::query::{distinct_values, QueryRow};
use crate::core::types::KnockingLogic;
use crate::core::window::DrawWindow;
use crate::matching::result::{
    require_width, KnockingNumber, MatchDetail, MatchError, MatchResult,
};
use crate::matching::WindowMatcher;

/// Whether `number` knocks across the window's draws under `logic`
#[must_use]
pub fn knock(number: u8, logic: KnockingLogic, window: &DrawWindow<'_>) -> Option<KnockingNumber> {
    let positions_by_draw: Vec<Vec<usize>> = window
        .draws
        .iter()
        .map(|d| d.positions_of(number).collect())
        .collect();

    if positions_by_draw.iter().any(Vec::is_empty) {
        return None;
    }

    let knocking_positions: Vec<usize> = match logic {
        KnockingLogic::Vertical => {
            let (first, rest) = positions_by_draw.split_first()?;
            first
                .iter()
                .copied()
                .filter(|i| rest.iter().all(|p| p.contains(i)))
                .collect()
        }
        KnockingLogic::Diagonal => positions_by_draw.iter().flatten().copied().collect(),
    };

    if knocking_positions.is_empty() {
        return None;
    }

    Some(KnockingNumber {
        number,
        knocking_positions,
        positions_by_draw,
    })
}

/// Evaluate a knocking query against a three-draw window.
///
/// Returns `Ok(None)` when all three rows are wildcards.
///
/// # Errors
///
/// Returns `MatchError::InsufficientWindow` unless the window holds exactly three draws.
pub fn match_knocking(
    rows: &[QueryRow; 3],
    logic: KnockingLogic,
    window: &DrawWindow<'_>,
) -> Result<Option<MatchResult>, MatchError> {
    require_width(window, 3)?;

    let values = distinct_values(rows);
    if values.is_empty() {
        return Ok(None);
    }

    let knocks: Vec<KnockingNumber> = values
        .into_iter()
        .filter_map(|n| knock(n, logic, window))
        .collect();

    let score = knocks.len();
    Ok(Some(MatchResult::for_window(
        window,
        score,
        1,
        score >= 1,
        MatchDetail::Knocking(knocks),
    )))
}

/// Knocking matcher bound to a query, for windowed dispatch
pub struct KnockingMatcher<'q> {
    rows: &'q [QueryRow; 3],
    logic: KnockingLogic,
}

impl<'q> KnockingMatcher<'q> {
    #[must_use]
    pub fn new(rows: &'q [QueryRow; 3], logic: KnockingLogic) -> Self {
        Self { rows, logic }
    }
}

impl WindowMatcher for KnockingMatcher<'_> {
    fn width(&self) -> usize {
        3
    }

    fn evaluate(&self, window: &DrawWindow<'_>) -> Result<Option<MatchResult>, MatchError> {
        match_knocking(self.rows, self.logic, window)
    }
}
