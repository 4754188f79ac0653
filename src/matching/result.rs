use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::core::draw::NumberSet;
use crate::core::types::{DrawId, SearchScope};
use crate::core::window::DrawWindow;

/// Errors a matcher can return for a single window
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("window holds {available} draws, {required} required")]
    InsufficientWindow { required: usize, available: usize },
}

/// Check the window holds exactly `required` draws
///
/// # Errors
///
/// Returns `MatchError::InsufficientWindow` on any other width.
pub fn require_width(window: &DrawWindow<'_>, required: usize) -> Result<(), MatchError> {
    if window.len() == required {
        Ok(())
    } else {
        Err(MatchError::InsufficientWindow {
            required,
            available: window.len(),
        })
    }
}

/// A matched cell location within a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchedPosition {
    pub set: NumberSet,
    pub index: usize,
}

/// Outcome of one query row against one draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    /// Index of the row within the query
    pub row: usize,
    pub draw_id: DrawId,
    pub scope: SearchScope,
    /// Non-wildcard entries considered
    pub supplied: usize,
    /// Minimum count for a hit after capping at `supplied`
    pub required: usize,
    pub count: usize,
    pub matched_numbers: Vec<u8>,
    pub matched_positions: Vec<MatchedPosition>,
    pub hit: bool,
}

/// A query number that laps across a two-draw window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LappingNumber {
    pub number: u8,
    pub first_positions: Vec<usize>,
    pub second_positions: Vec<usize>,
    /// Same index in both draws
    pub positional: bool,
    /// Present anywhere in the draw opposite its query row
    pub random: bool,
    /// Index i in the first draw and i±1 in the second
    pub zebra: bool,
}

/// A query number that knocks across a three-draw window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnockingNumber {
    pub number: u8,
    /// Shared index for vertical knocks; every index seen for diagonal knocks
    pub knocking_positions: Vec<usize>,
    /// Indices of the number in each draw of the window
    pub positions_by_draw: Vec<Vec<usize>>,
}

/// Which of the two pattern sides matched a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSide {
    Success,
    Machine,
    Both,
    Neither,
}

impl PatternSide {
    #[must_use]
    pub fn from_hits(success: bool, machine: bool) -> Self {
        match (success, machine) {
            (true, true) => Self::Both,
            (true, false) => Self::Success,
            (false, true) => Self::Machine,
            (false, false) => Self::Neither,
        }
    }
}

impl std::fmt::Display for PatternSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Machine => write!(f, "machine"),
            Self::Both => write!(f, "both"),
            Self::Neither => write!(f, "neither"),
        }
    }
}

/// Success/machine co-occurrence for one draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternOutcome {
    /// Query success numbers found among the draw's success numbers
    pub success_matches: Vec<u8>,
    /// Query machine numbers found among the draw's machine numbers
    pub machine_matches: Vec<u8>,
    /// Query success numbers that landed in the machine set
    pub success_to_machine: Vec<u8>,
    /// Query machine numbers that landed in the success set
    pub machine_to_success: Vec<u8>,
    pub success_required: usize,
    pub machine_required: usize,
    pub side: PatternSide,
}

/// Mode-specific detail carried by a [`MatchResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "matches", rename_all = "snake_case")]
pub enum MatchDetail {
    Rows(Vec<RowOutcome>),
    Lapping(Vec<LappingNumber>),
    Knocking(Vec<KnockingNumber>),
    Pattern(PatternOutcome),
}

/// Result of evaluating one draw window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Index of the window's first draw in the ordered corpus
    pub start: usize,
    pub draw_ids: Vec<DrawId>,
    pub draw_dates: Vec<NaiveDate>,
    /// Whether the window satisfies the query's threshold
    pub hit: bool,
    /// Matched count the threshold was checked against
    pub score: usize,
    pub required: usize,
    pub detail: MatchDetail,
}

impl MatchResult {
    #[must_use]
    pub fn for_window(
        window: &DrawWindow<'_>,
        score: usize,
        required: usize,
        hit: bool,
        detail: MatchDetail,
    ) -> Self {
        Self {
            start: window.start,
            draw_ids: window.ids(),
            draw_dates: window.draws.iter().map(|d| d.draw_date).collect(),
            hit,
            score,
            required,
            detail,
        }
    }

    /// Distinct matched values, ascending
    #[must_use]
    pub fn matched_numbers(&self) -> Vec<u8> {
        let mut numbers: Vec<u8> = match &self.detail {
            MatchDetail::Rows(rows) => rows
                .iter()
                .flat_map(|r| r.matched_numbers.iter().copied())
                .collect(),
            MatchDetail::Lapping(numbers) => numbers.iter().map(|n| n.number).collect(),
            MatchDetail::Knocking(numbers) => numbers.iter().map(|n| n.number).collect(),
            MatchDetail::Pattern(outcome) => outcome
                .success_matches
                .iter()
                .chain(&outcome.machine_matches)
                .copied()
                .collect(),
        };
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }

    /// Knocking positions across all knocking numbers, ascending and distinct
    #[must_use]
    pub fn knocking_positions(&self) -> Vec<usize> {
        let MatchDetail::Knocking(numbers) = &self.detail else {
            return Vec::new();
        };
        let mut positions: Vec<usize> = numbers
            .iter()
            .flat_map(|n| n.knocking_positions.iter().copied())
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions
    }
}
