//! Success/machine pattern tracking.
//!
//! Every draw in the scoped corpus is scored independently on both sides:
//! query success numbers against the draw's success set and query machine
//! numbers against its machine set. Cross-over lists record numbers that
//! moved between the two sets.

use crate::core::draw::{Draw, NumberSet};
use crate::core::query::{DrawFilter, QueryRow};
use crate::core::types::MatchLogic;
use crate::core::window::DrawWindow;
use crate::matching::result::{
    require_width, MatchDetail, MatchError, MatchResult, PatternOutcome, PatternSide,
};
use crate::matching::row::membership;
use crate::matching::WindowMatcher;

/// Score one draw on both sides. `None` when both rows are all wildcards.
#[must_use]
pub fn match_pattern_draw(
    success: &QueryRow,
    machine: &QueryRow,
    threshold: MatchLogic,
    draw: &Draw,
) -> Option<PatternOutcome> {
    let success_values = success.distinct_values();
    let machine_values = machine.distinct_values();
    if success_values.is_empty() && machine_values.is_empty() {
        return None;
    }

    let (success_matches, _) = membership(&success_values, draw, &[NumberSet::Success]);
    let (machine_matches, _) = membership(&machine_values, draw, &[NumberSet::Machine]);
    let (success_to_machine, _) = membership(&success_values, draw, &[NumberSet::Machine]);
    let (machine_to_success, _) = membership(&machine_values, draw, &[NumberSet::Success]);

    let success_required = threshold.required(success_values.len());
    let machine_required = threshold.required(machine_values.len());
    let success_hit = success_required > 0 && success_matches.len() >= success_required;
    let machine_hit = machine_required > 0 && machine_matches.len() >= machine_required;

    Some(PatternOutcome {
        success_matches,
        machine_matches,
        success_to_machine,
        machine_to_success,
        success_required,
        machine_required,
        side: PatternSide::from_hits(success_hit, machine_hit),
    })
}

fn pattern_result(
    success: &QueryRow,
    machine: &QueryRow,
    threshold: MatchLogic,
    window: &DrawWindow<'_>,
) -> Result<Option<MatchResult>, MatchError> {
    require_width(window, 1)?;

    let Some(outcome) = match_pattern_draw(success, machine, threshold, &window.draws[0]) else {
        return Ok(None);
    };

    let score = outcome.success_matches.len() + outcome.machine_matches.len();
    let required = match (outcome.success_required, outcome.machine_required) {
        (0, m) => m,
        (s, 0) => s,
        (s, m) => s.min(m),
    };
    let hit = outcome.side != PatternSide::Neither;

    Ok(Some(MatchResult::for_window(
        window,
        score,
        required,
        hit,
        MatchDetail::Pattern(outcome),
    )))
}

/// Scan a corpus for success/machine co-occurrence.
///
/// The corpus is scoped by `filter` and kept in the given order; `start` on
/// each result is the draw's index among the scoped draws. Every scoped draw
/// yields one result, hit or not, unless both rows are wildcards.
#[must_use]
pub fn match_pattern(
    success: &QueryRow,
    machine: &QueryRow,
    threshold: MatchLogic,
    filter: &DrawFilter,
    corpus: &[Draw],
) -> Vec<MatchResult> {
    corpus
        .iter()
        .filter(|d| filter.matches(d))
        .enumerate()
        .filter_map(|(start, draw)| {
            let window = DrawWindow::new(start, std::slice::from_ref(draw));
            pattern_result(success, machine, threshold, &window)
                .ok()
                .flatten()
        })
        .collect()
}

/// Pattern matcher bound to a query, for windowed dispatch
pub struct PatternMatcher<'q> {
    success: &'q QueryRow,
    machine: &'q QueryRow,
    threshold: MatchLogic,
}

impl<'q> PatternMatcher<'q> {
    #[must_use]
    pub fn new(success: &'q QueryRow, machine: &'q QueryRow, threshold: MatchLogic) -> Self {
        Self {
            success,
            machine,
            threshold,
        }
    }
}

impl WindowMatcher for PatternMatcher<'_> {
    fn width(&self) -> usize {
        1
    }

    fn evaluate(&self, window: &DrawWindow<'_>) -> Result<Option<MatchResult>, MatchError> {
        pattern_result(self.success, self.machine, self.threshold, window)
    }
}
