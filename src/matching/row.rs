//! Single-row and row-sequence matching.
//!
//! A row query is compared against one draw under a [`SearchScope`]:
//!
//! - `success` / `machine`: distinct query numbers found in the named set
//! - `both`: distinct query numbers (success and machine cells) found in either set
//! - `position`: cells equal to the draw's number at the same index
//!
//! For two- and three-row windows each row is evaluated independently against
//! its own draw; counts are never pooled across rows.

use crate::core::draw::{Draw, NumberSet};
use crate::core::query::{QueryRow, RowQuery};
use crate::core::types::{MatchLogic, SearchScope};
use crate::core::window::DrawWindow;
use crate::matching::result::{
    require_width, MatchDetail, MatchError, MatchResult, MatchedPosition, RowOutcome,
};
use crate::matching::WindowMatcher;

/// Values from `values` present in any of `sets`, with every location they occupy
pub(crate) fn membership(
    values: &[u8],
    draw: &Draw,
    sets: &[NumberSet],
) -> (Vec<u8>, Vec<MatchedPosition>) {
    let mut matched = Vec::new();
    let mut positions = Vec::new();

    for &value in values {
        let mut found = false;
        for &set in sets {
            for (index, &n) in draw.numbers(set).iter().enumerate() {
                if n == value {
                    found = true;
                    positions.push(MatchedPosition { set, index });
                }
            }
        }
        if found {
            matched.push(value);
        }
    }

    (matched, positions)
}

/// Cells equal to the draw number at the same index
fn position_agreements(
    row: &QueryRow,
    draw: &Draw,
    set: NumberSet,
    matched: &mut Vec<u8>,
    positions: &mut Vec<MatchedPosition>,
) -> usize {
    let numbers = draw.numbers(set);
    let mut supplied = 0;
    for (index, value) in row.entries() {
        supplied += 1;
        if numbers.get(index) == Some(&value) {
            matched.push(value);
            positions.push(MatchedPosition { set, index });
        }
    }
    supplied
}

/// Evaluate one row query against one draw.
///
/// Returns `None` when the cells relevant to `scope` are all wildcards; such
/// a row cannot match anything and imposes no constraint.
#[must_use]
pub fn match_row(
    query: &RowQuery,
    logic: MatchLogic,
    scope: SearchScope,
    draw: &Draw,
) -> Option<RowOutcome> {
    let (supplied, matched_numbers, matched_positions) = match scope {
        SearchScope::Success => {
            let values = query.success.distinct_values();
            let (matched, positions) = membership(&values, draw, &[NumberSet::Success]);
            (values.len(), matched, positions)
        }
        SearchScope::Machine => {
            // Without machine cells the success cells are looked up in the machine set
            let source = query.machine_numbers().unwrap_or(&query.success);
            let values = source.distinct_values();
            let (matched, positions) = membership(&values, draw, &[NumberSet::Machine]);
            (values.len(), matched, positions)
        }
        SearchScope::Both => {
            let mut rows = vec![query.success.clone()];
            rows.extend(query.machine_numbers().cloned());
            let values = crate::core::query::distinct_values(&rows);
            let (matched, positions) =
                membership(&values, draw, &[NumberSet::Success, NumberSet::Machine]);
            (values.len(), matched, positions)
        }
        SearchScope::Position => {
            let mut matched = Vec::new();
            let mut positions = Vec::new();
            let mut supplied = position_agreements(
                &query.success,
                draw,
                NumberSet::Success,
                &mut matched,
                &mut positions,
            );
            if let Some(machine) = query.machine_numbers() {
                supplied += position_agreements(
                    machine,
                    draw,
                    NumberSet::Machine,
                    &mut matched,
                    &mut positions,
                );
            }
            (supplied, matched, positions)
        }
    };

    if supplied == 0 {
        return None;
    }

    let count = match scope {
        SearchScope::Position => matched_positions.len(),
        _ => matched_numbers.len(),
    };
    let required = logic.required(supplied);

    Some(RowOutcome {
        row: 0,
        draw_id: draw.id.clone(),
        scope,
        supplied,
        required,
        count,
        matched_numbers,
        matched_positions,
        hit: count >= required,
    })
}

/// Evaluate one row per draw of the window.
///
/// The window hits when every row that supplies numbers hits on its own draw.
///
/// # Errors
///
/// Returns `MatchError::InsufficientWindow` if the window does not hold one
/// draw per row.
pub fn match_rows(
    rows: &[RowQuery],
    logic: MatchLogic,
    scope: SearchScope,
    window: &DrawWindow<'_>,
) -> Result<Option<MatchResult>, MatchError> {
    require_width(window, rows.len())?;

    let outcomes: Vec<RowOutcome> = rows
        .iter()
        .zip(window.draws)
        .enumerate()
        .filter_map(|(i, (query, draw))| {
            match_row(query, logic, scope, draw).map(|outcome| RowOutcome { row: i, ..outcome })
        })
        .collect();

    if outcomes.is_empty() {
        return Ok(None);
    }

    let hit = outcomes.iter().all(|o| o.hit);
    let score = outcomes.iter().map(|o| o.count).sum();
    let required = outcomes.iter().map(|o| o.required).sum();

    Ok(Some(MatchResult::for_window(
        window,
        score,
        required,
        hit,
        MatchDetail::Rows(outcomes),
    )))
}

/// Row matcher bound to a query, for windowed dispatch
pub struct RowMatcher<'q> {
    rows: &'q [RowQuery],
    logic: MatchLogic,
    scope: SearchScope,
}

impl<'q> RowMatcher<'q> {
    #[must_use]
    pub fn new(rows: &'q [RowQuery], logic: MatchLogic, scope: SearchScope) -> Self {
        Self { rows, logic, scope }
    }
}

impl WindowMatcher for RowMatcher<'_> {
    fn width(&self) -> usize {
        self.rows.len().max(1)
    }

    fn evaluate(&self, window: &DrawWindow<'_>) -> Result<Option<MatchResult>, MatchError> {
        match_rows(self.rows, self.logic, self.scope, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draw(id: &str, success: &[u8]) -> Draw {
        Draw::new(
            id,
            NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
            success.to_vec(),
        )
    }

    fn row(cells: &[Option<u8>]) -> RowQuery {
        RowQuery::success_only(QueryRow::new(cells.to_vec()))
    }

    #[test]
    fn test_success_scope_single_number_hits() {
        let query = row(&[Some(3), None, None, None, None, None]);
        let candidate = draw("d", &[3, 8, 15, 22, 41, 50]);
        let outcome = match_row(&query, MatchLogic::One, SearchScope::Success, &candidate).unwrap();
        assert!(outcome.hit);
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.supplied, 1);
        assert_eq!(
            outcome.matched_positions,
            vec![MatchedPosition {
                set: NumberSet::Success,
                index: 0
            }]
        );
    }

    #[test]
    fn test_position_scope_requires_same_index() {
        let query = row(&[Some(3), None, None, None, None, None]);
        let candidate = draw("d", &[9, 3, 15, 22, 41, 50]);
        let outcome =
            match_row(&query, MatchLogic::One, SearchScope::Position, &candidate).unwrap();
        assert!(!outcome.hit);
        assert_eq!(outcome.count, 0);

        let membership =
            match_row(&query, MatchLogic::One, SearchScope::Success, &candidate).unwrap();
        assert!(membership.hit);
    }

    #[test]
    fn test_threshold_three() {
        let query = row(&[Some(1), Some(2), Some(3), Some(4), Some(5)]);
        let three = draw("three", &[1, 2, 3, 60, 70]);
        let two = draw("two", &[1, 2, 60, 70, 80]);
        assert!(match_row(&query, MatchLogic::Three, SearchScope::Success, &three).unwrap().hit);
        assert!(!match_row(&query, MatchLogic::Three, SearchScope::Success, &two).unwrap().hit);
    }

    #[test]
    fn test_threshold_capped_at_supplied() {
        let query = row(&[Some(10), Some(20), None, None, None]);
        let candidate = draw("d", &[10, 20, 30, 40, 50]);
        let outcome =
            match_row(&query, MatchLogic::Five, SearchScope::Success, &candidate).unwrap();
        assert_eq!(outcome.required, 2);
        assert!(outcome.hit);
    }

    #[test]
    fn test_wildcard_only_row_yields_nothing() {
        let query = row(&[None, None, None]);
        let candidate = draw("d", &[1, 2, 3]);
        for scope in [
            SearchScope::Both,
            SearchScope::Success,
            SearchScope::Machine,
            SearchScope::Position,
        ] {
            assert!(match_row(&query, MatchLogic::Any, scope, &candidate).is_none());
        }
    }

    #[test]
    fn test_machine_scope_uses_machine_cells_when_given() {
        let candidate = draw("d", &[1, 2, 3]).with_machine(vec![40, 41, 42]);

        let success_only = row(&[Some(41)]);
        let outcome =
            match_row(&success_only, MatchLogic::Any, SearchScope::Machine, &candidate).unwrap();
        assert!(outcome.hit);

        let with_machine = row(&[Some(41)]).with_machine(QueryRow::from_numbers(&[2]));
        let outcome =
            match_row(&with_machine, MatchLogic::Any, SearchScope::Machine, &candidate).unwrap();
        assert!(!outcome.hit, "machine cells replace success cells for machine scope");
    }

    #[test]
    fn test_both_scope_counts_union_once() {
        let candidate = draw("d", &[1, 2, 3]).with_machine(vec![3, 40, 41]);
        let query = row(&[Some(3), Some(41), Some(99)]).with_machine(QueryRow::from_numbers(&[3]));
        let outcome = match_row(&query, MatchLogic::Two, SearchScope::Both, &candidate).unwrap();
        assert_eq!(outcome.supplied, 3);
        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.matched_numbers, vec![3, 41]);
        // 3 sits in both sets of the draw
        assert_eq!(outcome.matched_positions.len(), 3);
        assert!(outcome.hit);
    }

    #[test]
    fn test_position_scope_checks_machine_cells() {
        let candidate = draw("d", &[5, 6, 7]).with_machine(vec![70, 71, 72]);
        let query =
            row(&[Some(5), None, Some(9)]).with_machine(QueryRow::new(vec![None, Some(71)]));
        let outcome = match_row(&query, MatchLogic::Two, SearchScope::Position, &candidate).unwrap();
        assert_eq!(outcome.supplied, 3);
        assert_eq!(outcome.count, 2);
        assert!(outcome.hit);
    }

    #[test]
    fn test_two_row_results_stay_separate() {
        let draws = vec![draw("a", &[1, 2, 3, 4, 5]), draw("b", &[6, 7, 8, 9, 10])];
        let window = DrawWindow::new(0, &draws);
        let rows = vec![row(&[Some(1), Some(2)]), row(&[Some(6), Some(30)])];

        let result = match_rows(&rows, MatchLogic::Two, SearchScope::Success, &window)
            .unwrap()
            .unwrap();
        let MatchDetail::Rows(outcomes) = &result.detail else {
            panic!("expected row detail");
        };
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].hit);
        assert!(!outcomes[1].hit, "second row has one match, needs two");
        assert!(!result.hit);
        assert_eq!(outcomes[1].row, 1);
    }

    #[test]
    fn test_wildcard_row_imposes_no_constraint() {
        let draws = vec![draw("a", &[1, 2, 3]), draw("b", &[4, 5, 6])];
        let window = DrawWindow::new(0, &draws);
        let rows = vec![row(&[None, None]), row(&[Some(5)])];
        let result = match_rows(&rows, MatchLogic::Any, SearchScope::Success, &window)
            .unwrap()
            .unwrap();
        assert!(result.hit);
        let MatchDetail::Rows(outcomes) = &result.detail else {
            panic!("expected row detail");
        };
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].row, 1);
    }

    #[test]
    fn test_wrong_window_width_is_an_error() {
        let draws = vec![draw("a", &[1, 2, 3])];
        let window = DrawWindow::new(0, &draws);
        let rows = vec![row(&[Some(1)]), row(&[Some(2)])];
        assert_eq!(
            match_rows(&rows, MatchLogic::Any, SearchScope::Success, &window),
            Err(MatchError::InsufficientWindow {
                required: 2,
                available: 1
            })
        );
    }
}
