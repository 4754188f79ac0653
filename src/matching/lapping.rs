//! Two-draw lapping.
//!
//! Row 1 of a lapping query belongs to the first draw of a consecutive pair,
//! row 2 to the second. A query number laps when it turns up in the draw
//! opposite its own row. The logic variant constrains how:
//!
//! | Logic                   | Rule                                         | Min numbers |
//! |-------------------------|----------------------------------------------|-------------|
//! | `random`                | anywhere in the other draw                   | 1           |
//! | `positional`            | same index in both draws                     | 1           |
//! | `position-random-zebra` | positional OR random OR zebra                | 1           |
//! | `match-two-lapping`     | random                                       | 2           |
//! | `match-two-diagonal`    | zebra: index i, then i-1 or i+1              | 2           |
//!
//! A number written in both rows is tested once, against both draws, and
//! tallied once however many rules it satisfies.

use std::collections::BTreeMap;

use crate::core::draw::Draw;
use crate::core::query::QueryRow;
use crate::core::types::LappingLogic;
use crate::core::window::DrawWindow;
use crate::matching::result::{require_width, LappingNumber, MatchDetail, MatchError, MatchResult};
use crate::matching::WindowMatcher;

/// Which query rows a lapping number was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrigin {
    First,
    Second,
    Both,
}

impl RowOrigin {
    fn merge(self, other: Self) -> Self {
        if self == other {
            self
        } else {
            Self::Both
        }
    }
}

/// Distinct query numbers of a lapping pair with the rows they came from, ascending
#[must_use]
pub fn query_numbers(first_row: &QueryRow, second_row: &QueryRow) -> BTreeMap<u8, RowOrigin> {
    let mut numbers = BTreeMap::new();
    let tagged = first_row
        .distinct_values()
        .into_iter()
        .map(|n| (n, RowOrigin::First))
        .chain(
            second_row
                .distinct_values()
                .into_iter()
                .map(|n| (n, RowOrigin::Second)),
        );
    for (number, origin) in tagged {
        numbers
            .entry(number)
            .and_modify(|o: &mut RowOrigin| *o = o.merge(origin))
            .or_insert(origin);
    }
    numbers
}

/// Classify `number` across a draw pair.
///
/// `None` if the number is absent from every draw opposite `origin`, in which
/// case no lapping rule can hold.
#[must_use]
pub fn classify(
    number: u8,
    origin: RowOrigin,
    first: &Draw,
    second: &Draw,
) -> Option<LappingNumber> {
    let first_positions: Vec<usize> = first.positions_of(number).collect();
    let second_positions: Vec<usize> = second.positions_of(number).collect();

    let random = match origin {
        RowOrigin::First => !second_positions.is_empty(),
        RowOrigin::Second => !first_positions.is_empty(),
        RowOrigin::Both => !first_positions.is_empty() || !second_positions.is_empty(),
    };
    if !random {
        return None;
    }

    let positional = first_positions
        .iter()
        .any(|i| second_positions.contains(i));
    let zebra = first_positions
        .iter()
        .any(|&i| second_positions.iter().any(|&j| i.abs_diff(j) == 1));

    Some(LappingNumber {
        number,
        first_positions,
        second_positions,
        positional,
        random,
        zebra,
    })
}

/// Whether a classified number satisfies the comparison rule of `logic`
#[must_use]
pub fn satisfies(logic: LappingLogic, number: &LappingNumber) -> bool {
    match logic {
        LappingLogic::Random | LappingLogic::MatchTwoLapping => number.random,
        LappingLogic::Positional => number.positional,
        LappingLogic::PositionRandomZebra => number.positional || number.random || number.zebra,
        LappingLogic::MatchTwoDiagonal => number.zebra,
    }
}

/// Evaluate a lapping query against a two-draw window.
///
/// Returns `Ok(None)` when both rows are all wildcards.
///
/// # Errors
///
/// Returns `MatchError::InsufficientWindow` unless the window holds exactly two draws.
pub fn match_lapping(
    first_row: &QueryRow,
    second_row: &QueryRow,
    logic: LappingLogic,
    window: &DrawWindow<'_>,
) -> Result<Option<MatchResult>, MatchError> {
    require_width(window, 2)?;

    let numbers = query_numbers(first_row, second_row);
    if numbers.is_empty() {
        return Ok(None);
    }

    let (first, second) = (&window.draws[0], &window.draws[1]);
    let matched: Vec<LappingNumber> = numbers
        .into_iter()
        .filter_map(|(n, origin)| classify(n, origin, first, second))
        .filter(|n| satisfies(logic, n))
        .collect();

    let score = matched.len();
    let required = logic.min_numbers();

    Ok(Some(MatchResult::for_window(
        window,
        score,
        required,
        score >= required,
        MatchDetail::Lapping(matched),
    )))
}

/// Lapping matcher bound to a query, for windowed dispatch
pub struct LappingMatcher<'q> {
    rows: &'q [QueryRow; 2],
    logic: LappingLogic,
}

impl<'q> LappingMatcher<'q> {
    #[must_use]
    pub fn new(rows: &'q [QueryRow; 2], logic: LappingLogic) -> Self {
        Self { rows, logic }
    }
}

impl WindowMatcher for LappingMatcher<'_> {
    fn width(&self) -> usize {
        2
    }

    fn evaluate(&self, window: &DrawWindow<'_>) -> Result<Option<MatchResult>, MatchError> {
        match_lapping(&self.rows[0], &self.rows[1], self.logic, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn pair(first: &[u8], second: &[u8]) -> Vec<Draw> {
        let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        vec![
            Draw::new("d1", date, first.to_vec()),
            Draw::new("d2", date.succ_opt().unwrap(), second.to_vec()),
        ]
    }

    fn run(logic: LappingLogic, rows: [&[u8]; 2], draws: &[Draw]) -> MatchResult {
        let window = DrawWindow::new(0, draws);
        match_lapping(
            &QueryRow::from_numbers(rows[0]),
            &QueryRow::from_numbers(rows[1]),
            logic,
            &window,
        )
        .unwrap()
        .unwrap()
    }

    #[test]
    fn test_random_vs_positional() {
        let draws = pair(&[5, 12, 7], &[12, 5, 9]);
        let random = run(LappingLogic::Random, [&[5], &[]], &draws);
        assert!(random.hit);
        assert_eq!(random.matched_numbers(), vec![5]);

        let positional = run(LappingLogic::Positional, [&[5], &[]], &draws);
        assert!(!positional.hit);
        assert_eq!(positional.score, 0);
    }

    #[test]
    fn test_positional_same_index() {
        let draws = pair(&[5, 12, 7], &[30, 12, 9]);
        let result = run(LappingLogic::Positional, [&[12], &[]], &draws);
        assert!(result.hit);
    }

    #[test]
    fn test_match_two_lapping_threshold() {
        let draws = pair(&[5, 12, 7, 20], &[12, 40, 9, 33]);
        let one = run(LappingLogic::MatchTwoLapping, [&[5, 12], &[9]], &draws);
        assert_eq!(one.score, 1);
        assert!(!one.hit);

        let draws = pair(&[5, 12, 7, 20], &[12, 5, 9, 33]);
        let two = run(LappingLogic::MatchTwoLapping, [&[5, 12], &[9]], &draws);
        assert_eq!(two.score, 2);
        assert!(two.hit);
    }

    #[test]
    fn test_match_two_diagonal() {
        // 5: index 0 -> 1 (diagonal); 12: index 1 -> 0 (diagonal); 7: index 2 -> 4 (not)
        let draws = pair(&[5, 12, 7, 20, 33], &[12, 5, 60, 61, 7]);
        let result = run(LappingLogic::MatchTwoDiagonal, [&[5, 12, 7], &[]], &draws);
        assert_eq!(result.matched_numbers(), vec![5, 12]);
        assert!(result.hit);

        let only_one = run(LappingLogic::MatchTwoDiagonal, [&[5, 7], &[]], &draws);
        assert!(!only_one.hit);
    }

    #[test]
    fn test_position_random_zebra_counts_each_number_once() {
        // 12 sits at index 1 in both draws: positional and random at once
        let draws = pair(&[5, 12, 7], &[40, 12, 5]);
        let result = run(LappingLogic::PositionRandomZebra, [&[12, 5], &[12]], &draws);
        assert_eq!(result.score, 2);
        let MatchDetail::Lapping(numbers) = &result.detail else {
            panic!("expected lapping detail");
        };
        let twelve = numbers.iter().find(|n| n.number == 12).unwrap();
        assert!(twelve.positional && twelve.random && !twelve.zebra);
        let five = numbers.iter().find(|n| n.number == 5).unwrap();
        assert!(!five.positional && five.random);
    }

    #[test]
    fn test_random_first_row_number_found_only_in_second_draw() {
        let draws = pair(&[1, 2, 3], &[9, 4, 5]);
        let result = run(LappingLogic::Random, [&[9], &[]], &draws);
        assert!(result.hit);
        assert_eq!(result.score, 1);
        let MatchDetail::Lapping(numbers) = &result.detail else {
            panic!("expected lapping detail");
        };
        assert!(numbers[0].first_positions.is_empty());
        assert_eq!(numbers[0].second_positions, vec![0]);
        assert!(!numbers[0].positional && !numbers[0].zebra);
    }

    #[test]
    fn test_random_second_row_number_found_only_in_first_draw() {
        let draws = pair(&[1, 2, 3], &[9, 4, 5]);
        let result = run(LappingLogic::Random, [&[], &[2]], &draws);
        assert!(result.hit);
        assert_eq!(result.matched_numbers(), vec![2]);
    }

    #[test]
    fn test_random_number_in_own_draw_only_misses() {
        // 1 is in draw 1 but was asked of row 1, so it must turn up in draw 2
        let draws = pair(&[1, 2, 3], &[9, 4, 5]);
        assert!(!run(LappingLogic::Random, [&[1], &[]], &draws).hit);
        assert!(!run(LappingLogic::Random, [&[], &[9]], &draws).hit);
        // Written in both rows, either draw will do
        assert!(run(LappingLogic::Random, [&[1], &[1]], &draws).hit);
    }

    #[test]
    fn test_match_two_lapping_mixes_rows() {
        let draws = pair(&[1, 2, 3], &[9, 4, 5]);
        let result = run(LappingLogic::MatchTwoLapping, [&[4], &[3]], &draws);
        assert_eq!(result.matched_numbers(), vec![3, 4]);
        assert!(result.hit);
    }

    #[test]
    fn test_positional_needs_both_draws() {
        let draws = pair(&[1, 2, 3], &[9, 4, 5]);
        assert!(!run(LappingLogic::Positional, [&[9], &[]], &draws).hit);
        assert!(!run(LappingLogic::MatchTwoDiagonal, [&[9, 4], &[]], &draws).hit);
    }

    #[test]
    fn test_number_in_one_draw_only_does_not_lap() {
        let draws = pair(&[5, 12, 7], &[40, 41, 42]);
        let result = run(LappingLogic::PositionRandomZebra, [&[5, 12, 7], &[]], &draws);
        assert!(!result.hit);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_wildcard_rows_return_none() {
        let draws = pair(&[5, 12, 7], &[12, 5, 9]);
        let window = DrawWindow::new(0, &draws);
        let blank = QueryRow::new(vec![None, None, None]);
        assert_eq!(
            match_lapping(&blank, &blank, LappingLogic::Random, &window),
            Ok(None)
        );
    }

    #[test]
    fn test_requires_two_draws() {
        let draws = pair(&[5], &[5]);
        let window = DrawWindow::new(0, &draws[..1]);
        let row = QueryRow::from_numbers(&[5]);
        assert!(matches!(
            match_lapping(&row, &row, LappingLogic::Random, &window),
            Err(MatchError::InsufficientWindow { required: 2, .. })
        ));
    }
}
