//! Draw pattern matchers and the windowed search engine.
//!
//! This module provides the core matching functionality:
//!
//! - [`row`]: Single-row and two/three-row independent matching
//! - [`lapping`]: Two-draw lapping under five logics
//! - [`knocking`]: Three-draw vertical and diagonal knocking
//! - [`pattern`]: Success/machine co-occurrence per draw
//! - [`SearchEngine`]: Filters the corpus, slides windows and dispatches to a matcher
//!
//! ## Search Flow
//!
//! 1. **Short-circuit**: a query with no numbers in any cell returns no results
//! 2. **Scope**: draws are filtered by game type, game and year, then ordered
//! 3. **Window**: a window of the mode's width starts at every draw; windows that
//!    run past the end, cross a draw-number gap, or span two games are skipped
//! 4. **Match**: the mode's matcher evaluates each window independently
//! 5. **Collect**: results are returned in corpus order
//!
//! Matchers are pure functions of (query, window), so step 4 may run in parallel.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use draw_solver::{Draw, DrawHistory, MatchQuery, ModeQuery, QueryRow, SearchEngine};
//! use draw_solver::core::types::KnockingLogic;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let history = DrawHistory::from_draws(vec![
//!     Draw::new("a", day(1), vec![4, 22, 31]),
//!     Draw::new("b", day(2), vec![9, 22, 40]),
//!     Draw::new("c", day(3), vec![1, 22, 17]),
//! ])
//! .unwrap();
//!
//! let query = MatchQuery::new(ModeQuery::Knocking {
//!     rows: [
//!         QueryRow::from_numbers(&[22]),
//!         QueryRow::default(),
//!         QueryRow::default(),
//!     ],
//!     logic: KnockingLogic::Vertical,
//! });
//!
//! let outcome = SearchEngine::new(&history).search(&query).unwrap();
//! assert_eq!(outcome.hits().count(), 1);
//! assert_eq!(outcome.results[0].knocking_positions(), vec![1]);
//! ```

pub mod engine;
pub mod knocking;
pub mod lapping;
pub mod pattern;
pub mod result;
pub mod row;

pub use engine::{CancelToken, EngineConfig, SearchDiagnostics, SearchEngine, SearchOutcome};
pub use result::{MatchDetail, MatchError, MatchResult};

use crate::core::query::ModeQuery;
use crate::core::window::DrawWindow;

/// A matcher bound to one query, evaluated over fixed-width draw windows
pub trait WindowMatcher: Send + Sync {
    /// Number of consecutive draws per window
    fn width(&self) -> usize;

    /// Evaluate one window.
    ///
    /// `Ok(None)` means the query has nothing to compare (all wildcards).
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InsufficientWindow` if the window is not `width()` draws.
    fn evaluate(&self, window: &DrawWindow<'_>) -> Result<Option<MatchResult>, MatchError>;
}

/// Select the matcher for a query's mode
#[must_use]
pub fn matcher_for(query: &ModeQuery) -> Box<dyn WindowMatcher + '_> {
    match query {
        ModeQuery::Rows { rows, logic, scope } => {
            Box::new(row::RowMatcher::new(rows, *logic, *scope))
        }
        ModeQuery::Lapping { rows, logic } => Box::new(lapping::LappingMatcher::new(rows, *logic)),
        ModeQuery::Knocking { rows, logic } => {
            Box::new(knocking::KnockingMatcher::new(rows, *logic))
        }
        ModeQuery::Pattern {
            success,
            machine,
            threshold,
        } => Box::new(pattern::PatternMatcher::new(success, machine, *threshold)),
    }
}
