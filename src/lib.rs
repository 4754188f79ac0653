//! # draw-solver
//!
//! A library for finding number patterns in lottery draw histories.
//!
//! A history is an ordered list of draws, each with position-significant
//! "success" numbers and, for some games, a parallel set of "machine" numbers.
//! `draw-solver` slides a window of consecutive draws across the history and
//! reports every window that satisfies a query.
//!
//! ## Features
//!
//! - **Row matching**: one query row per draw, by membership or by exact position
//! - **Lapping**: numbers carried over between two consecutive draws
//! - **Knocking**: numbers recurring across three consecutive draws
//! - **Pattern tracking**: success/machine co-occurrence and crossovers per draw
//! - **Scoping**: restrict a search by game type, game and year
//! - **Wildcards**: blank cells never count and never block a match
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use draw_solver::{Draw, DrawHistory, InvalidCellPolicy, RawQuery, SearchEngine};
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
//! let history = DrawHistory::from_draws(vec![
//!     Draw::new("d1", day(1), vec![3, 8, 15, 22, 41, 50]),
//!     Draw::new("d2", day(8), vec![9, 3, 16, 23, 42, 51]),
//! ])
//! .unwrap();
//!
//! // 3 anywhere in the success numbers
//! let query = RawQuery::from_rows("single-row", &["3,,,,,".to_string()], &[])
//!     .compile(InvalidCellPolicy::Reject)
//!     .unwrap();
//!
//! let outcome = SearchEngine::new(&history).search(&query.query).unwrap();
//! assert_eq!(outcome.hits().count(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Draws, queries, selectors and windows
//! - [`history`]: Draw history storage and file loading
//! - [`matching`]: Mode matchers and the search engine
//! - [`parsing`]: Draw table and raw query parsers
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod history;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::draw::{Draw, NumberSet};
pub use core::query::{DrawFilter, MatchQuery, ModeQuery, QueryRow, RowQuery};
pub use core::types::*;
pub use history::{DrawHistory, DrawSource, HistoryError};
pub use matching::engine::{CancelToken, EngineConfig, SearchEngine, SearchError, SearchOutcome};
pub use matching::result::{MatchDetail, MatchError, MatchResult};
pub use parsing::query::{CompiledQuery, InvalidCellPolicy, QueryError, RawQuery};
