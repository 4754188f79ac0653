//! Draw history storage and loading.
//!
//! The history is the corpus every search runs over. It is kept in
//! chronological order (date, then draw number, then id) and indexed by id.
//!
//! ## File Formats
//!
//! | Extension | Layout |
//! |-----------|--------|
//! | `.json`   | `{"version": "1.0.0", "draws": [...]}` or a bare array of draws |
//! | `.csv`    | `id,game_type_id,game_id,draw_date,draw_number,success,machine` |
//! | `.tsv`    | same columns, tab-separated |
//!
//! Any of these may be gzip-compressed with a trailing `.gz`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use draw_solver::DrawHistory;
//! use std::path::Path;
//!
//! let history = DrawHistory::load_from_file(Path::new("draws.csv.gz")).unwrap();
//! for game in history.games() {
//!     println!("{:?}/{:?}: {} draws", game.game_type_id, game.game_id, game.draws);
//! }
//! ```

pub mod store;

pub use store::{DrawHistory, DrawSource, GameSummary, HistoryError};
