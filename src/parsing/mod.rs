//! Parsers for draw tables and raw queries.
//!
//! This module provides parsers for:
//!
//! - **CSV/TSV draw tables**: one draw per line, number lists space- or dash-separated
//! - **Raw queries**: JSON query files and CLI row strings compiled into a typed query
//!
//! ## Example
//!
//! ```rust
//! use draw_solver::parsing::query::{InvalidCellPolicy, RawQuery};
//!
//! let raw = RawQuery::from_rows("single-row", &["3,,,,,".to_string()], &[]);
//! let compiled = raw.compile(InvalidCellPolicy::Reject).unwrap();
//! assert!(compiled.issues.is_empty());
//! ```
//!
//! ## Query Cells
//!
//! | Input | Meaning |
//! |-------|---------|
//! | `1`..`99` | number |
//! | blank, `_`, `*`, JSON `null` | wildcard |
//! | anything else | invalid; rejected or downgraded per [`query::InvalidCellPolicy`] |

pub mod query;
pub mod tsv;
