//! Core data types for draw pattern search.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Draw`]: A single lottery draw with success and machine numbers
//! - [`QueryRow`], [`RowQuery`]: Query cells, where `None` is a wildcard
//! - [`MatchQuery`], [`ModeQuery`]: A validated query for one search mode
//! - [`DrawWindow`]: A run of consecutive draws used as the matching unit
//! - [`SearchMode`], [`MatchLogic`], [`SearchScope`], [`LappingLogic`],
//!   [`KnockingLogic`]: Closed selector enums
//!
//! ## Number Sets
//!
//! Games that draw twice per event record two sets:
//!
//! | Set     | Position-significant | Used by                         |
//! |---------|----------------------|---------------------------------|
//! | success | yes                  | every mode                      |
//! | machine | yes                  | row `machine`/`both`/`position`, pattern |
//!
//! Lapping and knocking compare success numbers only.
//!
//! [`Draw`]: draw::Draw
//! [`QueryRow`]: query::QueryRow
//! [`RowQuery`]: query::RowQuery
//! [`MatchQuery`]: query::MatchQuery
//! [`ModeQuery`]: query::ModeQuery
//! [`DrawWindow`]: window::DrawWindow
//! [`SearchMode`]: types::SearchMode
//! [`MatchLogic`]: types::MatchLogic
//! [`SearchScope`]: types::SearchScope
//! [`LappingLogic`]: types::LappingLogic
//! [`KnockingLogic`]: types::KnockingLogic

pub mod draw;
pub mod query;
pub mod types;
pub mod window;
