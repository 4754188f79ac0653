//! Raw query input and its compilation into a [`MatchQuery`].
//!
//! Raw queries come from JSON files or CLI flags and carry selector strings
//! and untyped cells. Compilation resolves the selectors, checks row counts,
//! and converts every cell to a number or a wildcard.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use crate::core::query::{DrawFilter, MatchQuery, ModeQuery, QueryRow, RowQuery};
use crate::core::types::{KnockingLogic, LappingLogic, MatchLogic, SearchMode, SearchScope};
use crate::utils::validation::{is_valid_number, parse_number, MAX_ROW_CELLS};

/// A cell as written by the user: a number, a string, or JSON null
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RawCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

pub type RawRow = Vec<Option<RawCell>>;

/// Split a comma-separated row such as `3,,,,,` into raw cells
#[must_use]
pub fn split_row(text: &str) -> RawRow {
    text.split(',')
        .map(|cell| Some(RawCell::Text(cell.to_string())))
        .collect()
}

/// A cell that is neither blank nor a number in 1..=99
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidCell {
    /// Zero-based row index; machine rows follow the success rows
    pub row: usize,
    pub cell: usize,
    pub input: String,
}

impl std::fmt::Display for InvalidCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {} cell {}: '{}'", self.row + 1, self.cell + 1, self.input)
    }
}

/// What to do with cells that do not hold a valid number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidCellPolicy {
    /// Fail compilation, listing every offending cell
    #[default]
    Reject,
    /// Treat offending cells as wildcards and report them as issues
    Wildcard,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid numbers in query: {}", format_cells(.0))]
    InvalidNumbers(Vec<InvalidCell>),

    #[error("unknown search mode '{0}'")]
    UnknownMode(String),

    #[error("unknown logic '{value}' for {mode} mode")]
    UnknownLogicVariant { mode: SearchMode, value: String },

    #[error("unknown search scope '{0}'")]
    UnknownScope(String),

    #[error("{mode} mode expects {expected} rows, found {found}")]
    RowCount {
        mode: SearchMode,
        expected: usize,
        found: usize,
    },

    #[error("row {row} has {found} cells, maximum is {max}", max = MAX_ROW_CELLS)]
    TooManyCells { row: usize, found: usize },
}

fn format_cells(cells: &[InvalidCell]) -> String {
    cells
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A query compiled from raw input, with any cells downgraded to wildcards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub query: MatchQuery,
    pub issues: Vec<InvalidCell>,
}

/// Query input before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuery {
    pub mode: String,

    /// Logic selector, interpreted per mode; defaults per mode when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic: Option<String>,

    /// Row-mode scope; defaults to `success`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Success rows, one per draw in the window
    #[serde(default)]
    pub rows: Vec<RawRow>,

    /// Machine rows: one per success row for row modes, one for pattern
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub machine_rows: Vec<RawRow>,

    #[serde(default)]
    pub filter: DrawFilter,
}

/// Cell conversion, collecting rejects as it goes
struct CellReader {
    policy: InvalidCellPolicy,
    invalid: Vec<InvalidCell>,
}

impl CellReader {
    fn cell(&mut self, row: usize, cell: usize, raw: Option<&RawCell>) -> Option<u8> {
        let parsed = match raw {
            None => return None,
            Some(RawCell::Text(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() || trimmed == "_" || trimmed == "*" {
                    return None;
                }
                parse_number(trimmed)
            }
            Some(RawCell::Number(n)) => u8::try_from(*n).ok().filter(|&v| is_valid_number(v)),
        };

        if parsed.is_none() {
            let input = raw.map(ToString::to_string).unwrap_or_default();
            if self.policy == InvalidCellPolicy::Wildcard {
                warn!(row = row + 1, cell = cell + 1, input = %input, "invalid cell treated as wildcard");
            }
            self.invalid.push(InvalidCell { row, cell, input });
        }
        parsed
    }

    fn row(&mut self, index: usize, raw: &RawRow) -> Result<QueryRow, QueryError> {
        if raw.len() > MAX_ROW_CELLS {
            return Err(QueryError::TooManyCells {
                row: index + 1,
                found: raw.len(),
            });
        }
        Ok(QueryRow::new(
            raw.iter()
                .enumerate()
                .map(|(i, c)| self.cell(index, i, c.as_ref()))
                .collect(),
        ))
    }
}

fn parse_logic<T: FromStr + Default>(mode: SearchMode, raw: Option<&str>) -> Result<T, QueryError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(T::default()),
        Some(value) => value.parse().map_err(|_| QueryError::UnknownLogicVariant {
            mode,
            value: value.to_string(),
        }),
    }
}

fn check_count(mode: SearchMode, expected: usize, found: usize) -> Result<(), QueryError> {
    if expected == found {
        Ok(())
    } else {
        Err(QueryError::RowCount {
            mode,
            expected,
            found,
        })
    }
}

impl RawQuery {
    /// Build a raw query from comma-separated row strings
    #[must_use]
    pub fn from_rows(mode: &str, rows: &[String], machine_rows: &[String]) -> Self {
        Self {
            mode: mode.to_string(),
            rows: rows.iter().map(|r| split_row(r)).collect(),
            machine_rows: machine_rows.iter().map(|r| split_row(r)).collect(),
            ..Self::default()
        }
    }

    /// Resolve selectors and cells into a [`MatchQuery`]
    ///
    /// # Errors
    ///
    /// Returns `QueryError::UnknownMode`, `QueryError::UnknownLogicVariant` or
    /// `QueryError::UnknownScope` for unrecognised selectors,
    /// `QueryError::RowCount` if the mode's row count is not met,
    /// `QueryError::TooManyCells` for oversized rows, and under
    /// `InvalidCellPolicy::Reject`, `QueryError::InvalidNumbers` listing every
    /// offending cell.
    pub fn compile(&self, policy: InvalidCellPolicy) -> Result<CompiledQuery, QueryError> {
        let mode: SearchMode = self
            .mode
            .parse()
            .map_err(|_| QueryError::UnknownMode(self.mode.clone()))?;
        let logic = self.logic.as_deref();

        check_count(mode, mode.row_count(), self.rows.len())?;

        let mut reader = CellReader {
            policy,
            invalid: Vec::new(),
        };
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| reader.row(i, r))
            .collect::<Result<Vec<_>, _>>()?;
        let machine_rows = self
            .machine_rows
            .iter()
            .enumerate()
            .map(|(i, r)| reader.row(self.rows.len() + i, r))
            .collect::<Result<Vec<_>, _>>()?;

        let query_mode = match mode {
            SearchMode::SingleRow | SearchMode::TwoRow | SearchMode::ThreeRow => {
                if !machine_rows.is_empty() {
                    check_count(mode, rows.len(), machine_rows.len())?;
                }
                let scope = match self.scope.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                    None => SearchScope::default(),
                    Some(s) => s
                        .parse()
                        .map_err(|_| QueryError::UnknownScope(s.to_string()))?,
                };
                let mut machine = machine_rows.into_iter();
                ModeQuery::Rows {
                    rows: rows
                        .into_iter()
                        .map(|success| RowQuery {
                            success,
                            machine: machine.next(),
                        })
                        .collect(),
                    logic: parse_logic::<MatchLogic>(mode, logic)?,
                    scope,
                }
            }
            SearchMode::Lapping => {
                check_count(mode, 0, machine_rows.len())?;
                let [first, second]: [QueryRow; 2] =
                    rows.try_into().map_err(|r: Vec<QueryRow>| QueryError::RowCount {
                        mode,
                        expected: 2,
                        found: r.len(),
                    })?;
                ModeQuery::Lapping {
                    rows: [first, second],
                    logic: parse_logic::<LappingLogic>(mode, logic)?,
                }
            }
            SearchMode::Knocking => {
                check_count(mode, 0, machine_rows.len())?;
                let rows: [QueryRow; 3] =
                    rows.try_into().map_err(|r: Vec<QueryRow>| QueryError::RowCount {
                        mode,
                        expected: 3,
                        found: r.len(),
                    })?;
                ModeQuery::Knocking {
                    rows,
                    logic: parse_logic::<KnockingLogic>(mode, logic)?,
                }
            }
            SearchMode::Pattern => {
                if machine_rows.len() > 1 {
                    check_count(mode, 1, machine_rows.len())?;
                }
                let success = rows.into_iter().next().unwrap_or_default();
                let machine = machine_rows.into_iter().next().unwrap_or_default();
                ModeQuery::Pattern {
                    success,
                    machine,
                    threshold: parse_logic::<MatchLogic>(mode, logic)?,
                }
            }
        };

        if policy == InvalidCellPolicy::Reject && !reader.invalid.is_empty() {
            return Err(QueryError::InvalidNumbers(reader.invalid));
        }

        Ok(CompiledQuery {
            query: MatchQuery {
                mode: query_mode,
                filter: self.filter,
            },
            issues: reader.invalid,
        })
    }
}
