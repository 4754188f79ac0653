use serde::{Deserialize, Serialize};

use crate::core::draw::Draw;
use crate::core::types::{KnockingLogic, LappingLogic, MatchLogic, SearchMode, SearchScope};

/// One row of query cells; `None` is a wildcard (blank cell)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryRow {
    pub cells: Vec<Option<u8>>,
}

impl QueryRow {
    #[must_use]
    pub fn new(cells: Vec<Option<u8>>) -> Self {
        Self { cells }
    }

    /// A row with no wildcards
    #[must_use]
    pub fn from_numbers(numbers: &[u8]) -> Self {
        Self::new(numbers.iter().copied().map(Some).collect())
    }

    /// Non-wildcard cells with their index
    pub fn entries(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell.map(|n| (i, n)))
    }

    /// Distinct non-wildcard values, ascending
    #[must_use]
    pub fn distinct_values(&self) -> Vec<u8> {
        let mut values: Vec<u8> = self.cells.iter().flatten().copied().collect();
        values.sort_unstable();
        values.dedup();
        values
    }

    #[must_use]
    pub fn is_wildcard_only(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

/// Distinct non-wildcard values across several rows, ascending
#[must_use]
pub fn distinct_values(rows: &[QueryRow]) -> Vec<u8> {
    let mut values: Vec<u8> = rows.iter().flat_map(QueryRow::distinct_values).collect();
    values.sort_unstable();
    values.dedup();
    values
}

/// A row query against one draw: success cells plus optional machine cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowQuery {
    pub success: QueryRow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<QueryRow>,
}

impl RowQuery {
    #[must_use]
    pub fn success_only(success: QueryRow) -> Self {
        Self {
            success,
            machine: None,
        }
    }

    #[must_use]
    pub fn with_machine(mut self, machine: QueryRow) -> Self {
        self.machine = Some(machine);
        self
    }

    /// Machine cells, if any were supplied with at least one number
    #[must_use]
    pub fn machine_numbers(&self) -> Option<&QueryRow> {
        self.machine.as_ref().filter(|row| !row.is_wildcard_only())
    }

    #[must_use]
    pub fn is_wildcard_only(&self) -> bool {
        self.success.is_wildcard_only() && self.machine_numbers().is_none()
    }
}

/// Corpus scoping; `None` fields are unfiltered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_type_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl DrawFilter {
    #[must_use]
    pub fn matches(&self, draw: &Draw) -> bool {
        self.game_type_id
            .map_or(true, |id| draw.game_type_id == Some(id))
            && self.game_id.map_or(true, |id| draw.game_id == Some(id))
            && self.year.map_or(true, |year| draw.year() == year)
    }

    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.game_type_id.is_none() && self.game_id.is_none() && self.year.is_none()
    }
}

/// Mode-specific query payload: exactly the rows and logic each mode needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ModeQuery {
    /// One row per draw of the window; 1, 2 or 3 rows
    Rows {
        rows: Vec<RowQuery>,
        logic: MatchLogic,
        scope: SearchScope,
    },
    Lapping {
        rows: [QueryRow; 2],
        logic: LappingLogic,
    },
    Knocking {
        rows: [QueryRow; 3],
        logic: KnockingLogic,
    },
    Pattern {
        success: QueryRow,
        machine: QueryRow,
        threshold: MatchLogic,
    },
}

impl ModeQuery {
    #[must_use]
    pub fn mode(&self) -> SearchMode {
        match self {
            Self::Rows { rows, .. } => match rows.len() {
                0 | 1 => SearchMode::SingleRow,
                2 => SearchMode::TwoRow,
                _ => SearchMode::ThreeRow,
            },
            Self::Lapping { .. } => SearchMode::Lapping,
            Self::Knocking { .. } => SearchMode::Knocking,
            Self::Pattern { .. } => SearchMode::Pattern,
        }
    }

    /// Number of consecutive draws each evaluated window holds
    #[must_use]
    pub fn window_width(&self) -> usize {
        match self {
            Self::Rows { rows, .. } => rows.len().max(1),
            other => other.mode().window_width(),
        }
    }

    /// True when no cell anywhere in the query holds a number
    #[must_use]
    pub fn is_wildcard_only(&self) -> bool {
        match self {
            Self::Rows { rows, .. } => rows.iter().all(RowQuery::is_wildcard_only),
            Self::Lapping { rows, .. } => rows.iter().all(QueryRow::is_wildcard_only),
            Self::Knocking { rows, .. } => rows.iter().all(QueryRow::is_wildcard_only),
            Self::Pattern {
                success, machine, ..
            } => success.is_wildcard_only() && machine.is_wildcard_only(),
        }
    }
}

/// A validated query ready for the search engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchQuery {
    #[serde(flatten)]
    pub mode: ModeQuery,
    #[serde(default)]
    pub filter: DrawFilter,
}

impl MatchQuery {
    #[must_use]
    pub fn new(mode: ModeQuery) -> Self {
        Self {
            mode,
            filter: DrawFilter::default(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: DrawFilter) -> Self {
        self.filter = filter;
        self
    }
}
