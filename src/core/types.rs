use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Unique identifier for a draw in the history
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawId(pub String);

impl DrawId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl std::fmt::Display for DrawId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A selector string that does not name any variant of the target enum
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Normalize a selector: lowercase, `_` and spaces folded to `-`
fn normalize_selector(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .collect()
}

/// Search mode, one per matcher family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    SingleRow,
    TwoRow,
    ThreeRow,
    Knocking,
    Lapping,
    Pattern,
}

impl SearchMode {
    /// Number of consecutive draws a window must hold for this mode
    #[must_use]
    pub fn window_width(self) -> usize {
        match self {
            Self::SingleRow | Self::Pattern => 1,
            Self::TwoRow | Self::Lapping => 2,
            Self::ThreeRow | Self::Knocking => 3,
        }
    }

    /// Number of query rows the mode expects
    #[must_use]
    pub fn row_count(self) -> usize {
        match self {
            Self::Pattern => 1,
            other => other.window_width(),
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleRow => write!(f, "single-row"),
            Self::TwoRow => write!(f, "two-row"),
            Self::ThreeRow => write!(f, "three-row"),
            Self::Knocking => write!(f, "knocking"),
            Self::Lapping => write!(f, "lapping"),
            Self::Pattern => write!(f, "pattern"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_selector(s).as_str() {
            "single-row" | "single" => Ok(Self::SingleRow),
            "two-row" => Ok(Self::TwoRow),
            "three-row" => Ok(Self::ThreeRow),
            "knocking" => Ok(Self::Knocking),
            "lapping" => Ok(Self::Lapping),
            "pattern" => Ok(Self::Pattern),
            _ => Err(UnknownVariant::new("search mode", s)),
        }
    }
}

/// Minimum number of query numbers that must be found for a row to hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchLogic {
    #[default]
    Any,
    One,
    Two,
    Three,
    Four,
    Five,
}

impl MatchLogic {
    /// The literal minimum before capping
    #[must_use]
    pub fn min_count(self) -> usize {
        match self {
            Self::Any | Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
        }
    }

    /// Minimum count capped at the number of non-wildcard entries supplied
    #[must_use]
    pub fn required(self, supplied: usize) -> usize {
        self.min_count().min(supplied)
    }
}

impl std::fmt::Display for MatchLogic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::One => write!(f, "one"),
            Self::Two => write!(f, "two"),
            Self::Three => write!(f, "three"),
            Self::Four => write!(f, "four"),
            Self::Five => write!(f, "five"),
        }
    }
}

impl FromStr for MatchLogic {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_selector(s).as_str() {
            "any" => Ok(Self::Any),
            "one" | "1" => Ok(Self::One),
            "two" | "2" => Ok(Self::Two),
            "three" | "3" => Ok(Self::Three),
            "four" | "4" => Ok(Self::Four),
            "five" | "5" => Ok(Self::Five),
            _ => Err(UnknownVariant::new("match logic", s)),
        }
    }
}

/// Which number set(s) of a draw a row query is counted against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchScope {
    /// Union of success and machine numbers, membership-based
    Both,
    /// Success numbers only, membership-based
    #[default]
    Success,
    /// Machine numbers only, membership-based
    Machine,
    /// Exact index agreement
    Position,
}

impl std::fmt::Display for SearchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Both => write!(f, "both"),
            Self::Success => write!(f, "success"),
            Self::Machine => write!(f, "machine"),
            Self::Position => write!(f, "position"),
        }
    }
}

impl FromStr for SearchScope {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_selector(s).as_str() {
            "both" => Ok(Self::Both),
            "success" => Ok(Self::Success),
            "machine" => Ok(Self::Machine),
            "position" => Ok(Self::Position),
            _ => Err(UnknownVariant::new("search scope", s)),
        }
    }
}

/// Two-draw lapping logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LappingLogic {
    /// Row 1 number anywhere in draw 2, or row 2 number anywhere in draw 1
    #[default]
    Random,
    /// Number at the same index in both draws
    Positional,
    /// Positional OR random OR zebra
    PositionRandomZebra,
    /// Random rule, at least two numbers
    MatchTwoLapping,
    /// Zebra rule, at least two numbers
    MatchTwoDiagonal,
}

impl LappingLogic {
    /// Minimum count of distinct numbers satisfying the rule for a hit
    #[must_use]
    pub fn min_numbers(self) -> usize {
        match self {
            Self::MatchTwoLapping | Self::MatchTwoDiagonal => 2,
            Self::Random | Self::Positional | Self::PositionRandomZebra => 1,
        }
    }
}

impl std::fmt::Display for LappingLogic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Positional => write!(f, "positional"),
            Self::PositionRandomZebra => write!(f, "position-random-zebra"),
            Self::MatchTwoLapping => write!(f, "match-two-lapping"),
            Self::MatchTwoDiagonal => write!(f, "match-two-diagonal"),
        }
    }
}

impl FromStr for LappingLogic {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_selector(s).as_str() {
            "random" => Ok(Self::Random),
            "positional" | "position" => Ok(Self::Positional),
            "position-random-zebra" => Ok(Self::PositionRandomZebra),
            "match-two-lapping" => Ok(Self::MatchTwoLapping),
            "match-two-diagonal" => Ok(Self::MatchTwoDiagonal),
            _ => Err(UnknownVariant::new("lapping logic", s)),
        }
    }
}

/// Three-draw knocking logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KnockingLogic {
    /// Same index in all three draws
    #[default]
    Vertical,
    /// Present anywhere in all three draws
    #[serde(alias = "zebra")]
    Diagonal,
}

impl std::fmt::Display for KnockingLogic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertical => write!(f, "vertical"),
            Self::Diagonal => write!(f, "diagonal"),
        }
    }
}

impl FromStr for KnockingLogic {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_selector(s).as_str() {
            "vertical" => Ok(Self::Vertical),
            "diagonal" | "zebra" => Ok(Self::Diagonal),
            _ => Err(UnknownVariant::new("knocking logic", s)),
        }
    }
}
