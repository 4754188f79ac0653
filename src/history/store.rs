use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::draw::{Draw, DrawError};
use crate::core::query::DrawFilter;
use crate::core::types::DrawId;
use crate::parsing::tsv::{parse_draw_table, ParseError};
use crate::utils::validation::{is_gzipped, MAX_DRAWS, MAX_HISTORY_BYTES};

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to read history: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse history JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse history table: {0}")]
    TableError(#[from] ParseError),

    #[error("Invalid draw: {0}")]
    InvalidDraw(#[from] DrawError),

    #[error("Duplicate draw id '{0}'")]
    DuplicateId(DrawId),

    #[error(
        "Draw {id} has {found} success numbers but game type {game_type_id} draws {expected}"
    )]
    InconsistentLength {
        id: DrawId,
        game_type_id: u32,
        expected: usize,
        found: usize,
    },

    #[error("Too many draws: {0} exceeds maximum allowed ({max})", max = MAX_DRAWS)]
    TooManyDraws(usize),

    #[error("History exceeds {limit} bytes of text")]
    TooLarge { limit: u64 },

    #[error("Unsupported history format: {0}")]
    UnsupportedFormat(String),
}

/// History file version for compatibility checking
pub const HISTORY_VERSION: &str = "1.0.0";

/// Versioned history envelope
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryData {
    pub version: String,
    pub draws: Vec<Draw>,
}

/// Either the versioned envelope or a bare array of draws
#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryDocument {
    Versioned(HistoryData),
    Bare(Vec<Draw>),
}

/// Supplies the draws a search runs over
pub trait DrawSource: Sync {
    /// Draws matching `filter`, in any order
    fn fetch_draws(&self, filter: &DrawFilter) -> Vec<Draw>;
}

/// Per-game counts and date span, for summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub game_type_id: Option<u32>,
    pub game_id: Option<u32>,
    pub draws: usize,
    pub first: NaiveDate,
    pub last: NaiveDate,
}

/// In-memory draw history, kept in chronological order
#[derive(Debug, Default)]
pub struct DrawHistory {
    draws: Vec<Draw>,

    /// Index: draw ID -> index in draws vec
    id_to_index: HashMap<DrawId, usize>,
}

impl DrawHistory {
    /// Create an empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from draws in any order
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::InvalidDraw` if a draw fails validation,
    /// `HistoryError::DuplicateId` if two draws share an id,
    /// `HistoryError::InconsistentLength` if a game type mixes success lengths,
    /// or `HistoryError::TooManyDraws` if the limit is exceeded.
    pub fn from_draws(draws: Vec<Draw>) -> Result<Self, HistoryError> {
        if draws.len() > MAX_DRAWS {
            return Err(HistoryError::TooManyDraws(draws.len()));
        }

        let mut lengths: HashMap<u32, usize> = HashMap::new();
        let mut seen: HashSet<&DrawId> = HashSet::with_capacity(draws.len());
        for draw in &draws {
            draw.validate()?;
            if !seen.insert(&draw.id) {
                return Err(HistoryError::DuplicateId(draw.id.clone()));
            }
            if let Some(game_type_id) = draw.game_type_id {
                let expected = *lengths.entry(game_type_id).or_insert(draw.success.len());
                if expected != draw.success.len() {
                    return Err(HistoryError::InconsistentLength {
                        id: draw.id.clone(),
                        game_type_id,
                        expected,
                        found: draw.success.len(),
                    });
                }
            }
        }

        let mut draws = draws;
        draws.sort_by(Draw::chronological_cmp);
        let id_to_index = draws
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.clone(), i))
            .collect();

        debug!(draws = draws.len(), "history loaded");
        Ok(Self { draws, id_to_index })
    }

    /// Parse a history from JSON, versioned envelope or bare array
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::JsonError` for malformed JSON, or any error of
    /// [`DrawHistory::from_draws`].
    pub fn from_json(json: &str) -> Result<Self, HistoryError> {
        let draws = match serde_json::from_str(json)? {
            HistoryDocument::Versioned(data) => {
                // Version check (warn but don't fail)
                if data.version != HISTORY_VERSION {
                    warn!(
                        expected = HISTORY_VERSION,
                        found = %data.version,
                        "history version mismatch"
                    );
                }
                data.draws
            }
            HistoryDocument::Bare(draws) => draws,
        };
        Self::from_draws(draws)
    }

    /// Load a history file: `.json`, `.csv` or `.tsv`, optionally gzip-compressed
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::ReadError` if the file cannot be read,
    /// `HistoryError::UnsupportedFormat` for unknown extensions, or any
    /// parse or validation error.
    pub fn load_from_file(path: &Path) -> Result<Self, HistoryError> {
        Self::load_from_file_with_limit(path, MAX_HISTORY_BYTES)
    }

    /// Load a history file, refusing more than `max_bytes` of (decompressed) text
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::TooLarge` past the byte cap, otherwise as
    /// [`DrawHistory::load_from_file`].
    pub fn load_from_file_with_limit(path: &Path, max_bytes: u64) -> Result<Self, HistoryError> {
        let gzipped = is_gzipped(path);
        let inner = if gzipped {
            path.file_stem().map(Path::new)
        } else {
            Some(path)
        };
        let extension = inner
            .and_then(Path::extension)
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        let file = std::fs::File::open(path)?;
        let content = if gzipped {
            read_capped(flate2::read::GzDecoder::new(file), max_bytes)?
        } else {
            read_capped(file, max_bytes)?
        };

        match extension.as_deref() {
            Some("json") => Self::from_json(&content),
            Some("csv") => Self::from_draws(parse_draw_table(&content, ',')?),
            Some("tsv" | "txt") => Self::from_draws(parse_draw_table(&content, '\t')?),
            Some(ext) => Err(HistoryError::UnsupportedFormat(ext.to_string())),
            None => Err(HistoryError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// All draws, in chronological order
    #[must_use]
    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    /// Get a draw by ID
    #[must_use]
    pub fn get(&self, id: &DrawId) -> Option<&Draw> {
        self.id_to_index.get(id).map(|&idx| &self.draws[idx])
    }

    /// Number of draws in history
    #[must_use]
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    /// Check if history is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// Earliest and latest draw dates
    #[must_use]
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.draws.first()?.draw_date, self.draws.last()?.draw_date))
    }

    /// Earliest and latest draw years
    #[must_use]
    pub fn year_span(&self) -> Option<(i32, i32)> {
        Some((self.draws.first()?.year(), self.draws.last()?.year()))
    }

    /// Draw counts per (game type, game), ordered by key
    #[must_use]
    pub fn games(&self) -> Vec<GameSummary> {
        let mut games: BTreeMap<(Option<u32>, Option<u32>), GameSummary> = BTreeMap::new();
        for draw in &self.draws {
            games
                .entry((draw.game_type_id, draw.game_id))
                .and_modify(|g| {
                    g.draws += 1;
                    g.last = draw.draw_date;
                })
                .or_insert(GameSummary {
                    game_type_id: draw.game_type_id,
                    game_id: draw.game_id,
                    draws: 1,
                    first: draw.draw_date,
                    last: draw.draw_date,
                });
        }
        games.into_values().collect()
    }
}

/// Read at most `limit` bytes; one byte more means the input is too large
fn read_capped<R: Read>(reader: R, limit: u64) -> Result<String, HistoryError> {
    let mut bytes = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > limit {
        return Err(HistoryError::TooLarge { limit });
    }
    String::from_utf8(bytes).map_err(|e| {
        HistoryError::ReadError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

impl DrawSource for DrawHistory {
    fn fetch_draws(&self, filter: &DrawFilter) -> Vec<Draw> {
        self.draws
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_from_draws_sorts_and_indexes() {
        let history = DrawHistory::from_draws(vec![
            Draw::new("b", day(2), vec![4, 5, 6]),
            Draw::new("a", day(1), vec![1, 2, 3]),
        ])
        .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.draws()[0].id.0, "a");
        assert_eq!(history.get(&DrawId::new("b")).unwrap().success, vec![4, 5, 6]);
        assert!(history.get(&DrawId::new("zz")).is_none());
        assert_eq!(history.date_span(), Some((day(1), day(2))));
        assert_eq!(history.year_span(), Some((2024, 2024)));
    }

    #[test]
    fn test_empty_history() {
        let history = DrawHistory::new();
        assert!(history.is_empty());
        assert!(history.date_span().is_none());
        assert!(history.games().is_empty());
    }

    #[test]
    fn test_rejects_duplicate_id() {
        let err = DrawHistory::from_draws(vec![
            Draw::new("a", day(1), vec![1, 2, 3]),
            Draw::new("a", day(2), vec![4, 5, 6]),
        ])
        .unwrap_err();
        assert!(matches!(err, HistoryError::DuplicateId(id) if id.0 == "a"));
    }

    #[test]
    fn test_rejects_invalid_draw() {
        let err = DrawHistory::from_draws(vec![Draw::new("a", day(1), vec![1, 100])]).unwrap_err();
        assert!(matches!(err, HistoryError::InvalidDraw(DrawError::OutOfRange { .. })));
    }

    #[test]
    fn test_rejects_mixed_lengths_within_game_type() {
        let err = DrawHistory::from_draws(vec![
            Draw::new("a", day(1), vec![1, 2, 3]).with_game(1, 1),
            Draw::new("b", day(2), vec![1, 2, 3, 4]).with_game(1, 2),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            HistoryError::InconsistentLength {
                expected: 3,
                found: 4,
                ..
            }
        ));

        // Different game types may differ
        assert!(DrawHistory::from_draws(vec![
            Draw::new("a", day(1), vec![1, 2, 3]).with_game(1, 1),
            Draw::new("b", day(2), vec![1, 2, 3, 4]).with_game(2, 1),
        ])
        .is_ok());
    }

    #[test]
    fn test_games_summary() {
        let history = DrawHistory::from_draws(vec![
            Draw::new("a", day(1), vec![1, 2]).with_game(1, 1),
            Draw::new("b", day(2), vec![1, 2]).with_game(1, 2),
            Draw::new("c", day(3), vec![1, 2]).with_game(1, 1),
        ])
        .unwrap();
        let games = history.games();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].game_id, Some(1));
        assert_eq!(games[0].draws, 2);
        assert_eq!(games[0].first, day(1));
        assert_eq!(games[0].last, day(3));
    }

    #[test]
    fn test_from_json_envelope_and_bare_array() {
        let envelope = r#"{
            "version": "1.0.0",
            "draws": [
                {"id": "x1", "draw_date": "2024-01-05", "success": [3, 8, 15], "machine": [40, 41, 42]}
            ]
        }"#;
        let history = DrawHistory::from_json(envelope).unwrap();
        assert_eq!(history.draws()[0].machine, vec![40, 41, 42]);

        let bare = r#"[{"id": "x1", "draw_date": "2024-01-05", "numbers": [3, 8, 15]}]"#;
        let history = DrawHistory::from_json(bare).unwrap();
        assert_eq!(history.draws()[0].success, vec![3, 8, 15]);
        assert!(history.draws()[0].machine.is_empty());
    }

    #[test]
    fn test_from_json_old_version_still_loads() {
        let json = r#"{"version": "0.9.0", "draws": [
            {"id": "a", "draw_date": "2024-03-01", "success": [7, 8, 9], "game_type_id": 3, "game_id": 4, "draw_number": 12}
        ]}"#;
        let history = DrawHistory::from_json(json).unwrap();
        assert_eq!(history.draws()[0].draw_number, Some(12));
        assert_eq!(history.draws()[0].game_id, Some(4));
    }

    #[test]
    fn test_load_gzipped_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draws.csv.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder
            .write_all(b"id,game_type_id,game_id,draw_date,draw_number,success,machine\nd1,1,1,2024-01-01,1,3 8 15,\n")
            .unwrap();
        encoder.finish().unwrap();

        let history = DrawHistory::load_from_file(&path).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.draws()[0].success, vec![3, 8, 15]);
    }

    #[test]
    fn test_gzip_bomb_stops_at_byte_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draws.csv.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::best());
        // Compresses to a few hundred bytes, inflates to 1 MiB of comment lines
        let line = format!("#{}\n", "x".repeat(1023));
        for _ in 0..1024 {
            encoder.write_all(line.as_bytes()).unwrap();
        }
        encoder.write_all(b"d1,1,1,2024-01-01,1,3 8 15,\n").unwrap();
        encoder.finish().unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() < 64 * 1024);

        assert!(matches!(
            DrawHistory::load_from_file_with_limit(&path, 64 * 1024),
            Err(HistoryError::TooLarge { limit: 65536 })
        ));
        let history = DrawHistory::load_from_file_with_limit(&path, 2 * 1024 * 1024)
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_too_many_draws_message_names_limit() {
        let message = HistoryError::TooManyDraws(MAX_DRAWS + 1).to_string();
        assert!(message.contains(&MAX_DRAWS.to_string()));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draws.xml");
        std::fs::write(&path, "<draws/>").unwrap();
        assert!(matches!(
            DrawHistory::load_from_file(&path),
            Err(HistoryError::UnsupportedFormat(ext)) if ext == "xml"
        ));
    }

    #[test]
    fn test_fetch_draws_applies_filter() {
        let history = DrawHistory::from_draws(vec![
            Draw::new("a", day(1), vec![1, 2]).with_game(1, 1),
            Draw::new("b", day(2), vec![1, 2]).with_game(1, 2),
        ])
        .unwrap();
        let filter = DrawFilter {
            game_id: Some(2),
            ..DrawFilter::default()
        };
        let draws = history.fetch_draws(&filter);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].id.0, "b");
    }
}
