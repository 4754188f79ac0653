use crate::core::draw::Draw;
use crate::core::types::DrawId;

/// Why a window could not be formed at a given start position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Fewer draws remain than the window width
    EndOfHistory,
    /// Both draw numbers are known and not consecutive
    DrawNumberGap,
    /// The window spans two different games
    GameBoundary,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndOfHistory => write!(f, "end of history"),
            Self::DrawNumberGap => write!(f, "draw number gap"),
            Self::GameBoundary => write!(f, "game boundary"),
        }
    }
}

/// A run of consecutive draws, borrowed read-only from the corpus
#[derive(Debug, Clone, Copy)]
pub struct DrawWindow<'a> {
    /// Index of the first draw within the (filtered, ordered) corpus
    pub start: usize,
    pub draws: &'a [Draw],
}

impl<'a> DrawWindow<'a> {
    #[must_use]
    pub fn new(start: usize, draws: &'a [Draw]) -> Self {
        Self { start, draws }
    }

    /// Form the window of `width` draws starting at `start`
    ///
    /// # Errors
    ///
    /// Returns the `SkipReason` when the draws at `start` cannot form a
    /// window of consecutive draws.
    pub fn form(corpus: &'a [Draw], start: usize, width: usize) -> Result<Self, SkipReason> {
        let end = start.saturating_add(width);
        let draws = corpus.get(start..end).ok_or(SkipReason::EndOfHistory)?;

        for pair in draws.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if let (Some(a), Some(b)) = (prev.game_id, next.game_id) {
                if a != b {
                    return Err(SkipReason::GameBoundary);
                }
            }
            if let (Some(a), Some(b)) = (prev.draw_number, next.draw_number) {
                if a.checked_add(1) != Some(b) {
                    return Err(SkipReason::DrawNumberGap);
                }
            }
        }

        Ok(Self::new(start, draws))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<DrawId> {
        self.draws.iter().map(|d| d.id.clone()).collect()
    }
}
