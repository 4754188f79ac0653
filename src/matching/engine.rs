use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::draw::Draw;
use crate::core::query::MatchQuery;
use crate::core::types::SearchMode;
use crate::core::window::{DrawWindow, SkipReason};
use crate::history::store::DrawSource;
use crate::matching::result::{MatchError, MatchResult};
use crate::matching::{matcher_for, WindowMatcher};

/// Default minimum number of window starts before evaluation goes parallel
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 512;

/// Configuration for the search engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Evaluate windows on the rayon thread pool
    pub parallel: bool,
    /// Window starts required before `parallel` takes effect
    pub parallel_threshold: usize,
    /// Keep negative results alongside hits
    pub include_misses: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            include_misses: false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("search cancelled after {evaluated} windows")]
    Cancelled { evaluated: usize },
}

/// Caller-owned flag that abandons a running search
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters describing what a search did, including windows it could not form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchDiagnostics {
    pub mode: Option<SearchMode>,
    /// Draws handed to the scan before scoping
    pub corpus_draws: usize,
    /// Draws left after the game/year filter
    pub scoped_draws: usize,
    pub windows_evaluated: usize,
    pub hits: usize,
    pub misses: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Windows dropped because the matcher rejected them
    pub matcher_errors: usize,
    /// The query held no numbers and was not scanned
    pub wildcard_only: bool,
}

impl SearchDiagnostics {
    #[must_use]
    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum::<usize>() + self.matcher_errors
    }
}

/// Ordered results plus diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<MatchResult>,
    pub diagnostics: SearchDiagnostics,
}

impl SearchOutcome {
    /// Positive results only
    pub fn hits(&self) -> impl Iterator<Item = &MatchResult> {
        self.results.iter().filter(|r| r.hit)
    }
}

/// What happened at one window start
enum WindowEval {
    Evaluated(MatchResult),
    Empty,
    Skipped(SkipReason),
    Failed(MatchError),
    Cancelled,
}

fn evaluate_window(
    matcher: &dyn WindowMatcher,
    corpus: &[Draw],
    start: usize,
    cancel: Option<&CancelToken>,
) -> WindowEval {
    if cancel.is_some_and(CancelToken::is_cancelled) {
        return WindowEval::Cancelled;
    }
    match DrawWindow::form(corpus, start, matcher.width()) {
        Err(reason) => WindowEval::Skipped(reason),
        Ok(window) => match matcher.evaluate(&window) {
            Ok(Some(result)) => WindowEval::Evaluated(result),
            Ok(None) => WindowEval::Empty,
            Err(e) => WindowEval::Failed(e),
        },
    }
}

/// Run a query over a pre-loaded corpus.
///
/// The corpus is scoped by the query's filter and ordered chronologically
/// before windows are formed, so callers may pass draws in any order.
///
/// # Errors
///
/// Returns `SearchError::Cancelled` if `cancel` trips before every window has
/// been evaluated; no partial results are returned.
pub fn search_draws(
    query: &MatchQuery,
    corpus: &[Draw],
    config: &EngineConfig,
    cancel: Option<&CancelToken>,
) -> Result<SearchOutcome, SearchError> {
    let scoped = if query.mode.is_wildcard_only() {
        Vec::new()
    } else {
        corpus
            .iter()
            .filter(|d| query.filter.matches(d))
            .cloned()
            .collect()
    };
    search_scoped(query, corpus.len(), scoped, config, cancel)
}

/// Run a query over draws that already passed the query's filter; sorts them in place
fn search_scoped(
    query: &MatchQuery,
    corpus_draws: usize,
    mut scoped: Vec<Draw>,
    config: &EngineConfig,
    cancel: Option<&CancelToken>,
) -> Result<SearchOutcome, SearchError> {
    let mode = query.mode.mode();
    let mut diagnostics = SearchDiagnostics {
        mode: Some(mode),
        corpus_draws,
        ..SearchDiagnostics::default()
    };

    if query.mode.is_wildcard_only() {
        info!(mode = %mode, "query holds only wildcards, nothing to match");
        diagnostics.wildcard_only = true;
        return Ok(SearchOutcome {
            results: Vec::new(),
            diagnostics,
        });
    }

    scoped.sort_by(Draw::chronological_cmp);
    diagnostics.scoped_draws = scoped.len();
    if !query.filter.is_unfiltered() {
        debug!(
            corpus = corpus_draws,
            scoped = scoped.len(),
            "corpus scoped by filter"
        );
    }

    let matcher = matcher_for(&query.mode);
    debug!(mode = %mode, width = query.mode.window_width(), "sliding windows");
    let starts = 0..scoped.len();

    let mut evals: Vec<(usize, WindowEval)> =
        if config.parallel && scoped.len() >= config.parallel_threshold {
            debug!(windows = scoped.len(), "evaluating windows in parallel");
            starts
                .into_par_iter()
                .map(|start| (start, evaluate_window(matcher.as_ref(), &scoped, start, cancel)))
                .collect()
        } else {
            starts
                .map(|start| (start, evaluate_window(matcher.as_ref(), &scoped, start, cancel)))
                .collect()
        };

    // Corpus order is the contract regardless of how evaluation was scheduled
    evals.sort_by_key(|(start, _)| *start);

    let mut results = Vec::new();
    for (start, eval) in evals {
        match eval {
            WindowEval::Evaluated(result) => {
                diagnostics.windows_evaluated += 1;
                if result.hit {
                    diagnostics.hits += 1;
                } else {
                    diagnostics.misses += 1;
                }
                if result.hit || config.include_misses {
                    results.push(result);
                }
            }
            WindowEval::Empty => diagnostics.windows_evaluated += 1,
            WindowEval::Skipped(reason) => {
                debug!(start, reason = %reason, "window skipped");
                *diagnostics.skipped.entry(reason).or_insert(0) += 1;
            }
            WindowEval::Failed(e) => {
                debug!(start, error = %e, "matcher rejected window");
                diagnostics.matcher_errors += 1;
            }
            WindowEval::Cancelled => {
                info!(mode = %mode, "search cancelled");
                return Err(SearchError::Cancelled {
                    evaluated: diagnostics.windows_evaluated,
                });
            }
        }
    }

    info!(
        mode = %mode,
        scoped = diagnostics.scoped_draws,
        evaluated = diagnostics.windows_evaluated,
        hits = diagnostics.hits,
        skipped = diagnostics.total_skipped(),
        "search complete"
    );

    Ok(SearchOutcome {
        results,
        diagnostics,
    })
}

/// The search dispatcher: pulls draws from a source and runs mode matchers over them
pub struct SearchEngine<'a> {
    source: &'a dyn DrawSource,
    /// Configuration for parallelism and result retention
    config: EngineConfig,
}

impl<'a> SearchEngine<'a> {
    /// Create a new search engine with default configuration
    pub fn new(source: &'a dyn DrawSource) -> Self {
        Self {
            source,
            config: EngineConfig::default(),
        }
    }

    /// Create a new search engine with custom configuration
    pub fn with_config(source: &'a dyn DrawSource, config: EngineConfig) -> Self {
        Self { source, config }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a query to completion
    ///
    /// # Errors
    ///
    /// Never cancelled; the `Result` mirrors [`SearchEngine::search_cancellable`].
    pub fn search(&self, query: &MatchQuery) -> Result<SearchOutcome, SearchError> {
        self.run(query, None)
    }

    /// Run a query that the caller may abandon through `cancel`
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Cancelled` once the token trips.
    pub fn search_cancellable(
        &self,
        query: &MatchQuery,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome, SearchError> {
        self.run(query, Some(cancel))
    }

    fn run(
        &self,
        query: &MatchQuery,
        cancel: Option<&CancelToken>,
    ) -> Result<SearchOutcome, SearchError> {
        // Fetched draws are owned already; scope and sort them without another copy
        let mut draws = self.source.fetch_draws(&query.filter);
        let fetched = draws.len();
        draws.retain(|d| query.filter.matches(d));
        search_scoped(query, fetched, draws, &self.config, cancel)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::core::query::{ModeQuery, QueryRow, RowQuery};
    use crate::core::types::{LappingLogic, MatchLogic, SearchScope};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn arb_corpus() -> impl Strategy<Value = Vec<Draw>> {
        prop::collection::vec(prop::collection::btree_set(1u8..=99, 5), 1..30).prop_map(|sets| {
            let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
            sets.into_iter()
                .enumerate()
                .map(|(i, set)| {
                    let offset = u64::try_from(i).unwrap();
                    Draw::new(
                        format!("d{i}"),
                        start + chrono::Days::new(offset),
                        set.into_iter().collect(),
                    )
                })
                .collect()
        })
    }

    fn arb_row() -> impl Strategy<Value = QueryRow> {
        prop::collection::vec(prop::option::of(1u8..=99), 1..7).prop_map(QueryRow::new)
    }

    fn row_query(row: &QueryRow, logic: MatchLogic) -> MatchQuery {
        MatchQuery::new(ModeQuery::Rows {
            rows: vec![RowQuery::success_only(row.clone())],
            logic,
            scope: SearchScope::Success,
        })
    }

    fn hit_starts(query: &MatchQuery, corpus: &[Draw]) -> Vec<usize> {
        search_draws(query, corpus, &EngineConfig::default(), None)
            .unwrap()
            .hits()
            .map(|r| r.start)
            .collect()
    }

    proptest! {
        #[test]
        fn stricter_logic_never_adds_hits(corpus in arb_corpus(), row in arb_row()) {
            let logics = [
                MatchLogic::One,
                MatchLogic::Two,
                MatchLogic::Three,
                MatchLogic::Four,
                MatchLogic::Five,
            ];
            for pair in logics.windows(2) {
                let looser = hit_starts(&row_query(&row, pair[0]), &corpus);
                let stricter = hit_starts(&row_query(&row, pair[1]), &corpus);
                prop_assert!(stricter.iter().all(|s| looser.contains(s)));
            }
        }

        #[test]
        fn wildcard_only_query_never_matches(corpus in arb_corpus(), width in 1usize..8) {
            let blank = QueryRow::new(vec![None; width]);
            let query = MatchQuery::new(ModeQuery::Lapping {
                rows: [blank.clone(), blank],
                logic: LappingLogic::PositionRandomZebra,
            });
            let outcome = search_draws(&query, &corpus, &EngineConfig::default(), None).unwrap();
            prop_assert!(outcome.results.is_empty());
            prop_assert!(outcome.diagnostics.wildcard_only);
        }

        #[test]
        fn search_is_idempotent_and_schedule_independent(
            corpus in arb_corpus(),
            first in arb_row(),
            second in arb_row(),
        ) {
            let query = MatchQuery::new(ModeQuery::Lapping {
                rows: [first, second],
                logic: LappingLogic::Random,
            });
            let sequential = EngineConfig {
                parallel: false,
                include_misses: true,
                ..EngineConfig::default()
            };
            let parallel = EngineConfig {
                parallel: true,
                parallel_threshold: 1,
                include_misses: true,
            };
            let a = search_draws(&query, &corpus, &sequential, None).unwrap();
            let b = search_draws(&query, &corpus, &sequential, None).unwrap();
            let c = search_draws(&query, &corpus, &parallel, None).unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(&a, &c);
        }
    }
}
