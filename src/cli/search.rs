use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::core::query::MatchQuery;
use crate::history::DrawHistory;
use crate::matching::engine::{EngineConfig, SearchEngine, SearchOutcome};
use crate::matching::result::{MatchDetail, MatchResult};
use crate::parsing::query::{InvalidCellPolicy, RawQuery};

#[derive(Args)]
pub struct SearchArgs {
    /// Draw history (.json, .csv or .tsv, optionally .gz)
    #[arg(required = true)]
    pub history: PathBuf,

    /// JSON query file; replaces --mode, --row and --machine-row
    #[arg(short, long, conflicts_with_all = ["mode", "rows", "machine_rows"])]
    pub query: Option<PathBuf>,

    /// Search mode: single-row, two-row, three-row, lapping, knocking, pattern
    #[arg(short, long, required_unless_present = "query")]
    pub mode: Option<String>,

    /// Logic for the mode (any/one..five, lapping or knocking variant)
    #[arg(short, long)]
    pub logic: Option<String>,

    /// Row-mode scope: both, success, machine, position
    #[arg(short, long)]
    pub scope: Option<String>,

    /// Query row as comma-separated cells; blank cells are wildcards.
    /// Repeat once per draw in the window
    #[arg(short, long = "row", value_name = "CELLS")]
    pub rows: Vec<String>,

    /// Machine cells, one per --row (row modes) or one for pattern mode
    #[arg(long = "machine-row", value_name = "CELLS")]
    pub machine_rows: Vec<String>,

    /// Only search draws of this game type
    #[arg(long)]
    pub game_type_id: Option<u32>,

    /// Only search draws of this game
    #[arg(long)]
    pub game_id: Option<u32>,

    /// Only search draws from this year
    #[arg(long)]
    pub year: Option<i32>,

    /// Treat invalid cells as wildcards instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Also report windows that did not hit
    #[arg(long)]
    pub include_misses: bool,

    /// Evaluate windows on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Maximum number of results to show
    #[arg(short = 'n', long)]
    pub max_results: Option<usize>,
}

impl SearchArgs {
    /// Raw query from the query file or the row flags, with flag overrides applied
    fn raw_query(&self) -> anyhow::Result<RawQuery> {
        let mut raw = if let Some(path) = &self.query {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read query file {}", path.display()))?;
            serde_json::from_str::<RawQuery>(&content)
                .with_context(|| format!("Failed to parse query file {}", path.display()))?
        } else {
            let mode = self
                .mode
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("--mode is required unless --query is given"))?;
            RawQuery::from_rows(mode, &self.rows, &self.machine_rows)
        };

        if self.logic.is_some() {
            raw.logic.clone_from(&self.logic);
        }
        if self.scope.is_some() {
            raw.scope.clone_from(&self.scope);
        }
        if self.game_type_id.is_some() {
            raw.filter.game_type_id = self.game_type_id;
        }
        if self.game_id.is_some() {
            raw.filter.game_id = self.game_id;
        }
        if self.year.is_some() {
            raw.filter.year = self.year;
        }
        Ok(raw)
    }
}

/// Execute search subcommand
///
/// # Errors
///
/// Returns an error if the query is invalid, the history cannot be loaded,
/// or output fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SearchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let policy = if args.lenient {
        InvalidCellPolicy::Wildcard
    } else {
        InvalidCellPolicy::Reject
    };
    let compiled = args.raw_query()?.compile(policy)?;

    let history = DrawHistory::load_from_file(&args.history)
        .with_context(|| format!("Failed to load history {}", args.history.display()))?;

    if verbose {
        eprintln!(
            "Loaded {} draws from {}",
            history.len(),
            args.history.display()
        );
        if !compiled.issues.is_empty() {
            eprintln!("{} invalid cells treated as wildcards", compiled.issues.len());
        }
    }

    let config = EngineConfig {
        parallel: !args.sequential,
        include_misses: args.include_misses,
        ..EngineConfig::default()
    };
    let engine = SearchEngine::with_config(&history, config);
    let outcome = engine.search(&compiled.query)?;

    let limit = args.max_results.unwrap_or(usize::MAX);
    let shown: Vec<&MatchResult> = outcome.results.iter().take(limit).collect();

    match format {
        OutputFormat::Text => print_text_results(&compiled.query, &outcome, &shown, verbose),
        OutputFormat::Json => print_json_results(&compiled.query, &outcome, &shown)?,
        OutputFormat::Tsv => print_tsv_results(&shown),
    }

    Ok(())
}

fn join<T: std::fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

/// One-line summary of what matched in a window
fn describe_detail(detail: &MatchDetail) -> String {
    match detail {
        MatchDetail::Rows(rows) => rows
            .iter()
            .map(|r| {
                format!(
                    "row {}: {}/{} [{}]",
                    r.row + 1,
                    r.count,
                    r.required,
                    join(&r.matched_numbers, " ")
                )
            })
            .collect::<Vec<_>>()
            .join("; "),
        MatchDetail::Lapping(numbers) => numbers
            .iter()
            .map(|n| {
                let mut rules = Vec::new();
                if n.positional {
                    rules.push("positional");
                }
                if n.random {
                    rules.push("random");
                }
                if n.zebra {
                    rules.push("zebra");
                }
                format!("{} ({})", n.number, rules.join("+"))
            })
            .collect::<Vec<_>>()
            .join(", "),
        MatchDetail::Knocking(numbers) => numbers
            .iter()
            .map(|n| format!("{} @ {}", n.number, join(&n.knocking_positions, ",")))
            .collect::<Vec<_>>()
            .join(", "),
        MatchDetail::Pattern(p) => format!(
            "{} side; success [{}] machine [{}] success->machine [{}] machine->success [{}]",
            p.side,
            join(&p.success_matches, " "),
            join(&p.machine_matches, " "),
            join(&p.success_to_machine, " "),
            join(&p.machine_to_success, " "),
        ),
    }
}

fn print_text_results(
    query: &MatchQuery,
    outcome: &SearchOutcome,
    shown: &[&MatchResult],
    verbose: bool,
) {
    let diag = &outcome.diagnostics;
    println!("Mode: {}", query.mode.mode());
    if diag.wildcard_only {
        println!("Query contains only wildcards; nothing to match.");
        return;
    }
    println!(
        "Draws: {} in scope of {} loaded",
        diag.scoped_draws, diag.corpus_draws
    );
    println!(
        "Windows: {} evaluated, {} hits, {} skipped",
        diag.windows_evaluated,
        diag.hits,
        diag.total_skipped()
    );
    if verbose {
        for (reason, count) in &diag.skipped {
            println!("  skipped ({reason}): {count}");
        }
    }
    println!();

    if shown.is_empty() {
        println!("No matching windows found.");
        return;
    }

    for (i, result) in shown.iter().enumerate() {
        let status = if result.hit { "HIT " } else { "miss" };
        println!(
            "#{:<4} {} {}  [{}]  score {}/{}",
            i + 1,
            status,
            join(&result.draw_dates, " "),
            join(&result.draw_ids, ", "),
            result.score,
            result.required,
        );
        println!("       {}", describe_detail(&result.detail));
    }

    if shown.len() < outcome.results.len() {
        println!();
        println!(
            "... {} more results not shown",
            outcome.results.len() - shown.len()
        );
    }
}

fn print_json_results(
    query: &MatchQuery,
    outcome: &SearchOutcome,
    shown: &[&MatchResult],
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "query": query,
        "diagnostics": outcome.diagnostics,
        "results": shown,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(shown: &[&MatchResult]) {
    println!("rank\tstart\tdraw_ids\tdraw_dates\thit\tscore\trequired\tmatched_numbers\tdetail");
    for (i, result) in shown.iter().enumerate() {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            i + 1,
            result.start,
            join(&result.draw_ids, ","),
            join(&result.draw_dates, ","),
            result.hit,
            result.score,
            result.required,
            join(&result.matched_numbers(), ","),
            describe_detail(&result.detail),
        );
    }
}
