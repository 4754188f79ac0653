use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::history::{DrawHistory, GameSummary};

#[derive(Args)]
pub struct HistoryArgs {
    /// Draw history (.json, .csv or .tsv, optionally .gz)
    #[arg(required = true)]
    pub history: PathBuf,
}

/// Execute history subcommand
///
/// # Errors
///
/// Returns an error if the history cannot be loaded or output fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: HistoryArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let history = DrawHistory::load_from_file(&args.history)
        .with_context(|| format!("Failed to load history {}", args.history.display()))?;

    if history.is_empty() {
        eprintln!("Warning: History is empty.");
        return Ok(());
    }

    let games = history.games();
    match format {
        OutputFormat::Text => print_text_summary(&history, &games, verbose),
        OutputFormat::Json => print_json_summary(&history, &games)?,
        OutputFormat::Tsv => print_tsv_summary(&games),
    }

    Ok(())
}

fn fmt_id(id: Option<u32>) -> String {
    id.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn print_text_summary(history: &DrawHistory, games: &[GameSummary], verbose: bool) {
    println!("Draws: {}", history.len());
    if let Some((first, last)) = history.date_span() {
        println!("Span:  {first} to {last}");
    }
    if let Some((first, last)) = history.year_span() {
        println!("Years: {first} to {last}");
    }
    println!("Games: {}", games.len());
    println!();
    println!("{:<10} {:<8} {:>7}  {:<10}  {:<10}", "Game type", "Game", "Draws", "First", "Last");
    println!("{}", "-".repeat(52));
    for game in games {
        println!(
            "{:<10} {:<8} {:>7}  {:<10}  {:<10}",
            fmt_id(game.game_type_id),
            fmt_id(game.game_id),
            game.draws,
            game.first.to_string(),
            game.last.to_string(),
        );
    }

    if verbose {
        let with_machine = history
            .draws()
            .iter()
            .filter(|d| !d.machine.is_empty())
            .count();
        println!();
        println!("Draws with machine numbers: {with_machine}");
    }
}

fn print_json_summary(history: &DrawHistory, games: &[GameSummary]) -> anyhow::Result<()> {
    let span = history.date_span();
    let years = history.year_span();
    let output = serde_json::json!({
        "draws": history.len(),
        "first_date": span.map(|(first, _)| first),
        "last_date": span.map(|(_, last)| last),
        "first_year": years.map(|(first, _)| first),
        "last_year": years.map(|(_, last)| last),
        "games": games,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_summary(games: &[GameSummary]) {
    println!("game_type_id\tgame_id\tdraws\tfirst\tlast");
    for game in games {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            fmt_id(game.game_type_id),
            fmt_id(game.game_id),
            game.draws,
            game.first,
            game.last,
        );
    }
}
