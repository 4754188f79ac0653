use chrono::NaiveDate;
use thiserror::Error;

use crate::core::draw::Draw;
use crate::utils::validation::{check_draw_limit, MAX_DRAWS};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid draw table: {0}")]
    InvalidFormat(String),

    #[error("Too many draws: {0} exceeds maximum allowed ({max})", max = MAX_DRAWS)]
    TooManyDraws(usize),
}

/// Minimum columns: id, game_type_id, game_id, draw_date, draw_number, success
const REQUIRED_FIELDS: usize = 6;

/// Parse a number list such as `3 8 15` or `3-8-15`
fn parse_numbers(field: &str, line_num: usize) -> Result<Vec<u8>, ParseError> {
    field
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<u8>().map_err(|_| {
                ParseError::InvalidFormat(format!("Invalid number on line {line_num}: '{t}'"))
            })
        })
        .collect()
}

/// Parse an optional integer column; blank is `None`
fn parse_optional(field: &str, column: &str, line_num: usize) -> Result<Option<u32>, ParseError> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    field.parse().map(Some).map_err(|_| {
        ParseError::InvalidFormat(format!(
            "Invalid {column} on line {line_num}: '{field}'"
        ))
    })
}

/// Parse CSV/TSV draw rows with columns:
/// `id, game_type_id, game_id, draw_date, draw_number, success, [machine]`
///
/// Number lists are space- or dash-separated. An optional header line whose
/// first field is `id` is skipped, as are blank lines and `#` comments.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if lines have too few fields, contain
/// unparsable values, or no draws are found, or `ParseError::TooManyDraws`
/// if the limit is exceeded.
pub fn parse_draw_table(text: &str, delimiter: char) -> Result<Vec<Draw>, ParseError> {
    let mut draws = Vec::new();
    let mut first_data_line = true;

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();

        if first_data_line {
            first_data_line = false;
            if fields.first().is_some_and(|f| f.eq_ignore_ascii_case("id")) {
                continue;
            }
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        if fields.len() < REQUIRED_FIELDS {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than {REQUIRED_FIELDS} fields"
            )));
        }

        let id = fields[0];
        if id.is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "Missing draw id on line {line_num}"
            )));
        }

        let draw_date = NaiveDate::parse_from_str(fields[3], "%Y-%m-%d").map_err(|_| {
            ParseError::InvalidFormat(format!(
                "Invalid draw_date on line {}: '{}'",
                line_num, fields[3]
            ))
        })?;

        let mut draw = Draw::new(id, draw_date, parse_numbers(fields[5], line_num)?);
        draw.game_type_id = parse_optional(fields[1], "game_type_id", line_num)?;
        draw.game_id = parse_optional(fields[2], "game_id", line_num)?;
        draw.draw_number = parse_optional(fields[4], "draw_number", line_num)?;
        if let Some(machine) = fields.get(6) {
            draw.machine = parse_numbers(machine, line_num)?;
        }

        // Check draw limit for DOS protection
        if check_draw_limit(draws.len()).is_some() {
            return Err(ParseError::TooManyDraws(draws.len()));
        }

        draws.push(draw);
    }

    if draws.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No draws found in file".to_string(),
        ));
    }

    Ok(draws)
}
