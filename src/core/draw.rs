use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

use crate::core::types::DrawId;
use crate::utils::validation::is_valid_number;

/// Which of a draw's two number sets a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberSet {
    Success,
    Machine,
}

impl std::fmt::Display for NumberSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Machine => write!(f, "machine"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    #[error("draw {id}: {set} number {value} outside 1..=99")]
    OutOfRange { id: DrawId, set: NumberSet, value: u8 },

    #[error("draw {id}: {set} number {value} appears more than once")]
    Duplicate { id: DrawId, set: NumberSet, value: u8 },

    #[error("draw {id}: no success numbers")]
    Empty { id: DrawId },
}

/// A single lottery draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    /// Opaque unique identifier
    pub id: DrawId,

    /// Game type classification (e.g. 5/90)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_type_id: Option<u32>,

    /// Specific game within the type (e.g. a weekday draw)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<u32>,

    pub draw_date: NaiveDate,

    /// Sequential draw number, when the operator publishes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_number: Option<u32>,

    /// Primary numbers, position-significant
    #[serde(alias = "numbers")]
    pub success: Vec<u8>,

    /// Secondary numbers; empty for games without a machine draw
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub machine: Vec<u8>,
}

impl Draw {
    pub fn new(id: impl Into<String>, draw_date: NaiveDate, success: Vec<u8>) -> Self {
        Self {
            id: DrawId::new(id),
            game_type_id: None,
            game_id: None,
            draw_date,
            draw_number: None,
            success,
            machine: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_machine(mut self, machine: Vec<u8>) -> Self {
        self.machine = machine;
        self
    }

    #[must_use]
    pub fn with_game(mut self, game_type_id: u32, game_id: u32) -> Self {
        self.game_type_id = Some(game_type_id);
        self.game_id = Some(game_id);
        self
    }

    #[must_use]
    pub fn with_draw_number(mut self, draw_number: u32) -> Self {
        self.draw_number = Some(draw_number);
        self
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.draw_date.year()
    }

    #[must_use]
    pub fn numbers(&self, set: NumberSet) -> &[u8] {
        match set {
            NumberSet::Success => &self.success,
            NumberSet::Machine => &self.machine,
        }
    }

    /// Indices at which `value` appears among the success numbers
    pub fn positions_of(&self, value: u8) -> impl Iterator<Item = usize> + '_ {
        self.success
            .iter()
            .enumerate()
            .filter(move |&(_, &n)| n == value)
            .map(|(i, _)| i)
    }

    /// Chronological ordering: date, then draw number, then id
    #[must_use]
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.draw_date
            .cmp(&other.draw_date)
            .then_with(|| self.draw_number.cmp(&other.draw_number))
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Check range and uniqueness of both number sets
    ///
    /// # Errors
    ///
    /// Returns `DrawError::Empty` if there are no success numbers,
    /// `DrawError::OutOfRange` for values outside 1..=99, or
    /// `DrawError::Duplicate` if a value repeats within one set.
    pub fn validate(&self) -> Result<(), DrawError> {
        if self.success.is_empty() {
            return Err(DrawError::Empty {
                id: self.id.clone(),
            });
        }
        self.validate_set(NumberSet::Success)?;
        self.validate_set(NumberSet::Machine)
    }

    fn validate_set(&self, set: NumberSet) -> Result<(), DrawError> {
        let numbers = self.numbers(set);
        for (i, &value) in numbers.iter().enumerate() {
            if !is_valid_number(value) {
                return Err(DrawError::OutOfRange {
                    id: self.id.clone(),
                    set,
                    value,
                });
            }
            if numbers[..i].contains(&value) {
                return Err(DrawError::Duplicate {
                    id: self.id.clone(),
                    set,
                    value,
                });
            }
        }
        Ok(())
    }
}
