use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::rank::Rank;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Opaque identifier, unique within the stored state
    pub id: String,
    /// Name of the habit, already trimmed
    pub name: String,
    /// Number of accepted daily marks since creation or the last reset
    #[serde(default)]
    pub streak: u32,
    /// Calendar date of the last accepted mark
    #[serde(default)]
    pub last_done_date: Option<Date>,
}

/// Result of marking a habit as done on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The streak grew by one
    Marked,
    /// The habit was already marked on that date, nothing changed
    AlreadyMarked,
}

impl Habit {
    /// Returns `None` when the name is blank after trimming.
    pub fn from_input(input: &str) -> Option<Habit> {
        let name = input.trim();
        if name.is_empty() {
            return None;
        }

        Some(Habit {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            streak: 0,
            last_done_date: None,
        })
    }

    /// At most one increment per calendar date. Missed days are not detected,
    /// so the streak never shrinks on its own.
    pub fn mark_done_on(&mut self, date: Date) -> MarkOutcome {
        if self.is_done_on(date) {
            return MarkOutcome::AlreadyMarked;
        }

        self.streak = self.streak.saturating_add(1);
        self.last_done_date = Some(date);
        MarkOutcome::Marked
    }

    pub fn reset(&mut self) {
        self.streak = 0;
        self.last_done_date = None;
    }

    pub fn is_done_on(&self, date: Date) -> bool {
        self.last_done_date == Some(date)
    }

    pub fn rank(&self) -> Rank {
        Rank::from_streak(self.streak)
    }
}
