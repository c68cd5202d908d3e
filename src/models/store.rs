use jiff::civil::Date;
use serde::Serialize;

use crate::models::{
    habit::{Habit, MarkOutcome},
    task::Task,
};

/// The whole planner: both lists, in display order.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub tasks: Vec<Task>,
    pub habits: Vec<Habit>,
}

impl AppState {
    pub fn get_habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// Appends a task. Blank input is dropped and `None` returned.
    pub fn add_task(&mut self, text: &str) -> Option<&Task> {
        let task = Task::from_input(text)?;
        self.tasks.push(task);
        self.tasks.last()
    }

    pub fn toggle_task(&mut self, id: &str) -> Option<&Task> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.toggle();
        Some(task)
    }

    /// Removes every finished task and returns how many were dropped.
    pub fn clear_done_tasks(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.done);
        before - self.tasks.len()
    }

    pub fn add_habit(&mut self, name: &str) -> Option<&Habit> {
        let habit = Habit::from_input(name)?;
        self.habits.push(habit);
        self.habits.last()
    }

    /// `None` when no habit has this id.
    pub fn mark_habit(&mut self, id: &str, date: Date) -> Option<MarkOutcome> {
        let habit = self.habits.iter_mut().find(|h| h.id == id)?;
        Some(habit.mark_done_on(date))
    }

    pub fn reset_habit(&mut self, id: &str) -> Option<&Habit> {
        let habit = self.habits.iter_mut().find(|h| h.id == id)?;
        habit.reset();
        Some(habit)
    }
}
