use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Opaque identifier, unique within the stored state
    pub id: String,
    /// What needs doing, already trimmed
    pub text: String,
    /// Whether the task has been checked off
    #[serde(default)]
    pub done: bool,
}

impl Task {
    /// Builds a new open task from raw user input.
    ///
    /// Returns `None` when the input is blank after trimming.
    pub fn from_input(input: &str) -> Option<Task> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        Some(Task {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            done: false,
        })
    }

    pub fn toggle(&mut self) {
        self.done = !self.done;
    }
}
