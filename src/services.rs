pub mod habits;
pub mod tasks;
