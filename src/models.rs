pub mod habit;
pub mod rank;
pub mod store;
pub mod task;
