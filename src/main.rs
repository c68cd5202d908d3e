use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;

use crate::{
    config::Config,
    models::{habit::MarkOutcome, store::AppState},
    persistence::Persistence,
    services::{
        habits::{
            AddHabitParameters, MarkHabitParameters, ResetHabitParameters, add_habit,
            mark_habit_today, reset_habit, today,
        },
        tasks::{AddTaskParameters, ToggleTaskParameters, add_task, clear_done_tasks, toggle_task},
    },
    storage::json::JsonFileStore,
};

mod config;
mod logging;
mod models;
mod persistence;
mod services;
mod storage;
mod ui;

#[derive(Parser)]
#[command(name = "minty", about = "A tiny planner for tasks and daily habits")]
struct Cli {
    /// Directory holding the planner data and logs
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks
    Tasks,

    /// Add a new task
    Add { text: String },

    /// Check or uncheck a task (by position or id)
    Toggle { task: String },

    /// Remove completed tasks
    Clear,

    /// List habits with their streaks
    Habits,

    /// Manage habits
    #[command(subcommand)]
    Habit(HabitCommands),
}

#[derive(Debug, Subcommand)]
enum HabitCommands {
    /// Start tracking a new habit
    Add { name: String },
    /// Mark a habit as done today (by position or id)
    Done { habit: String },
    /// Reset a habit's streak (by position or id)
    Reset { habit: String },
    /// List habits with their streaks
    List,
}

/// Accepts a 1-based position as listed, or a full id.
fn resolve_id<'a>(reference: &str, ids: impl Iterator<Item = &'a str>) -> Option<String> {
    let ids: Vec<&str> = ids.collect();
    let reference = reference.trim();

    if let Some(id) = ids.iter().find(|id| **id == reference) {
        return Some(id.to_string());
    }

    match reference.parse::<usize>() {
        Ok(position) if position >= 1 => ids.get(position - 1).map(|id| id.to_string()),
        _ => None,
    }
}

fn resolve_task(state: &AppState, reference: &str) -> Option<String> {
    resolve_id(reference, state.tasks.iter().map(|t| t.id.as_str()))
}

fn resolve_habit(state: &AppState, reference: &str) -> Option<String> {
    resolve_id(reference, state.habits.iter().map(|h| h.id.as_str()))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = Config::resolve(cli.data_dir, cli.log_level);

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        eprintln!(
            "Error: Failed to create data directory '{}': {}",
            config.data_dir.display(),
            e
        );
        std::process::exit(1);
    }

    if let Err(e) = logging::init_logging(&config.log_level, &config.log_dir()) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let mut persistence = Persistence::new(JsonFileStore::new(config.data_dir.clone()));
    let mut state = persistence.hydrate().await;
    let today = today();

    match cli.command {
        None => {
            ui::render_tasks(&state.tasks);
            ui::render_habits(&state.habits, today);
        }
        Some(Commands::Tasks) => ui::render_tasks(&state.tasks),
        Some(Commands::Add { text }) => {
            match add_task(&mut state, &mut persistence, AddTaskParameters { text }) {
                Some(task) => {
                    println!("✓ Task added: {}", task.text);
                    println!("  #{}", state.tasks.len());
                }
                None => println!("Nothing to add: the task text is empty"),
            }
        }
        Some(Commands::Toggle { task: reference }) => {
            let toggled = resolve_task(&state, &reference).and_then(|id| {
                toggle_task(&mut state, &mut persistence, ToggleTaskParameters { id })
            });
            match toggled {
                Some(task) if task.done => println!("✓ Task done: {}", task.text),
                Some(task) => println!("○ Task reopened: {}", task.text),
                None => println!("No task matches '{}'", reference),
            }
        }
        Some(Commands::Clear) => match clear_done_tasks(&mut state, &mut persistence) {
            0 => println!("No completed tasks to clear"),
            1 => println!("✓ Cleared 1 completed task"),
            n => println!("✓ Cleared {} completed tasks", n),
        },
        Some(Commands::Habits) | Some(Commands::Habit(HabitCommands::List)) => {
            ui::render_habits(&state.habits, today)
        }
        Some(Commands::Habit(HabitCommands::Add { name })) => {
            match add_habit(&mut state, &mut persistence, AddHabitParameters { name }) {
                Some(habit) => {
                    println!("✓ Habit added: {}", habit.name);
                    println!("  #{}", state.habits.len());
                }
                None => println!("Nothing to add: the habit name is empty"),
            }
        }
        Some(Commands::Habit(HabitCommands::Done { habit: reference })) => {
            let marked = resolve_habit(&state, &reference).and_then(|id| {
                mark_habit_today(&mut state, &mut persistence, MarkHabitParameters { id })
            });
            match marked {
                Some((habit, MarkOutcome::Marked)) => {
                    println!("✓ {} done today", habit.name);
                    let rank = habit.rank();
                    println!(
                        "  Streak: {}  ·  {} (tier {})",
                        habit.streak.to_string().bold(),
                        rank.label().cyan(),
                        rank.tier()
                    );
                }
                Some((habit, MarkOutcome::AlreadyMarked)) => {
                    println!("{} is already done today ✨", habit.name);
                }
                None => println!("No habit matches '{}'", reference),
            }
        }
        Some(Commands::Habit(HabitCommands::Reset { habit: reference })) => {
            let reset = resolve_habit(&state, &reference).and_then(|id| {
                reset_habit(&mut state, &mut persistence, ResetHabitParameters { id })
            });
            match reset {
                Some(habit) => println!("↺ Streak reset: {}", habit.name),
                None => println!("No habit matches '{}'", reference),
            }
        }
    }

    persistence.flush().await;
}
