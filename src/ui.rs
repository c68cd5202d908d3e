use colored::*;
use jiff::civil::Date;

use crate::models::{habit::Habit, task::Task};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

pub fn get_task_glyph(task: &Task) -> ColoredString {
    if task.done { "✓".green() } else { "○".normal() }
}

pub fn get_habit_glyph(habit: &Habit, today: Date) -> ColoredString {
    if habit.is_done_on(today) {
        "✦".green()
    } else {
        "·".dimmed()
    }
}

/// Render a single task line with its position, glyph and text
pub fn render_task_line(position: usize, task: &Task) {
    let line = format!("  {:>3}  {}  {}", position, get_task_glyph(task), task.text);

    if task.done {
        println!("{}", line.dimmed());
    } else {
        println!("{}", line);
    }
}

/// Render a habit line with streak on the left and the rank right-aligned
pub fn render_habit_line(position: usize, habit: &Habit, today: Date) {
    let terminal_width = get_terminal_width();

    let streak = format!("{} {}", habit.streak, day_word(habit.streak));
    let left_section = format!(
        "  {:>3}  {}  {}  {}",
        position,
        get_habit_glyph(habit, today),
        habit.name.bold(),
        streak.cyan()
    );
    let rank = habit.rank().label();

    // Visible width, without ANSI codes
    let left_visible_len =
        format!("  {:>3}  {}  {}  {}", position, " ", habit.name, streak).chars().count();
    let right_visible_len = rank.chars().count();
    let total_content = left_visible_len + right_visible_len;

    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!("{}{}{}", left_section, " ".repeat(padding), rank.dimmed());
    } else {
        println!("{}  {}", left_section, rank.dimmed());
    }
}

fn day_word(streak: u32) -> &'static str {
    if streak == 1 { "day" } else { "days" }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize, noun: &str) {
    let noun = if count == 1 {
        noun.to_string()
    } else {
        format!("{}s", noun)
    };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, noun);
}

pub fn render_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks yet. Add one with `minty add <text>`");
        return;
    }

    render_view_header("Tasks", tasks.len(), "task");
    for (index, task) in tasks.iter().enumerate() {
        render_task_line(index + 1, task);
    }
}

pub fn render_habits(habits: &[Habit], today: Date) {
    if habits.is_empty() {
        println!("No habits yet. Start a streak with `minty habit add <name>`");
        return;
    }

    render_view_header("Habits", habits.len(), "habit");
    for (index, habit) in habits.iter().enumerate() {
        render_habit_line(index + 1, habit, today);
    }
}
