use jiff::civil::Date;

use crate::{
    models::{
        habit::{Habit, MarkOutcome},
        store::AppState,
    },
    persistence::Persistence,
    storage::KeyValueStore,
};

/// Device-local calendar date. Crossing time zones can shift it, so a habit
/// may be marked twice within 24 hours or refused within a new local day.
pub fn today() -> Date {
    jiff::Zoned::now().date()
}

pub struct AddHabitParameters {
    pub name: String,
}

pub fn add_habit<S: KeyValueStore>(
    state: &mut AppState,
    persistence: &mut Persistence<S>,
    parameters: AddHabitParameters,
) -> Option<Habit> {
    let habit = state.add_habit(&parameters.name)?.clone();

    persistence.persist(state);

    Some(habit)
}

pub struct MarkHabitParameters {
    pub id: String,
}

pub fn mark_habit_today<S: KeyValueStore>(
    state: &mut AppState,
    persistence: &mut Persistence<S>,
    parameters: MarkHabitParameters,
) -> Option<(Habit, MarkOutcome)> {
    mark_habit_on(state, persistence, parameters, today())
}

/// Returns the habit as it stands afterwards, or `None` when the id is unknown.
pub fn mark_habit_on<S: KeyValueStore>(
    state: &mut AppState,
    persistence: &mut Persistence<S>,
    parameters: MarkHabitParameters,
    date: Date,
) -> Option<(Habit, MarkOutcome)> {
    let outcome = state.mark_habit(&parameters.id, date)?;

    if outcome == MarkOutcome::Marked {
        persistence.persist(state);
    }

    let habit = state.get_habit(&parameters.id)?.clone();
    Some((habit, outcome))
}

pub struct ResetHabitParameters {
    pub id: String,
}

pub fn reset_habit<S: KeyValueStore>(
    state: &mut AppState,
    persistence: &mut Persistence<S>,
    parameters: ResetHabitParameters,
) -> Option<Habit> {
    let habit = state.reset_habit(&parameters.id)?.clone();

    persistence.persist(state);

    Some(habit)
}
