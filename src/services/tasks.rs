use crate::{
    models::{store::AppState, task::Task},
    persistence::Persistence,
    storage::KeyValueStore,
};

pub struct AddTaskParameters {
    pub text: String,
}

/// Returns the created task, or `None` when the text was blank.
pub fn add_task<S: KeyValueStore>(
    state: &mut AppState,
    persistence: &mut Persistence<S>,
    parameters: AddTaskParameters,
) -> Option<Task> {
    let task = state.add_task(&parameters.text)?.clone();

    persistence.persist(state);

    Some(task)
}

pub struct ToggleTaskParameters {
    pub id: String,
}

pub fn toggle_task<S: KeyValueStore>(
    state: &mut AppState,
    persistence: &mut Persistence<S>,
    parameters: ToggleTaskParameters,
) -> Option<Task> {
    let task = state.toggle_task(&parameters.id)?.clone();

    persistence.persist(state);

    Some(task)
}

/// Returns how many finished tasks were removed.
pub fn clear_done_tasks<S: KeyValueStore>(
    state: &mut AppState,
    persistence: &mut Persistence<S>,
) -> usize {
    let removed = state.clear_done_tasks();

    if removed > 0 {
        persistence.persist(state);
    }

    removed
}
