//! Keeps the stored planner blob in step with the in-memory state.
//!
//! The adapter starts `Unloaded`. `hydrate` performs the single startup read
//! and always moves it to `Loaded`, whatever the read produced. Writes are
//! only issued once loaded, so an empty startup state can never overwrite
//! stored data.
//!
//! Every write is a detached tokio task: not awaited by the mutation that
//! caused it, never retried, never cancelled. Overlapping writes may finish
//! out of order.

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::task::JoinHandle;

use crate::{
    models::store::AppState,
    storage::{KeyValueStore, STORAGE_KEY, StorageError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loaded,
}

pub struct Persistence<S> {
    store: Arc<S>,
    key: String,
    load_state: LoadState,
    pending: Vec<JoinHandle<()>>,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: S, key: &str) -> Self {
        Self {
            store: Arc::new(store),
            key: key.to_string(),
            load_state: LoadState::Unloaded,
            pending: Vec::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.load_state == LoadState::Loaded
    }

    /// Reads the stored snapshot. Any failure yields an empty state.
    pub async fn hydrate(&mut self) -> AppState {
        let state = match self.store.get(&self.key).await {
            Ok(Some(raw)) => match decode(&raw) {
                Ok(state) => {
                    info!(
                        "event=hydrate module=persistence status=ok key={} tasks={} habits={}",
                        self.key,
                        state.tasks.len(),
                        state.habits.len()
                    );
                    state
                }
                Err(e) => self.hydrate_failed(&e),
            },
            Ok(None) => {
                info!(
                    "event=hydrate module=persistence status=empty key={}",
                    self.key
                );
                AppState::default()
            }
            Err(e) => self.hydrate_failed(&e),
        };

        self.load_state = LoadState::Loaded;
        state
    }

    fn hydrate_failed(&self, e: &StorageError) -> AppState {
        let kind = if e.is_read_failure() { "read" } else { "store" };
        error!(
            "event=hydrate module=persistence status=error kind={} key={} error={}",
            kind, self.key, e
        );
        AppState::default()
    }

    /// Starts a background write of `state`. Returns whether one was issued.
    pub fn persist(&mut self, state: &AppState) -> bool {
        if !self.is_loaded() {
            debug!(
                "event=persist module=persistence status=skipped reason=unloaded key={}",
                self.key
            );
            return false;
        }

        let blob = match encode(state) {
            Ok(blob) => blob,
            Err(e) => {
                error!(
                    "event=persist module=persistence status=error key={} error={}",
                    self.key, e
                );
                return false;
            }
        };

        self.pending.retain(|handle| !handle.is_finished());

        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        let bytes = blob.len();
        self.pending.push(tokio::spawn(async move {
            match store.set(&key, blob).await {
                Ok(()) => debug!(
                    "event=persist module=persistence status=ok key={} bytes={}",
                    key, bytes
                ),
                Err(e) => error!(
                    "event=persist module=persistence status=error key={} error={}",
                    key, e
                ),
            }
        }));
        true
    }

    /// Waits for writes already started. Meant for process shutdown.
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                error!(
                    "event=persist module=persistence status=error key={} error={}",
                    self.key, e
                );
            }
        }
    }
}

/// Serializes the full snapshot. Both lists are always written.
pub fn encode(state: &AppState) -> Result<String, StorageError> {
    serde_json::to_string(state).map_err(|source| StorageError::SerializeFailed { source })
}

/// Decodes a stored snapshot.
///
/// `tasks` and `habits` are decoded independently, and so is every entry in
/// them: a missing or `null` list is empty, an entry that does not decode is
/// skipped, and the rest of the state survives.
pub fn decode(raw: &str) -> Result<AppState, StorageError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|source| StorageError::ParseFailed { source })?;
    let Value::Object(mut fields) = value else {
        return Err(StorageError::NotAnObject);
    };

    Ok(AppState {
        tasks: take_list(&mut fields, "tasks"),
        habits: take_list(&mut fields, "habits"),
    })
}

fn take_list<T: DeserializeOwned>(fields: &mut Map<String, Value>, field: &str) -> Vec<T> {
    let entries = match fields.remove(field) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            warn!(
                "event=decode module=persistence status=fallback field={} reason=not_a_list found={}",
                field,
                json_type(&other)
            );
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(
                    "event=decode module=persistence status=skipped field={} index={} error={}",
                    field, index, e
                );
                None
            }
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use jiff::civil::date;

    fn sample_state() -> AppState {
        let mut state = AppState::default();
        state.add_task("buy mint");
        let done_id = state.add_task("water plants").unwrap().id.clone();
        state.toggle_task(&done_id);
        let habit_id = state.add_habit("walk").unwrap().id.clone();
        state.mark_habit(&habit_id, date(2025, 5, 4));
        state.add_habit("read");
        state
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let state = sample_state();
        let decoded = decode(&encode(&state).unwrap()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_encode_writes_exact_shape() {
        let value: Value = serde_json::from_str(&encode(&sample_state()).unwrap()).unwrap();

        let fields = value.as_object().unwrap();
        assert_eq!(fields.len(), 2);

        let task = &value["tasks"][1];
        assert_eq!(task["text"], "water plants");
        assert_eq!(task["done"], true);
        assert!(task["id"].is_string());

        assert_eq!(value["habits"][0]["lastDoneDate"], "2025-05-04");
        assert_eq!(value["habits"][0]["streak"], 1);
        assert!(value["habits"][1]["lastDoneDate"].is_null());
    }

    #[test]
    fn test_encode_empty_state_keeps_both_fields() {
        let blob = encode(&AppState::default()).unwrap();
        assert_eq!(blob, r#"{"tasks":[],"habits":[]}"#);
    }

    #[test]
    fn test_decode_empty_object() {
        assert_eq!(decode("{}").unwrap(), AppState::default());
    }

    #[test]
    fn test_decode_null_fields() {
        assert_eq!(
            decode(r#"{"tasks": null, "habits": null}"#).unwrap(),
            AppState::default()
        );
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert!(matches!(
            decode("{ this is not valid json }"),
            Err(StorageError::ParseFailed { .. })
        ));
        assert!(matches!(decode("[1, 2]"), Err(StorageError::NotAnObject)));
        assert!(matches!(decode("null"), Err(StorageError::NotAnObject)));
    }

    #[test]
    fn test_decode_tolerates_one_bad_field() {
        let raw = r#"{
            "tasks": [{"id": "1", "text": "keep me", "done": true}],
            "habits": "definitely not a list"
        }"#;

        let state = decode(raw).unwrap();
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].text, "keep me");
        assert!(state.habits.is_empty());
    }

    const MIXED_HABITS: &str = r#"{
        "tasks": [{"id": "t1", "text": "keep me"}, {"id": 7, "text": null}],
        "habits": [
            {"id": "h1", "name": "walk", "streak": 12, "lastDoneDate": "2025-05-03"},
            {"id": "h2", "name": "read", "streak": 2, "lastDoneDate": "2025-05-04T10:00:00.000Z"}
        ]
    }"#;

    #[test]
    fn test_decode_skips_only_bad_entries() {
        let state = decode(MIXED_HABITS).unwrap();

        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].id, "t1");
        assert_eq!(state.habits.len(), 1);
        assert_eq!(state.habits[0].name, "walk");
        assert_eq!(state.habits[0].streak, 12);
    }

    #[tokio::test]
    async fn test_valid_habits_survive_rewrite_after_bad_entry() {
        let store = MemoryStore::with_value(STORAGE_KEY, MIXED_HABITS);
        let mut persistence = Persistence::new(store.clone());
        let mut state = persistence.hydrate().await;

        state.add_task("new one");
        persistence.persist(&state);
        persistence.flush().await;

        let stored = decode(&store.value(STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(stored.tasks.len(), 2);
        assert_eq!(stored.habits.len(), 1);
        assert_eq!(stored.habits[0].id, "h1");
        assert_eq!(stored.habits[0].streak, 12);
        assert_eq!(stored.habits[0].last_done_date, Some(date(2025, 5, 3)));
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let raw = r#"{"version": 3, "habits": [{"id": "h", "name": "yoga", "streak": 5, "lastDoneDate": "2025-01-02", "color": "green"}]}"#;

        let state = decode(raw).unwrap();
        assert!(state.tasks.is_empty());
        assert_eq!(state.habits[0].streak, 5);
        assert_eq!(state.habits[0].last_done_date, Some(date(2025, 1, 2)));
    }

    #[tokio::test]
    async fn test_hydrate_loads_stored_state() {
        let state = sample_state();
        let store = MemoryStore::with_value(STORAGE_KEY, &encode(&state).unwrap());
        let mut persistence = Persistence::new(store);

        assert_eq!(persistence.load_state, LoadState::Unloaded);
        assert_eq!(persistence.hydrate().await, state);
        assert_eq!(persistence.load_state, LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_hydrate_without_stored_value() {
        let mut persistence = Persistence::new(MemoryStore::default());

        assert_eq!(persistence.hydrate().await, AppState::default());
        assert!(persistence.is_loaded());
    }

    #[tokio::test]
    async fn test_hydrate_malformed_blob_falls_back_to_empty() {
        let store = MemoryStore::with_value(STORAGE_KEY, "not json at all");
        let mut persistence = Persistence::new(store.clone());

        assert_eq!(persistence.hydrate().await, AppState::default());
        assert!(persistence.is_loaded());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_hydrate_read_failure_still_loads() {
        let store = MemoryStore::default();
        store.fail_reads(true);
        let mut persistence = Persistence::new(store);

        assert_eq!(persistence.hydrate().await, AppState::default());
        assert!(persistence.is_loaded());
    }

    #[tokio::test]
    async fn test_no_writes_before_hydration() {
        let store = MemoryStore::with_value(STORAGE_KEY, r#"{"tasks":[{"id":"1","text":"old"}]}"#);
        let mut persistence = Persistence::new(store.clone());

        assert!(!persistence.persist(&AppState::default()));
        persistence.flush().await;

        assert_eq!(store.write_count(), 0);
        assert_eq!(
            store.value(STORAGE_KEY).as_deref(),
            Some(r#"{"tasks":[{"id":"1","text":"old"}]}"#)
        );
    }

    #[tokio::test]
    async fn test_persist_writes_snapshot_after_hydration() {
        let store = MemoryStore::default();
        let mut persistence = Persistence::new(store.clone());
        let mut state = persistence.hydrate().await;

        state.add_task("new task");
        assert!(persistence.persist(&state));
        persistence.flush().await;

        let stored = store.value(STORAGE_KEY).expect("snapshot should be stored");
        assert_eq!(decode(&stored).unwrap(), state);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = MemoryStore::default();
        let mut persistence = Persistence::new(store.clone());
        let mut state = persistence.hydrate().await;

        state.add_task("one");
        persistence.persist(&state);
        persistence.flush().await;
        state.add_task("two");
        persistence.persist(&state);
        persistence.flush().await;

        let stored = decode(&store.value(STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(stored.tasks.len(), 2);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let store = MemoryStore::default();
        let mut persistence = Persistence::new(store.clone());
        let mut state = persistence.hydrate().await;
        store.fail_writes(true);

        state.add_habit("meditate");
        assert!(persistence.persist(&state));
        persistence.flush().await;

        assert_eq!(store.write_count(), 1);
        assert_eq!(store.value(STORAGE_KEY), None);
        assert_eq!(state.habits.len(), 1);
    }

    #[tokio::test]
    async fn test_custom_key() {
        let store = MemoryStore::default();
        let mut persistence = Persistence::with_key(store.clone(), "other_app");
        let state = persistence.hydrate().await;

        persistence.persist(&state);
        persistence.flush().await;

        assert!(store.value("other_app").is_some());
        assert!(store.value(STORAGE_KEY).is_none());
    }
}
