use anyhow::{bail, Result};
use chrono::{Duration, NaiveDate};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, warn};

use crate::{
    store::{
        entities::{parse_activity_history, ActivityDay, DailyCompletion, Workout, WorkoutImage},
        key_value::KeyValueStore,
        refresh::{RefreshSignal, StoreChange},
    },
    utils::clock::Clock,
};

pub const WORKOUTS_KEY: &str = "workouts";
pub const DAILY_COMPLETION_KEY: &str = "daily_completion";
pub const ACTIVITY_HISTORY_KEY: &str = "activity_history";

/// Days of history kept around. Anything older, measured from the current date at write time,
/// is pruned on every history write.
const HISTORY_RETENTION_DAYS: i64 = 90;

/// Single source of truth for the workout list, today's completed set and the activity history.
///
/// In-memory state is mutated synchronously before any persist is awaited, and a failed persist
/// never rolls it back. Memory therefore stays authoritative for the rest of the process even
/// when the disk copy is behind; the next [load](CompletionStore::load) resynchronizes.
///
/// Day rollover is detected lazily: there is no timer, a stale completion date is only noticed
/// when [load](CompletionStore::load) runs. Frontends are expected to reload whenever they
/// regain focus.
pub struct CompletionStore<S: KeyValueStore> {
    storage: S,
    clock: Box<dyn Clock>,
    refresh: Box<dyn RefreshSignal>,
    workouts: Vec<Workout>,
    completed_ids: Vec<String>,
    activity_history: Vec<ActivityDay>,
}

impl<S: KeyValueStore> CompletionStore<S> {
    pub fn new(storage: S, clock: Box<dyn Clock>, refresh: Box<dyn RefreshSignal>) -> Self {
        Self {
            storage,
            clock,
            refresh,
            workouts: vec![],
            completed_ids: vec![],
            activity_history: vec![],
        }
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn activity_history(&self) -> &[ActivityDay] {
        &self.activity_history
    }

    pub fn completed_ids(&self) -> &[String] {
        &self.completed_ids
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed_ids.iter().any(|v| v == id)
    }

    pub fn today_count(&self) -> u32 {
        self.completed_ids.len() as u32
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Reads all persisted state, detecting a day rollover along the way: a completion record
    /// carrying a previous date gets its count closed into history under that date, and the
    /// live set starts over empty for today.
    ///
    /// Read and parse failures are logged and treated as missing data, never surfaced.
    pub async fn load(&mut self) {
        self.workouts = self
            .read_key::<Vec<Workout>>(WORKOUTS_KEY)
            .await
            .unwrap_or_default();
        self.activity_history = self.read_history().await;

        let today = self.clock.today();
        match self.read_key::<DailyCompletion>(DAILY_COMPLETION_KEY).await {
            Some(completion) if completion.date == today => {
                self.completed_ids = dedup_ids(completion.completed_workout_ids);
            }
            Some(stale) => {
                // Close the previous day into history before starting over.
                let closed_count = dedup_ids(stale.completed_workout_ids).len() as u32;
                if closed_count > 0 {
                    self.update_activity_history(stale.date, closed_count).await;
                }
                self.completed_ids = vec![];
                self.persist_completion().await;
                self.notify(StoreChange::Completion).await;
            }
            None => self.completed_ids = vec![],
        }
    }

    /// Re-reads persisted state. Frontends call this when they regain focus, which is also the
    /// moment a rollover that happened while they were backgrounded gets detected.
    pub async fn reload(&mut self) {
        self.load().await;
    }

    /// Adds a workout to the list. The only failure modes are validation: `name` must be
    /// non-empty after trimming and `image` must reference something. Persistence failures are
    /// logged and swallowed.
    pub async fn add_workout(&mut self, name: &str, image: WorkoutImage) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Workout name can't be empty");
        }
        if image.is_empty() {
            bail!("Workout needs an icon or an image");
        }

        let workout = Workout {
            id: self.next_workout_id(),
            name: name.to_string(),
            image_uri: image,
            created_at: self.clock.time().to_utc(),
        };
        self.workouts.push(workout);
        self.persist_workouts().await;
        self.notify(StoreChange::Workouts).await;
        Ok(())
    }

    /// Removes a workout from the list. If it was completed today the live set and today's
    /// history count are re-derived without it.
    pub async fn delete_workout(&mut self, id: &str) {
        self.workouts.retain(|workout| workout.id != id);
        self.persist_workouts().await;

        if let Some(index) = self.completed_ids.iter().position(|v| v == id) {
            self.completed_ids.remove(index);
            self.persist_completion().await;
            self.notify(StoreChange::Completion).await;
        }

        self.notify(StoreChange::Workouts).await;
    }

    /// Flips membership of `id` in today's completed set and tracks the new set size in
    /// history. The id is not checked against the workout list.
    pub async fn toggle_completion(&mut self, id: &str) {
        match self.completed_ids.iter().position(|v| v == id) {
            Some(index) => {
                self.completed_ids.remove(index);
            }
            None => self.completed_ids.push(id.to_string()),
        }
        self.persist_completion().await;
        self.notify(StoreChange::Completion).await;
    }

    /// Ids are derived from the current time. Two workouts added within the same millisecond
    /// must still come out distinguishable, so the candidate is bumped past any taken id.
    fn next_workout_id(&self) -> String {
        let mut millis = self.clock.time().timestamp_millis();
        let mut id = millis.to_string();
        while self.workouts.iter().any(|workout| workout.id == id) {
            millis += 1;
            id = millis.to_string();
        }
        id
    }

    /// Upserts `count` under `date`, prunes everything older than the retention window and
    /// persists the result. The in-memory list is swapped as a whole so readers never observe a
    /// partially filtered state.
    async fn update_activity_history(&mut self, date: NaiveDate, count: u32) {
        let mut history = self.activity_history.clone();
        match history.iter_mut().find(|day| day.date == date) {
            Some(day) => day.count = count,
            None => history.push(ActivityDay { date, count }),
        }

        let cutoff = self.clock.today() - Duration::days(HISTORY_RETENTION_DAYS);
        history.retain(|day| day.date >= cutoff);

        self.activity_history = history;
        self.write_key(ACTIVITY_HISTORY_KEY, &self.activity_history)
            .await;
    }

    async fn persist_workouts(&mut self) {
        self.write_key(WORKOUTS_KEY, &self.workouts).await;
    }

    /// Mirrors the live set to disk together with today's history entry.
    async fn persist_completion(&mut self) {
        let completion = DailyCompletion {
            date: self.clock.today(),
            completed_workout_ids: self.completed_ids.clone(),
        };
        let count = completion.completed_workout_ids.len() as u32;
        self.write_key(DAILY_COMPLETION_KEY, &completion).await;
        self.update_activity_history(completion.date, count).await;
    }

    /// Writes are optimistic: a failure is logged and in-memory state stays authoritative until
    /// the next load.
    async fn write_key<T: Serialize>(&self, key: &str, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to serialize {key}: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.write(key, &payload).await {
            error!("Failed to persist {key}: {e:?}");
        }
    }

    async fn read_key<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = match self.storage.read(key).await {
            Ok(payload) => payload?,
            Err(e) => {
                warn!("Failed to read {key}, starting from empty: {e:?}");
                return None;
            }
        };
        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to parse {key}, starting from empty: {e}");
                None
            }
        }
    }

    async fn read_history(&self) -> Vec<ActivityDay> {
        let payload = match self.storage.read(ACTIVITY_HISTORY_KEY).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return vec![],
            Err(e) => {
                warn!("Failed to read {ACTIVITY_HISTORY_KEY}, starting from empty: {e:?}");
                return vec![];
            }
        };
        match parse_activity_history(&payload) {
            Ok(history) => history,
            Err(e) => {
                warn!("Failed to parse {ACTIVITY_HISTORY_KEY}, starting from empty: {e}");
                vec![]
            }
        }
    }

    async fn notify(&self, change: StoreChange) {
        if let Err(e) = self.refresh.notify(change).await {
            warn!("Refresh signal failed after {change:?} change: {e:?}");
        }
    }
}

/// Persisted sets may contain duplicates after a hand edit; membership toggling relies on
/// uniqueness.
fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}
