//! Unified meal/exercise history
//!
//! New items go to the front of the collection. Consumers that care about
//! order sort by `timestamp`/`consumedAt` themselves.

use crate::storage::{StateKey, StorageResult};
use crate::tracker::engine::Tracker;
use crate::tracker::types::{
    ExerciseLog, HistoryItem, Intensity, MealJudgment, MealLog, MealStatus,
};
use serde_json::Value;

const MILLIS_PER_HOUR: i64 = 3600 * 1000;

/// Hours covered by [`Tracker::recent_history_summary`] when not specified
pub const DEFAULT_SUMMARY_HOURS: u32 = 48;

/// Decode the history blob; entries without a `type` tag are meals
pub(crate) fn decode_history(raw: &str) -> Result<Vec<HistoryItem>, serde_json::Error> {
    let entries: Vec<Value> = serde_json::from_str(raw)?;
    entries
        .into_iter()
        .map(|mut entry| {
            if let Value::Object(fields) = &mut entry {
                fields
                    .entry("type")
                    .or_insert_with(|| Value::String("meal".to_string()));
            }
            serde_json::from_value(entry)
        })
        .collect()
}

/// Parameters for a new meal entry
#[derive(Debug, Clone)]
pub struct MealEntry {
    pub title: String,
    pub status: MealStatus,
    pub is_healthy: bool,
    pub calories: u32,
    pub notes: String,
    pub score_value: Option<i32>,
    /// Completion instant for completed meals; defaults to now
    pub consumed_at_override: Option<i64>,
}

impl MealEntry {
    pub fn new(title: impl Into<String>, status: MealStatus, is_healthy: bool, calories: u32) -> Self {
        Self {
            title: title.into(),
            status,
            is_healthy,
            calories,
            notes: String::new(),
            score_value: None,
            consumed_at_override: None,
        }
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn score(mut self, score_value: Option<i32>) -> Self {
        self.score_value = score_value;
        self
    }

    pub fn consumed_at(mut self, millis: Option<i64>) -> Self {
        self.consumed_at_override = millis;
        self
    }
}

/// Parameters for a new exercise entry
#[derive(Debug, Clone)]
pub struct ExerciseEntry {
    pub name: String,
    /// "HH:MM" the activity happened; blank means now
    pub time: String,
    pub intensity: Intensity,
    pub duration: u32,
    pub calories_burned: u32,
}

impl Tracker {
    /// Whole history, most recent first by insertion
    pub fn get_unified_history(&self) -> StorageResult<Vec<HistoryItem>> {
        self.load_history()
    }

    fn save_history(&self, items: &[HistoryItem]) -> StorageResult<()> {
        self.save(StateKey::History, items)
    }

    /// Apply `f` to the item with `id`; no-op when absent
    fn update_item<F>(&self, id: &str, f: F) -> StorageResult<Vec<HistoryItem>>
    where
        F: FnOnce(&mut HistoryItem, i64),
    {
        let _guard = self.write_guard()?;
        let mut items = self.load_history()?;

        match items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                f(item, self.now_millis());
                self.save_history(&items)?;
            }
            None => tracing::debug!(id, "History item not found, nothing to update"),
        }
        Ok(items)
    }

    /// Record a meal; completed meals count on their `consumedAt` day
    pub fn log_meal(&self, entry: MealEntry) -> StorageResult<Vec<HistoryItem>> {
        let _guard = self.write_guard()?;
        let now = self.now_millis();

        let consumed_at = match entry.status {
            MealStatus::Completed => Some(entry.consumed_at_override.unwrap_or(now)),
            MealStatus::Pending => None,
        };

        let meal = MealLog {
            id: Self::new_id(),
            timestamp: now,
            title: entry.title,
            calories: entry.calories,
            is_healthy: entry.is_healthy,
            score_value: entry.score_value,
            status: entry.status,
            consumed_at,
            user_notes: entry.notes,
        };
        tracing::debug!(id = %meal.id, status = ?meal.status, "Logging meal");

        let mut items = self.load_history()?;
        items.insert(0, HistoryItem::Meal(meal));
        self.save_history(&items)?;
        Ok(items)
    }

    /// Record a meal from an advisory verdict, clamping its score impact
    pub fn log_judged_meal(
        &self,
        title: impl Into<String>,
        status: MealStatus,
        judgment: &MealJudgment,
        notes: impl Into<String>,
    ) -> StorageResult<Vec<HistoryItem>> {
        let rules = self.rules();
        let score = judgment.clamped_score(rules.score_impact_min, rules.score_impact_max);
        if score != judgment.score_impact {
            tracing::warn!(
                received = judgment.score_impact,
                clamped = score,
                "Score impact out of range"
            );
        }

        let entry = MealEntry::new(title, status, judgment.is_healthy, judgment.calories)
            .notes(notes)
            .score(Some(score));
        self.log_meal(entry)
    }

    /// Mark a pending meal as eaten now
    ///
    /// Assigns the verdict default score when none was set. On a meal that
    /// is already completed only the notes change.
    pub fn confirm_meal(&self, id: &str, notes: &str) -> StorageResult<Vec<HistoryItem>> {
        let rules = self.rules().clone();
        self.update_item(id, |item, now| {
            if let HistoryItem::Meal(meal) = item {
                meal.user_notes = notes.to_string();
                if !meal.is_completed() {
                    meal.status = MealStatus::Completed;
                    meal.consumed_at = Some(now);
                    meal.score_value = Some(
                        meal.score_value
                            .unwrap_or_else(|| rules.default_meal_xp(meal.is_healthy)),
                    );
                    tracing::debug!(id = %meal.id, "Meal confirmed");
                }
            }
        })
    }

    /// Remove an item by id; no-op when absent
    pub fn delete_item(&self, id: &str) -> StorageResult<Vec<HistoryItem>> {
        let _guard = self.write_guard()?;
        let mut items = self.load_history()?;
        let before = items.len();
        items.retain(|item| item.id() != id);

        if items.len() != before {
            self.save_history(&items)?;
            tracing::debug!(id, "Deleted history item");
        }
        Ok(items)
    }

    /// Record an exercise session
    pub fn log_exercise(&self, entry: ExerciseEntry) -> StorageResult<Vec<HistoryItem>> {
        let _guard = self.write_guard()?;
        let now = self.now_millis();

        let time = if entry.time.trim().is_empty() {
            self.clock().time_of_day(now).unwrap_or_default()
        } else {
            entry.time
        };

        let exercise = ExerciseLog {
            id: Self::new_id(),
            timestamp: now,
            name: entry.name,
            time,
            intensity: entry.intensity,
            duration: entry.duration,
            calories_burned: entry.calories_burned,
        };
        tracing::debug!(id = %exercise.id, minutes = exercise.duration, "Logging exercise");

        let mut items = self.load_history()?;
        items.insert(0, HistoryItem::Exercise(exercise));
        self.save_history(&items)?;
        Ok(items)
    }

    /// Exercise sessions recorded today
    pub fn get_today_exercises(&self) -> StorageResult<Vec<ExerciseLog>> {
        let today = self.today();
        let clock = self.clock();
        Ok(self
            .load_history()?
            .into_iter()
            .filter_map(|item| match item {
                HistoryItem::Exercise(ex) if clock.date_of(ex.timestamp) == Some(today) => {
                    Some(ex)
                }
                _ => None,
            })
            .collect())
    }

    /// Plain-text digest of items recorded in the last `hours`
    pub fn recent_history_summary(&self, hours: u32) -> StorageResult<String> {
        let cutoff = self.now_millis() - hours as i64 * MILLIS_PER_HOUR;
        let lines: Vec<String> = self
            .load_history()?
            .iter()
            .filter(|item| item.timestamp() > cutoff)
            .map(summary_line)
            .collect();

        if lines.is_empty() {
            return Ok("No recent activity recorded.".to_string());
        }
        Ok(lines.join("\n"))
    }
}

fn summary_line(item: &HistoryItem) -> String {
    match item {
        HistoryItem::Exercise(ex) => format!(
            "- [EXERCISE] {} ({}min, {}, {}kcal) at {}",
            ex.name, ex.duration, ex.intensity, ex.calories_burned, ex.time
        ),
        HistoryItem::Meal(meal) => {
            let status = if meal.is_completed() { "done" } else { "planned" };
            let verdict = if meal.is_healthy { "healthy" } else { "treat" };
            let mut line = format!("- [MEAL] {} {} [{}]", status, meal.title, verdict);
            if !meal.user_notes.is_empty() {
                line.push_str(&format!(" (notes: {})", meal.user_notes));
            }
            line
        }
    }
}
