//! Hydration counter
//!
//! One live record for today plus a `date -> cups` history map. A stored
//! live record from an earlier day reads as a fresh zero record; nothing
//! closes out a day explicitly.

use crate::storage::{StateKey, StorageResult};
use crate::tracker::engine::Tracker;
use crate::tracker::types::{CalendarDate, WaterData};
use std::collections::BTreeMap;

impl Tracker {
    /// Today's live hydration record
    pub fn get_water_data(&self) -> StorageResult<WaterData> {
        let today = self.today();
        let stored: Option<WaterData> = self.load(StateKey::Water)?;

        match stored {
            Some(data) if data.date == today => Ok(data),
            _ => Ok(WaterData {
                date: today,
                count: 0,
                last_sip_timestamp: self.now_millis(),
            }),
        }
    }

    /// Add `delta` cups (negative to undo), never going below zero
    pub fn update_water(&self, delta: i64) -> StorageResult<WaterData> {
        let _guard = self.write_guard()?;
        let current = self.get_water_data()?;

        let count = (current.count as i64)
            .saturating_add(delta)
            .clamp(0, u32::MAX as i64) as u32;

        let data = WaterData {
            date: current.date,
            count,
            last_sip_timestamp: self.now_millis(),
        };
        self.save(StateKey::Water, &data)?;

        let mut history = self.water_history()?;
        history.insert(data.date, count);
        self.save(StateKey::WaterHistory, &history)?;

        tracing::debug!(date = %data.date, count, delta, "Updated water");
        Ok(data)
    }

    /// Cups per day, including today once anything was logged
    pub fn water_history(&self) -> StorageResult<BTreeMap<CalendarDate, u32>> {
        self.load(StateKey::WaterHistory)
    }
}
