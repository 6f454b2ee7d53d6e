use chrono::{DateTime, Utc};
use serde::Serialize;

/// Consecutive-day activity counter, advanced by every award.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStreak {
    pub days: u32,
    pub last_activity: Option<DateTime<Utc>>,
}

impl DailyStreak {
    /// Counts whole 24-hour periods since the previous activity: one extends
    /// the streak, more than one restarts it, less leaves it alone.
    pub fn record(&mut self, at: DateTime<Utc>) {
        match self.last_activity {
            None => self.days = 1,
            Some(last) => match (at - last).num_days() {
                1 => self.days = self.days.saturating_add(1),
                gap if gap > 1 => self.days = 1,
                _ => {}
            },
        }
        self.last_activity = Some(at);
    }
}
