use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::log_info;

use super::badges::{eligible_badges, Badge};
use super::engine::ScoreResult;
use super::levels::LevelProgress;
use super::streak::DailyStreak;

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "eduscope::scoring";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardRecord {
    pub project_id: u32,
    pub points: u64,
    pub total_after: u64,
    pub awarded_at: DateTime<Utc>,
    /// Badges this award pushed the total past
    pub new_badges: Vec<Badge>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsSnapshot {
    pub total: u64,
    pub level: LevelProgress,
    pub streak: DailyStreak,
    pub badges: Vec<Badge>,
    pub awards: Vec<AwardRecord>,
}

#[derive(Debug, Default)]
struct Ledger {
    total: u64,
    streak: DailyStreak,
    badges: Vec<Badge>,
    awards: Vec<AwardRecord>,
}

/// A user's running point total. Only grows.
///
/// Shared by reference with every surface that shows points; the lock
/// serialises completions that land at the same time.
#[derive(Debug, Default)]
pub struct PointsAccumulator {
    ledger: Mutex<Ledger>,
}

impl PointsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_total(total: u64) -> Self {
        Self {
            ledger: Mutex::new(Ledger {
                total,
                badges: eligible_badges(total).collect(),
                ..Ledger::default()
            }),
        }
    }

    /// Adds `result.total_points` and returns the new total.
    pub fn apply(&self, result: ScoreResult) -> u64 {
        self.award(result, Utc::now()).total_after
    }

    /// Adds `result.total_points` as of `at`, advancing the daily streak and
    /// unlocking any badges the new total reaches.
    pub fn award(&self, result: ScoreResult, at: DateTime<Utc>) -> AwardRecord {
        let mut ledger = self.lock_ledger();
        ledger.total = ledger.total.saturating_add(result.total_points);
        ledger.streak.record(at);

        let total_after = ledger.total;
        let new_badges: Vec<Badge> = eligible_badges(total_after)
            .filter(|badge| !ledger.badges.contains(badge))
            .collect();
        ledger.badges.extend(new_badges.iter().copied());

        let record = AwardRecord {
            project_id: result.project_id,
            points: result.total_points,
            total_after,
            awarded_at: at,
            new_badges,
        };
        ledger.awards.push(record.clone());

        log_info!(
            "Awarded {} points for project {}; total now {}, streak {} day(s)",
            result.total_points,
            result.project_id,
            total_after,
            ledger.streak.days
        );
        for badge in &record.new_badges {
            log_info!("Badge unlocked: {}", badge.name);
        }

        record
    }

    pub fn total(&self) -> u64 {
        self.lock_ledger().total
    }

    pub fn awards(&self) -> Vec<AwardRecord> {
        self.lock_ledger().awards.clone()
    }

    pub fn level(&self) -> LevelProgress {
        LevelProgress::from_points(self.total())
    }

    pub fn streak(&self) -> DailyStreak {
        self.lock_ledger().streak
    }

    pub fn badges(&self) -> Vec<Badge> {
        self.lock_ledger().badges.clone()
    }

    pub fn snapshot(&self) -> PointsSnapshot {
        let ledger = self.lock_ledger();
        PointsSnapshot {
            total: ledger.total,
            level: LevelProgress::from_points(ledger.total),
            streak: ledger.streak,
            badges: ledger.badges.clone(),
            awards: ledger.awards.clone(),
        }
    }

    fn lock_ledger(&self) -> MutexGuard<'_, Ledger> {
        match self.ledger.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
