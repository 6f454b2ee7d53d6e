pub mod accumulator;
pub mod badges;
pub mod config;
pub mod engine;
pub mod levels;
pub mod streak;

pub use accumulator::{AwardRecord, PointsAccumulator, PointsSnapshot};
pub use badges::{eligible_badges, Badge, BADGES};
pub use config::ScoringConfig;
pub use engine::{ScoreResult, ScoringEngine};
pub use levels::LevelProgress;
pub use streak::DailyStreak;
