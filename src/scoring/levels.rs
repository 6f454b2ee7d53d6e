use serde::Serialize;

pub const POINTS_PER_LEVEL: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub current_level: u64,
    pub points_to_next: u64,
    /// How far through the current level, 0.0 up to (but excluding) 100.0
    pub progress_percentage: f64,
}

impl LevelProgress {
    /// Level 1 starts at zero points; every 1000 points is another level.
    pub fn from_points(points: u64) -> Self {
        let current_level = 1 + points / POINTS_PER_LEVEL;
        let into_level = points % POINTS_PER_LEVEL;

        Self {
            current_level,
            points_to_next: POINTS_PER_LEVEL - into_level,
            progress_percentage: into_level as f64 * 100.0 / POINTS_PER_LEVEL as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_level_one() {
        let progress = LevelProgress::from_points(0);
        assert_eq!(progress.current_level, 1);
        assert_eq!(progress.points_to_next, 1000);
        assert_eq!(progress.progress_percentage, 0.0);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(LevelProgress::from_points(999).current_level, 1);
        assert_eq!(LevelProgress::from_points(999).points_to_next, 1);
        assert_eq!(LevelProgress::from_points(1000).current_level, 2);
        assert_eq!(LevelProgress::from_points(2450).current_level, 3);
        assert_eq!(LevelProgress::from_points(2450).progress_percentage, 45.0);
    }
}
