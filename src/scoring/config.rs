/// Tunables for project completion scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    /// Completion time at which the time bonus reaches zero
    pub par_seconds: f64,
}

pub const DEFAULT_PAR_SECONDS: f64 = 7200.0;

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            par_seconds: DEFAULT_PAR_SECONDS,
        }
    }
}

impl ScoringConfig {
    /// Falls back to the default par for zero, negative or non-finite values.
    pub fn with_par_seconds(par_seconds: f64) -> Self {
        if par_seconds.is_finite() && par_seconds > 0.0 {
            Self { par_seconds }
        } else {
            Self::default()
        }
    }
}
