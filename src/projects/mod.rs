pub mod attempt;
pub mod catalog;
pub mod commands;
pub mod tracker;

pub use attempt::ProjectAttempt;
pub use catalog::{Difficulty, ProjectCatalog, ProjectTemplate};
pub use tracker::{mock_matching_percent, ProjectTracker};
