pub mod resolver;
pub mod suggestion;

pub use resolver::{PolicyOptions, RankedEntry, Resolution, ResolutionPolicy};
pub use suggestion::{RemediationSuggestion, Severity};
