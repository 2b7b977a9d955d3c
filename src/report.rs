use serde::Serialize;
use std::path::PathBuf;

use crate::duplicates::Resolution;
use crate::profiles::Profile;
use crate::scanner::EmptyContainer;

/// Findings of one profile
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub profile: String,
    pub root: PathBuf,
    pub duplicates: Vec<Resolution>,
    pub empty_containers: Vec<EmptyContainer>,
    /// Skipped entries and directories, permission problems
    pub warnings: Vec<String>,
}

impl ProfileReport {
    pub fn aggregate(
        profile: &Profile,
        duplicates: Vec<Resolution>,
        empty_containers: Vec<EmptyContainer>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            profile: profile.name.clone(),
            root: profile.root.clone(),
            duplicates,
            empty_containers,
            warnings,
        }
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }

    pub fn empty_count(&self) -> usize {
        self.empty_containers.len()
    }

    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.empty_containers.is_empty()
    }
}

/// A profile that could not be checked
#[derive(Debug, Clone, Serialize)]
pub struct ProfileFailure {
    pub profile: String,
    pub root: Option<PathBuf>,
    pub error: String,
}

/// Result of one profile pass
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProfileOutcome {
    Checked(ProfileReport),
    Failed(ProfileFailure),
}

/// Totals over all profiles of one run, in registry order
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<ProfileOutcome>,
    pub total_duplicates: usize,
    pub total_empty: usize,
    pub profiles_checked: usize,
    pub profiles_failed: usize,
}

impl RunSummary {
    /// Sum the outcomes. Profiles are disjoint trees, so nothing is deduplicated.
    pub fn combine(outcomes: Vec<ProfileOutcome>) -> Self {
        let mut summary = Self {
            outcomes: Vec::new(),
            total_duplicates: 0,
            total_empty: 0,
            profiles_checked: 0,
            profiles_failed: 0,
        };
        for outcome in &outcomes {
            match outcome {
                ProfileOutcome::Checked(report) => {
                    summary.total_duplicates += report.duplicate_count();
                    summary.total_empty += report.empty_count();
                    summary.profiles_checked += 1;
                }
                ProfileOutcome::Failed(_) => summary.profiles_failed += 1,
            }
        }
        summary.outcomes = outcomes;
        summary
    }

    pub fn reports(&self) -> impl Iterator<Item = &ProfileReport> {
        self.outcomes.iter().filter_map(|o| match o {
            ProfileOutcome::Checked(r) => Some(r),
            ProfileOutcome::Failed(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProfileFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            ProfileOutcome::Failed(f) => Some(f),
            ProfileOutcome::Checked(_) => None,
        })
    }

    /// Every profile was checked
    pub fn is_success(&self) -> bool {
        self.profiles_failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> Profile {
        Profile {
            name: name.to_string(),
            root: PathBuf::from(format!("/tb/{}.default", name)),
            index_db: None,
        }
    }

    #[test]
    fn test_empty_report_is_clean() {
        let report = ProfileReport::aggregate(&profile("a"), vec![], vec![], vec![]);
        assert!(report.is_clean());
        assert_eq!(report.duplicate_count(), 0);
    }

    #[test]
    fn test_combine_counts_and_order() {
        let outcomes = vec![
            ProfileOutcome::Checked(ProfileReport::aggregate(&profile("a"), vec![], vec![], vec![])),
            ProfileOutcome::Failed(ProfileFailure {
                profile: "b".to_string(),
                root: None,
                error: "Profile 'b' not found".to_string(),
            }),
            ProfileOutcome::Checked(ProfileReport::aggregate(&profile("c"), vec![], vec![], vec![])),
        ];
        let summary = RunSummary::combine(outcomes);
        assert_eq!(summary.profiles_checked, 2);
        assert_eq!(summary.profiles_failed, 1);
        assert_eq!(summary.total_duplicates, 0);
        assert!(!summary.is_success());

        let names: Vec<_> = summary.reports().map(|r| r.profile.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        let failed: Vec<_> = summary.failures().map(|f| f.profile.as_str()).collect();
        assert_eq!(failed, vec!["b"]);
    }

    #[test]
    fn test_outcome_json_is_tagged() {
        let outcome = ProfileOutcome::Checked(ProfileReport::aggregate(&profile("a"), vec![], vec![], vec![]));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "checked");
        assert_eq!(json["profile"], "a");
    }
}
