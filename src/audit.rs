//! Per-profile audit passes.
//!
//! A pass normalizes permissions, runs the duplicate scan through the
//! resolution policy, then runs the empty container detector. Passes share
//! no mutable state, so a multi-profile run may use rayon; outcomes are
//! always delivered in registry order.

use rayon::prelude::*;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::common::config::Config;
use crate::common::errors::AuditError;
use crate::common::permissions::{NoopNormalizer, PermissionNormalizer};
use crate::duplicates::{PolicyOptions, ResolutionPolicy};
use crate::profiles::Profile;
use crate::report::{ProfileFailure, ProfileOutcome, ProfileReport, RunSummary};
use crate::scanner::{self, DetectorOptions, EmptyContainerDetector, Markers, MetadataSource, ScanOptions};

/// Settings for all passes of a run
#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    pub scan: ScanOptions,
    pub detector: DetectorOptions,
    pub policy: PolicyOptions,
    /// Run profile passes on the rayon pool
    pub parallel: bool,
}

impl AuditOptions {
    /// `verbose` attaches remediation commands to every finding
    pub fn from_config(config: &Config, verbose: bool) -> Self {
        let markers = Markers {
            container: config.container_suffix.clone(),
            index: config.index_suffix.clone(),
        };
        Self {
            scan: ScanOptions {
                markers: markers.clone(),
                exclude: config.exclude_paths.clone(),
            },
            detector: DetectorOptions {
                scope: PathBuf::from(&config.mail_scope),
                markers,
                emit_commands: verbose,
            },
            policy: PolicyOptions {
                emit_commands: verbose,
            },
            parallel: false,
        }
    }
}

pub struct Auditor {
    scan: ScanOptions,
    parallel: bool,
    policy: ResolutionPolicy,
    detector: EmptyContainerDetector,
    normalizer: Box<dyn PermissionNormalizer>,
}

impl Auditor {
    pub fn new(options: AuditOptions) -> Self {
        Self::with_metadata(options, scanner::platform_default())
    }

    pub fn with_metadata(options: AuditOptions, metadata: Box<dyn MetadataSource>) -> Self {
        debug!("using {} metadata", metadata.name());
        Self {
            scan: options.scan,
            parallel: options.parallel,
            policy: ResolutionPolicy::new(options.policy, metadata),
            detector: EmptyContainerDetector::new(options.detector),
            normalizer: Box::new(NoopNormalizer),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Box<dyn PermissionNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Run both passes over one profile
    pub fn audit_profile(&self, profile: &Profile) -> Result<ProfileReport, AuditError> {
        if !profile.root.is_dir() {
            return Err(AuditError::ProfileRootMissing {
                name: profile.name.clone(),
                path: profile.root.clone(),
            });
        }

        let mut warnings = Vec::new();
        if let Err(e) = self.normalizer.normalize(&profile.root) {
            warn!("permission normalization failed for '{}': {}", profile.name, e);
            warnings.push(format!("permission normalization failed: {}", e));
        }

        let mut duplicates = Vec::new();
        let mut sets = scanner::scan(&profile.root, self.scan.clone()).map_err(|e| match e {
            AuditError::Io { path, .. } => AuditError::ProfileRootMissing {
                name: profile.name.clone(),
                path,
            },
            other => other,
        })?;
        for set in sets.by_ref() {
            let resolution = self.policy.resolve(&set);
            warnings.extend(resolution.skipped.iter().cloned());
            duplicates.push(resolution);
        }
        debug!(
            "'{}' ({}): {} directories, {} duplicate sets",
            profile.name,
            sets.root().display(),
            sets.dirs_visited(),
            duplicates.len()
        );
        warnings.extend(sets.into_warnings().iter().map(|e| e.to_string()));

        let empty = self.detector.find(&profile.root);
        warnings.extend(empty.warnings.iter().map(|e| e.to_string()));

        Ok(ProfileReport::aggregate(
            profile,
            duplicates,
            empty.containers,
            warnings,
        ))
    }

    /// Audit one profile, turning a failure into an outcome
    pub fn outcome(&self, profile: &Profile) -> ProfileOutcome {
        match self.audit_profile(profile) {
            Ok(report) => ProfileOutcome::Checked(report),
            Err(e) => {
                warn!("{}", e);
                ProfileOutcome::Failed(ProfileFailure {
                    profile: profile.name.clone(),
                    root: Some(profile.root.clone()),
                    error: e.to_string(),
                })
            }
        }
    }

    /// Audit every profile. `on_outcome` sees each outcome in registry order,
    /// as soon as it is known when running sequentially.
    pub fn audit_all<F>(&self, profiles: &[Profile], mut on_outcome: F) -> RunSummary
    where
        F: FnMut(&ProfileOutcome),
    {
        let outcomes: Vec<ProfileOutcome> = if self.parallel {
            // collect() keeps input order whatever order the passes finish in
            let outcomes: Vec<ProfileOutcome> =
                profiles.par_iter().map(|p| self.outcome(p)).collect();
            outcomes.iter().for_each(&mut on_outcome);
            outcomes
        } else {
            profiles
                .iter()
                .map(|p| {
                    let outcome = self.outcome(p);
                    on_outcome(&outcome);
                    outcome
                })
                .collect()
        };
        RunSummary::combine(outcomes)
    }
}
