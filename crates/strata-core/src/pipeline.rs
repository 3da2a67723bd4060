//! Commit-walk orchestration: merge, then detect, one commit at a time.
//!
//! The walk is strictly sequential — each step's output snapshot is the next
//! step's input — while detection inside a step fans out over the rayon
//! pool.  A malformed or out-of-order change is logged and applied anyway;
//! nothing a single commit carries may abort the walk.

use tracing::{info, warn};

use crate::delta::SystemChange;
use crate::detect::{run_all, DetectionReport, DetectorConfig};
use crate::merge::merge;
use crate::models::SystemRecord;

/// Sequential fold of a system snapshot over its commit history.
#[derive(Debug)]
pub struct CommitWalk {
    system: SystemRecord,
    config: DetectorConfig,
}

impl CommitWalk {
    /// Start a walk from an initially extracted snapshot.
    pub fn new(initial: SystemRecord) -> Self {
        CommitWalk {
            system: initial,
            config: DetectorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DetectorConfig) -> Self {
        self.config = config;
        self
    }

    /// The snapshot the walk currently stands on.
    pub fn system(&self) -> &SystemRecord {
        &self.system
    }

    /// Advance one commit: apply the change, then run the detector family
    /// over the merged snapshot.
    pub fn step(&mut self, change: &SystemChange) -> DetectionReport {
        if change.old_commit != self.system.commit_id {
            warn!(
                expected = %self.system.commit_id,
                got = %change.old_commit,
                "change does not continue from the current snapshot, applying anyway"
            );
        }

        let system = std::mem::take(&mut self.system);
        self.system = merge(system, change);
        info!(
            commit = %self.system.commit_id,
            services = self.system.microservices.len(),
            orphans = self.system.orphans.len(),
            deltas = change.changes.len(),
            "merged commit"
        );
        run_all(&self.system, &self.config)
    }

    /// Walk a whole change sequence, returning one report per commit.
    pub fn run<'a>(
        &mut self,
        changes: impl IntoIterator<Item = &'a SystemChange>,
    ) -> Vec<DetectionReport> {
        changes.into_iter().map(|change| self.step(change)).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
