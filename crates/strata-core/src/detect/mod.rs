//! Anti-pattern detection over one immutable snapshot.
//!
//! Each detector is an independent read-only analysis over the service or
//! method dependency graph; [`run_all`] builds both graphs and runs the
//! whole family concurrently.  Detectors never fail: an empty or disconnected
//! graph produces empty result sets.

pub mod chains;
pub mod cuts;
pub mod cycles;
pub mod degree;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::{build_method_graph, build_service_graph};
use crate::models::SystemRecord;

/// Default distinct-service degree at which a service counts as greedy or
/// hub-like.
pub const DEFAULT_DEGREE_THRESHOLD: usize = 6;

/// Default number of services a call path must span to count as a chain.
pub const DEFAULT_CHAIN_LENGTH: usize = 3;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunable thresholds for the detector family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorConfig {
    pub greedy_threshold: usize,
    pub hub_threshold: usize,
    pub chain_length: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            greedy_threshold: DEFAULT_DEGREE_THRESHOLD,
            hub_threshold: DEFAULT_DEGREE_THRESHOLD,
            chain_length: DEFAULT_CHAIN_LENGTH,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Result sets of every detector for one commit, the unit handed to
/// downstream reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub commit_id: String,
    pub service_cycles: Vec<Vec<String>>,
    pub method_level_cycles: Vec<Vec<String>>,
    pub service_chains: Vec<Vec<String>>,
    pub method_level_chains: Vec<Vec<String>>,
    pub greedy_services: Vec<String>,
    pub hub_like_services: Vec<String>,
    pub wrong_cuts: Vec<BTreeSet<String>>,
}

/// Per-pattern occurrence counts of a [`DetectionReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub service_cycles: usize,
    pub method_level_cycles: usize,
    pub service_chains: usize,
    pub method_level_chains: usize,
    pub greedy_services: usize,
    pub hub_like_services: usize,
    pub wrong_cuts: usize,
}

impl DetectionReport {
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            service_cycles: self.service_cycles.len(),
            method_level_cycles: self.method_level_cycles.len(),
            service_chains: self.service_chains.len(),
            method_level_chains: self.method_level_chains.len(),
            greedy_services: self.greedy_services.len(),
            hub_like_services: self.hub_like_services.len(),
            wrong_cuts: self.wrong_cuts.len(),
        }
    }

    /// Whether any detector flagged anything.
    pub fn is_clean(&self) -> bool {
        self.summary() == ReportSummary::default()
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Run the full detector family over one snapshot.
///
/// Graph construction and the detectors are read-only over the immutable
/// snapshot, so the family fans out on the rayon pool with no
/// synchronization beyond that immutability.
pub fn run_all(system: &SystemRecord, config: &DetectorConfig) -> DetectionReport {
    let (service_graph, method_graph) = rayon::join(
        || build_service_graph(system),
        || build_method_graph(system),
    );

    let ((service_cycles, method_level_cycles), (chain_results, degree_and_cuts)) = rayon::join(
        || {
            rayon::join(
                || cycles::service_cycles(&service_graph),
                || cycles::method_level_cycles(&method_graph),
            )
        },
        || {
            rayon::join(
                || {
                    (
                        chains::service_chains(&service_graph, config.chain_length),
                        chains::method_level_chains(&method_graph, config.chain_length),
                    )
                },
                || {
                    (
                        degree::greedy_services(&service_graph, config.greedy_threshold),
                        degree::hub_like_services(&service_graph, config.hub_threshold),
                        cuts::wrong_cuts(&service_graph),
                    )
                },
            )
        },
    );
    let (service_chains, method_level_chains) = chain_results;
    let (greedy_services, hub_like_services, wrong_cuts) = degree_and_cuts;

    DetectionReport {
        commit_id: system.commit_id.clone(),
        service_cycles,
        method_level_cycles,
        service_chains,
        method_level_chains,
        greedy_services,
        hub_like_services,
        wrong_cuts,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
