//! File-level change records between two commits.
//!
//! A [`Delta`] describes one changed file together with the freshly parsed
//! class record when the file still exists after the change.  A batch of
//! deltas between two commit ids forms a [`SystemChange`], the input unit of
//! the merge engine.
//!
//! Paths follow the git-diff convention of the persisted format: a leading
//! `/` followed by the repository-relative path (`/ts-auth/src/Login.java`).

use serde::{Deserialize, Serialize};

use crate::models::ClassRecord;

/// File name that marks a build descriptor.  A descriptor delta drives
/// service lifecycle rather than class bookkeeping.
pub const BUILD_DESCRIPTOR: &str = "pom.xml";

/// Placeholder path git reports for the missing side of an add or delete.
pub const DEV_NULL: &str = "/dev/null";

/// Minimum number of `/`-separated segments before a descriptor names a
/// service directory.  Shallower descriptors are container builds at the
/// repository root.
const MIN_SERVICE_DESCRIPTOR_DEPTH: usize = 3;

// ---------------------------------------------------------------------------
// Change kinds
// ---------------------------------------------------------------------------

/// The kind of change a delta records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Add,
    Modify,
    Delete,
}

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

/// One file-level change.  `class_change` carries the parse of the file's
/// new content for adds and modifies; it is absent for deletes and for files
/// the upstream extractor could not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    pub change_type: ChangeKind,
    pub old_path: String,
    pub new_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_change: Option<ClassRecord>,
}

impl Delta {
    pub fn added(path: impl Into<String>, class_change: Option<ClassRecord>) -> Self {
        Delta {
            change_type: ChangeKind::Add,
            old_path: DEV_NULL.to_string(),
            new_path: path.into(),
            class_change,
        }
    }

    pub fn modified(path: impl Into<String>, class_change: Option<ClassRecord>) -> Self {
        let path = path.into();
        Delta {
            change_type: ChangeKind::Modify,
            old_path: path.clone(),
            new_path: path,
            class_change,
        }
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        Delta {
            change_type: ChangeKind::Delete,
            old_path: path.into(),
            new_path: DEV_NULL.to_string(),
            class_change: None,
        }
    }

    /// The path that identifies the changed file: the new path for adds, the
    /// old path otherwise.
    pub fn path(&self) -> &str {
        match self.change_type {
            ChangeKind::Add => &self.new_path,
            _ => &self.old_path,
        }
    }

    /// Whether this delta changes a build descriptor rather than a source
    /// class.
    pub fn is_build_descriptor(&self) -> bool {
        self.path()
            .rsplit('/')
            .next()
            .is_some_and(|file| file == BUILD_DESCRIPTOR)
    }

    /// Whether the descriptor sits at the repository root.  Root descriptors
    /// are container builds, not services, and are skipped by the merge
    /// engine's lifecycle pass.
    pub fn is_root_descriptor(&self) -> bool {
        self.is_build_descriptor()
            && self.path().split('/').count() < MIN_SERVICE_DESCRIPTOR_DEPTH
    }

    /// Directory of the changed file, i.e. the service directory for a
    /// non-root build descriptor.
    pub fn parent_directory(&self) -> &str {
        let path = self.path();
        match path.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &path[..idx],
        }
    }
}

// ---------------------------------------------------------------------------
// SystemChange
// ---------------------------------------------------------------------------

/// All deltas between two adjacent commits, in diff order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemChange {
    pub old_commit: String,
    pub new_commit: String,
    pub changes: Vec<Delta>,
}

impl SystemChange {
    pub fn new(old_commit: impl Into<String>, new_commit: impl Into<String>) -> Self {
        SystemChange {
            old_commit: old_commit.into(),
            new_commit: new_commit.into(),
            changes: Vec::new(),
        }
    }

    pub fn with_changes(mut self, changes: Vec<Delta>) -> Self {
        self.changes = changes;
        self
    }

    /// Build-descriptor deltas that name a service directory.
    pub fn descriptor_deltas(&self) -> impl Iterator<Item = &Delta> {
        self.changes
            .iter()
            .filter(|d| d.is_build_descriptor() && !d.is_root_descriptor())
    }

    /// Source-class deltas, everything that is not a build descriptor.
    pub fn source_deltas(&self) -> impl Iterator<Item = &Delta> {
        self.changes.iter().filter(|d| !d.is_build_descriptor())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
