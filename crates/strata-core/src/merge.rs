//! Delta merge: advance a system snapshot from one commit to the next.
//!
//! Two passes run over a [`SystemChange`]: a service-lifecycle pass driven by
//! build-descriptor deltas (creating services and adopting orphans, or
//! orphanizing a removed service's classes), then a class-level pass applying
//! source-file adds, modifies, and deletes.  Each delta is applied
//! independently; a failed parse or a dangling path is local to that delta
//! and never aborts the batch.

use tracing::{debug, info, warn};

use crate::delta::{ChangeKind, Delta, SystemChange};
use crate::models::{path_contains, ServiceRecord, SystemRecord};

/// Apply `change` to `system`, producing the snapshot for the change's new
/// commit.
pub fn merge(mut system: SystemRecord, change: &SystemChange) -> SystemRecord {
    for delta in change.descriptor_deltas() {
        apply_descriptor_delta(&mut system, delta);
    }
    for delta in change.source_deltas() {
        apply_source_delta(&mut system, delta);
    }
    system.commit_id = change.new_commit.clone();
    system
}

// ---------------------------------------------------------------------------
// Service lifecycle
// ---------------------------------------------------------------------------

fn apply_descriptor_delta(system: &mut SystemRecord, delta: &Delta) {
    let directory = delta.parent_directory().to_string();
    match delta.change_type {
        ChangeKind::Add => {
            if system.service_index_by_path(&directory).is_some() {
                debug!(path = %directory, "service already present, descriptor add ignored");
                return;
            }
            let name = service_name_from_directory(&directory);
            info!(service = %name, path = %directory, "creating service");
            system.microservices.push(ServiceRecord::new(name, &directory));
            let idx = system.microservices.len() - 1;
            adopt_orphans(system, idx);
        }
        ChangeKind::Delete => match system.service_index_by_path(&directory) {
            Some(idx) => {
                let mut service = system.microservices.remove(idx);
                info!(service = %service.name, path = %directory, "removing service, orphanizing classes");
                system.orphans.append(&mut service.drain_classes());
            }
            None => debug!(path = %directory, "descriptor delete for unknown service"),
        },
        // Descriptor content changes carry no architectural signal here;
        // dependency and property edits stay out of the class model.
        ChangeKind::Modify => debug!(path = %directory, "descriptor modify ignored"),
    }
}

/// Move every orphan whose path falls under the service's directory into the
/// service.  Orphans whose role has no service bin stay in the pool.
fn adopt_orphans(system: &mut SystemRecord, service_idx: usize) {
    let service_path = system.microservices[service_idx].path.clone();
    let mut idx = 0;
    while idx < system.orphans.len() {
        let orphan = &system.orphans[idx];
        if path_contains(&service_path, &orphan.path)
            && ServiceRecord::accepts_role(orphan.class_role)
        {
            let class = system.orphans.remove(idx);
            debug!(class = %class.path, service = %system.microservices[service_idx].name, "adopting orphan");
            system.microservices[service_idx].insert_class(class);
        } else {
            idx += 1;
        }
    }
}

/// Service name derived from the last segment of its directory.
fn service_name_from_directory(directory: &str) -> String {
    directory
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(directory)
        .to_string()
}

// ---------------------------------------------------------------------------
// Class-level changes
// ---------------------------------------------------------------------------

fn apply_source_delta(system: &mut SystemRecord, delta: &Delta) {
    match delta.change_type {
        ChangeKind::Add => match &delta.class_change {
            Some(class) => system.place_class(class.clone()),
            None => warn!(path = %delta.path(), "add delta without parsed class, dropped"),
        },
        ChangeKind::Modify => {
            let removed = system.take_class(&delta.old_path);
            match &delta.class_change {
                // Re-insert wherever the path now resolves, whether or not
                // the old record was found; a valid parse is never lost.
                Some(class) => system.place_class(class.clone()),
                None => {
                    if removed.is_some() {
                        warn!(path = %delta.old_path, "modified class no longer parses, dropped");
                    } else {
                        debug!(path = %delta.old_path, "modify delta for unknown class, nothing to drop");
                    }
                }
            }
        }
        ChangeKind::Delete => {
            if system.take_class(&delta.old_path).is_none() {
                debug!(path = %delta.old_path, "delete delta for unknown class, already consistent");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
