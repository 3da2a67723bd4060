//! JSON persistence boundary for snapshots, change sets, and reports.
//!
//! The core operates on in-memory records; these helpers are the only place
//! the crate touches the filesystem.  Snapshots round-trip through the
//! stable field names of the persisted format.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::delta::SystemChange;
use crate::detect::DetectionReport;
use crate::errors::{StrataError, StrataResult};
use crate::models::SystemRecord;

/// Read a system snapshot from a JSON file.
pub fn read_snapshot(path: &Path) -> StrataResult<SystemRecord> {
    read_json(path).map_err(|e| match e {
        StrataError::Json(e) => StrataError::Snapshot(format!("{}: {e}", path.display())),
        other => other,
    })
}

/// Write a system snapshot as pretty-printed JSON.
pub fn write_snapshot(path: &Path, system: &SystemRecord) -> StrataResult<()> {
    write_json(path, system)
}

/// Read a system change (delta batch) from a JSON file.
pub fn read_system_change(path: &Path) -> StrataResult<SystemChange> {
    read_json(path).map_err(|e| match e {
        StrataError::Json(e) => StrataError::Delta(format!("{}: {e}", path.display())),
        other => other,
    })
}

/// Write a per-commit detection report as pretty-printed JSON.
pub fn write_report(path: &Path, report: &DetectionReport) -> StrataResult<()> {
    write_json(path, report)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StrataResult<T> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> StrataResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
