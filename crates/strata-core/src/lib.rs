//! Strata core library — temporal architecture reconstruction for
//! multi-service codebases.
//!
//! The crate advances a typed snapshot of a service system commit by commit
//! (delta merge), derives service-level and method-level dependency graphs
//! from every snapshot, and runs a family of anti-pattern detectors — cyclic
//! dependencies, service chains, greedy and hub-like services, wrong cuts —
//! over each one.  Parsing source into records and walking git history are
//! upstream concerns; the core consumes already-extracted records.

pub mod delta;
pub mod detect;
pub mod errors;
pub mod graph;
pub mod merge;
pub mod models;
pub mod persist;
pub mod pipeline;

pub use errors::{StrataError, StrataResult};
