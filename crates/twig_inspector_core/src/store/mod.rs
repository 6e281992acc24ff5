//! Provenance storage for the current page.

pub mod provenance_store;

pub use provenance_store::{ProvenanceEntry, ProvenanceStore, ScanSummary, TrackedElement};
