//! The suggestion engine.
//!
//! - [`ingest`]: the detector boundary. Validates loosely-typed drafts,
//!   quarantines malformed ones, de-duplicates against pending rows, and
//!   optionally auto-applies on a matching auto-apply pattern.
//! - [`matcher`]: annotates suggestions with active pattern matches and the
//!   boosted display confidence, at read time.
//! - [`preview`]: computes the declarative mutation diff a resolution
//!   implies, without executing it.
//! - [`decision`]: the approve/reject/skip state machine; one serializable
//!   transaction per resolution.

pub mod decision;
pub mod ingest;
pub mod matcher;
pub mod preview;
