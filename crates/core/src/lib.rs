//! Domain logic for the atelier suggestion engine.
//!
//! Pure functions and types shared by the DB and API layers: the error
//! taxonomy, confidence scoring, sender/domain parsing, pattern key
//! normalization, the suggestion status machine, detector draft validation,
//! mutation diff types, and review-queue cursor handling. No I/O lives here.

pub mod confidence;
pub mod detector;
pub mod domains;
pub mod error;
pub mod mutation;
pub mod pattern;
pub mod queue;
pub mod sender;
pub mod suggestion;
pub mod types;
