//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Methods that must run inside a
//! caller-owned transaction take `&mut PgConnection` instead.

pub mod catalog_repo;
pub mod correction_repo;
pub mod document_repo;
pub mod link_repo;
pub mod pattern_repo;
pub mod suggestion_repo;
pub mod tag_repo;

pub use catalog_repo::CatalogRepo;
pub use correction_repo::CorrectionRepo;
pub use document_repo::DocumentRepo;
pub use link_repo::LinkRepo;
pub use pattern_repo::PatternRepo;
pub use suggestion_repo::SuggestionRepo;
pub use tag_repo::TagRepo;
