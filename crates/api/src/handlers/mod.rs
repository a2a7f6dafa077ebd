//! HTTP request handlers, grouped by resource.

pub mod documents;
pub mod patterns;
pub mod suggestions;
pub mod tags;
