//! Core data model types: extracted field sets and index records.

pub mod fields;
pub mod record;
