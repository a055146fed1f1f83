//! `mailextract` — split a hierarchical mail archive into per-message body
//! artifacts and a single newest-first CSV index.
//!
//! This crate provides the extraction pipeline, the archive decoder contract
//! with a decoder for on-disk mail trees, and the index reader/writer.

pub mod archive;
pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod model;
pub mod parser;
