//! The flat metadata index: ordering, CSV serialization, and reading it back.

pub mod builder;
pub mod reader;
pub mod writer;
