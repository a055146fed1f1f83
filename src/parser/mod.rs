//! Email parsing: MBOX span scanning, header helpers, and MIME body extraction.

pub mod header;
pub mod mbox;
pub mod mime;
