//! Services built on the reference core.
//!
//! Collections, bulk compilation and text export. Each takes its parser,
//! extractor and verse store as arguments so they can be tested against
//! in-memory data.

pub mod collection;
pub mod compiler;
pub mod export;
