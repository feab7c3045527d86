//! Flattening raw exports into tables, and writing them out.

pub mod flatten;
pub mod store;
pub mod writer;

pub use flatten::flatten_records;
pub use store::{FlattenReport, TableStore};
