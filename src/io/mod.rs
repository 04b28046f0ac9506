//! I/O module
//!
//! Handles snapshot persistence and statement output.
//!
//! # Components
//!
//! - `snapshot` - JSON snapshot records plus the file-backed and in-memory stores
//! - `statement` - CSV statement export

pub mod snapshot;
pub mod statement;

pub use snapshot::{decode_snapshot, encode_snapshot, FileSnapshotStore, MemorySnapshotStore};
pub use statement::write_statement_csv;
