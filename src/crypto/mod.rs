//! Credential digests

pub mod hashing;

pub use hashing::{digest, digests_match};
