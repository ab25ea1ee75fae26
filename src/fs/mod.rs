//! File system helpers for reading and writing manifests.

pub mod output;

pub use output::{read_manifest, write_atomic};
