// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities.
pub use crate::memory::{CallKind, DirectoryCall, MemoryDirectory, MemoryDirectoryError};

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}
