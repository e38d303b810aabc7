//! Shared Tokio runtime for synchronous callers
//!
//! The connector API is async, but notebook-style callers frequently sit in
//! a plain blocking context. This module provides one shared runtime so the
//! blocking wrappers can drive async driver code without each call spinning
//! up its own.

use std::sync::OnceLock;
use tokio::runtime::Runtime;

/// Global Tokio runtime for database drivers
static TOKIO_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Get or create the shared Tokio runtime for database drivers.
///
/// # Panics
///
/// Panics if the runtime cannot be created.
pub fn get_tokio_runtime() -> &'static Runtime {
    TOKIO_RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("kustoql-driver-runtime")
            .build()
            .expect("Failed to create Tokio runtime for database drivers")
    })
}

/// Run an async operation to completion on the shared runtime.
///
/// This blocks the current thread until the future completes. Must not be
/// called from inside an async context.
pub fn block_on_tokio<F, T>(future: F) -> T
where
    F: std::future::Future<Output = T>,
{
    get_tokio_runtime().block_on(future)
}
