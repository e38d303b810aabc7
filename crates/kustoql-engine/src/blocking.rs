//! Blocking wrappers over the async API
//!
//! For callers without an async context (scripts, notebook kernels). Each
//! call drives the shared driver runtime to completion; do not call these
//! from inside a Tokio context.

use crate::engine::Engine;
use crate::table::{Query, TableHandle};
use arrow_array::RecordBatch;
use kustoql_core::Result;
use kustoql_drivers::block_on_tokio;

/// Blocking variant of [`crate::reflect_table`]
pub fn reflect_table(engine: &Engine, name: &str) -> Result<TableHandle> {
    block_on_tokio(crate::table::reflect_table(engine, name))
}

/// Blocking variant of [`crate::run_query`]
pub fn run_query(query: &Query, engine: &Engine) -> Result<RecordBatch> {
    block_on_tokio(crate::dataframe::run_query(query, engine))
}

/// Blocking variant of [`Engine::close`]
pub fn close(engine: &Engine) -> Result<()> {
    block_on_tokio(engine.close())
}
