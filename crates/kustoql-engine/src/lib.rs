//! kustoql engine - engine handles and query helpers
//!
//! The glue between a caller and the drivers: build an authenticated engine
//! for a cluster/database pair, reflect tables through it, and run queries
//! whose results materialize as Arrow record batches.
//!
//! ```no_run
//! use std::sync::Arc;
//! use kustoql_core::StaticTokenCredential;
//! use kustoql_engine::{build_engine, reflect_table, run_query};
//!
//! # async fn example() -> kustoql_core::Result<()> {
//! let credential = Arc::new(StaticTokenCredential::new("<token>"));
//! let engine = build_engine("mycluster", "Samples", credential)?;
//!
//! let table = reflect_table(&engine, "StormEvents").await?;
//! let query = table.select().columns(&["State", "EventType"]).limit(100).build()?;
//! let batch = run_query(&query, &engine).await?;
//! # Ok(())
//! # }
//! ```

pub mod blocking;
mod dataframe;
mod engine;
mod table;

#[cfg(test)]
mod support;

pub use dataframe::{arrow_type_for, run_query, schema_for, to_record_batch};
pub use engine::{build_engine, Engine};
pub use table::{reflect_table, reflect_table_in, Query, SelectBuilder, TableHandle};
