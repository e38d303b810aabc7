//! Azure Data Explorer (Kusto) driver for kustoql
//!
//! This crate adapts MSSQL-style connectivity (TDS) to the Kusto SQL
//! endpoint. The endpoint speaks the SQL Server wire protocol but does not
//! populate SQL Server's constraint catalogs, so the schema introspection
//! here short-circuits the metadata queries that would be slow or invalid
//! against it.

mod connection;
mod dialect;
mod driver;
mod schema;

#[cfg(test)]
mod connection_tests;
#[cfg(test)]
mod dialect_tests;
#[cfg(test)]
mod driver_tests;
#[cfg(test)]
mod schema_tests;

pub use connection::{KustoConnection, KustoConnectionError};
pub use dialect::KustoDialect;
pub use driver::{kusto_dialect, KustoDriver};
