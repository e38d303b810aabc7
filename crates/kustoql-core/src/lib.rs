//! kustoql core - Core abstractions and traits for the Kusto SQL connector
//!
//! This crate provides the fundamental traits and types the other kustoql
//! crates depend on. It defines:
//!
//! - `DatabaseDriver` - Trait for database driver implementations
//! - `Connection` - Trait for database connections
//! - `SchemaIntrospection` - Trait for schema inspection
//! - `TokenCredential` - Trait for bearer-token sources
//! - `DialectInfo` - SQL dialect metadata (keywords, functions, types)
//! - Common types like `Value`, `Row`, `QueryResult`, etc.

mod connection;
mod credential;
mod dialect;
mod driver;
mod error;
mod schema;
mod types;

pub use connection::*;
pub use credential::*;
pub use dialect::*;
pub use driver::*;
pub use error::*;
pub use schema::*;
pub use types::*;
