//! T-SQL dialect helpers for the Kusto SQL endpoint
//!
//! The endpoint accepts a subset of T-SQL. Identifier quoting and string
//! quoting follow SQL Server conventions; row limiting is `TOP n` only,
//! since the endpoint does not implement `OFFSET ... FETCH`.

use kustoql_core::{DialectInfo, KustoqlError, Result};

use crate::driver::kusto_dialect;

/// Dialect helper for SQL sent to the Kusto SQL endpoint
#[derive(Debug, Clone, Default)]
pub struct KustoDialect;

impl KustoDialect {
    /// Create a new dialect instance
    pub fn new() -> Self {
        Self
    }

    /// Get the complete dialect information
    pub fn dialect_info(&self) -> DialectInfo {
        kusto_dialect()
    }

    /// Quote an identifier using square bracket syntax
    ///
    /// Closing brackets inside the identifier are doubled.
    ///
    /// # Example
    ///
    /// ```
    /// use kustoql_driver_kusto::KustoDialect;
    ///
    /// let dialect = KustoDialect::new();
    /// assert_eq!(dialect.quote_identifier("StormEvents"), "[StormEvents]");
    /// assert_eq!(dialect.quote_identifier("odd]name"), "[odd]]name]");
    /// ```
    pub fn quote_identifier(&self, ident: &str) -> String {
        let escaped = ident.replace(']', "]]");
        format!("[{}]", escaped)
    }

    /// Quote a string literal using single quotes
    ///
    /// Single quotes within the string are doubled.
    pub fn quote_string(&self, s: &str) -> String {
        let escaped = s.replace('\'', "''");
        format!("'{}'", escaped)
    }

    /// Fully qualified, quoted table reference
    ///
    /// The endpoint presents everything under the fixed `dbo` schema.
    pub fn qualified_table(&self, schema: Option<&str>, table: &str) -> String {
        let schema = schema.unwrap_or("dbo");
        format!(
            "{}.{}",
            self.quote_identifier(schema),
            self.quote_identifier(table)
        )
    }

    /// Row-limit clause
    ///
    /// Always `TOP n`; the endpoint has no `OFFSET ... FETCH` support, so
    /// there is no offset parameter here.
    pub fn limit_clause(&self, limit: u64) -> String {
        format!("TOP {}", limit)
    }

    /// Reject pagination requests the engine cannot serve
    pub fn check_offset(&self, offset: Option<u64>) -> Result<()> {
        match offset {
            Some(n) if n > 0 => Err(KustoqlError::NotSupported(
                "OFFSET pagination is not supported by the Kusto SQL endpoint".into(),
            )),
            _ => Ok(()),
        }
    }
}
