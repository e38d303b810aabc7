//! Table reflection and query construction

use crate::engine::Engine;
use kustoql_core::{ColumnInfo, KustoqlError, Result, Value};
use kustoql_drivers::kusto::KustoDialect;

/// A SQL query ready for execution
#[derive(Debug, Clone)]
pub struct Query {
    /// SQL text
    pub sql: String,
    /// Bound parameters
    pub params: Vec<Value>,
}

impl Query {
    /// Wrap raw SQL as a query
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Wrap raw SQL with bound parameters
    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// A reflected table: name plus discovered column metadata
///
/// Reflection goes through the driver's introspection, which on this engine
/// means one lightweight catalog lookup and never a constraint query.
#[derive(Debug, Clone)]
pub struct TableHandle {
    schema: Option<String>,
    name: String,
    columns: Vec<ColumnInfo>,
}

impl TableHandle {
    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema the table was reflected under
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Reflected columns, in ordinal order
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Look up a reflected column by name
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Start building a SELECT against this table
    pub fn select(&self) -> SelectBuilder<'_> {
        SelectBuilder {
            table: self,
            projection: Vec::new(),
            predicate: None,
            params: Vec::new(),
            limit: None,
        }
    }
}

/// Builder for SELECT statements against a reflected table
#[derive(Debug)]
pub struct SelectBuilder<'a> {
    table: &'a TableHandle,
    projection: Vec<String>,
    predicate: Option<String>,
    params: Vec<Value>,
    limit: Option<u64>,
}

impl SelectBuilder<'_> {
    /// Project the named columns instead of all reflected columns
    pub fn columns(mut self, names: &[&str]) -> Self {
        self.projection = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Add a raw predicate; use `@P1`-style placeholders for parameters
    pub fn filter(mut self, predicate: impl Into<String>, params: Vec<Value>) -> Self {
        self.predicate = Some(predicate.into());
        self.params = params;
        self
    }

    /// Cap the number of returned rows (rendered as `TOP n`)
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render the query
    ///
    /// Projected column names must exist on the reflected table; this is the
    /// only validation performed, everything else is the engine's problem.
    pub fn build(self) -> Result<Query> {
        let dialect = KustoDialect::new();

        for name in &self.projection {
            if self.table.column(name).is_none() {
                return Err(KustoqlError::Schema(format!(
                    "column '{}' does not exist on table '{}'",
                    name, self.table.name
                )));
            }
        }

        let projection = if self.projection.is_empty() {
            if self.table.columns.is_empty() {
                "*".to_string()
            } else {
                self.table
                    .columns
                    .iter()
                    .map(|c| dialect.quote_identifier(&c.name))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        } else {
            self.projection
                .iter()
                .map(|name| dialect.quote_identifier(name))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = String::from("SELECT ");
        if let Some(limit) = self.limit {
            sql.push_str(&dialect.limit_clause(limit));
            sql.push(' ');
        }
        sql.push_str(&projection);
        sql.push_str(" FROM ");
        sql.push_str(&dialect.qualified_table(self.table.schema.as_deref(), &self.table.name));

        if let Some(predicate) = &self.predicate {
            sql.push_str(" WHERE ");
            sql.push_str(predicate);
        }

        Ok(Query {
            sql,
            params: self.params,
        })
    }
}

/// Reflect a table through the engine's connection
pub async fn reflect_table(engine: &Engine, name: &str) -> Result<TableHandle> {
    reflect_table_in(engine, None, name).await
}

/// Reflect a table under an explicit schema
#[tracing::instrument(skip(engine))]
pub async fn reflect_table_in(
    engine: &Engine,
    schema: Option<&str>,
    name: &str,
) -> Result<TableHandle> {
    let conn = engine.acquire().await?;
    let introspection = conn.as_schema_introspection().ok_or_else(|| {
        KustoqlError::NotSupported("driver does not support schema introspection".into())
    })?;

    let columns = introspection.get_columns(schema, name).await?;
    tracing::debug!(table = %name, columns = columns.len(), "table reflected");

    Ok(TableHandle {
        schema: schema.map(String::from),
        name: name.to_string(),
        columns,
    })
}
