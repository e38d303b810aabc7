//! Schema introspection against the Kusto SQL endpoint
//!
//! The endpoint exposes `INFORMATION_SCHEMA.TABLES` and
//! `INFORMATION_SCHEMA.COLUMNS`, but none of SQL Server's constraint
//! catalogs (`sys.indexes`, `sys.foreign_keys`, ...). Primary key, foreign
//! key, and index lookups therefore return empty results without issuing a
//! query, and column discovery stays on the lightweight views with a
//! zero-row probe as fallback.

use async_trait::async_trait;
use kustoql_core::{
    ColumnInfo, Connection, DatabaseInfo, ForeignKeyInfo, IndexInfo, KustoqlError, PrimaryKeyInfo,
    Result, SchemaInfo, SchemaIntrospection, TableDetails, TableInfo, TableType, Value,
};

use crate::connection::KustoConnection;
use crate::dialect::KustoDialect;

/// Collation reported for Kusto string columns; the engine compares strings
/// case-sensitively.
const STRING_COLLATION: &str = "SQL_Latin1_General_CP1_CS_AS";

/// Default schema the endpoint presents all tables under
const DEFAULT_SCHEMA: &str = "dbo";

#[async_trait]
impl SchemaIntrospection for KustoConnection {
    /// The endpoint scopes a connection to one database and exposes no
    /// catalog of its siblings, so this reports the connected database only.
    #[tracing::instrument(skip(self))]
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        Ok(self
            .database()
            .map(|name| DatabaseInfo {
                name: name.to_string(),
                owner: None,
                comment: None,
            })
            .into_iter()
            .collect())
    }

    /// Everything lives under the fixed `dbo` schema.
    #[tracing::instrument(skip(self))]
    async fn list_schemas(&self) -> Result<Vec<SchemaInfo>> {
        Ok(vec![SchemaInfo {
            name: DEFAULT_SCHEMA.to_string(),
            owner: None,
            comment: None,
        }])
    }

    #[tracing::instrument(skip(self))]
    async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<TableInfo>> {
        fetch_tables(self, schema).await
    }

    #[tracing::instrument(skip(self))]
    async fn has_table(&self, schema: Option<&str>, name: &str) -> Result<bool> {
        fetch_has_table(self, schema, name).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_table(&self, schema: Option<&str>, name: &str) -> Result<TableDetails> {
        fetch_table_details(self, schema, name).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnInfo>> {
        fetch_columns(self, schema, table).await
    }

    /// The engine does not expose primary keys; answered without a query.
    #[tracing::instrument(skip(self))]
    async fn get_primary_key(
        &self,
        _schema: Option<&str>,
        table: &str,
    ) -> Result<Option<PrimaryKeyInfo>> {
        tracing::debug!(table = %table, "primary key lookup skipped; engine exposes no key catalog");
        Ok(None)
    }

    /// The engine does not expose relational constraints; answered without a
    /// query.
    #[tracing::instrument(skip(self))]
    async fn get_foreign_keys(
        &self,
        _schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<ForeignKeyInfo>> {
        tracing::debug!(table = %table, "foreign key lookup skipped; engine exposes no constraint catalog");
        Ok(Vec::new())
    }

    /// The engine does not expose indexes; answered without a query.
    #[tracing::instrument(skip(self))]
    async fn get_indexes(&self, _schema: Option<&str>, table: &str) -> Result<Vec<IndexInfo>> {
        tracing::debug!(table = %table, "index lookup skipped; engine exposes no index catalog");
        Ok(Vec::new())
    }
}

/// Full table reflection: catalog entry plus columns
///
/// Key and index sets are always empty on this engine, so reflecting a table
/// costs exactly the table lookup and the column discovery.
pub(crate) async fn fetch_table_details(
    conn: &dyn Connection,
    schema: Option<&str>,
    name: &str,
) -> Result<TableDetails> {
    let tables = fetch_tables(conn, schema).await?;
    let info = tables
        .into_iter()
        .find(|t| t.name == name)
        .ok_or_else(|| KustoqlError::NotFound(format!("Table '{}' not found", name)))?;

    let columns = fetch_columns(conn, schema, name).await?;

    Ok(TableDetails {
        info,
        columns,
        primary_key: None,
        foreign_keys: Vec::new(),
        indexes: Vec::new(),
    })
}

/// List tables (and views) through `INFORMATION_SCHEMA.TABLES`
pub(crate) async fn fetch_tables(
    conn: &dyn Connection,
    schema: Option<&str>,
) -> Result<Vec<TableInfo>> {
    let (sql, params): (&str, Vec<Value>) = match schema {
        Some(schema) => (
            "SELECT TABLE_NAME, TABLE_TYPE \
             FROM INFORMATION_SCHEMA.TABLES \
             WHERE (TABLE_TYPE = 'BASE TABLE' OR TABLE_TYPE = 'VIEW') \
               AND TABLE_SCHEMA = @P1 \
             ORDER BY TABLE_NAME",
            vec![Value::String(schema.to_string())],
        ),
        None => (
            "SELECT TABLE_NAME, TABLE_TYPE \
             FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_TYPE = 'BASE TABLE' OR TABLE_TYPE = 'VIEW' \
             ORDER BY TABLE_NAME",
            Vec::new(),
        ),
    };

    let result = conn.query(sql, &params).await?;

    let tables = result
        .rows
        .iter()
        .map(|row| {
            let name = row
                .get(0)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let table_type = match row.get(1).and_then(|v| v.as_str()) {
                Some("VIEW") => TableType::View,
                _ => TableType::Table,
            };

            TableInfo {
                schema: Some(schema.unwrap_or(DEFAULT_SCHEMA).to_string()),
                name,
                table_type,
                comment: None,
            }
        })
        .collect();

    Ok(tables)
}

/// Existence check through `INFORMATION_SCHEMA.TABLES`
pub(crate) async fn fetch_has_table(
    conn: &dyn Connection,
    schema: Option<&str>,
    name: &str,
) -> Result<bool> {
    let (sql, params): (&str, Vec<Value>) = match schema {
        Some(schema) => (
            "SELECT TABLE_NAME \
             FROM INFORMATION_SCHEMA.TABLES \
             WHERE (TABLE_TYPE = 'BASE TABLE' OR TABLE_TYPE = 'VIEW') \
               AND TABLE_NAME = @P1 AND TABLE_SCHEMA = @P2",
            vec![
                Value::String(name.to_string()),
                Value::String(schema.to_string()),
            ],
        ),
        None => (
            "SELECT TABLE_NAME \
             FROM INFORMATION_SCHEMA.TABLES \
             WHERE (TABLE_TYPE = 'BASE TABLE' OR TABLE_TYPE = 'VIEW') \
               AND TABLE_NAME = @P1",
            vec![Value::String(name.to_string())],
        ),
    };

    let result = conn.query(sql, &params).await?;
    Ok(result.has_rows())
}

/// Column discovery: lightweight `INFORMATION_SCHEMA.COLUMNS` select first,
/// zero-row probe fallback
///
/// Neither path touches a constraint catalog. The fallback covers databases
/// where the engine leaves `INFORMATION_SCHEMA.COLUMNS` unpopulated: a
/// `SELECT TOP 0` costs one round-trip and the result-set descriptors carry
/// name and type for every column.
pub(crate) async fn fetch_columns(
    conn: &dyn Connection,
    schema: Option<&str>,
    table: &str,
) -> Result<Vec<ColumnInfo>> {
    let result = conn
        .query(
            "SELECT COLUMN_NAME, DATA_TYPE, ORDINAL_POSITION, NUMERIC_PRECISION, NUMERIC_SCALE \
             FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_NAME = @P1 \
             ORDER BY ORDINAL_POSITION",
            &[Value::String(table.to_string())],
        )
        .await?;

    if result.has_rows() {
        let columns = result
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let name = row
                    .get(0)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                let data_type = row
                    .get(1)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                let ordinal = row
                    .get(2)
                    .and_then(|v| v.as_i64())
                    .map(|n| n as usize)
                    .unwrap_or(idx + 1);
                let precision = row.get(3).and_then(|v| v.as_i64()).map(|n| n as i32);
                let scale = row.get(4).and_then(|v| v.as_i64()).map(|n| n as i32);

                kusto_column(name, data_type, ordinal, precision, scale)
            })
            .collect();

        return Ok(columns);
    }

    tracing::debug!(
        table = %table,
        "INFORMATION_SCHEMA.COLUMNS returned nothing, probing result-set descriptors"
    );
    probe_columns(conn, schema, table).await
}

/// Zero-row probe: run `SELECT TOP 0 *` and read the cursor descriptors
async fn probe_columns(
    conn: &dyn Connection,
    schema: Option<&str>,
    table: &str,
) -> Result<Vec<ColumnInfo>> {
    let dialect = KustoDialect::new();
    let sql = format!(
        "SELECT {} * FROM {}",
        dialect.limit_clause(0),
        dialect.qualified_table(schema, table)
    );

    let result = conn.query(&sql, &[]).await?;

    let columns = result
        .columns
        .iter()
        .map(|meta| {
            kusto_column(
                meta.name.clone(),
                meta.data_type.clone(),
                meta.ordinal + 1,
                meta.precision,
                meta.scale,
            )
        })
        .collect();

    Ok(columns)
}

/// Build a ColumnInfo with the invariants Kusto columns always have: nullable,
/// never auto-increment, never part of a key.
fn kusto_column(
    name: String,
    data_type: String,
    ordinal: usize,
    precision: Option<i32>,
    scale: Option<i32>,
) -> ColumnInfo {
    let collation = if data_type == "nvarchar" {
        Some(STRING_COLLATION.to_string())
    } else {
        None
    };
    // `real` maps to a 53-bit float on this engine even when the catalog
    // reports no precision.
    let precision = precision.or(if data_type == "real" { Some(53) } else { None });

    ColumnInfo {
        name,
        ordinal,
        data_type,
        nullable: true,
        default_value: None,
        precision,
        scale,
        collation,
        is_primary_key: false,
        is_auto_increment: false,
        comment: None,
    }
}
