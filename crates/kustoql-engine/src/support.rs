//! Shared test doubles: an in-memory driver and connection

use async_trait::async_trait;
use kustoql_core::{
    ColumnInfo, ColumnMeta, Connection, ConnectionConfig, DatabaseDriver, DatabaseInfo,
    DriverCapabilities, ForeignKeyInfo, IndexInfo, KustoqlError, PrimaryKeyInfo, QueryResult,
    Result, Row, SchemaInfo, SchemaIntrospection, TableDetails, TableInfo, TableType, Value,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Connection double that replays one canned result
#[derive(Debug)]
pub(crate) struct StubConnection {
    closed: AtomicBool,
    result: QueryResult,
    columns: Vec<ColumnInfo>,
}

impl StubConnection {
    pub fn new(result: QueryResult, columns: Vec<ColumnInfo>) -> Self {
        Self {
            closed: AtomicBool::new(false),
            result,
            columns,
        }
    }
}

#[async_trait]
impl Connection for StubConnection {
    fn driver_name(&self) -> &str {
        "stub"
    }

    async fn query(&self, _sql: &str, _params: &[Value]) -> Result<QueryResult> {
        if self.is_closed() {
            return Err(KustoqlError::Connection("connection is closed".into()));
        }
        Ok(self.result.clone())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        Some(self)
    }
}

#[async_trait]
impl SchemaIntrospection for StubConnection {
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        Ok(Vec::new())
    }

    async fn list_schemas(&self) -> Result<Vec<SchemaInfo>> {
        Ok(Vec::new())
    }

    async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<TableInfo>> {
        Ok(vec![TableInfo {
            schema: schema.map(String::from),
            name: "StormEvents".to_string(),
            table_type: TableType::Table,
            comment: None,
        }])
    }

    async fn has_table(&self, _schema: Option<&str>, name: &str) -> Result<bool> {
        Ok(name == "StormEvents")
    }

    async fn get_table(&self, schema: Option<&str>, name: &str) -> Result<TableDetails> {
        Ok(TableDetails {
            info: TableInfo {
                schema: schema.map(String::from),
                name: name.to_string(),
                table_type: TableType::Table,
                comment: None,
            },
            columns: self.columns.clone(),
            primary_key: None,
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        })
    }

    async fn get_columns(&self, _schema: Option<&str>, _table: &str) -> Result<Vec<ColumnInfo>> {
        Ok(self.columns.clone())
    }

    async fn get_primary_key(
        &self,
        _schema: Option<&str>,
        _table: &str,
    ) -> Result<Option<PrimaryKeyInfo>> {
        Ok(None)
    }

    async fn get_foreign_keys(
        &self,
        _schema: Option<&str>,
        _table: &str,
    ) -> Result<Vec<ForeignKeyInfo>> {
        Ok(Vec::new())
    }

    async fn get_indexes(&self, _schema: Option<&str>, _table: &str) -> Result<Vec<IndexInfo>> {
        Ok(Vec::new())
    }
}

/// Driver double: hands out [`StubConnection`]s, counting physical connects
/// and consulting the credential exactly like a real driver would
pub(crate) struct StubDriver {
    pub connects: AtomicUsize,
    result: QueryResult,
    columns: Vec<ColumnInfo>,
}

impl StubDriver {
    pub fn new(result: QueryResult, columns: Vec<ColumnInfo>) -> Self {
        Self {
            connects: AtomicUsize::new(0),
            result,
            columns,
        }
    }
}

#[async_trait]
impl DatabaseDriver for StubDriver {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn capabilities(&self) -> DriverCapabilities {
        DriverCapabilities::default()
    }

    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let credential = config.credential.clone().ok_or_else(|| {
            KustoqlError::Credential("no credential configured for connection".into())
        })?;
        let _token = credential.token().await?;

        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubConnection::new(
            self.result.clone(),
            self.columns.clone(),
        )))
    }

    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()> {
        let _conn = self.connect(config).await?;
        Ok(())
    }

    fn build_connection_string(&self, config: &ConnectionConfig) -> String {
        format!("Server={};Database={:?}", config.host, config.database)
    }
}

/// Canned three-column, three-row result in the shape the Kusto endpoint
/// reports
pub(crate) fn storm_events_result() -> QueryResult {
    let names = vec![
        "EventId".to_string(),
        "State".to_string(),
        "Damage".to_string(),
    ];
    QueryResult {
        id: Uuid::new_v4(),
        columns: vec![
            ColumnMeta {
                name: "EventId".to_string(),
                data_type: "bigint".to_string(),
                nullable: true,
                ordinal: 0,
                ..Default::default()
            },
            ColumnMeta {
                name: "State".to_string(),
                data_type: "nvarchar".to_string(),
                nullable: true,
                ordinal: 1,
                ..Default::default()
            },
            ColumnMeta {
                name: "Damage".to_string(),
                data_type: "real".to_string(),
                nullable: true,
                ordinal: 2,
                ..Default::default()
            },
        ],
        rows: vec![
            Row::new(
                names.clone(),
                vec![
                    Value::Int64(1),
                    Value::String("FLORIDA".to_string()),
                    Value::Float32(10.5),
                ],
            ),
            Row::new(
                names.clone(),
                vec![
                    Value::Int64(2),
                    Value::String("KANSAS".to_string()),
                    Value::Null,
                ],
            ),
            Row::new(
                names.clone(),
                vec![
                    Value::Int64(3),
                    Value::Null,
                    Value::Float32(0.0),
                ],
            ),
        ],
        execution_time_ms: 1,
    }
}

/// Reflected columns matching [`storm_events_result`]
pub(crate) fn storm_events_columns() -> Vec<ColumnInfo> {
    vec![
        ColumnInfo {
            name: "EventId".to_string(),
            ordinal: 1,
            data_type: "bigint".to_string(),
            nullable: true,
            ..Default::default()
        },
        ColumnInfo {
            name: "State".to_string(),
            ordinal: 2,
            data_type: "nvarchar".to_string(),
            nullable: true,
            collation: Some("SQL_Latin1_General_CP1_CS_AS".to_string()),
            ..Default::default()
        },
        ColumnInfo {
            name: "Damage".to_string(),
            ordinal: 3,
            data_type: "real".to_string(),
            nullable: true,
            precision: Some(53),
            ..Default::default()
        },
    ]
}
