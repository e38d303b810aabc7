//! Kusto SQL endpoint connection using tiberius

use async_trait::async_trait;
use kustoql_core::{
    AccessToken, ColumnMeta, Connection, KustoqlError, QueryResult, Result, Row, Value,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tiberius::{AuthMethod, Client, ColumnData, ColumnType, Config, EncryptionLevel};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use uuid::Uuid;

/// Kusto connection errors
#[derive(Debug, thiserror::Error)]
pub enum KustoConnectionError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Tiberius error: {0}")]
    Tiberius(#[from] tiberius::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<KustoConnectionError> for KustoqlError {
    fn from(err: KustoConnectionError) -> Self {
        KustoqlError::Driver(err.to_string())
    }
}

/// Connection to a Kusto cluster's SQL (TDS) endpoint
///
/// Authentication is bearer-token only: the token is attached as a
/// connect-time attribute of the TDS login, so a fresh token must be supplied
/// for every physical connection. There is no transaction surface; the
/// endpoint runs in autocommit mode.
pub struct KustoConnection {
    client: Mutex<Client<Compat<TcpStream>>>,
    closed: AtomicBool,
    database: Option<String>,
}

impl KustoConnection {
    /// Open a new connection to the SQL endpoint of a Kusto cluster
    ///
    /// # Arguments
    /// * `host` - Endpoint hostname, e.g. `mycluster.kusto.windows.net`
    /// * `port` - Endpoint port (1433)
    /// * `database` - Database to connect to
    /// * `token` - Bearer token attached to the TDS login
    /// * `trust_cert` - Trust the server certificate (local emulators only)
    #[tracing::instrument(skip(token))]
    pub async fn connect(
        host: &str,
        port: u16,
        database: Option<&str>,
        token: &AccessToken,
        trust_cert: bool,
    ) -> std::result::Result<Self, KustoConnectionError> {
        tracing::debug!("connecting to Kusto SQL endpoint at {}:{}", host, port);

        let mut config = Config::new();
        config.host(host);
        config.port(port);

        if let Some(db) = database {
            config.database(db);
        }

        if trust_cert {
            config.trust_cert();
        }

        config.encryption(EncryptionLevel::Required);
        config.authentication(AuthMethod::aad_token(token.secret()));

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| KustoConnectionError::ConnectionFailed(e.to_string()))?;

        tcp.set_nodelay(true)?;
        let compat_stream = tcp.compat_write();

        let client = Client::connect(config, compat_stream)
            .await
            .map_err(|e| KustoConnectionError::ConnectionFailed(e.to_string()))?;

        tracing::debug!("successfully connected to Kusto SQL endpoint");

        Ok(Self {
            client: Mutex::new(client),
            closed: AtomicBool::new(false),
            database: database.map(String::from),
        })
    }

    /// The database this connection was opened against
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    fn ensure_not_closed(&self) -> std::result::Result<(), KustoConnectionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(KustoConnectionError::ConnectionClosed);
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for KustoConnection {
    fn driver_name(&self) -> &str {
        "kusto"
    }

    fn dialect_id(&self) -> Option<&'static str> {
        Some("kusto")
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.ensure_not_closed()?;
        let start = std::time::Instant::now();

        let mut client = self.client.lock().await;

        let stream = if params.is_empty() {
            client.query(sql, &[]).await
        } else {
            let sql_params = values_to_sql_params(params);
            let param_refs: Vec<&dyn tiberius::ToSql> = sql_params
                .iter()
                .map(|p| p as &dyn tiberius::ToSql)
                .collect();
            client.query(sql, &param_refs[..]).await
        };

        match stream {
            Ok(mut query_stream) => {
                // Column descriptors come from the stream metadata, not the
                // first row, so zero-row results keep their schema.
                let columns: Vec<ColumnMeta> = query_stream
                    .columns()
                    .await
                    .map_err(|e| KustoqlError::Driver(e.to_string()))?
                    .unwrap_or_default()
                    .iter()
                    .enumerate()
                    .map(|(idx, col)| column_to_meta(col, idx))
                    .collect();

                let tds_rows = query_stream
                    .into_first_result()
                    .await
                    .map_err(|e| KustoqlError::Driver(e.to_string()))?;

                let column_names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
                let mut rows: Vec<Row> = Vec::with_capacity(tds_rows.len());

                for tds_row in tds_rows {
                    let values = row_to_values(tds_row)?;
                    rows.push(Row::new(column_names.clone(), values));
                }

                let execution_time_ms = start.elapsed().as_millis() as u64;
                tracing::debug!(
                    row_count = rows.len(),
                    duration_ms = execution_time_ms,
                    "query completed"
                );

                Ok(QueryResult {
                    id: Uuid::new_v4(),
                    columns,
                    rows,
                    execution_time_ms,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "query failed");
                Err(KustoqlError::Driver(e.to_string()))
            }
        }
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!("Kusto connection closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn as_schema_introspection(&self) -> Option<&dyn kustoql_core::SchemaIntrospection> {
        Some(self)
    }
}

/// Convert a tiberius column descriptor to ColumnMeta
fn column_to_meta(col: &tiberius::Column, ordinal: usize) -> ColumnMeta {
    ColumnMeta {
        name: col.name().to_string(),
        data_type: column_type_name(col.column_type()).to_string(),
        nullable: true,
        ordinal,
        precision: None,
        scale: None,
    }
}

/// SQL type name for a TDS column type, as the engine would report it
pub(crate) fn column_type_name(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Null => "null",
        ColumnType::Bit | ColumnType::Bitn => "bit",
        ColumnType::Int1 => "tinyint",
        ColumnType::Int2 => "smallint",
        ColumnType::Int4 | ColumnType::Intn => "int",
        ColumnType::Int8 => "bigint",
        ColumnType::Float4 => "real",
        ColumnType::Float8 | ColumnType::Floatn => "float",
        ColumnType::Money | ColumnType::Money4 => "money",
        ColumnType::Decimaln => "decimal",
        ColumnType::Numericn => "numeric",
        ColumnType::Datetime | ColumnType::Datetimen => "datetime",
        ColumnType::Datetime4 => "smalldatetime",
        ColumnType::Datetime2 => "datetime2",
        ColumnType::DatetimeOffsetn => "datetimeoffset",
        ColumnType::Daten => "date",
        ColumnType::Timen => "time",
        ColumnType::Guid => "uniqueidentifier",
        ColumnType::BigVarChar => "varchar",
        ColumnType::BigChar => "char",
        ColumnType::NVarchar => "nvarchar",
        ColumnType::NChar => "nchar",
        ColumnType::BigVarBin => "varbinary",
        ColumnType::BigBinary => "binary",
        ColumnType::Text => "text",
        ColumnType::NText => "ntext",
        ColumnType::Image => "image",
        ColumnType::Xml => "xml",
        ColumnType::Udt => "udt",
        ColumnType::SSVariant => "sql_variant",
    }
}

/// Convert a tiberius row to values by consuming the row
fn row_to_values(row: tiberius::Row) -> Result<Vec<Value>> {
    let mut values = Vec::new();

    for col_data in row.into_iter() {
        values.push(column_data_to_value(col_data)?);
    }

    Ok(values)
}

/// Convert tiberius ColumnData to a kustoql Value
pub(crate) fn column_data_to_value(col_data: ColumnData<'static>) -> Result<Value> {
    match col_data {
        ColumnData::Bit(None) => Ok(Value::Null),
        ColumnData::Bit(Some(v)) => Ok(Value::Bool(v)),
        ColumnData::U8(None) => Ok(Value::Null),
        ColumnData::U8(Some(v)) => Ok(Value::Int16(v as i16)),
        ColumnData::I16(None) => Ok(Value::Null),
        ColumnData::I16(Some(v)) => Ok(Value::Int16(v)),
        ColumnData::I32(None) => Ok(Value::Null),
        ColumnData::I32(Some(v)) => Ok(Value::Int32(v)),
        ColumnData::I64(None) => Ok(Value::Null),
        ColumnData::I64(Some(v)) => Ok(Value::Int64(v)),
        ColumnData::F32(None) => Ok(Value::Null),
        ColumnData::F32(Some(v)) => Ok(Value::Float32(v)),
        ColumnData::F64(None) => Ok(Value::Null),
        ColumnData::F64(Some(v)) => Ok(Value::Float64(v)),
        ColumnData::String(None) => Ok(Value::Null),
        ColumnData::String(Some(v)) => Ok(Value::String(v.into_owned())),
        ColumnData::Guid(None) => Ok(Value::Null),
        ColumnData::Guid(Some(v)) => Ok(Value::Uuid(v)),
        ColumnData::Binary(None) => Ok(Value::Null),
        ColumnData::Binary(Some(v)) => Ok(Value::Bytes(v.into_owned())),
        ColumnData::Numeric(None) => Ok(Value::Null),
        ColumnData::Numeric(Some(v)) => Ok(Value::Decimal(v.to_string())),
        ColumnData::DateTime(None) => Ok(Value::Null),
        ColumnData::DateTime(Some(v)) => {
            let dt = chrono::NaiveDateTime::new(
                chrono::NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
                    + chrono::Duration::days(v.days() as i64),
                chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                    (v.seconds_fragments() as f64 / 300.0) as u32,
                    0,
                )
                .unwrap_or_default(),
            );
            Ok(Value::DateTime(dt))
        }
        ColumnData::SmallDateTime(None) => Ok(Value::Null),
        ColumnData::SmallDateTime(Some(v)) => {
            let dt = chrono::NaiveDateTime::new(
                chrono::NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
                    + chrono::Duration::days(v.days() as i64),
                chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                    (v.seconds_fragments() as u32) * 60,
                    0,
                )
                .unwrap_or_default(),
            );
            Ok(Value::DateTime(dt))
        }
        ColumnData::DateTime2(None) => Ok(Value::Null),
        ColumnData::DateTime2(Some(v)) => {
            let date = v.date();
            let time = v.time();
            let dt = chrono::NaiveDateTime::new(
                chrono::NaiveDate::from_ymd_opt(1, 1, 1).unwrap()
                    + chrono::Duration::days(date.days() as i64),
                chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                    (time.increments() / 10_000_000) as u32,
                    ((time.increments() % 10_000_000) * 100) as u32,
                )
                .unwrap_or_default(),
            );
            Ok(Value::DateTime(dt))
        }
        ColumnData::DateTimeOffset(None) => Ok(Value::Null),
        ColumnData::DateTimeOffset(Some(v)) => {
            let dt2 = v.datetime2();
            let date = dt2.date();
            let time = dt2.time();
            let naive = chrono::NaiveDateTime::new(
                chrono::NaiveDate::from_ymd_opt(1, 1, 1).unwrap()
                    + chrono::Duration::days(date.days() as i64),
                chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                    (time.increments() / 10_000_000) as u32,
                    ((time.increments() % 10_000_000) * 100) as u32,
                )
                .unwrap_or_default(),
            );
            let utc =
                chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(naive, chrono::Utc);
            Ok(Value::DateTimeUtc(utc))
        }
        ColumnData::Date(None) => Ok(Value::Null),
        ColumnData::Date(Some(v)) => {
            let date = chrono::NaiveDate::from_ymd_opt(1, 1, 1).unwrap()
                + chrono::Duration::days(v.days() as i64);
            Ok(Value::Date(date))
        }
        ColumnData::Time(None) => Ok(Value::Null),
        ColumnData::Time(Some(v)) => {
            let time = chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                (v.increments() / 10_000_000) as u32,
                ((v.increments() % 10_000_000) * 100) as u32,
            )
            .unwrap_or_default();
            Ok(Value::Time(time))
        }
        ColumnData::Xml(None) => Ok(Value::Null),
        ColumnData::Xml(Some(v)) => Ok(Value::String(v.into_owned().into_string())),
    }
}

/// Container for TDS parameter values
#[derive(Debug)]
pub(crate) enum SqlParam {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
}

impl tiberius::ToSql for SqlParam {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            SqlParam::Null => ColumnData::I32(None),
            SqlParam::Bool(v) => ColumnData::Bit(Some(*v)),
            SqlParam::I16(v) => ColumnData::I16(Some(*v)),
            SqlParam::I32(v) => ColumnData::I32(Some(*v)),
            SqlParam::I64(v) => ColumnData::I64(Some(*v)),
            SqlParam::F32(v) => ColumnData::F32(Some(*v)),
            SqlParam::F64(v) => ColumnData::F64(Some(*v)),
            SqlParam::String(v) => {
                ColumnData::String(Some(std::borrow::Cow::Borrowed(v.as_str())))
            }
            SqlParam::Bytes(v) => {
                ColumnData::Binary(Some(std::borrow::Cow::Borrowed(v.as_slice())))
            }
            SqlParam::Uuid(v) => ColumnData::Guid(Some(*v)),
        }
    }
}

/// Convert kustoql Values to TDS parameters
pub(crate) fn values_to_sql_params(values: &[Value]) -> Vec<SqlParam> {
    values
        .iter()
        .map(|v| match v {
            Value::Null => SqlParam::Null,
            Value::Bool(b) => SqlParam::Bool(*b),
            Value::Int16(i) => SqlParam::I16(*i),
            Value::Int32(i) => SqlParam::I32(*i),
            Value::Int64(i) => SqlParam::I64(*i),
            Value::Float32(f) => SqlParam::F32(*f),
            Value::Float64(f) => SqlParam::F64(*f),
            Value::Decimal(d) => SqlParam::String(d.clone()),
            Value::String(s) => SqlParam::String(s.clone()),
            Value::Bytes(b) => SqlParam::Bytes(b.clone()),
            Value::Uuid(u) => SqlParam::Uuid(*u),
            Value::Date(d) => SqlParam::String(d.to_string()),
            Value::Time(t) => SqlParam::String(t.to_string()),
            Value::DateTime(dt) => SqlParam::String(dt.to_string()),
            Value::DateTimeUtc(dt) => SqlParam::String(dt.to_string()),
            Value::Json(j) => SqlParam::String(j.to_string()),
        })
        .collect()
}

impl std::fmt::Debug for KustoConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KustoConnection")
            .field("database", &self.database)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}
