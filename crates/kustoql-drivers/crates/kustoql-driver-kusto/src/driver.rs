//! Kusto SQL endpoint driver implementation

use crate::connection::KustoConnection;
use async_trait::async_trait;
use kustoql_core::{
    CommentStyles, Connection, ConnectionConfig, DataTypeCategory, DataTypeInfo, DatabaseDriver,
    DialectInfo, DriverCapabilities, FunctionCategory, KeywordCategory, KeywordInfo, KustoqlError,
    Result, SqlFunctionInfo,
};
use std::borrow::Cow;
use std::sync::Arc;

/// Azure Data Explorer (Kusto) database driver
///
/// Speaks to the cluster's SQL (TDS) endpoint with bearer-token
/// authentication. A fresh token is requested from the configured credential
/// for every physical connection.
pub struct KustoDriver;

impl KustoDriver {
    /// Create a new Kusto driver instance
    pub fn new() -> Self {
        tracing::debug!("Kusto driver initialized");
        Self
    }
}

impl Default for KustoDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for KustoDriver {
    fn id(&self) -> &'static str {
        "kusto"
    }

    fn name(&self) -> &'static str {
        "kusto"
    }

    fn display_name(&self) -> &'static str {
        "Azure Data Explorer"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn default_port(&self) -> Option<u16> {
        Some(1433)
    }

    fn dialect_info(&self) -> DialectInfo {
        kusto_dialect()
    }

    fn capabilities(&self) -> DriverCapabilities {
        DriverCapabilities {
            supports_transactions: false, // autocommit only
            supports_prepared_statements: true,
            supports_multiple_statements: false,
            supports_window_functions: true,
            supports_cte: true,
            supports_schemas: false, // single fixed `dbo` schema
            supports_multiple_databases: true,
            supports_foreign_keys: false,
            supports_views: false,
            supports_triggers: false,
            supports_offset_fetch: false,
            supports_ssl: true,
            max_identifier_length: Some(128),
            max_parameters: Some(2100), // TDS RPC limit
        }
    }

    #[tracing::instrument(skip(self, config), fields(host = %config.host, database = config.database.as_deref()))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        tracing::debug!("connecting to Kusto SQL endpoint");

        let credential = config.credential.clone().ok_or_else(|| {
            KustoqlError::Credential("no credential configured for connection".into())
        })?;

        // The token must be in hand before the TDS login is attempted; a
        // credential failure surfaces here, unchanged, with no connection
        // left behind.
        let token = credential.token().await?;

        let host = if config.host.is_empty() {
            return Err(KustoqlError::Configuration(
                "no cluster host configured".into(),
            ));
        } else {
            config.host.clone()
        };
        let port = if config.port > 0 { config.port } else { 1433 };
        let trust_cert = config
            .get_string("trust_cert")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let connection = KustoConnection::connect(
            &host,
            port,
            config.database.as_deref(),
            &token,
            trust_cert,
        )
        .await
        .map_err(|e| KustoqlError::Driver(e.to_string()))?;

        Ok(Arc::new(connection))
    }

    #[tracing::instrument(skip(self, config))]
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()> {
        tracing::debug!("testing Kusto connection");
        let _conn = self.connect(config).await?;
        Ok(())
    }

    fn build_connection_string(&self, config: &ConnectionConfig) -> String {
        let port = if config.port > 0 { config.port } else { 1433 };
        let mut conn_str = format!("Server=tcp:{},{}", config.host, port);

        if let Some(db) = &config.database {
            conn_str.push_str(&format!(";Database={}", db));
        }

        conn_str.push_str(";Encrypt=True;TrustServerCertificate=");
        conn_str.push_str(
            if config.get_string("trust_cert").as_deref() == Some("true") {
                "True"
            } else {
                "False"
            },
        );

        if config.autocommit() {
            conn_str.push_str(";Autocommit=True");
        }

        conn_str
    }

    fn connection_string_help(&self) -> &'static str {
        "kusto://<cluster>/<database> or Server=tcp:<cluster>.kusto.windows.net,1433;Database=<db>"
    }

    fn parse_connection_string(&self, conn_str: &str) -> Result<ConnectionConfig> {
        if conn_str.contains("://") {
            parse_url(conn_str)
        } else {
            parse_ado_string(conn_str)
        }
    }
}

/// Parse a `kusto://<cluster>/<database>` URL
fn parse_url(conn_str: &str) -> Result<ConnectionConfig> {
    let url = url::Url::parse(conn_str)
        .map_err(|e| KustoqlError::Configuration(format!("invalid connection URL: {}", e)))?;

    if url.scheme() != "kusto" {
        return Err(KustoqlError::Configuration(format!(
            "unexpected URL scheme '{}', expected 'kusto'",
            url.scheme()
        )));
    }

    let cluster = url
        .host_str()
        .ok_or_else(|| KustoqlError::Configuration("connection URL has no cluster host".into()))?;
    let database = url.path().trim_start_matches('/');
    if database.is_empty() {
        return Err(KustoqlError::Configuration(
            "connection URL has no database".into(),
        ));
    }

    let mut config = ConnectionConfig::new_kusto(cluster, database);
    if let Some(port) = url.port() {
        config.port = port;
    }
    for (key, value) in url.query_pairs() {
        config.params.insert(key.into_owned(), value.into_owned());
    }

    Ok(config)
}

/// Parse an ADO/ODBC-style `Key=Value;...` connection string
///
/// Unknown keys (including `Driver={...}`) are ignored; a
/// `Trusted_Connection` entry is dropped since the endpoint only accepts
/// bearer tokens.
fn parse_ado_string(conn_str: &str) -> Result<ConnectionConfig> {
    let mut server = None;
    let mut database = None;
    let mut params = Vec::new();

    for segment in conn_str.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let (key, value) = segment
            .split_once('=')
            .ok_or_else(|| {
                KustoqlError::Configuration(format!("malformed connection string near '{}'", segment))
            })?;
        match key.trim().to_ascii_lowercase().as_str() {
            "server" => server = Some(value.trim().to_string()),
            "database" => database = Some(value.trim().to_string()),
            "autocommit" => params.push(("autocommit", value.trim().to_ascii_lowercase())),
            "trustservercertificate" => {
                params.push(("trust_cert", value.trim().to_ascii_lowercase()))
            }
            // Dropped: token auth replaces integrated auth on this endpoint.
            "trusted_connection" => {}
            _ => {}
        }
    }

    let server = server.ok_or_else(|| {
        KustoqlError::Configuration("connection string has no Server entry".into())
    })?;
    let database = database.ok_or_else(|| {
        KustoqlError::Configuration("connection string has no Database entry".into())
    })?;

    let server = server.trim_start_matches("tcp:");
    let (host, port) = match server.split_once(',') {
        Some((host, port)) => {
            let port = port.trim().parse::<u16>().map_err(|_| {
                KustoqlError::Configuration(format!("invalid port in Server entry: '{}'", port))
            })?;
            (host.trim(), port)
        }
        None => (server, 1433),
    };

    let mut config = ConnectionConfig::new_kusto(host, &database);
    config.port = port;
    for (key, value) in params {
        config = config.with_param(key, value);
    }

    Ok(config)
}

/// Create dialect information for the T-SQL subset the Kusto endpoint accepts
pub fn kusto_dialect() -> DialectInfo {
    DialectInfo {
        id: Cow::Borrowed("kusto"),
        display_name: Cow::Borrowed("Kusto T-SQL"),
        keywords: kusto_keywords(),
        functions: kusto_functions(),
        data_types: kusto_data_types(),
        identifier_quote: '[',
        string_quote: '\'',
        // Kusto entity names and string comparisons are case-sensitive,
        // unlike SQL Server's default collation.
        case_sensitive_identifiers: true,
        statement_terminator: ';',
        comment_styles: CommentStyles::sql_standard(),
    }
}

fn kusto_keywords() -> Vec<KeywordInfo> {
    vec![
        KeywordInfo::new("SELECT", KeywordCategory::Dql),
        KeywordInfo::new("FROM", KeywordCategory::Dql),
        KeywordInfo::new("WHERE", KeywordCategory::Dql),
        KeywordInfo::new("DISTINCT", KeywordCategory::Dql),
        KeywordInfo::new("JOIN", KeywordCategory::Clause),
        KeywordInfo::new("INNER", KeywordCategory::Clause),
        KeywordInfo::new("LEFT", KeywordCategory::Clause),
        KeywordInfo::new("RIGHT", KeywordCategory::Clause),
        KeywordInfo::new("OUTER", KeywordCategory::Clause),
        KeywordInfo::new("ON", KeywordCategory::Clause),
        KeywordInfo::new("GROUP", KeywordCategory::Clause),
        KeywordInfo::new("BY", KeywordCategory::Clause),
        KeywordInfo::new("HAVING", KeywordCategory::Clause),
        KeywordInfo::new("ORDER", KeywordCategory::Clause),
        KeywordInfo::new("ASC", KeywordCategory::Clause),
        KeywordInfo::new("DESC", KeywordCategory::Clause),
        KeywordInfo::with_desc(
            "TOP",
            KeywordCategory::Clause,
            "Row limiting; the endpoint has no OFFSET/FETCH",
        ),
        KeywordInfo::new("WITH", KeywordCategory::Clause),
        KeywordInfo::new("AS", KeywordCategory::Clause),
        KeywordInfo::new("OVER", KeywordCategory::Clause),
        KeywordInfo::new("PARTITION", KeywordCategory::Clause),
        KeywordInfo::new("UNION", KeywordCategory::Clause),
        KeywordInfo::new("ALL", KeywordCategory::Clause),
        KeywordInfo::new("AND", KeywordCategory::Operator),
        KeywordInfo::new("OR", KeywordCategory::Operator),
        KeywordInfo::new("NOT", KeywordCategory::Operator),
        KeywordInfo::new("IN", KeywordCategory::Operator),
        KeywordInfo::new("LIKE", KeywordCategory::Operator),
        KeywordInfo::new("BETWEEN", KeywordCategory::Operator),
        KeywordInfo::new("EXISTS", KeywordCategory::Operator),
        KeywordInfo::new("IS", KeywordCategory::Operator),
        KeywordInfo::new("NULL", KeywordCategory::Operator),
    ]
}

fn kusto_functions() -> Vec<SqlFunctionInfo> {
    vec![
        SqlFunctionInfo::new("COUNT", FunctionCategory::Aggregate)
            .with_signature("COUNT(expression)"),
        SqlFunctionInfo::new("COUNT_BIG", FunctionCategory::Aggregate)
            .with_signature("COUNT_BIG(expression)"),
        SqlFunctionInfo::new("SUM", FunctionCategory::Aggregate).with_signature("SUM(expression)"),
        SqlFunctionInfo::new("AVG", FunctionCategory::Aggregate).with_signature("AVG(expression)"),
        SqlFunctionInfo::new("MIN", FunctionCategory::Aggregate).with_signature("MIN(expression)"),
        SqlFunctionInfo::new("MAX", FunctionCategory::Aggregate).with_signature("MAX(expression)"),
        SqlFunctionInfo::new("STDEV", FunctionCategory::Aggregate)
            .with_signature("STDEV(expression)"),
        SqlFunctionInfo::new("VAR", FunctionCategory::Aggregate).with_signature("VAR(expression)"),
        SqlFunctionInfo::new("LEN", FunctionCategory::String).with_signature("LEN(string)"),
        SqlFunctionInfo::new("SUBSTRING", FunctionCategory::String)
            .with_signature("SUBSTRING(string, start, length)"),
        SqlFunctionInfo::new("REPLACE", FunctionCategory::String)
            .with_signature("REPLACE(string, old, new)"),
        SqlFunctionInfo::new("CONCAT", FunctionCategory::String)
            .with_signature("CONCAT(string1, string2, ...)"),
        SqlFunctionInfo::new("UPPER", FunctionCategory::String).with_signature("UPPER(string)"),
        SqlFunctionInfo::new("LOWER", FunctionCategory::String).with_signature("LOWER(string)"),
        SqlFunctionInfo::new("TRIM", FunctionCategory::String).with_signature("TRIM(string)"),
        SqlFunctionInfo::new("ABS", FunctionCategory::Numeric).with_signature("ABS(number)"),
        SqlFunctionInfo::new("FLOOR", FunctionCategory::Numeric).with_signature("FLOOR(number)"),
        SqlFunctionInfo::new("CEILING", FunctionCategory::Numeric)
            .with_signature("CEILING(number)"),
        SqlFunctionInfo::new("ROUND", FunctionCategory::Numeric)
            .with_signature("ROUND(number, precision)"),
        SqlFunctionInfo::new("SQRT", FunctionCategory::Numeric).with_signature("SQRT(number)"),
        SqlFunctionInfo::new("GETUTCDATE", FunctionCategory::DateTime)
            .with_signature("GETUTCDATE()"),
        SqlFunctionInfo::new("DATEADD", FunctionCategory::DateTime)
            .with_signature("DATEADD(datepart, number, date)"),
        SqlFunctionInfo::new("DATEDIFF", FunctionCategory::DateTime)
            .with_signature("DATEDIFF(datepart, startdate, enddate)"),
        SqlFunctionInfo::new("DATEPART", FunctionCategory::DateTime)
            .with_signature("DATEPART(datepart, date)"),
        SqlFunctionInfo::new("YEAR", FunctionCategory::DateTime).with_signature("YEAR(date)"),
        SqlFunctionInfo::new("MONTH", FunctionCategory::DateTime).with_signature("MONTH(date)"),
        SqlFunctionInfo::new("DAY", FunctionCategory::DateTime).with_signature("DAY(date)"),
        SqlFunctionInfo::new("CAST", FunctionCategory::Conversion)
            .with_signature("CAST(expression AS datatype)"),
        SqlFunctionInfo::new("CONVERT", FunctionCategory::Conversion)
            .with_signature("CONVERT(datatype, expression)"),
        SqlFunctionInfo::new("CASE", FunctionCategory::Conditional)
            .with_signature("CASE WHEN condition THEN result ELSE default END"),
        SqlFunctionInfo::new("COALESCE", FunctionCategory::Conditional)
            .with_signature("COALESCE(expression1, expression2, ...)"),
        SqlFunctionInfo::new("NULLIF", FunctionCategory::Conditional)
            .with_signature("NULLIF(expression1, expression2)"),
        SqlFunctionInfo::new("ISNULL", FunctionCategory::Conditional)
            .with_signature("ISNULL(expression, replacement)"),
    ]
}

fn kusto_data_types() -> Vec<DataTypeInfo> {
    // Kusto scalar types as they surface over TDS.
    vec![
        DataTypeInfo::new("bit", DataTypeCategory::Boolean),
        DataTypeInfo::new("int", DataTypeCategory::Integer),
        DataTypeInfo::new("bigint", DataTypeCategory::Integer),
        DataTypeInfo::new("real", DataTypeCategory::Float).with_length(Some(53), Some(53)),
        DataTypeInfo::new("float", DataTypeCategory::Float).with_length(Some(53), Some(53)),
        DataTypeInfo::new("decimal", DataTypeCategory::Decimal).with_length(Some(18), Some(38)),
        DataTypeInfo::new("nvarchar", DataTypeCategory::String).with_length(Some(1), Some(4000)),
        DataTypeInfo::new("varbinary", DataTypeCategory::Binary).with_length(Some(1), Some(8000)),
        DataTypeInfo::new("datetime2", DataTypeCategory::DateTime).with_length(Some(7), Some(7)),
        DataTypeInfo::new("time", DataTypeCategory::Time).with_length(Some(7), Some(7)),
        DataTypeInfo::new("uniqueidentifier", DataTypeCategory::Uuid),
        DataTypeInfo::new("sql_variant", DataTypeCategory::Other),
    ]
}
