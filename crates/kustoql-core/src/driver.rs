//! Database driver trait definition

use crate::{Connection, DialectInfo, Result, TokenCredential};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Capabilities that a driver may support
#[derive(Debug, Clone, Default)]
pub struct DriverCapabilities {
    /// Supports transactions
    pub supports_transactions: bool,
    /// Supports prepared statements / parameter binding
    pub supports_prepared_statements: bool,
    /// Supports multiple statements in one query
    pub supports_multiple_statements: bool,
    /// Supports window functions
    pub supports_window_functions: bool,
    /// Supports common table expressions (WITH)
    pub supports_cte: bool,
    /// Supports schemas (namespaces)
    pub supports_schemas: bool,
    /// Supports multiple databases
    pub supports_multiple_databases: bool,
    /// Supports foreign keys
    pub supports_foreign_keys: bool,
    /// Supports views
    pub supports_views: bool,
    /// Supports triggers
    pub supports_triggers: bool,
    /// Supports OFFSET ... FETCH pagination
    pub supports_offset_fetch: bool,
    /// Supports SSL/TLS
    pub supports_ssl: bool,
    /// Maximum identifier length (None = no limit)
    pub max_identifier_length: Option<usize>,
    /// Maximum parameters per query (None = no limit)
    pub max_parameters: Option<usize>,
}

/// Core driver trait that database drivers implement
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Unique identifier for this driver (e.g., "kusto")
    ///
    /// This doubles as the connection-URL scheme the driver claims in the
    /// registry.
    fn id(&self) -> &'static str {
        self.name()
    }

    /// Driver name
    fn name(&self) -> &'static str;

    /// Display name for diagnostics
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// Driver version
    fn version(&self) -> &'static str {
        "0.1.0"
    }

    /// Supported features/capabilities
    fn capabilities(&self) -> DriverCapabilities;

    /// Default connection port
    fn default_port(&self) -> Option<u16> {
        None
    }

    /// Connection string format help text
    fn connection_string_help(&self) -> &'static str {
        ""
    }

    /// Get SQL dialect information
    ///
    /// Returns metadata about the SQL dialect this driver speaks, including
    /// keywords, functions, data types, and syntax rules.
    fn dialect_info(&self) -> DialectInfo {
        DialectInfo::default()
    }

    /// Create a new connection
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>>;

    /// Test connection without keeping it
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()>;

    /// Parse a connection string or URL into a configuration
    fn parse_connection_string(&self, _conn_str: &str) -> Result<ConnectionConfig> {
        Err(crate::KustoqlError::NotSupported(
            "Connection string parsing not implemented for this driver".into(),
        ))
    }

    /// Build a connection string from configuration
    fn build_connection_string(&self, config: &ConnectionConfig) -> String;
}

/// Connection configuration
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Unique identifier
    pub id: uuid::Uuid,
    /// Display name
    pub name: String,
    /// Driver ID (e.g., "kusto")
    pub driver: String,
    /// Host address
    pub host: String,
    /// Port number (0 for driver default)
    pub port: u16,
    /// Database name
    pub database: Option<String>,
    /// Additional connection parameters
    pub params: HashMap<String, String>,
    /// Credential used to authenticate new physical connections
    pub credential: Option<Arc<dyn TokenCredential>>,
}

impl ConnectionConfig {
    /// Create a new configuration with default values
    pub fn new(driver: &str, name: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: name.to_string(),
            driver: driver.to_string(),
            host: String::new(),
            port: 0,
            database: None,
            params: HashMap::new(),
            credential: None,
        }
    }

    /// Create a configuration for a Kusto cluster
    ///
    /// `cluster` is the bare cluster name; the SQL endpoint host
    /// `<cluster>.kusto.windows.net` is derived from it. A fully qualified
    /// host is used as-is.
    pub fn new_kusto(cluster: &str, database: &str) -> Self {
        let mut config = Self::new("kusto", cluster);
        config.host = if cluster.contains('.') {
            cluster.to_string()
        } else {
            format!("{}.kusto.windows.net", cluster)
        };
        config.port = 1433;
        config.database = Some(database.to_string());
        config
    }

    /// Set a connection parameter
    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Attach the credential used when opening physical connections
    pub fn with_credential(mut self, credential: Arc<dyn TokenCredential>) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Get a string parameter
    pub fn get_string(&self, key: &str) -> Option<String> {
        if let Some(val) = self.params.get(key) {
            return Some(val.clone());
        }
        match key {
            "host" => Some(self.host.clone()),
            "database" => self.database.clone(),
            _ => None,
        }
    }

    /// Whether connections run in autocommit mode (default: true)
    ///
    /// The Kusto SQL endpoint has no transactions; turning this off is only
    /// meaningful for engines that support them.
    pub fn autocommit(&self) -> bool {
        self.params
            .get("autocommit")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("params", &self.params)
            .field("has_credential", &self.credential.is_some())
            .finish()
    }
}
