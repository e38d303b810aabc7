//! Engine handle construction
//!
//! An [`Engine`] bundles a resolved driver with its connection
//! configuration and hands out connections on demand. Physical connections
//! are cached and reused until they close; every newly opened one goes back
//! through the driver, which asks the configured credential for a fresh
//! token at that point.

use kustoql_core::{
    Connection, ConnectionConfig, DatabaseDriver, KustoqlError, Result, TokenCredential,
};
use kustoql_drivers::DriverRegistry;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handle encapsulating driver, connection configuration, and a cached
/// connection
pub struct Engine {
    driver: Arc<dyn DatabaseDriver>,
    config: ConnectionConfig,
    connection: Mutex<Option<Arc<dyn Connection>>>,
}

impl Engine {
    /// Create an engine from an explicit driver and configuration
    pub fn new(driver: Arc<dyn DatabaseDriver>, config: ConnectionConfig) -> Self {
        Self {
            driver,
            config,
            connection: Mutex::new(None),
        }
    }

    /// Create an engine by resolving the configuration's driver id in a
    /// registry
    pub fn with_registry(registry: &DriverRegistry, config: ConnectionConfig) -> Result<Self> {
        let driver = registry
            .get(&config.driver)
            .ok_or_else(|| KustoqlError::NotFound(format!("Unknown driver: {}", config.driver)))?;
        Ok(Self::new(driver, config))
    }

    /// Create an engine from a connection URL
    ///
    /// The URL scheme is resolved through the default registry, then the
    /// resolved driver parses the rest of the URL.
    pub fn from_url(url: &str, credential: Arc<dyn TokenCredential>) -> Result<Self> {
        let registry = DriverRegistry::with_defaults();
        let driver = registry.driver_for_url(url).ok_or_else(|| {
            KustoqlError::NotFound(format!("no driver registered for URL '{}'", url))
        })?;
        let config = driver
            .parse_connection_string(url)?
            .with_credential(credential);
        Ok(Self::new(driver, config))
    }

    /// The driver backing this engine
    pub fn driver(&self) -> &Arc<dyn DatabaseDriver> {
        &self.driver
    }

    /// The engine's connection configuration
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The database this engine targets
    pub fn database(&self) -> Option<&str> {
        self.config.database.as_deref()
    }

    /// The connection string this engine connects with, for diagnostics
    pub fn connection_string(&self) -> String {
        self.driver.build_connection_string(&self.config)
    }

    /// Get a connection, reusing the cached one while it is alive
    ///
    /// Opening a new physical connection re-fetches a token from the
    /// configured credential; a credential failure surfaces here unchanged.
    #[tracing::instrument(skip(self), fields(driver = %self.config.driver, host = %self.config.host))]
    pub async fn acquire(&self) -> Result<Arc<dyn Connection>> {
        let mut cached = self.connection.lock().await;

        if let Some(conn) = cached.as_ref() {
            if !conn.is_closed() {
                return Ok(conn.clone());
            }
            tracing::debug!("cached connection is closed, reconnecting");
        }

        let conn = self.driver.connect(&self.config).await?;
        *cached = Some(conn.clone());
        Ok(conn)
    }

    /// Open a new physical connection, bypassing the cache
    pub async fn connect(&self) -> Result<Arc<dyn Connection>> {
        self.driver.connect(&self.config).await
    }

    /// Close the cached connection, if any
    pub async fn close(&self) -> Result<()> {
        let mut cached = self.connection.lock().await;
        if let Some(conn) = cached.take() {
            conn.close().await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("driver", &self.config.driver)
            .field("host", &self.config.host)
            .field("database", &self.config.database)
            .finish()
    }
}

/// Build an engine for a Kusto cluster/database pair
///
/// `cluster` may be a bare cluster name or a fully qualified endpoint host.
/// The credential is attached to the configuration and consulted for a
/// fresh token whenever a physical connection is opened; nothing is
/// contacted here.
pub fn build_engine(
    cluster: &str,
    database: &str,
    credential: Arc<dyn TokenCredential>,
) -> Result<Engine> {
    let registry = DriverRegistry::with_defaults();
    let config = ConnectionConfig::new_kusto(cluster, database).with_credential(credential);
    Engine::with_registry(&registry, config)
}
