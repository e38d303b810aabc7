//! Driver registry for managing available database drivers
//!
//! Registration is an explicit call, never an import side effect, and is
//! idempotent: registering a driver under an id it already holds replaces
//! the entry.

use std::collections::HashMap;
use std::sync::Arc;
use kustoql_core::{DatabaseDriver, DialectInfo};

/// Registry of available database drivers
///
/// Connection URLs resolve through the registry by scheme: a URL
/// `kusto://cluster/db` routes to whichever driver is registered under the
/// id `kusto`.
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn DatabaseDriver>>,
}

impl DriverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// Create a registry with all built-in drivers registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        #[cfg(feature = "kusto")]
        registry.register(Arc::new(crate::kusto::KustoDriver::new()));

        registry
    }

    /// Register a driver under its id, replacing any previous registration
    pub fn register(&mut self, driver: Arc<dyn DatabaseDriver>) {
        let id = driver.id().to_string();
        tracing::info!(driver = %id, "registering database driver");
        self.drivers.insert(id, driver);
    }

    /// Get a driver by id
    pub fn get(&self, id: &str) -> Option<Arc<dyn DatabaseDriver>> {
        let driver = self.drivers.get(id).cloned();
        if driver.is_none() {
            tracing::warn!(driver = %id, "driver not found in registry");
        }
        driver
    }

    /// Resolve a connection URL to the driver registered for its scheme
    pub fn driver_for_url(&self, url: &str) -> Option<Arc<dyn DatabaseDriver>> {
        let scheme = url.split_once("://").map(|(scheme, _)| scheme)?;
        self.get(scheme)
    }

    /// List all registered driver ids
    pub fn list(&self) -> Vec<&str> {
        self.drivers.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a driver is registered
    pub fn has(&self, id: &str) -> bool {
        self.drivers.contains_key(id)
    }

    /// Get dialect info for a driver by id
    pub fn dialect_info(&self, id: &str) -> Option<DialectInfo> {
        self.drivers.get(id).map(|driver| driver.dialect_info())
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.drivers.keys().collect::<Vec<_>>())
            .finish()
    }
}
