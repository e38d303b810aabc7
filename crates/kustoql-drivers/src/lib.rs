//! kustoql drivers - database driver implementations
//!
//! This crate provides the concrete drivers implementing the traits defined
//! in `kustoql-core`, the registry that routes connection URLs to them, and
//! a shared runtime for synchronous callers.

#[cfg(feature = "kusto")]
pub use kustoql_driver_kusto as kusto;

mod registry;
mod runtime;

pub use registry::DriverRegistry;
pub use runtime::{block_on_tokio, get_tokio_runtime};

/// Re-export commonly used types from kustoql-core
pub use kustoql_core::{
    AccessToken, ColumnMeta, Connection, ConnectionConfig, DatabaseDriver, DriverCapabilities,
    KustoqlError, QueryResult, Result, Row, SchemaIntrospection, TokenCredential, Value,
};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FakeDriver {
        id: &'static str,
    }

    #[async_trait]
    impl DatabaseDriver for FakeDriver {
        fn name(&self) -> &'static str {
            self.id
        }

        fn capabilities(&self) -> DriverCapabilities {
            DriverCapabilities::default()
        }

        async fn connect(&self, _config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
            Err(KustoqlError::NotSupported("fake driver".into()))
        }

        async fn test_connection(&self, _config: &ConnectionConfig) -> Result<()> {
            Ok(())
        }

        fn build_connection_string(&self, _config: &ConnectionConfig) -> String {
            String::new()
        }
    }

    #[test]
    fn test_defaults_register_kusto() {
        let registry = DriverRegistry::with_defaults();
        assert!(registry.has("kusto"));
        assert!(registry.get("kusto").is_some());
    }

    #[test]
    fn test_url_scheme_resolves_to_registered_driver() {
        let registry = DriverRegistry::with_defaults();

        let driver = registry
            .driver_for_url("kusto://mycluster/Samples")
            .expect("kusto URL should resolve");
        assert_eq!(driver.id(), "kusto");

        assert!(registry.driver_for_url("postgres://host/db").is_none());
        assert!(registry.driver_for_url("not a url").is_none());
    }

    #[test]
    fn test_registration_is_idempotent() {
        let mut registry = DriverRegistry::new();
        registry.register(Arc::new(FakeDriver { id: "fake" }));
        registry.register(Arc::new(FakeDriver { id: "fake" }));

        assert_eq!(registry.list().len(), 1);
        assert!(registry.has("fake"));
    }

    #[test]
    fn test_custom_driver_claims_scheme() {
        let mut registry = DriverRegistry::with_defaults();
        registry.register(Arc::new(FakeDriver { id: "fake" }));

        let driver = registry.driver_for_url("fake://anything").unwrap();
        assert_eq!(driver.id(), "fake");
        // The kusto scheme still routes to the kusto driver.
        let driver = registry.driver_for_url("kusto://cluster/db").unwrap();
        assert_eq!(driver.id(), "kusto");
    }

    #[test]
    fn test_dialect_info_lookup() {
        let registry = DriverRegistry::with_defaults();
        let info = registry.dialect_info("kusto").unwrap();
        assert_eq!(info.id.as_ref(), "kusto");
        assert!(registry.dialect_info("missing").is_none());
    }
}
