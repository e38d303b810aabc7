//! Unit tests for the Kusto driver

use super::*;
use kustoql_core::{
    CallbackCredential, ConnectionConfig, DatabaseDriver, KustoqlError, StaticTokenCredential,
};
use std::sync::Arc;

#[test]
fn test_driver_identity() {
    let driver = KustoDriver::new();
    assert_eq!(driver.id(), "kusto");
    assert_eq!(driver.name(), "kusto");
    assert_eq!(driver.display_name(), "Azure Data Explorer");
    assert_eq!(driver.default_port(), Some(1433));
}

#[test]
fn test_driver_capabilities() {
    let driver = KustoDriver::new();
    let caps = driver.capabilities();

    assert!(!caps.supports_transactions);
    assert!(caps.supports_prepared_statements);
    assert!(!caps.supports_multiple_statements);
    assert!(caps.supports_window_functions);
    assert!(caps.supports_cte);
    assert!(!caps.supports_foreign_keys);
    assert!(!caps.supports_triggers);
    assert!(!caps.supports_offset_fetch);
    assert!(caps.supports_ssl);
    assert_eq!(caps.max_identifier_length, Some(128));
    assert_eq!(caps.max_parameters, Some(2100));
}

#[test]
fn test_dialect_info() {
    let driver = KustoDriver::new();
    let dialect = driver.dialect_info();

    assert_eq!(dialect.id.as_ref(), "kusto");
    assert_eq!(dialect.display_name.as_ref(), "Kusto T-SQL");
    assert_eq!(dialect.identifier_quote, '[');
    assert_eq!(dialect.string_quote, '\'');
    assert!(dialect.case_sensitive_identifiers);
    assert!(dialect.keyword_names().any(|k| k == "TOP"));
    assert!(dialect.is_aggregate_function("count"));
    assert!(dialect.data_type_names().any(|t| t == "nvarchar"));
}

#[test]
fn test_build_connection_string_names_host_and_database() {
    let driver = KustoDriver::new();
    let config = ConnectionConfig::new_kusto("mycluster", "Samples");

    let conn_str = driver.build_connection_string(&config);

    assert!(conn_str.contains("Server=tcp:mycluster.kusto.windows.net,1433"));
    assert!(conn_str.contains("Database=Samples"));
    assert!(conn_str.contains("Encrypt=True"));
    assert!(conn_str.contains("Autocommit=True"));
}

#[test]
fn test_build_connection_string_without_autocommit() {
    let driver = KustoDriver::new();
    let config = ConnectionConfig::new_kusto("c", "db").with_param("autocommit", "false");
    let conn_str = driver.build_connection_string(&config);
    assert!(!conn_str.contains("Autocommit=True"));
}

#[test]
fn test_parse_url_form() {
    let driver = KustoDriver::new();
    let config = driver
        .parse_connection_string("kusto://mycluster/Samples?autocommit=true")
        .unwrap();

    assert_eq!(config.driver, "kusto");
    assert_eq!(config.host, "mycluster.kusto.windows.net");
    assert_eq!(config.port, 1433);
    assert_eq!(config.database.as_deref(), Some("Samples"));
    assert!(config.autocommit());
}

#[test]
fn test_parse_url_rejects_other_schemes() {
    let driver = KustoDriver::new();
    let err = driver
        .parse_connection_string("mysql://host/db")
        .unwrap_err();
    assert!(matches!(err, KustoqlError::Configuration(_)));
}

#[test]
fn test_parse_url_requires_database() {
    let driver = KustoDriver::new();
    let err = driver.parse_connection_string("kusto://mycluster").unwrap_err();
    assert!(matches!(err, KustoqlError::Configuration(_)));
}

#[test]
fn test_parse_ado_string() {
    let driver = KustoDriver::new();
    let config = driver
        .parse_connection_string(
            "Server=tcp:mycluster.kusto.windows.net,1433;Database=Samples;Trusted_Connection=Yes",
        )
        .unwrap();

    assert_eq!(config.host, "mycluster.kusto.windows.net");
    assert_eq!(config.port, 1433);
    assert_eq!(config.database.as_deref(), Some("Samples"));
    // Integrated auth has no meaning here and must not leak into params.
    assert!(!config.params.contains_key("trusted_connection"));
}

#[test]
fn test_parse_ado_string_defaults_port() {
    let driver = KustoDriver::new();
    let config = driver
        .parse_connection_string("Server=mycluster.kusto.windows.net;Database=db")
        .unwrap();
    assert_eq!(config.port, 1433);
}

#[test]
fn test_parse_ado_string_missing_database() {
    let driver = KustoDriver::new();
    let err = driver
        .parse_connection_string("Server=mycluster.kusto.windows.net")
        .unwrap_err();
    assert!(matches!(err, KustoqlError::Configuration(_)));
}

#[tokio::test]
async fn test_connect_without_credential_fails() {
    let driver = KustoDriver::new();
    let config = ConnectionConfig::new_kusto("mycluster", "Samples");

    let err = driver.connect(&config).await.unwrap_err();
    assert!(matches!(err, KustoqlError::Credential(_)));
}

#[tokio::test]
async fn test_connect_propagates_credential_failure() {
    let driver = KustoDriver::new();
    let credential = Arc::new(CallbackCredential::new(|| {
        Err(KustoqlError::Credential("token issuer unreachable".into()))
    }));
    let config = ConnectionConfig::new_kusto("mycluster", "Samples").with_credential(credential);

    // The token is fetched before any network activity, so this fails fast
    // with the credential's own error rather than a connect timeout.
    let err = driver.connect(&config).await.unwrap_err();
    assert!(matches!(err, KustoqlError::Credential(_)));
    assert!(err.to_string().contains("token issuer unreachable"));
}

#[tokio::test]
async fn test_connect_requires_host() {
    let driver = KustoDriver::new();
    let mut config = ConnectionConfig::new("kusto", "no-host");
    config.database = Some("db".to_string());
    config.credential = Some(Arc::new(StaticTokenCredential::new("tok")));

    let err = driver.connect(&config).await.unwrap_err();
    assert!(matches!(err, KustoqlError::Configuration(_)));
}
