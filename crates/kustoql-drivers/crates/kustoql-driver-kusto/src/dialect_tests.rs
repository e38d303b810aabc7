//! Tests for the Kusto dialect helpers

use crate::dialect::KustoDialect;
use kustoql_core::KustoqlError;

#[test]
fn test_quote_identifier() {
    let dialect = KustoDialect::new();
    assert_eq!(dialect.quote_identifier("StormEvents"), "[StormEvents]");
    assert_eq!(dialect.quote_identifier("odd]name"), "[odd]]name]");
}

#[test]
fn test_quote_string() {
    let dialect = KustoDialect::new();
    assert_eq!(dialect.quote_string("hello"), "'hello'");
    assert_eq!(dialect.quote_string("it's"), "'it''s'");
}

#[test]
fn test_qualified_table_defaults_to_dbo() {
    let dialect = KustoDialect::new();
    assert_eq!(
        dialect.qualified_table(None, "StormEvents"),
        "[dbo].[StormEvents]"
    );
    assert_eq!(
        dialect.qualified_table(Some("other"), "T"),
        "[other].[T]"
    );
}

#[test]
fn test_limit_clause_is_top_only() {
    let dialect = KustoDialect::new();
    assert_eq!(dialect.limit_clause(10), "TOP 10");
    assert_eq!(dialect.limit_clause(0), "TOP 0");
}

#[test]
fn test_offset_is_rejected() {
    let dialect = KustoDialect::new();
    assert!(dialect.check_offset(None).is_ok());
    assert!(dialect.check_offset(Some(0)).is_ok());
    let err = dialect.check_offset(Some(20)).unwrap_err();
    assert!(matches!(err, KustoqlError::NotSupported(_)));
}

#[test]
fn test_dialect_info_round_trip() {
    let dialect = KustoDialect::new();
    let info = dialect.dialect_info();
    assert_eq!(info.id.as_ref(), "kusto");
    assert_eq!(info.identifier_quote, '[');
}
