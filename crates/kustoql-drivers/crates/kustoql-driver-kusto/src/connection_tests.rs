//! Tests for the Kusto connection module

use crate::connection::{
    column_data_to_value, column_type_name, values_to_sql_params, KustoConnectionError, SqlParam,
};
use kustoql_core::{KustoqlError, Value};
use tiberius::{ColumnData, ColumnType};

// Value -> parameter conversion tests

#[test]
fn test_values_to_params_null() {
    let params = values_to_sql_params(&[Value::Null]);
    assert_eq!(params.len(), 1);
    assert!(matches!(params[0], SqlParam::Null));
}

#[test]
fn test_values_to_params_scalars() {
    let params = values_to_sql_params(&[
        Value::Bool(true),
        Value::Int16(7),
        Value::Int32(100_000),
        Value::Int64(9_999_999_999),
        Value::Float32(1.5),
        Value::Float64(std::f64::consts::PI),
    ]);
    assert_eq!(params.len(), 6);
    assert!(matches!(params[0], SqlParam::Bool(true)));
    assert!(matches!(params[3], SqlParam::I64(9_999_999_999)));
}

#[test]
fn test_values_to_params_strings_and_bytes() {
    let params = values_to_sql_params(&[
        Value::String("hello".to_string()),
        Value::Bytes(vec![0x01, 0x02]),
        Value::Decimal("123.456".to_string()),
    ]);
    assert!(matches!(params[0], SqlParam::String(_)));
    assert!(matches!(params[1], SqlParam::Bytes(_)));
    // Decimals travel as strings to keep precision.
    assert!(matches!(params[2], SqlParam::String(_)));
}

#[test]
fn test_values_to_params_uuid() {
    let id = uuid::Uuid::new_v4();
    let params = values_to_sql_params(&[Value::Uuid(id)]);
    assert!(matches!(params[0], SqlParam::Uuid(u) if u == id));
}

#[test]
fn test_values_to_params_temporal_as_strings() {
    let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let time = chrono::NaiveTime::from_hms_opt(14, 30, 0).unwrap();
    let params = values_to_sql_params(&[
        Value::Date(date),
        Value::Time(time),
        Value::DateTime(chrono::NaiveDateTime::new(date, time)),
        Value::Json(serde_json::json!({"k": 1})),
    ]);
    assert_eq!(params.len(), 4);
    for param in &params {
        assert!(matches!(param, SqlParam::String(_)));
    }
}

// ColumnData -> Value conversion tests

#[test]
fn test_column_data_null() {
    assert_eq!(column_data_to_value(ColumnData::I32(None)).unwrap(), Value::Null);
    assert_eq!(column_data_to_value(ColumnData::Bit(None)).unwrap(), Value::Null);
    assert_eq!(
        column_data_to_value(ColumnData::String(None)).unwrap(),
        Value::Null
    );
}

#[test]
fn test_column_data_scalars() {
    assert_eq!(
        column_data_to_value(ColumnData::I32(Some(42))).unwrap(),
        Value::Int32(42)
    );
    assert_eq!(
        column_data_to_value(ColumnData::I64(Some(1 << 40))).unwrap(),
        Value::Int64(1 << 40)
    );
    assert_eq!(
        column_data_to_value(ColumnData::Bit(Some(true))).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        column_data_to_value(ColumnData::F64(Some(2.5))).unwrap(),
        Value::Float64(2.5)
    );
}

#[test]
fn test_column_data_tinyint_widens() {
    assert_eq!(
        column_data_to_value(ColumnData::U8(Some(255))).unwrap(),
        Value::Int16(255)
    );
}

#[test]
fn test_column_data_string() {
    let value =
        column_data_to_value(ColumnData::String(Some(std::borrow::Cow::Owned("hi".into()))))
            .unwrap();
    assert_eq!(value, Value::String("hi".to_string()));
}

#[test]
fn test_column_data_guid() {
    let id = uuid::Uuid::new_v4();
    assert_eq!(
        column_data_to_value(ColumnData::Guid(Some(id))).unwrap(),
        Value::Uuid(id)
    );
}

// Column type naming tests

#[test]
fn test_column_type_names_core_types() {
    assert_eq!(column_type_name(ColumnType::Int4), "int");
    assert_eq!(column_type_name(ColumnType::Int8), "bigint");
    assert_eq!(column_type_name(ColumnType::Float4), "real");
    assert_eq!(column_type_name(ColumnType::NVarchar), "nvarchar");
    assert_eq!(column_type_name(ColumnType::Datetime2), "datetime2");
    assert_eq!(column_type_name(ColumnType::Guid), "uniqueidentifier");
    assert_eq!(column_type_name(ColumnType::Bitn), "bit");
    assert_eq!(column_type_name(ColumnType::Decimaln), "decimal");
    assert_eq!(column_type_name(ColumnType::BigVarBin), "varbinary");
}

// SqlParam ToSql tests

#[test]
fn test_sql_param_to_sql_round_trip() {
    use tiberius::ToSql;

    assert!(matches!(SqlParam::Null.to_sql(), ColumnData::I32(None)));
    assert!(matches!(
        SqlParam::Bool(true).to_sql(),
        ColumnData::Bit(Some(true))
    ));
    assert!(matches!(
        SqlParam::I64(5).to_sql(),
        ColumnData::I64(Some(5))
    ));
    assert!(matches!(
        SqlParam::String("x".to_string()).to_sql(),
        ColumnData::String(Some(_))
    ));
    assert!(matches!(
        SqlParam::Bytes(vec![1]).to_sql(),
        ColumnData::Binary(Some(_))
    ));
}

// Error conversion tests

#[test]
fn test_connection_error_conversion() {
    let err = KustoConnectionError::ConnectionClosed;
    let core_err: KustoqlError = err.into();
    assert!(matches!(core_err, KustoqlError::Driver(_)));
}

#[test]
fn test_connection_error_display() {
    let err = KustoConnectionError::ConnectionFailed("refused".to_string());
    assert!(err.to_string().contains("Connection failed"));

    let err = KustoConnectionError::AuthenticationFailed("bad token".to_string());
    assert!(err.to_string().contains("Authentication failed"));

    let err = KustoConnectionError::QueryFailed("syntax".to_string());
    assert!(err.to_string().contains("Query execution failed"));

    let err = KustoConnectionError::ConnectionClosed;
    assert!(err.to_string().contains("closed"));
}
