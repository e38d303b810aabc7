//! Query execution into Arrow record batches
//!
//! The entire result set is materialized: one column per selected
//! expression with its name taken from the result metadata, one row per
//! result row. Zero-row results keep their schema.

use crate::engine::Engine;
use crate::table::Query;
use arrow_array::builder::{
    BinaryBuilder, BooleanBuilder, Date32Builder, Float32Builder, Float64Builder, Int16Builder,
    Int32Builder, Int64Builder, StringBuilder, Time64MicrosecondBuilder,
    TimestampMicrosecondBuilder,
};
use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{DataType, Field, Schema, TimeUnit};
use chrono::Timelike;
use kustoql_core::{ColumnMeta, KustoqlError, QueryResult, Result, Row, Value};
use std::sync::Arc;

/// Execute a query on the engine and materialize the full result set
#[tracing::instrument(skip(query, engine), fields(sql = %query.sql))]
pub async fn run_query(query: &Query, engine: &Engine) -> Result<RecordBatch> {
    let conn = engine.acquire().await?;
    let result = conn.query(&query.sql, &query.params).await?;
    tracing::debug!(
        rows = result.row_count(),
        columns = result.column_count(),
        "materializing result set"
    );
    to_record_batch(&result)
}

/// Arrow type for an engine-reported SQL type name
pub fn arrow_type_for(sql_type: &str) -> DataType {
    match sql_type.to_ascii_lowercase().as_str() {
        "bit" => DataType::Boolean,
        "tinyint" | "smallint" => DataType::Int16,
        "int" => DataType::Int32,
        "bigint" => DataType::Int64,
        "real" => DataType::Float32,
        "float" => DataType::Float64,
        "date" => DataType::Date32,
        "time" => DataType::Time64(TimeUnit::Microsecond),
        "datetime" | "datetime2" | "smalldatetime" | "datetimeoffset" => {
            DataType::Timestamp(TimeUnit::Microsecond, None)
        }
        "varbinary" | "binary" | "image" => DataType::Binary,
        // Decimals stay textual to keep precision; GUIDs, JSON, and any
        // unrecognized type come through as their string rendering.
        _ => DataType::Utf8,
    }
}

/// Arrow schema for a result's column metadata
pub fn schema_for(columns: &[ColumnMeta]) -> Schema {
    Schema::new(
        columns
            .iter()
            .map(|col| Field::new(col.name.clone(), arrow_type_for(&col.data_type), true))
            .collect::<Vec<_>>(),
    )
}

/// Convert a query result into a single Arrow record batch
pub fn to_record_batch(result: &QueryResult) -> Result<RecordBatch> {
    if result.columns.is_empty() {
        return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
    }

    let schema = Arc::new(schema_for(&result.columns));

    let arrays = result
        .columns
        .iter()
        .enumerate()
        .map(|(idx, col)| build_column(col, idx, &result.rows))
        .collect::<Result<Vec<_>>>()?;

    RecordBatch::try_new(schema, arrays)
        .map_err(|e| KustoqlError::Query(format!("failed to assemble record batch: {}", e)))
}

fn build_column(meta: &ColumnMeta, idx: usize, rows: &[Row]) -> Result<ArrayRef> {
    let values = rows.iter().map(|row| row.get(idx));

    let array: ArrayRef = match arrow_type_for(&meta.data_type) {
        DataType::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(rows.len());
            for value in values {
                match value {
                    Some(Value::Bool(v)) => builder.append_value(*v),
                    Some(Value::Null) | None => builder.append_null(),
                    Some(other) => return Err(type_mismatch(meta, other)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Int16 => {
            let mut builder = Int16Builder::with_capacity(rows.len());
            for value in values {
                match value {
                    Some(Value::Int16(v)) => builder.append_value(*v),
                    Some(Value::Null) | None => builder.append_null(),
                    Some(other) => return Err(type_mismatch(meta, other)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Int32 => {
            let mut builder = Int32Builder::with_capacity(rows.len());
            for value in values {
                match value {
                    Some(Value::Int32(v)) => builder.append_value(*v),
                    Some(Value::Int16(v)) => builder.append_value(*v as i32),
                    Some(Value::Null) | None => builder.append_null(),
                    Some(other) => return Err(type_mismatch(meta, other)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Int64 => {
            let mut builder = Int64Builder::with_capacity(rows.len());
            for value in values {
                match value {
                    Some(v @ (Value::Int16(_) | Value::Int32(_) | Value::Int64(_))) => {
                        builder.append_value(v.as_i64().unwrap_or_default())
                    }
                    Some(Value::Null) | None => builder.append_null(),
                    Some(other) => return Err(type_mismatch(meta, other)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Float32 => {
            let mut builder = Float32Builder::with_capacity(rows.len());
            for value in values {
                match value {
                    Some(Value::Float32(v)) => builder.append_value(*v),
                    Some(Value::Null) | None => builder.append_null(),
                    Some(other) => return Err(type_mismatch(meta, other)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Float64 => {
            let mut builder = Float64Builder::with_capacity(rows.len());
            for value in values {
                match value {
                    Some(v @ (Value::Float32(_) | Value::Float64(_))) => {
                        builder.append_value(v.as_f64().unwrap_or_default())
                    }
                    Some(Value::Null) | None => builder.append_null(),
                    Some(other) => return Err(type_mismatch(meta, other)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Date32 => {
            let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
            let mut builder = Date32Builder::with_capacity(rows.len());
            for value in values {
                match value {
                    Some(Value::Date(d)) => {
                        builder.append_value((*d - epoch).num_days() as i32)
                    }
                    Some(Value::Null) | None => builder.append_null(),
                    Some(other) => return Err(type_mismatch(meta, other)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Time64(TimeUnit::Microsecond) => {
            let mut builder = Time64MicrosecondBuilder::with_capacity(rows.len());
            for value in values {
                match value {
                    Some(Value::Time(t)) => {
                        let micros = t.num_seconds_from_midnight() as i64 * 1_000_000
                            + (t.nanosecond() / 1_000) as i64;
                        builder.append_value(micros);
                    }
                    Some(Value::Null) | None => builder.append_null(),
                    Some(other) => return Err(type_mismatch(meta, other)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let mut builder = TimestampMicrosecondBuilder::with_capacity(rows.len());
            for value in values {
                match value {
                    Some(Value::DateTime(dt)) => {
                        builder.append_value(dt.and_utc().timestamp_micros())
                    }
                    Some(Value::DateTimeUtc(dt)) => builder.append_value(dt.timestamp_micros()),
                    Some(Value::Null) | None => builder.append_null(),
                    Some(other) => return Err(type_mismatch(meta, other)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Binary => {
            let mut builder = BinaryBuilder::new();
            for value in values {
                match value {
                    Some(Value::Bytes(b)) => builder.append_value(b),
                    Some(Value::Null) | None => builder.append_null(),
                    Some(other) => return Err(type_mismatch(meta, other)),
                }
            }
            Arc::new(builder.finish())
        }
        _ => {
            let mut builder = StringBuilder::new();
            for value in values {
                match value {
                    Some(Value::Null) | None => builder.append_null(),
                    Some(Value::String(s)) => builder.append_value(s),
                    Some(Value::Decimal(d)) => builder.append_value(d),
                    Some(other) => builder.append_value(other.to_string()),
                }
            }
            Arc::new(builder.finish())
        }
    };

    Ok(array)
}

fn type_mismatch(meta: &ColumnMeta, value: &Value) -> KustoqlError {
    KustoqlError::Query(format!(
        "column '{}' reported as '{}' but carried an incompatible value {:?}",
        meta.name, meta.data_type, value
    ))
}
