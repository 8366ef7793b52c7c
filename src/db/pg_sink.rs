//! Postgres sink - Maps column specs to DDL and appends batches as batched INSERTs

use crate::error::{LoadError, Result};
use crate::ingest::loader::TableSink;
use crate::schema::{ColumnSpec, ColumnType};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Postgres caps one statement at 65,535 bind parameters; a 15,000-row batch
/// with more than four columns has to be split across statements.
const PG_BIND_LIMIT: usize = 65_535;

/// Appends row batches to Postgres tables, creating each table on first use.
pub struct PgSink {
    pool: PgPool,
}

/// One cell, parsed into the sqlx bind type its column declares.
#[derive(Debug)]
enum SqlValue {
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Timestamp(Option<NaiveDateTime>),
}

impl PgSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn ddl_type(ty: &ColumnType) -> String {
        match ty {
            ColumnType::VarChar(n) => format!("VARCHAR({})", n),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::Float => "DOUBLE PRECISION".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
        }
    }

    async fn ensure_table(&self, table: &str, schema: &[ColumnSpec]) -> Result<()> {
        let columns = schema
            .iter()
            .map(|c| format!("\"{}\" {}", c.name, Self::ddl_type(&c.ty)))
            .collect::<Vec<_>>()
            .join(", ");
        let ddl = format!("CREATE TABLE IF NOT EXISTS \"{}\" ({})", table, columns);
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_rows(
        &self,
        table: &str,
        schema: &[ColumnSpec],
        rows: &[Vec<SqlValue>],
    ) -> Result<()> {
        let column_list = schema
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO \"{}\" ({}) ", table, column_list));
        builder.push_values(rows.iter(), |mut b, row| {
            for cell in row {
                match cell {
                    SqlValue::Int(v) => {
                        b.push_bind(*v);
                    }
                    SqlValue::Float(v) => {
                        b.push_bind(*v);
                    }
                    SqlValue::Text(v) => {
                        b.push_bind(v.clone());
                    }
                    SqlValue::Timestamp(v) => {
                        b.push_bind(*v);
                    }
                }
            }
        });
        builder.build().execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TableSink for PgSink {
    async fn append_batch(
        &self,
        table: &str,
        schema: &[ColumnSpec],
        batch: &DataFrame,
    ) -> Result<()> {
        if batch.height() == 0 {
            return Ok(());
        }
        self.ensure_table(table, schema).await?;

        let rows = extract_rows(schema, batch)?;
        let rows_per_stmt = (PG_BIND_LIMIT / schema.len().max(1)).max(1);
        for stmt_rows in rows.chunks(rows_per_stmt) {
            self.insert_rows(table, schema, stmt_rows).await?;
        }
        Ok(())
    }
}

fn extract_rows(schema: &[ColumnSpec], batch: &DataFrame) -> Result<Vec<Vec<SqlValue>>> {
    let columns = batch.get_columns();
    let mut rows = Vec::with_capacity(batch.height());
    for row_idx in 0..batch.height() {
        let mut row = Vec::with_capacity(schema.len());
        for (spec, series) in schema.iter().zip(columns.iter()) {
            row.push(cell_value(spec, series.get(row_idx)?)?);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Parse one cell into the bind type its column declares.
///
/// Name-overridden columns can carry values sniffed to another dtype (a
/// phone number column sampled as all-integer, an epoch column read as
/// text), so numeric targets accept numeric strings and string targets
/// render any scalar.
fn cell_value(spec: &ColumnSpec, value: AnyValue) -> Result<SqlValue> {
    if matches!(value, AnyValue::Null) {
        return Ok(match spec.ty {
            ColumnType::BigInt | ColumnType::Integer => SqlValue::Int(None),
            ColumnType::Float => SqlValue::Float(None),
            ColumnType::Timestamp => SqlValue::Timestamp(None),
            ColumnType::VarChar(_) | ColumnType::Text => SqlValue::Text(None),
        });
    }

    match spec.ty {
        ColumnType::BigInt | ColumnType::Integer => {
            let parsed = match value {
                AnyValue::String(s) => s.trim().parse::<i64>().ok(),
                AnyValue::StringOwned(ref s) => s.trim().parse::<i64>().ok(),
                ref other => other.try_extract::<i64>().ok(),
            };
            parsed
                .map(|v| SqlValue::Int(Some(v)))
                .ok_or_else(|| conversion_err(spec, "integer"))
        }
        ColumnType::Float => {
            let parsed = match value {
                AnyValue::String(s) => s.trim().parse::<f64>().ok(),
                AnyValue::StringOwned(ref s) => s.trim().parse::<f64>().ok(),
                ref other => other.try_extract::<f64>().ok(),
            };
            parsed
                .map(|v| SqlValue::Float(Some(v)))
                .ok_or_else(|| conversion_err(spec, "float"))
        }
        ColumnType::Timestamp => match value {
            AnyValue::Datetime(v, unit, _) => timestamp_from_units(v, unit)
                .map(|t| SqlValue::Timestamp(Some(t)))
                .ok_or_else(|| conversion_err(spec, "timestamp")),
            AnyValue::Date(days) => timestamp_from_units(days as i64 * 86_400_000, TimeUnit::Milliseconds)
                .map(|t| SqlValue::Timestamp(Some(t)))
                .ok_or_else(|| conversion_err(spec, "timestamp")),
            _ => Err(conversion_err(spec, "timestamp")),
        },
        ColumnType::VarChar(_) | ColumnType::Text => {
            let rendered = match value {
                AnyValue::String(s) => s.to_string(),
                AnyValue::StringOwned(s) => s.to_string(),
                other => other.to_string(),
            };
            Ok(SqlValue::Text(Some(rendered)))
        }
    }
}

fn timestamp_from_units(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Nanoseconds => DateTime::from_timestamp(
            value.div_euclid(1_000_000_000),
            value.rem_euclid(1_000_000_000) as u32,
        )?,
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value)?,
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value)?,
    };
    Some(dt.naive_utc())
}

fn conversion_err(spec: &ColumnSpec, wanted: &str) -> LoadError {
    LoadError::Conversion(format!(
        "column '{}' has a value that cannot be represented as {}",
        spec.name, wanted
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_types_cover_the_vocabulary() {
        assert_eq!(PgSink::ddl_type(&ColumnType::VarChar(150)), "VARCHAR(150)");
        assert_eq!(PgSink::ddl_type(&ColumnType::VarChar(255)), "VARCHAR(255)");
        assert_eq!(PgSink::ddl_type(&ColumnType::Text), "TEXT");
        assert_eq!(PgSink::ddl_type(&ColumnType::BigInt), "BIGINT");
        assert_eq!(PgSink::ddl_type(&ColumnType::Integer), "INTEGER");
        assert_eq!(PgSink::ddl_type(&ColumnType::Float), "DOUBLE PRECISION");
        assert_eq!(PgSink::ddl_type(&ColumnType::Timestamp), "TIMESTAMP");
    }

    #[test]
    fn numeric_cell_renders_as_text_for_overridden_columns() {
        let spec = ColumnSpec {
            name: "phone_number".to_string(),
            ty: ColumnType::VarChar(150),
        };
        let cell = cell_value(&spec, AnyValue::Int64(9876543210)).unwrap();
        match cell {
            SqlValue::Text(Some(s)) => assert_eq!(s, "9876543210"),
            _ => panic!("expected text cell"),
        }
    }

    #[test]
    fn numeric_string_parses_into_bigint_column() {
        let spec = ColumnSpec {
            name: "created_at_epoch".to_string(),
            ty: ColumnType::BigInt,
        };
        let cell = cell_value(&spec, AnyValue::String(" 1700000000 ")).unwrap();
        match cell {
            SqlValue::Int(Some(v)) => assert_eq!(v, 1_700_000_000),
            _ => panic!("expected integer cell"),
        }
    }

    #[test]
    fn garbage_string_in_bigint_column_is_a_conversion_error() {
        let spec = ColumnSpec {
            name: "created_at_epoch".to_string(),
            ty: ColumnType::BigInt,
        };
        let err = cell_value(&spec, AnyValue::String("soon")).unwrap_err();
        assert!(matches!(err, LoadError::Conversion(_)));
    }

    #[test]
    fn null_cells_bind_as_typed_nulls() {
        let spec = ColumnSpec {
            name: "amount".to_string(),
            ty: ColumnType::Float,
        };
        assert!(matches!(
            cell_value(&spec, AnyValue::Null).unwrap(),
            SqlValue::Float(None)
        ));
    }

    #[test]
    fn datetime_cell_converts_to_naive_timestamp() {
        let spec = ColumnSpec {
            name: "seen_at".to_string(),
            ty: ColumnType::Timestamp,
        };
        let cell = cell_value(
            &spec,
            AnyValue::Datetime(1_600_000_000_000, TimeUnit::Milliseconds, &None),
        )
        .unwrap();
        match cell {
            SqlValue::Timestamp(Some(t)) => {
                assert_eq!(t.and_utc().timestamp(), 1_600_000_000);
            }
            _ => panic!("expected timestamp cell"),
        }
    }
}
