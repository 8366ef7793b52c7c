//! Schema Inference - Name-based overrides first, then statistical dtype sniffing

use crate::schema::{ColumnSpec, ColumnType};
use polars::prelude::*;

/// Column names whose type is fixed regardless of sampled content.
///
/// Consulted before any statistical sniffing: a column named here keeps its
/// declared type even when every sampled value would sniff differently.
const NAME_OVERRIDES: &[(&str, ColumnType)] = &[
    ("phone_number", ColumnType::VarChar(150)),
    ("whatsapp_number", ColumnType::VarChar(150)),
    ("alternate_phone_number", ColumnType::VarChar(150)),
    ("created_at_epoch", ColumnType::BigInt),
    ("updated_at_epoch", ColumnType::BigInt),
    ("comment", ColumnType::Text),
    ("latest_comment", ColumnType::Text),
    ("metadata", ColumnType::Text),
];

/// Infer one `ColumnSpec` per column of `sample`, in input column order.
///
/// Inference is a one-shot decision over the sample; later batches of the
/// same file are assumed to be consistent with it.
pub fn infer_table_schema(sample: &DataFrame) -> Vec<ColumnSpec> {
    sample
        .get_columns()
        .iter()
        .map(|series| ColumnSpec {
            name: series.name().to_string(),
            ty: name_override(series.name()).unwrap_or_else(|| sniff_column(series)),
        })
        .collect()
}

fn name_override(name: &str) -> Option<ColumnType> {
    NAME_OVERRIDES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, ty)| *ty)
}

/// Statistical fallback: trust the sampled dtype, except that a column with
/// no observed values never qualifies for a typed column.
fn sniff_column(series: &Series) -> ColumnType {
    if series.null_count() == series.len() {
        return ColumnType::VarChar(255);
    }
    let dtype = series.dtype();
    if dtype.is_integer() {
        ColumnType::Integer
    } else if dtype.is_float() {
        ColumnType::Float
    } else if matches!(dtype, DataType::Date | DataType::Datetime(_, _)) {
        ColumnType::Timestamp
    } else {
        ColumnType::VarChar(255)
    }
}
