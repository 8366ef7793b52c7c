//! Schema Module - Column type vocabulary and sample-based inference

pub mod inference;

pub use inference::infer_table_schema;

use serde::{Deserialize, Serialize};

/// Semantic column type, mapped independently by each storage binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Bounded string of at most the given length
    VarChar(u32),
    /// Unbounded free text
    Text,
    /// 64-bit integer
    BigInt,
    /// 32-bit integer
    Integer,
    /// Double-precision float
    Float,
    /// Date/time without timezone
    Timestamp,
}

/// A named, typed column as inferred from a sample.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub ty: ColumnType,
}
