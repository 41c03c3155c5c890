//! Maps a column's reported MySQL type name to the `TypedValue` kind its
//! cells decode into.

/// How the cells of one result column are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDecoding {
    Bool,
    Int,
    /// Unsigned integers, saturated into `i64`
    UnsignedInt,
    Float,
    Double,
    /// DATETIME / TIMESTAMP to UTC epoch milliseconds
    DateTime,
    /// DATE to UTC midnight epoch milliseconds
    Date,
    /// TIME rendered as text
    Time,
    Text,
    Binary,
    Null,
}

pub fn decoding_for(type_name: &str) -> ColumnDecoding {
    let name = type_name.trim().to_ascii_uppercase();

    if name.contains("BLOB") || name.contains("BINARY") {
        return ColumnDecoding::Binary;
    }

    match name.as_str() {
        "BOOLEAN" | "BOOL" => ColumnDecoding::Bool,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" | "YEAR" => {
            ColumnDecoding::Int
        }
        n if n.ends_with("UNSIGNED") => ColumnDecoding::UnsignedInt,
        "FLOAT" => ColumnDecoding::Float,
        "DOUBLE" | "REAL" => ColumnDecoding::Double,
        "DATETIME" | "TIMESTAMP" => ColumnDecoding::DateTime,
        "DATE" => ColumnDecoding::Date,
        "TIME" => ColumnDecoding::Time,
        "BIT" | "GEOMETRY" => ColumnDecoding::Binary,
        "NULL" => ColumnDecoding::Null,
        // DECIMAL, JSON, ENUM, SET and the character types
        _ => ColumnDecoding::Text,
    }
}

/// `u64` cells above `i64::MAX` clamp instead of wrapping.
pub fn saturate_unsigned(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}
