//! The closed catalog of MySQL column types.
//!
//! Column construction validates its type string against the union of these
//! three catalogs, case-insensitively. The catalogs are intentionally closed:
//! a type outside them fails with an out-of-range error at construction time.

/// String and binary column types.
pub const STRING_TYPES: &[&str] = &[
    "CHAR",
    "VARCHAR",
    "BINARY",
    "VARBINARY",
    "TINYBLOB",
    "BLOB",
    "MEDIUMBLOB",
    "LONGBLOB",
    "TINYTEXT",
    "TEXT",
    "MEDIUMTEXT",
    "LONGTEXT",
    "ENUM",
    "SET",
];

/// Numeric column types.
pub const NUMERIC_TYPES: &[&str] = &[
    "BIT",
    "TINYINT",
    "BOOL",
    "BOOLEAN",
    "SMALLINT",
    "MEDIUMINT",
    "INT",
    "INTEGER",
    "BIGINT",
    "DECIMAL",
    "DEC",
    "NUMERIC",
    "FLOAT",
    "DOUBLE",
    "REAL",
];

/// Date and time column types.
pub const DATETIME_TYPES: &[&str] = &["DATE", "DATETIME", "TIMESTAMP", "TIME", "YEAR"];

/// Returns the canonical (upper-case) catalog entry matching `ty`, compared
/// after trimming and ignoring case. `None` if the type is not in the
/// catalog.
#[must_use]
pub fn lookup_type(ty: &str) -> Option<&'static str> {
    let needle = ty.trim();
    STRING_TYPES
        .iter()
        .chain(NUMERIC_TYPES.iter())
        .chain(DATETIME_TYPES.iter())
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(needle))
}

/// Whether `ty` is a member of the type catalog.
#[must_use]
pub fn is_valid_type(ty: &str) -> bool {
    lookup_type(ty).is_some()
}
