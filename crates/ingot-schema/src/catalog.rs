//! The catalog-source contract and the raw rows it yields.
//!
//! Reconstruction is split in two: a [`CatalogSource`] supplies plain rows
//! describing fields, constraints, and references (however it obtains them),
//! and the pure mapping logic in [`crate::table`] turns those rows into
//! entities. [`StaticCatalog`] is the in-memory implementation drivers
//! prefetch into; it doubles as the test collaborator.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One column as described by the database catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRow {
    /// Column name.
    pub name: String,
    /// Raw column type as reported, e.g. `int(10) unsigned`.
    pub raw_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Reported default value, if any.
    pub default: Option<String>,
    /// Extra flags, e.g. `auto_increment`.
    pub extra: String,
    /// Column comment; empty when unset.
    pub comment: String,
}

/// One index constraint as described by the database catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintRow {
    /// Constraint name; `PRIMARY` for the primary key.
    pub name: String,
    /// Constraint kind: `PRIMARY`, `UNIQUE`, or `INDEX`.
    pub kind: String,
    /// Comma-joined column list, in index order.
    pub columns: String,
}

/// One foreign key as described by the database catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRow {
    /// Constraint name.
    pub name: String,
    /// Comma-joined local column list.
    pub columns: String,
    /// Referenced table.
    pub target_table: String,
    /// Comma-joined referenced column list.
    pub target_columns: String,
    /// Reported ON UPDATE rule.
    pub on_update: String,
    /// Reported ON DELETE rule.
    pub on_delete: String,
}

/// Supplies catalog metadata for schema reconstruction.
///
/// Calls are blocking from the engine's point of view; failures propagate
/// unmodified inside [`crate::SchemaError::Source`]. The engine is agnostic
/// to how the rows are obtained.
pub trait CatalogSource: std::fmt::Debug {
    /// Names of the tables present in `db`.
    fn table_names(&self, db: &str) -> Result<Vec<String>>;

    /// Whether `table` exists in `db`.
    fn has_table(&self, db: &str, table: &str) -> Result<bool> {
        Ok(self.table_names(db)?.iter().any(|name| name == table))
    }

    /// Per-column rows for `table`.
    fn fields(&self, db: &str, table: &str) -> Result<Vec<FieldRow>>;

    /// Per-constraint rows for `table`.
    fn constraints(&self, db: &str, table: &str) -> Result<Vec<ConstraintRow>>;

    /// Per-foreign-key rows for `table`.
    fn references(&self, db: &str, table: &str) -> Result<Vec<ReferenceRow>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TableRows {
    fields: Vec<FieldRow>,
    constraints: Vec<ConstraintRow>,
    references: Vec<ReferenceRow>,
}

/// An in-memory catalog snapshot keyed by database and table name.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tables: IndexMap<(String, String), TableRows>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the rows of one table, replacing any previous entry.
    pub fn insert_table(
        &mut self,
        db: &str,
        table: &str,
        fields: Vec<FieldRow>,
        constraints: Vec<ConstraintRow>,
        references: Vec<ReferenceRow>,
    ) {
        self.tables.insert(
            (db.to_string(), table.to_string()),
            TableRows {
                fields,
                constraints,
                references,
            },
        );
    }

    fn rows(&self, db: &str, table: &str) -> Option<&TableRows> {
        self.tables.get(&(db.to_string(), table.to_string()))
    }
}

impl CatalogSource for StaticCatalog {
    fn table_names(&self, db: &str) -> Result<Vec<String>> {
        Ok(self
            .tables
            .keys()
            .filter(|(catalog, _)| catalog == db)
            .map(|(_, table)| table.clone())
            .collect())
    }

    fn has_table(&self, db: &str, table: &str) -> Result<bool> {
        Ok(self.rows(db, table).is_some())
    }

    fn fields(&self, db: &str, table: &str) -> Result<Vec<FieldRow>> {
        Ok(self.rows(db, table).map(|rows| rows.fields.clone()).unwrap_or_default())
    }

    fn constraints(&self, db: &str, table: &str) -> Result<Vec<ConstraintRow>> {
        Ok(self
            .rows(db, table)
            .map(|rows| rows.constraints.clone())
            .unwrap_or_default())
    }

    fn references(&self, db: &str, table: &str) -> Result<Vec<ReferenceRow>> {
        Ok(self
            .rows(db, table)
            .map(|rows| rows.references.clone())
            .unwrap_or_default())
    }
}

static RAW_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+)(?:\(([^)]*)\))?\s*(.*)$").expect("raw type pattern is valid")
});

/// Splits a raw catalog type like `int(10) unsigned` into its base type,
/// parenthesized parameters (comma-split), and trailing option tokens. The
/// base type and options are upper-cased; parameters keep their spelling.
#[must_use]
pub fn parse_raw_type(raw: &str) -> (String, Vec<String>, Vec<String>) {
    let raw = raw.trim();
    let Some(captures) = RAW_TYPE_RE.captures(raw) else {
        return (raw.to_ascii_uppercase(), Vec::new(), Vec::new());
    };
    let base = captures[1].to_ascii_uppercase();
    let parameters = captures.get(2).map_or_else(Vec::new, |parameters| {
        parameters
            .as_str()
            .split(',')
            .map(|parameter| parameter.trim().to_string())
            .filter(|parameter| !parameter.is_empty())
            .collect()
    });
    let options = captures.get(3).map_or_else(Vec::new, |options| {
        options
            .as_str()
            .split_whitespace()
            .map(str::to_ascii_uppercase)
            .collect()
    });
    (base, parameters, options)
}

/// Splits a comma-joined catalog column list into trimmed names.
pub(crate) fn split_column_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|column| column.trim().to_string())
        .filter(|column| !column.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_type() {
        assert_eq!(parse_raw_type("datetime"), ("DATETIME".into(), vec![], vec![]));
    }

    #[test]
    fn parse_type_with_size() {
        let (base, parameters, options) = parse_raw_type("varchar(255)");
        assert_eq!(base, "VARCHAR");
        assert_eq!(parameters, vec!["255"]);
        assert!(options.is_empty());
    }

    #[test]
    fn parse_type_with_precision_and_scale() {
        let (base, parameters, options) = parse_raw_type("decimal(10,2)");
        assert_eq!(base, "DECIMAL");
        assert_eq!(parameters, vec!["10", "2"]);
        assert!(options.is_empty());
    }

    #[test]
    fn parse_type_with_trailing_options() {
        let (base, parameters, options) = parse_raw_type("int(10) unsigned zerofill");
        assert_eq!(base, "INT");
        assert_eq!(parameters, vec!["10"]);
        assert_eq!(options, vec!["UNSIGNED", "ZEROFILL"]);
    }

    #[test]
    fn parse_enum_keeps_quoted_parameters() {
        let (base, parameters, _) = parse_raw_type("enum('draft','published')");
        assert_eq!(base, "ENUM");
        assert_eq!(parameters, vec!["'draft'", "'published'"]);
    }

    #[test]
    fn split_column_list_trims_entries() {
        assert_eq!(split_column_list("a, b ,c"), vec!["a", "b", "c"]);
        assert!(split_column_list("").is_empty());
    }

    #[test]
    fn static_catalog_scopes_by_database() {
        let mut catalog = StaticCatalog::new();
        catalog.insert_table("app", "users", vec![], vec![], vec![]);
        catalog.insert_table("other", "logs", vec![], vec![], vec![]);

        assert_eq!(catalog.table_names("app").unwrap(), vec!["users"]);
        assert!(catalog.has_table("app", "users").unwrap());
        assert!(!catalog.has_table("app", "logs").unwrap());
    }
}
