//! The top-level table registry, optionally backed by a catalog source.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::CatalogSource;
use crate::error::{Result, SchemaError};
use crate::lifecycle::Lifecycle;
use crate::table::Table;

/// A named schema (the catalog/database name) holding its tables.
///
/// A schema may be bound to a [`CatalogSource`]; [`get_table`](Self::get_table)
/// then reconstructs unseen tables from it on first access, and
/// [`from_source`](Self::from_source) reconstructs everything eagerly.
#[derive(Debug, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    tables: IndexMap<String, Table>,
    #[serde(skip)]
    source: Option<Box<dyn CatalogSource>>,
}

impl Schema {
    /// Creates an empty schema with no backing source.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: IndexMap::new(),
            source: None,
        }
    }

    /// Creates an empty schema bound to `source` for lazy reconstruction.
    #[must_use]
    pub fn with_source(name: impl Into<String>, source: Box<dyn CatalogSource>) -> Self {
        Self {
            name: name.into(),
            tables: IndexMap::new(),
            source: Some(source),
        }
    }

    /// Eagerly reconstructs every table `source` reports for `name`.
    ///
    /// # Errors
    ///
    /// Source failures propagate unmodified.
    pub fn from_source(name: impl Into<String>, source: Box<dyn CatalogSource>) -> Result<Self> {
        let name = name.into();
        let table_names = source.table_names(&name)?;
        info!(db = %name, tables = table_names.len(), "loading schema from catalog source");
        let mut tables = IndexMap::new();
        for table_name in table_names {
            let table = Table::read_from_existing(&name, &table_name, source.as_ref())?;
            tables.insert(table_name, table);
        }
        Ok(Self {
            name,
            tables,
            source: Some(source),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All registered tables in insertion order, deleted ones included.
    #[must_use]
    pub fn tables(&self) -> &IndexMap<String, Table> {
        &self.tables
    }

    /// Registers a pre-built table and returns a handle to it.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Duplicate`] if the name is taken.
    pub fn add_table(&mut self, table: Table) -> Result<&mut Table> {
        let name = table.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(SchemaError::Duplicate(format!(
                "table '{name}' already exists"
            )));
        }
        Ok(self.tables.entry(name).or_insert(table))
    }

    /// Creates, registers, and returns a fresh empty table.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Duplicate`] if the name is taken.
    pub fn create_table(&mut self, name: &str) -> Result<&mut Table> {
        self.add_table(Table::new(name))
    }

    /// Returns the named table.
    ///
    /// A cached table is returned as-is. Otherwise, when a source is bound,
    /// the table is reconstructed from it if it exists there, or created
    /// fresh and registered if the source reports it absent.
    ///
    /// # Errors
    ///
    /// [`SchemaError::OutOfRange`] when the table is unknown and no source
    /// is bound; source failures propagate unmodified.
    pub fn get_table(&mut self, name: &str) -> Result<&mut Table> {
        if !self.tables.contains_key(name) {
            let Some(source) = &self.source else {
                return Err(SchemaError::OutOfRange(format!("table '{name}' not found")));
            };
            let table = if source.has_table(&self.name, name)? {
                Table::read_from_existing(&self.name, name, source.as_ref())?
            } else {
                debug!(db = %self.name, table = name, "table absent on source, creating fresh");
                Table::new(name)
            };
            self.tables.insert(name.to_string(), table);
        }
        self.tables
            .get_mut(name)
            .ok_or_else(|| SchemaError::OutOfRange(format!("table '{name}' not found")))
    }

    /// Marks the named table deleted; it stays registered so that
    /// [`Table::migrate`] can synthesize its DROP statement.
    ///
    /// # Errors
    ///
    /// Propagates the [`get_table`](Self::get_table) lookup errors.
    pub fn delete_table(&mut self, name: &str) -> Result<&mut Self> {
        self.get_table(name)?.set_deleted(true);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldRow, StaticCatalog};

    fn one_table_source() -> Box<StaticCatalog> {
        let mut source = StaticCatalog::new();
        source.insert_table(
            "app",
            "users",
            vec![FieldRow {
                name: "id".into(),
                raw_type: "int".into(),
                nullable: false,
                default: None,
                extra: "auto_increment".into(),
                comment: String::new(),
            }],
            vec![],
            vec![],
        );
        Box::new(source)
    }

    #[test]
    fn add_table_rejects_duplicates() {
        let mut schema = Schema::new("app");
        schema.create_table("users").unwrap();
        assert!(matches!(
            schema.create_table("users"),
            Err(SchemaError::Duplicate(_))
        ));
    }

    #[test]
    fn get_table_without_source_fails_for_unknown() {
        let mut schema = Schema::new("app");
        assert!(matches!(
            schema.get_table("ghost"),
            Err(SchemaError::OutOfRange(_))
        ));
    }

    #[test]
    fn get_table_reconstructs_from_source() {
        let mut schema = Schema::with_source("app", one_table_source());
        let table = schema.get_table("users").unwrap();
        assert!(table.is_existing_on_db());
        assert!(table.column("id").unwrap().is_auto_increment());
    }

    #[test]
    fn get_table_creates_fresh_when_absent_on_source() {
        let mut schema = Schema::with_source("app", one_table_source());
        let table = schema.get_table("sessions").unwrap();
        assert!(!table.is_existing_on_db());
        assert!(table.columns().is_empty());
    }

    #[test]
    fn get_table_caches_reconstruction() {
        let mut schema = Schema::with_source("app", one_table_source());
        schema.get_table("users").unwrap().add_int_col("age").unwrap();
        assert!(schema.get_table("users").unwrap().column("age").is_some());
    }

    #[test]
    fn from_source_loads_everything_eagerly() {
        let schema = Schema::from_source("app", one_table_source()).unwrap();
        assert_eq!(schema.tables().len(), 1);
        assert!(schema.tables().contains_key("users"));
    }

    #[test]
    fn delete_table_marks_without_removing() {
        let mut schema = Schema::new("app");
        schema.create_table("users").unwrap().add_int_col("id").unwrap();
        schema.delete_table("users").unwrap();

        let table = schema.tables().get("users").unwrap();
        assert!(table.is_deleted());
        assert_eq!(schema.tables().len(), 1);
    }
}
