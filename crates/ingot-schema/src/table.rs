//! Tables: entity collections, validation, and DDL synthesis.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{self, CatalogSource};
use crate::column::Column;
use crate::error::{Result, SchemaError};
use crate::foreign_key::{ForeignKey, ReferenceAction};
use crate::index::{Index, IndexColumn, IndexType};
use crate::lifecycle::{Lifecycle, LifecycleState};

/// Collection key for an anonymous PRIMARY index.
const ANONYMOUS_INDEX: &str = "";

/// A table definition owning its columns, indexes, and foreign keys.
///
/// Entities marked deleted stay in their collections so that alter passes
/// can consume them; only the desired-state views (`show_create`) skip them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    comment: Option<String>,
    storage_engine: Option<String>,
    options: IndexMap<String, String>,
    columns: IndexMap<String, Column>,
    indexes: IndexMap<String, Index>,
    foreign_keys: IndexMap<String, ForeignKey>,
    state: LifecycleState,
}

impl Table {
    /// Creates an empty table not yet present on the database.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            storage_engine: None,
            options: IndexMap::new(),
            columns: IndexMap::new(),
            indexes: IndexMap::new(),
            foreign_keys: IndexMap::new(),
            state: LifecycleState::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<&str>) -> &mut Self {
        self.comment = comment.map(str::to_string);
        self.set_modified(true);
        self
    }

    #[must_use]
    pub fn storage_engine(&self) -> Option<&str> {
        self.storage_engine.as_deref()
    }

    pub fn set_storage_engine(&mut self, storage_engine: Option<&str>) -> &mut Self {
        self.storage_engine = storage_engine.map(str::to_string);
        self.set_modified(true);
        self
    }

    #[must_use]
    pub fn options(&self) -> &IndexMap<String, String> {
        &self.options
    }

    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.options.insert(name.into(), value.into());
        self.set_modified(true);
        self
    }

    // --- columns ----------------------------------------------------------

    /// Builds and adds a column from its parts.
    ///
    /// # Errors
    ///
    /// [`SchemaError::OutOfRange`] for an unknown type,
    /// [`SchemaError::Duplicate`] if the name is taken.
    pub fn add_column(
        &mut self,
        name: &str,
        ty: &str,
        parameters: &[&str],
        nullable: bool,
    ) -> Result<&mut Self> {
        let mut column = Column::new(name, ty)?;
        if !parameters.is_empty() {
            column = column.with_parameters(parameters.iter().copied());
        }
        if !nullable {
            column = column.not_null();
        }
        self.add_column_object(column)
    }

    /// Adds a pre-built column.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Duplicate`] if the name is taken.
    pub fn add_column_object(&mut self, column: Column) -> Result<&mut Self> {
        let name = column.name().to_string();
        if self.columns.contains_key(&name) {
            return Err(SchemaError::Duplicate(format!(
                "column '{name}' in table '{}' already exists",
                self.name
            )));
        }
        self.columns.insert(name, column);
        Ok(self)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.get_mut(name)
    }

    /// All columns in insertion order, deleted ones included.
    #[must_use]
    pub fn columns(&self) -> &IndexMap<String, Column> {
        &self.columns
    }

    /// Marks a column for DROP COLUMN synthesis; it stays registered.
    ///
    /// # Errors
    ///
    /// [`SchemaError::OutOfRange`] if the column does not exist.
    pub fn drop_column(&mut self, name: &str) -> Result<&mut Self> {
        match self.columns.get_mut(name) {
            Some(column) => {
                column.set_deleted(true);
                Ok(self)
            }
            None => Err(SchemaError::OutOfRange(format!(
                "column '{name}' in table '{}' not found",
                self.name
            ))),
        }
    }

    /// Clears auto-increment on every column, then sets it on `name`. The
    /// clearing sweep is silent so that it does not flag untouched columns
    /// as modified.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Empty`] if the target column does not exist.
    pub fn set_auto_increment_column(&mut self, name: &str) -> Result<&mut Self> {
        if !self.columns.contains_key(name) {
            return Err(SchemaError::Empty(format!(
                "column '{name}' in table '{}' not found",
                self.name
            )));
        }
        for column in self.columns.values_mut() {
            column.set_auto_increment_silent(false);
        }
        if let Some(column) = self.columns.get_mut(name) {
            column.set_auto_increment(true);
        }
        Ok(self)
    }

    // --- indexes ----------------------------------------------------------

    /// Builds and adds an index over the named columns. An empty or missing
    /// name registers the index anonymously, which is only sensible for
    /// PRIMARY.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Duplicate`] if the name is taken.
    pub fn add_index(
        &mut self,
        name: Option<&str>,
        columns: &[&str],
        ty: IndexType,
    ) -> Result<&mut Self> {
        let name = name.filter(|name| !name.is_empty()).map(str::to_string);
        let mut index = Index::new(name, ty);
        for column in columns {
            index = index.with_column(IndexColumn::new(*column));
        }
        self.add_index_object(index)
    }

    /// Adds a pre-built index.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Duplicate`] if the name is taken.
    pub fn add_index_object(&mut self, index: Index) -> Result<&mut Self> {
        let key = index.name().unwrap_or(ANONYMOUS_INDEX).to_string();
        if self.indexes.contains_key(&key) {
            return Err(SchemaError::Duplicate(format!(
                "index '{key}' in table '{}' already exists",
                self.name
            )));
        }
        self.indexes.insert(key, index);
        Ok(self)
    }

    #[must_use]
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.get(name)
    }

    pub fn index_mut(&mut self, name: &str) -> Option<&mut Index> {
        self.indexes.get_mut(name)
    }

    /// All indexes in insertion order, deleted ones included. The anonymous
    /// PRIMARY index is keyed under the empty string.
    #[must_use]
    pub fn indexes(&self) -> &IndexMap<String, Index> {
        &self.indexes
    }

    /// Marks an index for DROP INDEX synthesis; it stays registered.
    ///
    /// # Errors
    ///
    /// [`SchemaError::OutOfRange`] if the index does not exist.
    pub fn drop_index(&mut self, name: &str) -> Result<&mut Self> {
        match self.indexes.get_mut(name) {
            Some(index) => {
                index.set_deleted(true);
                Ok(self)
            }
            None => Err(SchemaError::OutOfRange(format!(
                "index '{name}' in table '{}' not found",
                self.name
            ))),
        }
    }

    // --- foreign keys -----------------------------------------------------

    /// Builds and adds a foreign key with RESTRICT actions.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Duplicate`] if the name is taken.
    pub fn add_foreign_key(
        &mut self,
        name: &str,
        columns: &[&str],
        target_table: &str,
        target_columns: &[&str],
    ) -> Result<&mut Self> {
        let foreign_key = ForeignKey::new(
            name,
            columns.iter().map(|column| (*column).to_string()).collect(),
            target_table,
            target_columns
                .iter()
                .map(|column| (*column).to_string())
                .collect(),
        );
        self.add_foreign_key_object(foreign_key)
    }

    /// Adds a pre-built foreign key.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Duplicate`] if the name is taken.
    pub fn add_foreign_key_object(&mut self, foreign_key: ForeignKey) -> Result<&mut Self> {
        let name = foreign_key.name().to_string();
        if self.foreign_keys.contains_key(&name) {
            return Err(SchemaError::Duplicate(format!(
                "foreign key '{name}' in table '{}' already exists",
                self.name
            )));
        }
        self.foreign_keys.insert(name, foreign_key);
        Ok(self)
    }

    #[must_use]
    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.get(name)
    }

    pub fn foreign_key_mut(&mut self, name: &str) -> Option<&mut ForeignKey> {
        self.foreign_keys.get_mut(name)
    }

    /// All foreign keys in insertion order, deleted ones included.
    #[must_use]
    pub fn foreign_keys(&self) -> &IndexMap<String, ForeignKey> {
        &self.foreign_keys
    }

    /// Marks a foreign key for DROP synthesis; it stays registered.
    ///
    /// # Errors
    ///
    /// [`SchemaError::OutOfRange`] if the key does not exist.
    pub fn drop_foreign_key(&mut self, name: &str) -> Result<&mut Self> {
        match self.foreign_keys.get_mut(name) {
            Some(foreign_key) => {
                foreign_key.set_deleted(true);
                Ok(self)
            }
            None => Err(SchemaError::OutOfRange(format!(
                "foreign key '{name}' in table '{}' not found",
                self.name
            ))),
        }
    }

    // --- convenience builders --------------------------------------------

    /// Adds an auto-incrementing INT column with an anonymous PRIMARY index.
    ///
    /// # Errors
    ///
    /// Propagates the underlying add/assign errors.
    pub fn add_primary_key(&mut self, name: &str) -> Result<&mut Self> {
        self.add_column(name, "INT", &[], false)?;
        self.add_index(None, &[name], IndexType::Primary)?;
        self.set_auto_increment_column(name)
    }

    /// Adds a nullable VARCHAR column of the given length.
    ///
    /// # Errors
    ///
    /// Propagates the underlying add errors.
    pub fn add_varchar_col(&mut self, name: &str, length: u32) -> Result<&mut Self> {
        let column = Column::new(name, "VARCHAR")?.with_parameters([length.to_string()]);
        self.add_column_object(column)
    }

    /// Adds a nullable INT column.
    ///
    /// # Errors
    ///
    /// Propagates the underlying add errors.
    pub fn add_int_col(&mut self, name: &str) -> Result<&mut Self> {
        self.add_column(name, "INT", &[], true)
    }

    /// Adds a nullable TEXT column.
    ///
    /// # Errors
    ///
    /// Propagates the underlying add errors.
    pub fn add_text_col(&mut self, name: &str) -> Result<&mut Self> {
        self.add_column(name, "TEXT", &[], true)
    }

    /// Adds a NOT NULL TIMESTAMP column defaulting to the current time.
    ///
    /// # Errors
    ///
    /// Propagates the underlying add errors.
    pub fn add_timestamp_col(&mut self, name: &str) -> Result<&mut Self> {
        let column = Column::new(name, "TIMESTAMP")?
            .not_null()
            .with_default("CURRENT_TIMESTAMP()");
        self.add_column_object(column)
    }

    // --- validation and synthesis ----------------------------------------

    /// Checks structural invariants: at least one column, at most one
    /// PRIMARY index.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Empty`] with zero columns, [`SchemaError::Duplicate`]
    /// with more than one PRIMARY index.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(SchemaError::Empty(format!(
                "table '{}' has no columns",
                self.name
            )));
        }
        let mut has_primary = false;
        for index in self.indexes.values() {
            if index.ty() == IndexType::Primary {
                if has_primary {
                    return Err(SchemaError::Duplicate(format!(
                        "duplicated primary index in table '{}'",
                        self.name
                    )));
                }
                has_primary = true;
            }
        }
        Ok(())
    }

    /// Renders the full CREATE TABLE statement. Columns, indexes, and
    /// foreign keys render in insertion order; deleted entities are skipped.
    #[must_use]
    pub fn show_create(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        parts.extend(
            self.columns
                .values()
                .filter(|column| !column.is_deleted())
                .map(Column::render),
        );
        parts.extend(
            self.indexes
                .values()
                .filter(|index| !index.is_deleted())
                .map(Index::render),
        );
        parts.extend(
            self.foreign_keys
                .values()
                .filter(|foreign_key| !foreign_key.is_deleted())
                .map(ForeignKey::render),
        );
        let mut out = format!("CREATE TABLE `{}` ({})", self.name, parts.join(",\n"));
        if let Some(engine) = &self.storage_engine {
            out.push_str(&format!(" ENGINE = {engine}"));
        }
        out.push(';');
        out
    }

    /// Renders the statements reconciling this table with the database:
    /// one ALTER TABLE collecting every column fragment, then standalone
    /// statements for each index and foreign-key fragment, each terminated
    /// with `;` and a newline. Empty when nothing changed.
    #[must_use]
    pub fn show_alter(&self) -> String {
        let mut out = String::new();
        let column_fragments: Vec<String> = self
            .columns
            .values()
            .map(Column::show_alter)
            .filter(|fragment| !fragment.is_empty())
            .collect();
        if !column_fragments.is_empty() {
            out.push_str(&format!(
                "ALTER TABLE `{}` {};\n",
                self.name,
                column_fragments.join(", ")
            ));
        }
        for index in self.indexes.values() {
            let fragment = index.show_alter(&self.name);
            if !fragment.is_empty() {
                out.push_str(&fragment);
                out.push_str(";\n");
            }
        }
        for foreign_key in self.foreign_keys.values() {
            let fragment = foreign_key.show_alter();
            if !fragment.is_empty() {
                out.push_str(&fragment);
                out.push_str(";\n");
            }
        }
        out
    }

    /// Renders the DROP TABLE statement.
    #[must_use]
    pub fn show_drop(&self) -> String {
        format!("DROP TABLE {};", self.name)
    }

    /// Synthesizes the DDL that reconciles this table with the database:
    /// DROP for deleted existing tables, CREATE for tables not yet on the
    /// database, the alter statements otherwise. Flags are never cleared
    /// here; resetting them after applying the DDL is the caller's job.
    #[must_use]
    pub fn migrate(&self) -> String {
        if self.is_existing_on_db() && self.is_deleted() {
            debug!(table = %self.name, "synthesizing DROP TABLE");
            return self.show_drop();
        }
        if !self.is_existing_on_db() {
            debug!(table = %self.name, "synthesizing CREATE TABLE");
            return self.show_create();
        }
        self.show_alter()
    }

    // --- reconstruction ---------------------------------------------------

    /// Reconstructs a table from catalog metadata.
    ///
    /// Issues the three logical queries against `source` and maps the rows
    /// into entities, every one flagged existing-on-db and unmodified, so an
    /// immediately following [`migrate`](Self::migrate) emits nothing. The
    /// PRIMARY constraint name is normalized to anonymous. Referential
    /// actions come from the reported rules, falling back to RESTRICT for
    /// an unrecognized rule string.
    ///
    /// # Errors
    ///
    /// Source failures propagate unmodified; malformed rows surface the
    /// usual construction errors.
    pub fn read_from_existing(db: &str, table: &str, source: &dyn CatalogSource) -> Result<Self> {
        let fields = source.fields(db, table)?;
        let constraints = source.constraints(db, table)?;
        let references = source.references(db, table)?;
        debug!(
            db,
            table,
            fields = fields.len(),
            constraints = constraints.len(),
            references = references.len(),
            "reconstructing table from catalog rows"
        );

        let mut out = Self::new(table);
        out.state = LifecycleState::existing();

        for field in &fields {
            let (base, parameters, options) = catalog::parse_raw_type(&field.raw_type);
            let column = Column::from_catalog(field, &base, parameters, options)?;
            out.add_column_object(column)?;
        }

        for constraint in constraints {
            let ty = IndexType::parse(&constraint.kind)?;
            let name = if ty == IndexType::Primary {
                None
            } else {
                Some(constraint.name)
            };
            let columns = catalog::split_column_list(&constraint.columns);
            out.add_index_object(Index::from_catalog(name, ty, &columns))?;
        }

        for reference in references {
            let on_update =
                ReferenceAction::parse(&reference.on_update).unwrap_or(ReferenceAction::Restrict);
            let on_delete =
                ReferenceAction::parse(&reference.on_delete).unwrap_or(ReferenceAction::Restrict);
            let foreign_key = ForeignKey::from_catalog(
                &reference.name,
                catalog::split_column_list(&reference.columns),
                &reference.target_table,
                catalog::split_column_list(&reference.target_columns),
                on_update,
                on_delete,
            );
            out.add_foreign_key_object(foreign_key)?;
        }

        Ok(out)
    }
}

impl Lifecycle for Table {
    fn state(&self) -> &LifecycleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LifecycleState {
        &mut self.state
    }
}
