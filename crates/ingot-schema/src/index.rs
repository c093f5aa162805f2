//! Indexes and the column references they are built from.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::lifecycle::{Lifecycle, LifecycleState};

/// Sort order of an indexed column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// The SQL keyword for this order.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parses `ASC`/`DESC`, trimmed and case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::OutOfRange`] for anything else.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            other => Err(SchemaError::OutOfRange(format!(
                "sort order '{other}' not found"
            ))),
        }
    }
}

/// Index kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexType {
    #[default]
    Index,
    Primary,
    Unique,
    Fulltext,
}

impl IndexType {
    /// The SQL keyword for this index type.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Index => "INDEX",
            Self::Primary => "PRIMARY",
            Self::Unique => "UNIQUE",
            Self::Fulltext => "FULLTEXT",
        }
    }

    /// Parses an index type keyword, trimmed and case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::OutOfRange`] for anything outside the
    /// enumerated set.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INDEX" => Ok(Self::Index),
            "PRIMARY" => Ok(Self::Primary),
            "UNIQUE" => Ok(Self::Unique),
            "FULLTEXT" => Ok(Self::Fulltext),
            other => Err(SchemaError::OutOfRange(format!(
                "index type '{other}' not found"
            ))),
        }
    }
}

/// One column reference inside an index: name, sort order, and an optional
/// prefix length for string-typed columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumn {
    name: String,
    order: SortOrder,
    length: Option<u32>,
    state: LifecycleState,
}

impl IndexColumn {
    /// Creates an ascending reference with no prefix length.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: SortOrder::Asc,
            length: None,
            state: LifecycleState::new(),
        }
    }

    pub(crate) fn from_catalog(name: &str) -> Self {
        let mut column = Self::new(name);
        column.state = LifecycleState::existing();
        column
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn order(&self) -> SortOrder {
        self.order
    }

    #[must_use]
    pub fn length(&self) -> Option<u32> {
        self.length
    }

    #[must_use]
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self.set_modified(true);
        self
    }

    pub fn set_order(&mut self, order: SortOrder) -> &mut Self {
        self.order = order;
        self.set_modified(true);
        self
    }

    pub fn set_length(&mut self, length: Option<u32>) -> &mut Self {
        self.length = length;
        self.set_modified(true);
        self
    }

    /// Renders as `` `name`[ (len)] ORDER ``.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("`{}`", self.name);
        if let Some(length) = self.length {
            out.push_str(&format!(" ({length})"));
        }
        out.push(' ');
        out.push_str(self.order.as_sql());
        out
    }
}

impl Lifecycle for IndexColumn {
    fn state(&self) -> &LifecycleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LifecycleState {
        &mut self.state
    }
}

/// A named or anonymous index over an ordered list of [`IndexColumn`]s.
///
/// Only PRIMARY indexes are anonymous; every other type carries a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    name: Option<String>,
    ty: IndexType,
    columns: Vec<IndexColumn>,
    state: LifecycleState,
}

impl Index {
    #[must_use]
    pub fn new(name: Option<String>, ty: IndexType) -> Self {
        Self {
            name,
            ty,
            columns: Vec::new(),
            state: LifecycleState::new(),
        }
    }

    /// An anonymous PRIMARY KEY index.
    #[must_use]
    pub fn primary() -> Self {
        Self::new(None, IndexType::Primary)
    }

    pub(crate) fn from_catalog(name: Option<String>, ty: IndexType, columns: &[String]) -> Self {
        let mut index = Self::new(name, ty);
        index.columns = columns
            .iter()
            .map(|column| IndexColumn::from_catalog(column))
            .collect();
        index.state = LifecycleState::existing();
        index
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn ty(&self) -> IndexType {
        self.ty
    }

    #[must_use]
    pub fn columns(&self) -> &[IndexColumn] {
        &self.columns
    }

    #[must_use]
    pub fn with_column(mut self, column: IndexColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a column reference and marks the index modified.
    pub fn add_column(&mut self, column: IndexColumn) -> &mut Self {
        self.columns.push(column);
        self.set_modified(true);
        self
    }

    /// Renders the index as it appears inside CREATE TABLE. PRIMARY renders
    /// as `PRIMARY  KEY` with no name; the historical double space is part
    /// of the output contract.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from(self.ty.as_sql());
        out.push(' ');
        if self.ty == IndexType::Primary {
            out.push_str(" KEY");
        }
        out.push(' ');
        if let Some(name) = &self.name {
            out.push_str(&format!("`{name}`"));
        }
        let columns: Vec<String> = self.columns.iter().map(IndexColumn::render).collect();
        out.push('(');
        out.push_str(&columns.join(", "));
        out.push(')');
        out
    }

    /// The reconciliation statement(s) for this index.
    ///
    /// Index definitions cannot be altered in place, so a modified index is
    /// dropped and recreated. PRIMARY indexes are never diffed; their
    /// evolution goes through table-level column changes.
    #[must_use]
    pub fn show_alter(&self, table: &str) -> String {
        if self.is_deleted() && self.is_existing_on_db() {
            return format!(
                "DROP INDEX `{}` ON {table}",
                self.name.as_deref().unwrap_or_default()
            );
        }
        if !self.is_existing_on_db() && self.ty != IndexType::Primary {
            return format!("CREATE {}", self.render());
        }
        if self.is_existing_on_db() && self.is_modified() && self.ty != IndexType::Primary {
            return format!(
                "DROP INDEX `{}` ON {table};\nCREATE {}",
                self.name.as_deref().unwrap_or_default(),
                self.render()
            );
        }
        String::new()
    }
}

impl Lifecycle for Index {
    fn state(&self) -> &LifecycleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LifecycleState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_order_parse() {
        assert_eq!(SortOrder::parse(" desc ").unwrap(), SortOrder::Desc);
        assert!(matches!(
            SortOrder::parse("SIDEWAYS"),
            Err(SchemaError::OutOfRange(_))
        ));
    }

    #[test]
    fn index_type_parse() {
        assert_eq!(IndexType::parse("unique").unwrap(), IndexType::Unique);
        assert!(matches!(
            IndexType::parse("SPATIAL"),
            Err(SchemaError::OutOfRange(_))
        ));
    }

    #[test]
    fn index_column_render() {
        assert_eq!(IndexColumn::new("id").render(), "`id` ASC");
        assert_eq!(
            IndexColumn::new("title")
                .with_length(10)
                .with_order(SortOrder::Desc)
                .render(),
            "`title` (10) DESC"
        );
    }

    #[test]
    fn primary_renders_anonymous_key() {
        let index = Index::primary().with_column(IndexColumn::new("id"));
        assert_eq!(index.render(), "PRIMARY  KEY (`id` ASC)");
    }

    #[test]
    fn named_unique_renders() {
        let index = Index::new(Some("uq_email".into()), IndexType::Unique)
            .with_column(IndexColumn::new("email"));
        assert_eq!(index.render(), "UNIQUE  `uq_email`(`email` ASC)");
    }

    #[test]
    fn show_alter_creates_new_index() {
        let index =
            Index::new(Some("idx_name".into()), IndexType::Index).with_column(IndexColumn::new("name"));
        assert_eq!(
            index.show_alter("users"),
            "CREATE INDEX  `idx_name`(`name` ASC)"
        );
    }

    #[test]
    fn show_alter_drops_deleted_index() {
        let mut index = Index::new(Some("idx_name".into()), IndexType::Index);
        index.set_existing_on_db(true);
        index.set_deleted(true);
        assert_eq!(index.show_alter("users"), "DROP INDEX `idx_name` ON users");
    }

    #[test]
    fn show_alter_recreates_modified_index() {
        let mut index =
            Index::new(Some("idx_name".into()), IndexType::Index).with_column(IndexColumn::new("name"));
        index.set_existing_on_db(true);
        index.add_column(IndexColumn::new("surname"));
        assert_eq!(
            index.show_alter("users"),
            "DROP INDEX `idx_name` ON users;\nCREATE INDEX  `idx_name`(`name` ASC, `surname` ASC)"
        );
    }

    #[test]
    fn primary_is_never_diffed() {
        let mut index = Index::primary().with_column(IndexColumn::new("id"));
        assert_eq!(index.show_alter("users"), "");

        index.set_existing_on_db(true);
        index.set_modified(true);
        assert_eq!(index.show_alter("users"), "");
    }
}
