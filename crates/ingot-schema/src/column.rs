//! Column definitions and their ALTER fragments.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::catalog::FieldRow;
use crate::error::{Result, SchemaError};
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::types;

/// Placement of a column inside its table, appended to ADD/MODIFY fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnPosition {
    /// Place the column first.
    First,
    /// Keep the column at the end; no clause is emitted.
    #[default]
    Last,
    /// Place the column after the named one.
    After(String),
}

impl ColumnPosition {
    /// The SQL clause appended to ADD/MODIFY fragments; empty for `Last`.
    #[must_use]
    pub fn clause(&self) -> String {
        match self {
            Self::First => String::from(" FIRST"),
            Self::Last => String::new(),
            Self::After(column) => format!(" AFTER `{column}`"),
        }
    }
}

/// A typed column definition.
///
/// The type string is validated against the closed catalog in
/// [`crate::types`] and stored in its canonical upper-case form. The name is
/// immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    ty: String,
    parameters: Vec<String>,
    options: IndexMap<String, Option<String>>,
    nullable: bool,
    auto_increment: bool,
    default_value: Option<String>,
    comment: Option<String>,
    position: ColumnPosition,
    state: LifecycleState,
}

impl Column {
    /// Creates a nullable column with no parameters or options.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::OutOfRange`] if `ty` is not in the type
    /// catalog.
    pub fn new(name: impl Into<String>, ty: &str) -> Result<Self> {
        let ty = types::lookup_type(ty)
            .ok_or_else(|| SchemaError::OutOfRange(format!("column type '{ty}' not found")))?;
        Ok(Self {
            name: name.into(),
            ty: ty.to_string(),
            parameters: Vec::new(),
            options: IndexMap::new(),
            nullable: true,
            auto_increment: false,
            default_value: None,
            comment: None,
            position: ColumnPosition::Last,
            state: LifecycleState::new(),
        })
    }

    /// Whether `ty` is a member of the closed type catalog.
    #[must_use]
    pub fn validate_type(ty: &str) -> bool {
        types::is_valid_type(ty)
    }

    /// Builds a column from a catalog row and its parsed raw type, flagged
    /// existing-on-db and unmodified.
    pub(crate) fn from_catalog(
        field: &FieldRow,
        ty: &str,
        parameters: Vec<String>,
        options: Vec<String>,
    ) -> Result<Self> {
        let mut column = Self::new(&field.name, ty)?;
        column.parameters = parameters;
        for option in options {
            column.options.insert(option, None);
        }
        column.nullable = field.nullable;
        column.default_value = field.default.clone();
        column.auto_increment = field.extra.to_ascii_lowercase().contains("auto_increment");
        if !field.comment.is_empty() {
            column.comment = Some(field.comment.clone());
        }
        column.state = LifecycleState::existing();
        Ok(column)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical type string, e.g. `VARCHAR`.
    #[must_use]
    pub fn ty(&self) -> &str {
        &self.ty
    }

    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// The option bag in insertion order. Options without a value render as
    /// a bare keyword, options with a value as `KEY = value`.
    #[must_use]
    pub fn options(&self) -> &IndexMap<String, Option<String>> {
        &self.options
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.contains_key(option)
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    #[must_use]
    pub fn position(&self) -> &ColumnPosition {
        &self.position
    }

    // --- consuming builders, for construction before insertion -----------

    /// Sets the size/precision parameter list.
    #[must_use]
    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one option, with or without a value.
    #[must_use]
    pub fn with_option(mut self, option: impl Into<String>, value: Option<&str>) -> Self {
        self.options.insert(option.into(), value.map(str::to_string));
        self
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the default value, applying the same nullability rule as
    /// [`set_default_value`](Self::set_default_value).
    #[must_use]
    pub fn with_default(mut self, value: &str) -> Self {
        self.apply_default(Some(value));
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: ColumnPosition) -> Self {
        self.position = position;
        self
    }

    // --- mutating setters; each marks the column modified ----------------

    /// Replaces the column type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::OutOfRange`] if `ty` is not in the type
    /// catalog.
    pub fn set_type(&mut self, ty: &str) -> Result<&mut Self> {
        let ty = types::lookup_type(ty)
            .ok_or_else(|| SchemaError::OutOfRange(format!("column type '{ty}' not found")))?;
        self.ty = ty.to_string();
        self.set_modified(true);
        Ok(self)
    }

    pub fn set_parameters<I, S>(&mut self, parameters: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self.set_modified(true);
        self
    }

    pub fn add_option(&mut self, option: impl Into<String>, value: Option<String>) -> &mut Self {
        self.options.insert(option.into(), value);
        self.set_modified(true);
        self
    }

    pub fn set_nullable(&mut self, nullable: bool) -> &mut Self {
        self.nullable = nullable;
        self.set_modified(true);
        self
    }

    /// Toggles auto-increment and marks the column modified. The table-level
    /// auto-increment sweep uses the silent variant instead so that clearing
    /// every other column does not flag them all as changed.
    pub fn set_auto_increment(&mut self, auto_increment: bool) -> &mut Self {
        self.auto_increment = auto_increment;
        self.set_modified(true);
        self
    }

    /// Toggles auto-increment without touching the modified flag.
    pub(crate) fn set_auto_increment_silent(&mut self, auto_increment: bool) {
        self.auto_increment = auto_increment;
    }

    /// Sets or clears the default value.
    ///
    /// Setting a default also toggles nullability: the literal `NULL` (any
    /// case) makes the column nullable, any other value makes it NOT NULL.
    /// Clearing the default leaves nullability untouched.
    pub fn set_default_value(&mut self, value: Option<&str>) -> &mut Self {
        self.apply_default(value);
        self.set_modified(true);
        self
    }

    fn apply_default(&mut self, value: Option<&str>) {
        if let Some(value) = value {
            self.nullable = value.eq_ignore_ascii_case("NULL");
            self.default_value = Some(value.to_string());
        } else {
            self.default_value = None;
        }
    }

    pub fn set_comment(&mut self, comment: Option<&str>) -> &mut Self {
        self.comment = comment.map(str::to_string);
        self.set_modified(true);
        self
    }

    pub fn set_position(&mut self, position: ColumnPosition) -> &mut Self {
        self.position = position;
        self.set_modified(true);
        self
    }

    // --- rendering --------------------------------------------------------

    /// Renders the column definition as it appears in CREATE TABLE and in
    /// ADD/MODIFY fragments.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("`{}` {}", self.name, self.ty);
        if !self.parameters.is_empty() {
            out.push('(');
            out.push_str(&self.parameters.join(" "));
            out.push(')');
        }
        for (option, value) in &self.options {
            out.push(' ');
            out.push_str(option);
            if let Some(value) = value {
                out.push_str(" = ");
                out.push_str(value);
            }
        }
        out.push_str(if self.nullable { " NULL" } else { " NOT NULL" });
        if let Some(default) = &self.default_value {
            out.push_str(" DEFAULT ");
            out.push_str(&render_default(default));
        }
        if self.auto_increment {
            out.push_str(" AUTO_INCREMENT");
        }
        if let Some(comment) = &self.comment {
            if !comment.trim().is_empty() {
                out.push_str(" COMMENT '");
                out.push_str(comment);
                out.push('\'');
            }
        }
        out
    }

    /// The ALTER TABLE fragment reconciling this column with the database:
    /// DROP for deleted existing columns, ADD for columns not yet on the
    /// database, MODIFY for changed existing columns, empty otherwise.
    #[must_use]
    pub fn show_alter(&self) -> String {
        if self.is_deleted() && self.is_existing_on_db() {
            return format!("DROP COLUMN `{}`", self.name);
        }
        if !self.is_existing_on_db() {
            return format!("ADD {}{}", self.render(), self.position.clause());
        }
        if self.is_modified() {
            return format!("MODIFY {}{}", self.render(), self.position.clause());
        }
        String::new()
    }
}

impl Lifecycle for Column {
    fn state(&self) -> &LifecycleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LifecycleState {
        &mut self.state
    }
}

/// Renders a default value: the literal `NULL` becomes the bare keyword, a
/// value containing `()` is treated as a function call and left unquoted,
/// anything else is single-quoted.
fn render_default(value: &str) -> String {
    if value.eq_ignore_ascii_case("NULL") {
        String::from("NULL")
    } else if value.contains("()") {
        value.to_string()
    } else {
        format!("'{value}'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_types_construct() {
        for ty in ["INT", "varchar", " Text ", "TIMESTAMP"] {
            assert!(Column::new("c", ty).is_ok(), "{ty} should construct");
        }
    }

    #[test]
    fn invalid_type_fails_out_of_range() {
        let err = Column::new("c", "FOO").unwrap_err();
        assert!(matches!(err, SchemaError::OutOfRange(_)));
    }

    #[test]
    fn type_is_stored_canonically() {
        let column = Column::new("c", "varchar").unwrap();
        assert_eq!(column.ty(), "VARCHAR");
    }

    #[test]
    fn render_full_definition() {
        let column = Column::new("name", "VARCHAR")
            .unwrap()
            .with_parameters(["255"])
            .with_option("CHARACTER SET", Some("utf8mb4"))
            .not_null()
            .with_default("guest")
            .with_comment("display name");
        assert_eq!(
            column.render(),
            "`name` VARCHAR(255) CHARACTER SET = utf8mb4 NOT NULL DEFAULT 'guest' COMMENT 'display name'"
        );
    }

    #[test]
    fn render_space_joins_parameters() {
        let column = Column::new("id", "INT").unwrap().with_parameters(["10", "UNSIGNED"]);
        assert_eq!(column.render(), "`id` INT(10 UNSIGNED) NULL");
    }

    #[test]
    fn valueless_option_renders_bare() {
        let column = Column::new("n", "INT")
            .unwrap()
            .with_option("UNSIGNED", None)
            .with_option("ZEROFILL", None);
        assert_eq!(column.render(), "`n` INT UNSIGNED ZEROFILL NULL");
    }

    #[test]
    fn null_default_forces_nullable() {
        let mut column = Column::new("c", "INT").unwrap().not_null();
        column.set_default_value(Some("null"));
        assert!(column.is_nullable());
        assert_eq!(column.render(), "`c` INT NULL DEFAULT NULL");
    }

    #[test]
    fn function_default_renders_unquoted() {
        let mut column = Column::new("c", "TIMESTAMP").unwrap();
        column.set_default_value(Some("NOW()"));
        assert!(!column.is_nullable());
        assert_eq!(column.render(), "`c` TIMESTAMP NOT NULL DEFAULT NOW()");
    }

    #[test]
    fn plain_default_renders_quoted_and_not_null() {
        let mut column = Column::new("c", "VARCHAR").unwrap();
        column.set_default_value(Some("abc"));
        assert!(!column.is_nullable());
        assert!(column.render().ends_with("NOT NULL DEFAULT 'abc'"));
    }

    #[test]
    fn blank_comment_is_omitted() {
        let column = Column::new("c", "INT").unwrap().with_comment("   ");
        assert_eq!(column.render(), "`c` INT NULL");
    }

    #[test]
    fn show_alter_drop_for_deleted_existing() {
        let mut column = Column::new("age", "INT").unwrap();
        column.set_existing_on_db(true);
        column.set_deleted(true);
        assert_eq!(column.show_alter(), "DROP COLUMN `age`");
    }

    #[test]
    fn show_alter_add_for_new_column() {
        let mut column = Column::new("age", "INT").unwrap().not_null();
        column.set_position(ColumnPosition::After("name".into()));
        assert_eq!(column.show_alter(), "ADD `age` INT NOT NULL AFTER `name`");
    }

    #[test]
    fn deleted_but_never_applied_column_still_adds() {
        let mut column = Column::new("age", "INT").unwrap();
        column.set_deleted(true);
        assert!(column.show_alter().starts_with("ADD "));
    }

    #[test]
    fn show_alter_modify_for_changed_existing() {
        let mut column = Column::new("age", "INT").unwrap();
        column.set_existing_on_db(true);
        column.set_nullable(false);
        assert_eq!(column.show_alter(), "MODIFY `age` INT NOT NULL");
    }

    #[test]
    fn show_alter_empty_for_untouched_existing() {
        let mut column = Column::new("age", "INT").unwrap();
        column.set_existing_on_db(true);
        assert_eq!(column.show_alter(), "");
    }

    #[test]
    fn position_clauses() {
        assert_eq!(ColumnPosition::First.clause(), " FIRST");
        assert_eq!(ColumnPosition::Last.clause(), "");
        assert_eq!(ColumnPosition::After("id".into()).clause(), " AFTER `id`");
    }

    #[test]
    fn setters_mark_modified() {
        let mut column = Column::new("c", "INT").unwrap();
        assert!(!column.is_modified());
        column.set_nullable(false);
        assert!(column.is_modified());

        let mut column = Column::new("c", "INT").unwrap();
        column.set_auto_increment_silent(true);
        assert!(!column.is_modified());
        assert!(column.is_auto_increment());
    }
}
