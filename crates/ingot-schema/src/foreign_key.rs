//! Foreign key constraints.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::lifecycle::{Lifecycle, LifecycleState};

/// Referential action for `ON UPDATE` / `ON DELETE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceAction {
    #[default]
    Restrict,
    NoAction,
    Cascade,
    SetNull,
}

impl ReferenceAction {
    /// The SQL keywords for this action.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
        }
    }

    /// Parses an action keyword as the catalog reports it, trimmed and
    /// case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::OutOfRange`] for anything outside the
    /// enumerated action set.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RESTRICT" => Ok(Self::Restrict),
            "NO ACTION" => Ok(Self::NoAction),
            "CASCADE" => Ok(Self::Cascade),
            "SET NULL" => Ok(Self::SetNull),
            other => Err(SchemaError::OutOfRange(format!(
                "action '{other}' is invalid"
            ))),
        }
    }
}

/// A named constraint mapping local columns to a target table's columns.
///
/// Both actions default to RESTRICT. A foreign key cannot be modified in
/// place on MySQL; [`show_alter`](Self::show_alter) drops and recreates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    name: String,
    columns: Vec<String>,
    target_table: String,
    target_columns: Vec<String>,
    on_update: ReferenceAction,
    on_delete: ReferenceAction,
    state: LifecycleState,
}

impl ForeignKey {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        target_table: impl Into<String>,
        target_columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            target_table: target_table.into(),
            target_columns,
            on_update: ReferenceAction::Restrict,
            on_delete: ReferenceAction::Restrict,
            state: LifecycleState::new(),
        }
    }

    pub(crate) fn from_catalog(
        name: &str,
        columns: Vec<String>,
        target_table: &str,
        target_columns: Vec<String>,
        on_update: ReferenceAction,
        on_delete: ReferenceAction,
    ) -> Self {
        let mut foreign_key = Self::new(name, columns, target_table, target_columns);
        foreign_key.on_update = on_update;
        foreign_key.on_delete = on_delete;
        foreign_key.state = LifecycleState::existing();
        foreign_key
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn target_table(&self) -> &str {
        &self.target_table
    }

    #[must_use]
    pub fn target_columns(&self) -> &[String] {
        &self.target_columns
    }

    #[must_use]
    pub fn on_update_action(&self) -> ReferenceAction {
        self.on_update
    }

    #[must_use]
    pub fn on_delete_action(&self) -> ReferenceAction {
        self.on_delete
    }

    /// Sets both actions during construction.
    #[must_use]
    pub fn with_actions(mut self, on_update: ReferenceAction, on_delete: ReferenceAction) -> Self {
        self.on_update = on_update;
        self.on_delete = on_delete;
        self
    }

    pub fn add_column(&mut self, column: impl Into<String>) -> &mut Self {
        self.columns.push(column.into());
        self.set_modified(true);
        self
    }

    pub fn add_target_column(&mut self, column: impl Into<String>) -> &mut Self {
        self.target_columns.push(column.into());
        self.set_modified(true);
        self
    }

    pub fn set_target_table(&mut self, target_table: impl Into<String>) -> &mut Self {
        self.target_table = target_table.into();
        self.set_modified(true);
        self
    }

    pub fn set_on_update_action(&mut self, action: ReferenceAction) -> &mut Self {
        self.on_update = action;
        self.set_modified(true);
        self
    }

    pub fn set_on_delete_action(&mut self, action: ReferenceAction) -> &mut Self {
        self.on_delete = action;
        self.set_modified(true);
        self
    }

    /// Renders the constraint as it appears inside CREATE TABLE and in ADD
    /// fragments.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON UPDATE {} ON DELETE {}",
            self.name,
            self.columns.join(", "),
            self.target_table,
            self.target_columns.join(", "),
            self.on_update.as_sql(),
            self.on_delete.as_sql(),
        )
    }

    /// The reconciliation fragment(s) for this constraint: DROP for deleted
    /// existing keys, ADD for new ones, and a drop-then-add pair for
    /// modified ones.
    #[must_use]
    pub fn show_alter(&self) -> String {
        if self.is_deleted() && self.is_existing_on_db() {
            return format!("DROP FOREIGN KEY {}", self.name);
        }
        if !self.is_existing_on_db() {
            return format!("ADD {}", self.render());
        }
        if self.is_modified() {
            return format!("DROP FOREIGN KEY {};\nADD {}", self.name, self.render());
        }
        String::new()
    }
}

impl Lifecycle for ForeignKey {
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

    fn sample() -> ForeignKey {
        ForeignKey::new(
            "fk_post_user",
            vec!["user_id".into()],
            "users",
            vec!["id".into()],
        )
    }

    #[test]
    fn action_parse_accepts_catalog_values() {
        assert_eq!(
            ReferenceAction::parse("cascade").unwrap(),
            ReferenceAction::Cascade
        );
        assert_eq!(
            ReferenceAction::parse(" no action ").unwrap(),
            ReferenceAction::NoAction
        );
        assert!(matches!(
            ReferenceAction::parse("EXPLODE"),
            Err(SchemaError::OutOfRange(_))
        ));
    }

    #[test]
    fn render_emits_each_action_once() {
        let foreign_key =
            sample().with_actions(ReferenceAction::Cascade, ReferenceAction::SetNull);
        assert_eq!(
            foreign_key.render(),
            "CONSTRAINT fk_post_user FOREIGN KEY (user_id) REFERENCES users (id) \
             ON UPDATE CASCADE ON DELETE SET NULL"
        );
    }

    #[test]
    fn render_joins_composite_columns() {
        let foreign_key = ForeignKey::new(
            "fk_membership",
            vec!["org_id".into(), "user_id".into()],
            "memberships",
            vec!["org_id".into(), "user_id".into()],
        );
        assert!(foreign_key
            .render()
            .contains("FOREIGN KEY (org_id, user_id) REFERENCES memberships (org_id, user_id)"));
    }

    #[test]
    fn show_alter_add_for_new_key() {
        let foreign_key = sample();
        assert!(foreign_key.show_alter().starts_with("ADD CONSTRAINT fk_post_user"));
    }

    #[test]
    fn show_alter_drop_for_deleted_existing_key() {
        let mut foreign_key = sample();
        foreign_key.set_existing_on_db(true);
        foreign_key.set_deleted(true);
        assert_eq!(foreign_key.show_alter(), "DROP FOREIGN KEY fk_post_user");
    }

    #[test]
    fn show_alter_recreates_modified_key() {
        let mut foreign_key = sample();
        foreign_key.set_existing_on_db(true);
        foreign_key.set_on_delete_action(ReferenceAction::Cascade);
        let ddl = foreign_key.show_alter();
        assert!(ddl.starts_with("DROP FOREIGN KEY fk_post_user;\nADD CONSTRAINT fk_post_user"));
        assert!(ddl.ends_with("ON DELETE CASCADE"));
    }

    #[test]
    fn show_alter_empty_for_untouched_existing_key() {
        let mut foreign_key = sample();
        foreign_key.set_existing_on_db(true);
        assert_eq!(foreign_key.show_alter(), "");
    }
}
