//! Error types for schema construction and DDL synthesis.

/// Errors raised while building, mutating, or reconstructing schema objects.
///
/// All errors are raised synchronously at the point of violation; nothing is
/// retried. An empty `show_alter()` result is the valid "no change" case and
/// is represented as an empty string, never as an error.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A name collided with an existing entry in its owning collection.
    #[error("duplicate definition: {0}")]
    Duplicate(String),

    /// A value fell outside one of the enumerated catalogs (column type,
    /// index type, sort order, reference action), or a lookup referenced a
    /// table that is neither registered nor present on the data source.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// A required element was missing, e.g. a table validated with zero
    /// columns or an auto-increment assignment to an unknown column.
    #[error("empty: {0}")]
    Empty(String),

    /// The backing catalog source failed. The driver error is carried
    /// unmodified.
    #[error("catalog source error: {0}")]
    Source(Box<dyn std::error::Error + Send + Sync>),
}

impl SchemaError {
    /// Wraps a driver error without translating it.
    pub fn source(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Source(Box::new(err))
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = SchemaError::Duplicate("column 'id' in table 'users' already exists".into());
        assert!(err.to_string().contains("column 'id'"));

        let err = SchemaError::OutOfRange("column type 'FOO' not found".into());
        assert!(err.to_string().starts_with("out of range"));
    }

    #[test]
    fn source_preserves_inner_error() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "gone");
        let err = SchemaError::source(inner);
        assert!(err.to_string().contains("gone"));
    }
}
