use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("table is empty")]
    EmptyTable,
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("row {row}: invalid {column}: {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        reason: String,
    },
}

impl SchemaError {
    pub(crate) fn invalid(row: usize, column: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            row,
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}
