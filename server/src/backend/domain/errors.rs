use thiserror::Error;

/// Failure categories the REST layer maps onto status codes
///
/// Services return `anyhow::Result`; these variants travel inside the
/// `anyhow::Error` and are recovered with `downcast_ref`.
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Ingredient '{ingredient}' is used by {references} recipe line(s) and cannot be deleted")]
    IngredientInUse { ingredient: String, references: i64 },

    #[error("Import failed: {0}")]
    ImportFailed(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}
