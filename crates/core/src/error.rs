use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Persisted data violates a structural invariant (e.g. two children of
    /// one parent sharing an identity). Never recoverable by the caller.
    #[error("Data integrity violation: {0}")]
    Integrity(String),
}
