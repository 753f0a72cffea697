use surveys_core::error::CoreError;

/// Failure while loading or writing aggregates.
///
/// `Core` carries stored rows that could not be folded back into a valid
/// domain value; the caller decides how to surface it.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}
