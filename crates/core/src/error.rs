/// Domain-level errors raised by value constructors and configuration checks.
///
/// Generation outcomes do not use this type; see [`crate::generation::Outcome`].
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
