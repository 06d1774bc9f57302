use thiserror::Error;

/// Errors from agreement validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Kappa is undefined without at least one paired record.
    #[error(
        "no record has both a usable screening decision and a human decision \
         ({screened} screened, {reviewed} reviewed)"
    )]
    NoOverlap { screened: usize, reviewed: usize },
}

/// Result alias for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;
