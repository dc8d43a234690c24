//! Error types shared by all models.

use thiserror::Error;

/// Errors raised by model constructors.
///
/// Construction either yields a fully validated, immutable model or fails
/// with [`Error::InvalidParameter`]; queries on a constructed model are total
/// and do not return errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A constructor argument is out of range, violates an ordering
    /// invariant, or selects an unsupported option.
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter {
        /// Name of the offending argument.
        field: &'static str,
        /// Description of the violated constraint.
        reason: String,
    },

    /// An internal invariant was violated during a computation.
    ///
    /// Not expected to occur for models built from validated inputs.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

/// A specialized result type for model construction.
pub type Result<T> = std::result::Result<T, Error>;
