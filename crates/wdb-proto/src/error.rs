//! Protocol error types.

use thiserror::Error;

/// Errors raised while building statement IR.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Comparison operator symbol not recognised.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
}
