//! Error types for rule definitions.

use thiserror::Error;

/// Result type for rule parsing.
pub type RuleResult<T> = Result<T, RuleError>;

/// A rule definition that cannot be turned into a [`crate::Constraint`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// An empty entry in a rule list, e.g. `["required", ""]`. Empty segments
    /// of a pipe string are ignored instead.
    #[error("empty rule for column {column}")]
    EmptyRule { column: String },

    /// A rule that needs a parameter was written without one.
    #[error("rule {rule} requires a parameter")]
    MissingParameter { rule: String },

    /// A rule parameter that does not parse.
    #[error("invalid parameter {param:?} for rule {rule}: {reason}")]
    InvalidParameter {
        rule: String,
        param: String,
        reason: String,
    },

    /// A `regex:` pattern that does not compile.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
