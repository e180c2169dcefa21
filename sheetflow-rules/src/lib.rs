//! Column validation rules for sheetflow imports.
//!
//! - [`Constraint`]: one parsed rule (`required`, `max:50`, `in:a,b`, ...)
//! - [`RuleSet`]: per-column constraint lists, in declaration order
//! - [`ValidationEngine`] / [`RuleEngine`]: evaluates a flattened key → value
//!   table against a key → constraints table in a single pass
//! - [`describe_rules`]: markdown description of a rule set for upload forms
//!
//! # Rule syntax
//!
//! Rules are written the way upload templates document them: a pipe separated
//! string (`"required|numeric|max:120"`) or a list with one rule per entry.
//! The list form is required when a `regex:` pattern contains a `|`.

mod constraint;
mod date;
mod describe;
mod engine;
mod error;
mod key;
mod rule_set;

pub use constraint::{Constraint, Pattern};
pub use describe::{describe_constraint, describe_rules, NO_RULES_DESCRIPTION};
pub use engine::{CustomRule, FieldFailures, FlatData, RuleEngine, RuleTable, ValidationEngine};
pub use error::{RuleError, RuleResult};
pub use key::FieldKey;
pub use rule_set::{FieldRules, RuleSet, RuleSpec};
