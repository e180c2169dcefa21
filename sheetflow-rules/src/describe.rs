//! Human-readable rule descriptions for upload forms and `sheetflow rules`.

use crate::constraint::{format_number, Constraint};
use crate::rule_set::RuleSet;

/// Shown when a job declares no rules.
pub const NO_RULES_DESCRIPTION: &str = "_No import-specific rules._";

/// Maximum `in:` options listed before the list is cut short.
const MAX_LISTED_OPTIONS: usize = 5;

/// Renders one markdown line per column: `**age**: required, must be a number`.
pub fn describe_rules(rules: &RuleSet) -> String {
    if rules.is_empty() {
        return NO_RULES_DESCRIPTION.to_string();
    }

    rules
        .iter()
        .map(|field| {
            let described: Vec<String> =
                field.constraints.iter().map(describe_constraint).collect();
            format!("**{}**: {}", field.column, described.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Describes a single constraint in plain words.
pub fn describe_constraint(constraint: &Constraint) -> String {
    match constraint {
        Constraint::Required => "required".to_string(),
        Constraint::Nullable => "may be empty".to_string(),
        Constraint::String => "must be text".to_string(),
        Constraint::Integer => "must be a whole number".to_string(),
        Constraint::Numeric => "must be a number".to_string(),
        Constraint::Boolean => "must be 1 (yes) or 0 (no)".to_string(),
        Constraint::Date => "must be a date".to_string(),
        Constraint::DateFormat(format) => format!("date format must be '{format}'"),
        Constraint::Max(n) => format!("at most {} characters", format_number(*n)),
        Constraint::Min(n) => format!("at least {}", format_number(*n)),
        Constraint::Digits(n) => format!("{n} digits"),
        Constraint::In(options) => {
            let mut shown = options
                .iter()
                .take(MAX_LISTED_OPTIONS)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            if options.len() > MAX_LISTED_OPTIONS {
                shown.push_str(", etc.");
            }
            format!("must be one of: {shown}")
        }
        Constraint::Regex(_) => "must match a specific pattern".to_string(),
        Constraint::Custom { name, param } => match param {
            Some(param) => format!("{name}: {param}"),
            None => name.clone(),
        },
    }
}
