//! Rule evaluator. Pure logic, no I/O.
//!
//! The engine sees a batch as two flat tables keyed by [`FieldKey`]: the cell
//! values and the constraints that apply to each cell. One call checks every
//! cell of the batch.

use std::collections::HashMap;
use std::fmt;

use sheetflow_types::CellValue;

use crate::constraint::Constraint;
use crate::date;
use crate::key::FieldKey;

/// Flattened cell values of a batch. Absent keys are missing cells.
pub type FlatData<'a> = HashMap<FieldKey, &'a CellValue>;

/// Constraints per cell, in the order failures should be reported.
pub type RuleTable<'a> = Vec<(FieldKey, &'a [Constraint])>;

/// Failure messages per cell, in rule table order.
pub type FieldFailures = Vec<(FieldKey, Vec<String>)>;

/// Predicate backing a custom rule kind: `(value, param) -> passes`.
pub type CustomRule = Box<dyn Fn(&CellValue, Option<&str>) -> bool + Send + Sync>;

/// Evaluates a rule table against flattened batch data.
pub trait ValidationEngine {
    /// Returns `Err` with every failing cell and its messages, or `Ok` when
    /// every constraint passes.
    fn check(&self, data: &FlatData<'_>, table: &RuleTable<'_>) -> Result<(), FieldFailures>;
}

/// Default [`ValidationEngine`] with per-job message and attribute overrides.
#[derive(Default)]
pub struct RuleEngine {
    messages: HashMap<String, String>,
    attributes: HashMap<String, String>,
    custom: HashMap<String, CustomRule>,
}

impl fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut custom: Vec<&String> = self.custom.keys().collect();
        custom.sort();
        f.debug_struct("RuleEngine")
            .field("messages", &self.messages)
            .field("attributes", &self.attributes)
            .field("custom", &custom)
            .finish()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message overrides keyed by `column.rule` (most specific) or `rule`.
    ///
    /// Messages may use `:attribute`, `:value` and the rule's parameter
    /// placeholder (`:max`, `:min`, `:digits`, `:format`, `:values`, `:param`).
    #[must_use]
    pub fn with_messages<K, V, I>(mut self, messages: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.messages
            .extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Display names used for `:attribute`, keyed by column.
    #[must_use]
    pub fn with_attributes<K, V, I>(mut self, attributes: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Registers a predicate for a custom rule kind such as `starts_with:ID`.
    #[must_use]
    pub fn with_rule<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&CellValue, Option<&str>) -> bool + Send + Sync + 'static,
    {
        self.custom
            .insert(name.into().to_ascii_lowercase(), Box::new(predicate));
        self
    }

    /// Checks one cell against its constraints and returns every failure message.
    pub fn check_field(
        &self,
        column: &str,
        value: Option<&CellValue>,
        constraints: &[Constraint],
    ) -> Vec<String> {
        let nullable = constraints.iter().any(|c| matches!(c, Constraint::Nullable));
        let numeric = constraints.iter().any(Constraint::is_numeric_kind);

        constraints
            .iter()
            .filter(|c| should_run(c, value, nullable))
            .filter(|c| !self.passes(c, value, numeric))
            .map(|c| self.message(column, c, value, numeric))
            .collect()
    }

    /// Display name for a column.
    pub fn attribute(&self, column: &str) -> String {
        self.attributes
            .get(column)
            .cloned()
            .unwrap_or_else(|| column.replace('_', " "))
    }

    fn passes(&self, constraint: &Constraint, value: Option<&CellValue>, numeric: bool) -> bool {
        let Some(value) = value else {
            // Only implicit rules reach here without a value.
            return !constraint.is_implicit();
        };

        match constraint {
            Constraint::Required => !value.is_blank(),
            Constraint::Nullable => true,
            Constraint::String => matches!(value, CellValue::String(_)),
            Constraint::Integer => is_integer(value),
            Constraint::Numeric => value.as_f64().is_some(),
            Constraint::Boolean => is_boolean(value),
            Constraint::Date => value.as_str().is_some_and(date::is_date),
            Constraint::DateFormat(format) => value
                .as_str()
                .is_some_and(|text| date::matches_format(text, format)),
            Constraint::Max(max) => size_of(value, numeric).is_some_and(|size| size <= *max),
            Constraint::Min(min) => size_of(value, numeric).is_some_and(|size| size >= *min),
            Constraint::Digits(n) => {
                let text = value.to_text();
                text.len() == *n && text.bytes().all(|b| b.is_ascii_digit())
            }
            Constraint::In(allowed) => {
                let text = value.to_text();
                allowed.iter().any(|candidate| *candidate == text)
            }
            Constraint::Regex(pattern) => match value {
                CellValue::String(s) => pattern.is_match(s),
                CellValue::Integer(_) | CellValue::Float(_) => pattern.is_match(&value.to_text()),
                _ => false,
            },
            Constraint::Custom { name, param } => match self.custom.get(name.as_str()) {
                Some(predicate) => predicate(value, param.as_deref()),
                None => true,
            },
        }
    }

    fn message(
        &self,
        column: &str,
        constraint: &Constraint,
        value: Option<&CellValue>,
        numeric: bool,
    ) -> String {
        let rule = constraint.name();
        let template = self
            .messages
            .get(&format!("{column}.{rule}"))
            .or_else(|| self.messages.get(rule))
            .cloned()
            .unwrap_or_else(|| default_message(constraint, numeric).to_string());

        let mut message = template.replace(":attribute", &self.attribute(column));
        let placeholder = match constraint {
            Constraint::Max(_) => Some(":max"),
            Constraint::Min(_) => Some(":min"),
            Constraint::Digits(_) => Some(":digits"),
            Constraint::DateFormat(_) => Some(":format"),
            _ => None,
        };
        if let Some(placeholder) = placeholder {
            message = message.replace(placeholder, &constraint.param().unwrap_or_default());
        }
        if let Constraint::In(values) = constraint {
            message = message.replace(":values", &values.join(", "));
        }
        if let Some(param) = constraint.param() {
            message = message.replace(":param", &param);
        }

        // Last, so `:values` is never read as `:value` + "s".
        let value_text = value.map_or_else(|| "NULL".to_string(), ToString::to_string);
        message.replace(":value", &value_text)
    }
}

impl ValidationEngine for RuleEngine {
    fn check(&self, data: &FlatData<'_>, table: &RuleTable<'_>) -> Result<(), FieldFailures> {
        let failures: FieldFailures = table
            .iter()
            .filter_map(|(key, constraints)| {
                let value = data.get(key).copied();
                let messages = self.check_field(&key.column, value, constraints);
                (!messages.is_empty()).then(|| (key.clone(), messages))
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            tracing::debug!(cells = failures.len(), "rule table check failed");
            Err(failures)
        }
    }
}

/// Missing and blank values only run implicit rules; an explicit null skips
/// everything when the column is nullable.
fn should_run(constraint: &Constraint, value: Option<&CellValue>, nullable: bool) -> bool {
    if constraint.is_implicit() {
        return true;
    }
    if matches!(constraint, Constraint::Nullable) {
        return false;
    }
    match value {
        None => false,
        Some(CellValue::Null) => !nullable,
        Some(CellValue::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Integers as PHP's `FILTER_VALIDATE_INT` reads them: no leading zeros.
fn is_integer(value: &CellValue) -> bool {
    match value {
        CellValue::Bool(_) => false,
        CellValue::String(s) => {
            let digits = s.trim().trim_start_matches(['+', '-']);
            let leading_zero = digits.len() > 1 && digits.starts_with('0');
            !leading_zero && value.as_i64().is_some()
        }
        other => other.as_i64().is_some(),
    }
}

fn is_boolean(value: &CellValue) -> bool {
    match value {
        CellValue::Bool(_) => true,
        CellValue::Integer(i) => *i == 0 || *i == 1,
        CellValue::String(s) => matches!(s.as_str(), "0" | "1"),
        _ => false,
    }
}

fn size_of(value: &CellValue, numeric: bool) -> Option<f64> {
    if numeric {
        if let Some(n) = value.as_f64() {
            return Some(n);
        }
    }
    match value {
        CellValue::Null => None,
        other => Some(other.to_text().chars().count() as f64),
    }
}

fn default_message(constraint: &Constraint, numeric: bool) -> &'static str {
    match constraint {
        Constraint::Required => "The :attribute field is required.",
        Constraint::Nullable => "The :attribute field is invalid.",
        Constraint::String => "The :attribute field must be a string.",
        Constraint::Integer => "The :attribute field must be an integer.",
        Constraint::Numeric => "The :attribute field must be a number.",
        Constraint::Boolean => "The :attribute field must be true or false.",
        Constraint::Date => "The :attribute field must be a valid date.",
        Constraint::DateFormat(_) => "The :attribute field must match the format :format.",
        Constraint::Max(_) if numeric => "The :attribute field must not be greater than :max.",
        Constraint::Max(_) => "The :attribute field must not be greater than :max characters.",
        Constraint::Min(_) if numeric => "The :attribute field must be at least :min.",
        Constraint::Min(_) => "The :attribute field must be at least :min characters.",
        Constraint::Digits(_) => "The :attribute field must be :digits digits.",
        Constraint::In(_) => "The selected :attribute is invalid.",
        Constraint::Regex(_) => "The :attribute field format is invalid.",
        Constraint::Custom { .. } => "The :attribute field is invalid.",
    }
}
