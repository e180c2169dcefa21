//! Parsed rule kinds.

use regex_lite::Regex;
use std::fmt;

use crate::error::{RuleError, RuleResult};

/// A single validation constraint attached to a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Value must be present and not blank.
    Required,
    /// An explicit null skips every other constraint on the column.
    Nullable,
    String,
    Integer,
    Numeric,
    /// `true`, `false`, `1`, `0`, `"1"` or `"0"`.
    Boolean,
    /// Any recognisable calendar date.
    Date,
    /// Date written in the given PHP-style format, e.g. `Y-m-d`.
    DateFormat(String),
    /// Upper bound: numeric value when the column is numeric, otherwise character count.
    Max(f64),
    /// Lower bound, same sizing as [`Constraint::Max`].
    Min(f64),
    /// Exactly `n` ASCII digits.
    Digits(usize),
    /// Membership in a fixed list of values.
    In(Vec<String>),
    Regex(Pattern),
    /// A rule kind this crate does not interpret. Passes unless a predicate
    /// is registered for `name` on the engine.
    Custom { name: String, param: Option<String> },
}

impl Constraint {
    /// Parses one rule such as `required`, `max:255` or `in:a,b,c`.
    ///
    /// Rule names are case-insensitive. The parameter is everything after the
    /// first `:`, so regex patterns may contain further colons.
    pub fn parse(rule: &str) -> RuleResult<Self> {
        let rule = rule.trim();
        let (name, param) = match rule.split_once(':') {
            Some((name, param)) => (name.trim().to_ascii_lowercase(), Some(param)),
            None => (rule.to_ascii_lowercase(), None),
        };

        let constraint = match name.as_str() {
            "required" => Self::Required,
            "nullable" => Self::Nullable,
            "string" => Self::String,
            "integer" => Self::Integer,
            "numeric" => Self::Numeric,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "date_format" => Self::DateFormat(required_param(&name, param)?.to_string()),
            "max" => Self::Max(number_param(&name, param)?),
            "min" => Self::Min(number_param(&name, param)?),
            "digits" => {
                let raw = required_param(&name, param)?;
                let digits = raw.trim().parse::<usize>().map_err(|e| RuleError::InvalidParameter {
                    rule: name.clone(),
                    param: raw.to_string(),
                    reason: e.to_string(),
                })?;
                Self::Digits(digits)
            }
            "in" => Self::In(
                required_param(&name, param)?
                    .split(',')
                    .map(str::to_string)
                    .collect(),
            ),
            "regex" => Self::Regex(Pattern::new(required_param(&name, param)?)?),
            _ => Self::Custom {
                name,
                param: param.map(str::to_string),
            },
        };
        Ok(constraint)
    }

    /// Parses a pipe separated rule string, e.g. `required|numeric|max:120`.
    pub fn parse_piped(rules: &str) -> RuleResult<Vec<Self>> {
        rules
            .split('|')
            .filter(|rule| !rule.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    /// Rule name as written in rule strings and message keys.
    pub fn name(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Nullable => "nullable",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateFormat(_) => "date_format",
            Self::Max(_) => "max",
            Self::Min(_) => "min",
            Self::Digits(_) => "digits",
            Self::In(_) => "in",
            Self::Regex(_) => "regex",
            Self::Custom { name, .. } => name,
        }
    }

    /// Parameter as written in rule strings.
    pub fn param(&self) -> Option<String> {
        match self {
            Self::DateFormat(format) => Some(format.clone()),
            Self::Max(n) | Self::Min(n) => Some(format_number(*n)),
            Self::Digits(n) => Some(n.to_string()),
            Self::In(values) => Some(values.join(",")),
            Self::Regex(pattern) => Some(pattern.source().to_string()),
            Self::Custom { param, .. } => param.clone(),
            _ => None,
        }
    }

    /// Whether the constraint is evaluated even when the value is missing or blank.
    pub fn is_implicit(&self) -> bool {
        matches!(self, Self::Required)
    }

    /// Whether the constraint makes `max`/`min` compare numeric values.
    pub fn is_numeric_kind(&self) -> bool {
        matches!(self, Self::Numeric | Self::Integer)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.param() {
            Some(param) => write!(f, "{}:{}", self.name(), param),
            None => f.write_str(self.name()),
        }
    }
}

/// A compiled `regex:` pattern that remembers how it was written.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source`, accepting the delimited `/body/flags` form.
    pub fn new(source: &str) -> RuleResult<Self> {
        let translated = strip_delimiters(source);
        let regex = Regex::new(&translated).map_err(|e| RuleError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// `/^[a-z]+$/i` → `(?i)^[a-z]+$`. Undelimited patterns are used as-is.
fn strip_delimiters(source: &str) -> String {
    let Some(rest) = source.strip_prefix('/') else {
        return source.to_string();
    };
    let Some(end) = rest.rfind('/') else {
        return source.to_string();
    };
    let (body, flags) = (&rest[..end], &rest[end + 1..]);
    let flags: String = flags
        .chars()
        .filter(|c| matches!(c, 'i' | 'm' | 's' | 'x'))
        .collect();
    if flags.is_empty() {
        body.to_string()
    } else {
        format!("(?{flags}){body}")
    }
}

fn required_param<'a>(rule: &str, param: Option<&'a str>) -> RuleResult<&'a str> {
    match param {
        Some(p) if !p.trim().is_empty() => Ok(p),
        _ => Err(RuleError::MissingParameter {
            rule: rule.to_string(),
        }),
    }
}

fn number_param(rule: &str, param: Option<&str>) -> RuleResult<f64> {
    let raw = required_param(rule, param)?;
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| RuleError::InvalidParameter {
            rule: rule.to_string(),
            param: raw.to_string(),
            reason: "not a number".to_string(),
        })
}

/// Renders `5.0` as `5` and `2.5` as `2.5`.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
