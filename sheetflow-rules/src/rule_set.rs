//! Per-column rule collections.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

use crate::constraint::Constraint;
use crate::error::{RuleError, RuleResult};

/// Rules for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRules {
    pub column: String,
    pub constraints: Vec<Constraint>,
}

/// Column → constraint list, in declaration order.
///
/// Declaration order is the order failures are reported in for each row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    fields: Vec<FieldRules>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: sets the constraints for `column`, replacing any earlier entry.
    #[must_use]
    pub fn field(mut self, column: impl Into<String>, constraints: Vec<Constraint>) -> Self {
        self.set(column, constraints);
        self
    }

    /// Builder-style: parses `rules` (pipe string) for `column`.
    pub fn rule(self, column: impl Into<String>, rules: &str) -> RuleResult<Self> {
        let column = column.into();
        let constraints = parse_spec(&column, &RuleSpec::Piped(rules.to_string()))?;
        Ok(self.field(column, constraints))
    }

    /// Builds a rule set from `(column, spec)` pairs.
    pub fn from_specs<K, I>(specs: I) -> RuleResult<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RuleSpec)>,
    {
        let mut set = Self::new();
        for (column, spec) in specs {
            let column = column.into();
            let constraints = parse_spec(&column, &spec)?;
            set.set(column, constraints);
        }
        Ok(set)
    }

    pub fn set(&mut self, column: impl Into<String>, constraints: Vec<Constraint>) {
        let column = column.into();
        match self.fields.iter_mut().find(|f| f.column == column) {
            Some(existing) => existing.constraints = constraints,
            None => self.fields.push(FieldRules {
                column,
                constraints,
            }),
        }
    }

    pub fn get(&self, column: &str) -> Option<&[Constraint]> {
        self.fields
            .iter()
            .find(|f| f.column == column)
            .map(|f| f.constraints.as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.column.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldRules> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a FieldRules;
    type IntoIter = std::slice::Iter<'a, FieldRules>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// How one column's rules are written in a job file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    /// `"required|numeric|max:120"`
    Piped(String),
    /// `["required", "regex:/^(a|b)$/"]`
    List(Vec<String>),
}

impl From<&str> for RuleSpec {
    fn from(s: &str) -> Self {
        Self::Piped(s.to_string())
    }
}

impl From<Vec<&str>> for RuleSpec {
    fn from(rules: Vec<&str>) -> Self {
        Self::List(rules.into_iter().map(str::to_string).collect())
    }
}

fn parse_spec(column: &str, spec: &RuleSpec) -> RuleResult<Vec<Constraint>> {
    match spec {
        RuleSpec::Piped(rules) => Constraint::parse_piped(rules),
        RuleSpec::List(rules) => rules
            .iter()
            .map(|rule| {
                if rule.trim().is_empty() {
                    Err(RuleError::EmptyRule {
                        column: column.to_string(),
                    })
                } else {
                    Constraint::parse(rule)
                }
            })
            .collect(),
    }
}

// Deserialized from a map of column → spec, keeping document order.
impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuleSetVisitor;

        impl<'de> Visitor<'de> for RuleSetVisitor {
            type Value = RuleSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column names to rule strings or rule lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RuleSet, A::Error> {
                let mut set = RuleSet::new();
                while let Some((column, spec)) = map.next_entry::<String, RuleSpec>()? {
                    let constraints = parse_spec(&column, &spec).map_err(de::Error::custom)?;
                    set.set(column, constraints);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(RuleSetVisitor)
    }
}
