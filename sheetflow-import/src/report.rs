//! User-facing summaries of an import outcome.

use std::fmt;

use crate::error::{ImportError, ImportResult, ValidationError};
use crate::importer::ImportSummary;

/// Validation messages listed before the rest are counted.
pub const DEFAULT_ERROR_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Danger,
}

/// Title and body shown to whoever started the import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub body: Option<String>,
    /// Failures stay on screen until dismissed.
    pub persistent: bool,
}

impl Notification {
    pub fn from_outcome(outcome: &ImportResult<ImportSummary>) -> Self {
        match outcome {
            Ok(summary) => Self {
                level: NotificationLevel::Success,
                title: "Import succeeded".to_string(),
                body: Some(format!(
                    "Imported {} row(s) in {} batch(es).",
                    summary.rows, summary.batches
                )),
                persistent: false,
            },
            Err(ImportError::Validation(err)) => Self {
                level: NotificationLevel::Danger,
                title: "Import validation failed".to_string(),
                body: Some(summarize_errors(&err.errors, DEFAULT_ERROR_LIMIT)),
                persistent: true,
            },
            Err(err) => Self {
                level: NotificationLevel::Danger,
                title: "Import failed".to_string(),
                body: Some(err.to_string()),
                persistent: true,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.level == NotificationLevel::Success
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)?;
        if let Some(body) = &self.body {
            write!(f, "\n\n{body}")?;
        }
        Ok(())
    }
}

/// Lists the first `limit` errors, then how many were left out.
pub fn summarize_errors(errors: &[ValidationError], limit: usize) -> String {
    let mut parts: Vec<String> = errors.iter().take(limit).map(ToString::to_string).collect();
    if errors.len() > limit {
        parts.push(format!("... and {} more errors.", errors.len() - limit));
    }
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BatchValidationError;
    use sheetflow_types::CellValue;

    fn error(row: usize) -> ValidationError {
        ValidationError {
            row,
            column: "age".to_string(),
            value: CellValue::from("abc"),
            message: "The age field must be a number.".to_string(),
        }
    }

    #[test]
    fn truncates_after_limit() {
        let errors: Vec<_> = (1..=8).map(error).collect();
        let body = summarize_errors(&errors, 5);

        assert_eq!(body.matches("must be a number").count(), 5);
        assert!(body.ends_with("... and 3 more errors."));
        assert!(!body.contains("in row 6"));
    }

    #[test]
    fn exact_limit_has_no_tail() {
        let errors: Vec<_> = (1..=5).map(error).collect();
        assert!(!summarize_errors(&errors, 5).contains("more errors"));
    }

    #[test]
    fn validation_failure_is_persistent_danger() {
        let outcome = Err(ImportError::Validation(BatchValidationError {
            batch: 0,
            first_row: 0,
            errors: vec![error(2)],
        }));
        let note = Notification::from_outcome(&outcome);

        assert_eq!(note.level, NotificationLevel::Danger);
        assert!(note.persistent);
        assert_eq!(
            note.body.as_deref(),
            Some("The age field must be a number. for value (abc) in column age, in row 2")
        );
    }

    #[test]
    fn success_reports_counts() {
        let note = Notification::from_outcome(&Ok(ImportSummary { batches: 3, rows: 2500 }));
        assert!(note.is_success());
        assert_eq!(note.to_string(), "Import succeeded\n\nImported 2500 row(s) in 3 batch(es).");
    }
}
