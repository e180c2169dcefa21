//! Batch validation.

use sheetflow_rules::{FieldKey, FlatData, RuleSet, RuleTable, ValidationEngine};
use sheetflow_types::{Batch, CellValue};

use crate::error::ValidationError;

/// Checks every record of `batch` against `rules` in one engine call.
///
/// Errors come back row by row, and within a row in rule declaration order.
/// Rows are numbered from 1 within the batch; a missing cell reports `Null`.
pub fn validate_batch(
    batch: &Batch,
    rules: &RuleSet,
    engine: &dyn ValidationEngine,
) -> Result<(), Vec<ValidationError>> {
    if rules.is_empty() || batch.is_empty() {
        return Ok(());
    }

    let mut data = FlatData::with_capacity(batch.len() * rules.len());
    let mut table = RuleTable::with_capacity(batch.len() * rules.len());
    for (row, record) in batch.iter().enumerate() {
        for field in rules {
            let key = FieldKey::new(row, field.column.as_str());
            if let Some(value) = record.get(&field.column) {
                data.insert(key.clone(), value);
            }
            table.push((key, field.constraints.as_slice()));
        }
    }

    engine.check(&data, &table).map_err(|failures| {
        failures
            .into_iter()
            .flat_map(|(key, messages)| {
                let value = batch
                    .get(key.row)
                    .and_then(|record| record.get(&key.column))
                    .cloned()
                    .unwrap_or(CellValue::Null);
                messages.into_iter().map(move |message| ValidationError {
                    row: key.row + 1,
                    column: key.column.clone(),
                    value: value.clone(),
                    message,
                })
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetflow_rules::RuleEngine;
    use sheetflow_types::Record;

    #[test]
    fn empty_rules_accept_anything() {
        let batch = Batch::new(0, 0, vec![Record::new().with("age", "abc")]);
        let result = validate_batch(&batch, &RuleSet::new(), &RuleEngine::new());
        assert!(result.is_ok());
    }

    #[test]
    fn missing_cell_reports_null() {
        let rules = RuleSet::new().rule("age", "required").unwrap();
        let batch = Batch::new(0, 0, vec![Record::new().with("name", "Ani")]);

        let errors = validate_batch(&batch, &rules, &RuleEngine::new()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row, 1);
        assert_eq!(errors[0].value, CellValue::Null);
        assert_eq!(
            errors[0].to_string(),
            "The age field is required. for value (NULL) in column age, in row 1"
        );
    }
}
