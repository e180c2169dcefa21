use std::fmt;

/// Composite address of one cell inside a batch.
///
/// Kept structured so column names containing `.` never need to be split
/// back out of a string key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    /// 0-based, batch-relative row index.
    pub row: usize,
    pub column: String,
}

impl FieldKey {
    pub fn new(row: usize, column: impl Into<String>) -> Self {
        Self {
            row,
            column: column.into(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.row, self.column)
    }
}
