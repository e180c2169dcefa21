use crate::Record;

/// An ordered group of records handed to validation and the sink as one unit.
///
/// `number` is the 0-based position of the batch within one import and
/// `first_row` the 0-based stream offset of its first record, so that
/// `first_row + i` locates record `i` in the source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    number: usize,
    first_row: usize,
    records: Vec<Record>,
}

impl Batch {
    pub fn new(number: usize, first_row: usize, records: Vec<Record>) -> Self {
        Self {
            number,
            first_row,
            records,
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn first_row(&self) -> usize {
        self.first_row
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
