//! Property-based tests for batching.

mod common;

use common::{people, stream, FakeSink};
use proptest::prelude::*;
use sheetflow_import::{import_records, ImportJob};
use sheetflow_types::CellValue;
use std::cell::RefCell;

proptest! {
    #[test]
    fn batch_count_is_rows_divided_by_size_rounded_up(rows in 0usize..300, size in 1usize..64) {
        let sizes = RefCell::new(Vec::new());
        let mut job = ImportJob::builder()
            .batch_size(size)
            .handle(|batch| {
                sizes.borrow_mut().push(batch.len());
                Ok(())
            })
            .build()
            .unwrap();

        let summary = import_records(stream(people(rows)), &mut job).unwrap();
        drop(job);
        let sizes = sizes.into_inner();

        prop_assert_eq!(sizes.len(), rows.div_ceil(size));
        prop_assert_eq!(summary.batches, sizes.len());
        prop_assert_eq!(sizes.iter().sum::<usize>(), rows);
        if let Some((last, full)) = sizes.split_last() {
            prop_assert!(full.iter().all(|&n| n == size));
            prop_assert!(*last >= 1 && *last <= size);
        }
    }

    #[test]
    fn rollback_keeps_exactly_the_committed_batches(
        rows in 1usize..120,
        size in 1usize..16,
        fail_batch in 0usize..10,
        fail_row in 0usize..16,
    ) {
        let batches = rows.div_ceil(size);
        let last_len = rows - (batches - 1) * size;
        let batch_len = if fail_batch + 1 == batches { last_len } else { size };
        let fails = fail_batch < batches && fail_row < batch_len;

        let mut sink = FakeSink::failing(fail_batch, fail_row);
        let mut job = ImportJob::builder()
            .batch_size(size)
            .transactional_sink(&mut sink)
            .build()
            .unwrap();
        let result = import_records(stream(people(rows)), &mut job);
        drop(job);

        if fails {
            prop_assert!(result.is_err());
            prop_assert_eq!(sink.store.committed.len(), fail_batch * size);
            prop_assert_eq!(sink.store.rollbacks, 1);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(sink.store.committed.len(), rows);
        }

        let ids: Vec<CellValue> = sink.store.committed.iter().filter_map(|r| r.get("id").cloned()).collect();
        let expected: Vec<CellValue> = (1..=ids.len() as i64).map(CellValue::Integer).collect();
        prop_assert_eq!(ids, expected);
    }
}
