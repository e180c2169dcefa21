use pretty_assertions::assert_eq;
use sheetflow_io::{export_records, export_template, open_records, ReaderOptions, WriteError};
use sheetflow_types::{CellValue, Record};
use tempfile::TempDir;

#[test]
fn exports_header_from_first_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exports").join("people.csv");
    let records = vec![
        Record::new().with("name", "Ani").with("age", 30i64),
        Record::new().with("name", "Budi").with("age", CellValue::Null),
    ];

    let summary = export_records(records, &path).unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.columns, vec!["name", "age"]);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "name,age\nAni,30\nBudi,\n");
}

#[test]
fn later_records_fill_missing_columns_with_blanks() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    let records = vec![
        Record::new().with("a", "1").with("b", "2"),
        Record::new().with("b", "3").with("c", "ignored"),
    ];
    export_records(records, &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n1,2\n,3\n");
}

#[test]
fn exported_file_reads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("round.tsv");
    let records = vec![Record::new().with("city", "Bandung, Jawa Barat").with("flag", true)];
    export_records(records, &path).unwrap();

    let read: Vec<Record> = open_records(&path, &ReaderOptions::default())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        read,
        vec![Record::new().with("city", "Bandung, Jawa Barat").with("flag", "1")]
    );
}

#[test]
fn no_records_writes_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("none.csv");
    let summary = export_records(Vec::new(), &path).unwrap();
    assert_eq!(summary.rows, 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn xlsx_export_reads_back_through_the_reader() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exports/people.xlsx");
    let records = vec![
        Record::new().with("name", "Ani").with("age", 30i64).with("active", true),
        Record::new().with("name", "Budi").with("age", CellValue::Null).with("active", false),
        Record::new().with("name", "Cici").with("age", 1.5).with("active", true),
    ];

    let summary = export_records(records, &path).unwrap();
    assert_eq!(summary.rows, 3);

    let read: Vec<Record> = open_records(&path, &ReaderOptions::default())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        read,
        vec![
            Record::new().with("name", "Ani").with("age", 30.0).with("active", true),
            Record::new().with("name", "Budi").with("age", "").with("active", false),
            Record::new().with("name", "Cici").with("age", 1.5).with("active", true),
        ]
    );
}

#[test]
fn xlsx_template_has_header_row_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("template.xlsx");
    export_template(&["name", "age"], &path).unwrap();

    let stream = open_records(&path, &ReaderOptions::default()).unwrap();
    assert_eq!(stream.headers(), &["name", "age"]);
    assert_eq!(stream.count(), 0);
}

#[test]
fn other_workbook_formats_are_unsupported() {
    let dir = TempDir::new().unwrap();
    let err = export_records(Vec::new(), dir.path().join("out.ods")).unwrap_err();
    assert!(matches!(err, WriteError::UnsupportedFormat(_)));
    let err = export_records(Vec::new(), dir.path().join("out.pdf")).unwrap_err();
    assert!(matches!(err, WriteError::UnsupportedFormat(_)));
}

#[test]
fn template_contains_only_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("template.csv");
    let summary = export_template(&["name", "age", "gender"], &path).unwrap();
    assert_eq!(summary.rows, 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "name,age,gender\n");
}
