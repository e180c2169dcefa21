use pretty_assertions::assert_eq;
use sheetflow_rules::{Constraint, FieldKey, FlatData, RuleEngine, RuleTable, ValidationEngine};
use sheetflow_types::CellValue;

fn rules(spec: &str) -> Vec<Constraint> {
    Constraint::parse_piped(spec).unwrap()
}

fn check(spec: &str, value: Option<CellValue>) -> Vec<String> {
    RuleEngine::new().check_field("test_field", value.as_ref(), &rules(spec))
}

fn text(s: &str) -> Option<CellValue> {
    Some(CellValue::from(s))
}

// ── required / nullable ──────────────────────────────────────────

#[test]
fn required_passes_with_value() {
    assert!(check("required", text("hello")).is_empty());
}

#[test]
fn required_fails_missing_field() {
    assert_eq!(check("required", None), vec!["The test field field is required."]);
}

#[test]
fn required_fails_null_and_blank() {
    assert_eq!(check("required", Some(CellValue::Null)).len(), 1);
    assert_eq!(check("required", text("")).len(), 1);
    assert_eq!(check("required", text("   ")).len(), 1);
}

#[test]
fn blank_values_skip_non_implicit_rules() {
    assert!(check("numeric|max:3", text("")).is_empty());
    assert!(check("numeric", None).is_empty());
}

#[test]
fn required_and_numeric_on_blank_reports_only_required() {
    let failures = check("required|numeric", text(""));
    assert_eq!(failures, vec!["The test field field is required."]);
}

#[test]
fn empty_cell_passes_optional_type_rules() {
    let empty = Some(CellValue::String(String::new()));
    assert!(check("numeric", empty.clone()).is_empty());
    assert!(check("date_format:Y-m-d", empty.clone()).is_empty());
    assert!(check("integer|max:3", empty).is_empty());
}

#[test]
fn explicit_null_runs_type_rules_unless_nullable() {
    assert_eq!(check("numeric", Some(CellValue::Null)).len(), 1);
    assert!(check("nullable|numeric", Some(CellValue::Null)).is_empty());
}

// ── types ────────────────────────────────────────────────────────

#[test]
fn numeric_accepts_numbers_and_numeric_strings() {
    assert!(check("numeric", text("42")).is_empty());
    assert!(check("numeric", text("-4.25")).is_empty());
    assert!(check("numeric", Some(CellValue::Float(1.5))).is_empty());
    assert_eq!(check("numeric", text("abc")), vec!["The test field field must be a number."]);
}

#[test]
fn integer_rejects_fractions_and_booleans() {
    assert!(check("integer", text("17")).is_empty());
    assert_eq!(check("integer", text("1.5")).len(), 1);
    assert_eq!(check("integer", Some(CellValue::Bool(true))).len(), 1);
}

#[test]
fn integer_rejects_leading_zeros() {
    assert_eq!(check("integer", text("012")).len(), 1);
    assert_eq!(check("integer", text("-07")).len(), 1);
    assert!(check("integer", text("0")).is_empty());
    assert!(check("integer", text("-120")).is_empty());
    assert!(check("digits:3", text("012")).is_empty());
}

#[test]
fn string_requires_text_cell() {
    assert!(check("string", text("x")).is_empty());
    assert_eq!(check("string", Some(CellValue::Integer(3))).len(), 1);
}

#[test]
fn boolean_accepts_zero_and_one() {
    for ok in [text("1"), text("0"), Some(CellValue::Bool(false)), Some(CellValue::Integer(1))] {
        assert!(check("boolean", ok).is_empty());
    }
    assert_eq!(check("boolean", text("yes")).len(), 1);
    assert_eq!(check("boolean", Some(CellValue::Integer(2))).len(), 1);
}

#[test]
fn date_and_date_format() {
    assert!(check("date", text("2024-05-01")).is_empty());
    assert_eq!(check("date", text("not a date")).len(), 1);
    assert!(check("date_format:d/m/Y", text("01/05/2024")).is_empty());
    assert_eq!(
        check("date_format:Y-m-d", text("01/05/2024")),
        vec!["The test field field must match the format Y-m-d."]
    );
}

#[test]
fn date_format_requires_exact_layout() {
    assert_eq!(check("date_format:Y-m-d", text("2024-1-5")).len(), 1);
    assert_eq!(check("date_format:Y-m-d", text(" 2024-01-05")).len(), 1);
    assert!(check("date_format:Y-m-d", text("2024-01-05")).is_empty());
}

// ── sizes ────────────────────────────────────────────────────────

#[test]
fn max_counts_characters_for_text_columns() {
    assert!(check("max:5", text("hello")).is_empty());
    assert_eq!(
        check("max:3", text("hello")),
        vec!["The test field field must not be greater than 3 characters."]
    );
}

#[test]
fn max_counts_unicode_characters_not_bytes() {
    assert!(check("max:4", text("café")).is_empty());
}

#[test]
fn max_compares_values_for_numeric_columns() {
    assert!(check("numeric|max:120", text("99")).is_empty());
    assert_eq!(
        check("numeric|max:120", text("121")),
        vec!["The test field field must not be greater than 120."]
    );
}

#[test]
fn min_for_numeric_and_text() {
    assert_eq!(check("integer|min:18", text("17")), vec!["The test field field must be at least 18."]);
    assert!(check("min:2", text("ab")).is_empty());
}

#[test]
fn digits_requires_exact_count() {
    assert!(check("digits:4", text("0123")).is_empty());
    assert_eq!(check("digits:4", text("123")).len(), 1);
    assert_eq!(check("digits:4", text("12a4")).len(), 1);
}

// ── membership / patterns / custom ───────────────────────────────

#[test]
fn in_checks_membership() {
    assert!(check("in:L,P", text("L")).is_empty());
    assert_eq!(check("in:L,P", text("X")), vec!["The selected test field is invalid."]);
}

#[test]
fn regex_with_flags() {
    let constraints = vec![Constraint::parse("regex:/^[a-z]+$/i").unwrap()];
    let engine = RuleEngine::new();
    assert!(engine.check_field("code", Some(&CellValue::from("AbC")), &constraints).is_empty());
    assert_eq!(engine.check_field("code", Some(&CellValue::from("Ab1")), &constraints).len(), 1);
}

#[test]
fn unregistered_custom_rule_passes() {
    assert!(check("uuid", text("definitely-not-a-uuid")).is_empty());
}

#[test]
fn registered_custom_rule_is_applied() {
    let engine = RuleEngine::new().with_rule("starts_with", |value, param| {
        value.to_text().starts_with(param.unwrap_or_default())
    });
    let constraints = rules("starts_with:ID-");
    assert!(engine.check_field("code", Some(&CellValue::from("ID-7")), &constraints).is_empty());
    assert_eq!(
        engine.check_field("code", Some(&CellValue::from("XX-7")), &constraints),
        vec!["The code field is invalid."]
    );
}

#[test]
fn all_failing_rules_are_reported_in_order() {
    let failures = check("integer|numeric|max:2", text("abc"));
    assert_eq!(
        failures,
        vec![
            "The test field field must be an integer.",
            "The test field field must be a number.",
            // numeric column, so max reports the numeric form
            "The test field field must not be greater than 2.",
        ]
    );
}

// ── messages / attributes ────────────────────────────────────────

#[test]
fn column_specific_message_wins_over_rule_message() {
    let engine = RuleEngine::new().with_messages([
        ("required", "Please fill :attribute."),
        ("age.required", "Age is mandatory."),
    ]);
    let constraints = rules("required");
    assert_eq!(engine.check_field("age", None, &constraints), vec!["Age is mandatory."]);
    assert_eq!(engine.check_field("name", None, &constraints), vec!["Please fill name."]);
}

#[test]
fn attributes_rename_columns_in_messages() {
    let engine = RuleEngine::new().with_attributes([("nik", "National ID")]);
    assert_eq!(
        engine.check_field("nik", Some(&CellValue::from("12")), &rules("digits:16")),
        vec!["The National ID field must be 16 digits."]
    );
}

#[test]
fn message_placeholders_are_filled() {
    let engine = RuleEngine::new().with_messages([
        ("in", ":value is not one of :values"),
        ("max", ":attribute over :max (:param)"),
    ]);
    assert_eq!(
        engine.check_field("g", Some(&CellValue::from("X")), &rules("in:L,P")),
        vec!["X is not one of L, P"]
    );
    assert_eq!(
        engine.check_field("g", Some(&CellValue::from("long")), &rules("max:2")),
        vec!["g over 2 (2)"]
    );
}

// ── table check ──────────────────────────────────────────────────

#[test]
fn table_check_reports_failing_cells_in_table_order() {
    let age = rules("required|numeric");
    let row0 = CellValue::from("30");
    let row2 = CellValue::from("abc");

    let mut data = FlatData::new();
    data.insert(FieldKey::new(0, "age"), &row0);
    data.insert(FieldKey::new(2, "age"), &row2);

    let table: RuleTable<'_> = (0..3).map(|row| (FieldKey::new(row, "age"), age.as_slice())).collect();

    let failures = RuleEngine::new().check(&data, &table).unwrap_err();
    assert_eq!(
        failures,
        vec![
            (FieldKey::new(1, "age"), vec!["The age field is required.".to_string()]),
            (FieldKey::new(2, "age"), vec!["The age field must be a number.".to_string()]),
        ]
    );
}

#[test]
fn table_check_passes_when_clean() {
    let value = CellValue::from("x");
    let required = rules("required");
    let mut data = FlatData::new();
    data.insert(FieldKey::new(0, "a"), &value);
    let table: RuleTable<'_> = vec![(FieldKey::new(0, "a"), required.as_slice())];
    assert!(RuleEngine::new().check(&data, &table).is_ok());
}
