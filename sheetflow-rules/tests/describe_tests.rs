use pretty_assertions::assert_eq;
use sheetflow_rules::{describe_constraint, describe_rules, Constraint, RuleSet, NO_RULES_DESCRIPTION};

#[test]
fn empty_rule_set_has_placeholder_text() {
    assert_eq!(describe_rules(&RuleSet::new()), NO_RULES_DESCRIPTION);
}

#[test]
fn one_line_per_column() {
    let rules = RuleSet::new()
        .rule("name", "required|string|max:100")
        .unwrap()
        .rule("birth_date", "nullable|date_format:Y-m-d")
        .unwrap();
    assert_eq!(
        describe_rules(&rules),
        "**name**: required, must be text, at most 100 characters\n\
         **birth_date**: may be empty, date format must be 'Y-m-d'"
    );
}

#[test]
fn long_option_lists_are_truncated() {
    let constraint = Constraint::parse("in:a,b,c,d,e,f,g").unwrap();
    assert_eq!(describe_constraint(&constraint), "must be one of: a, b, c, d, e, etc.");
}

#[test]
fn short_option_lists_are_complete() {
    let constraint = Constraint::parse("in:L,P").unwrap();
    assert_eq!(describe_constraint(&constraint), "must be one of: L, P");
}

#[test]
fn custom_rules_render_name_and_param() {
    assert_eq!(
        describe_constraint(&Constraint::parse("starts_with:ID").unwrap()),
        "starts_with: ID"
    );
    assert_eq!(describe_constraint(&Constraint::parse("uuid").unwrap()), "uuid");
}

#[test]
fn remaining_kinds() {
    let described: Vec<String> = Constraint::parse_piped("integer|numeric|boolean|date|min:3|digits:16|regex:/x/")
        .unwrap()
        .iter()
        .map(describe_constraint)
        .collect();
    assert_eq!(
        described,
        vec![
            "must be a whole number",
            "must be a number",
            "must be 1 (yes) or 0 (no)",
            "must be a date",
            "at least 3",
            "16 digits",
            "must match a specific pattern",
        ]
    );
}
