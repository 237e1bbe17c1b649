use estate_fields::{coerce, normalize_date, parse_answer_set, FieldEntry, FieldValue, ValueKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn answer(name: &str, value: &str) -> String {
    format!(r#"<Answer name="{name}"><TextValue>{value}</TextValue></Answer>"#)
}

fn answer_set(answers: &[String]) -> String {
    format!("<AnswerSet>{}</AnswerSet>", answers.concat())
}

#[test]
fn test_field_order_follows_first_occurrence() {
    let table = parse_answer_set(&answer_set(&[
        answer("Client first name", "Matthew"),
        answer("Child name", "Anna"),
        answer("Client last name", "Christensen"),
        answer("Child name", "Ben"),
    ]))
    .unwrap();

    let names: Vec<&str> = table.names().collect();
    assert_eq!(names, vec!["Client first name", "Child name", "Client last name"]);
}

#[test]
fn test_parallel_lists_pair_by_index() {
    let markup = r#"<AnswerSet>
        <Answer name="Child name"><RptValue>
            <TextValue>Anna Christensen</TextValue>
            <TextValue>Ben Christensen</TextValue>
        </RptValue></Answer>
        <Answer name="Child DOB"><RptValue>
            <DateValue unans="true"/>
            <DateValue>13/02/2012</DateValue>
        </RptValue></Answer>
    </AnswerSet>"#;
    let table = parse_answer_set(markup).unwrap();

    let pairs: Vec<(Option<&str>, Option<&str>)> = table
        .texts("Child name")
        .into_iter()
        .zip(table.texts("Child DOB"))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (Some("Anna Christensen"), None),
            (Some("Ben Christensen"), Some("2012-02-13")),
        ]
    );
}

#[test]
fn test_json_dump_matches_table() {
    let markup = r#"<AnswerSet>
        <Answer name="Joint trust TF"><TFValue>TRUE</TFValue></Answer>
        <Answer name="Beneficiary percentage"><RptValue><NumValue>60</NumValue><NumValue>40</NumValue></RptValue></Answer>
    </AnswerSet>"#;
    let table = parse_answer_set(markup).unwrap();
    assert_eq!(
        table.to_json(),
        serde_json::json!({
            "Joint trust TF": true,
            "Beneficiary percentage": [60.0, 40.0],
        })
    );
}

#[test]
fn test_sparse_export_still_parses() {
    let markup = r#"<AnswerSet>
        <Answer name="Client first name"><TextValue>null</TextValue></Answer>
        <Answer name="Spouse first name"><TextValue>undefined</TextValue></Answer>
        <Answer name="Trust name"><TextValue></TextValue></Answer>
        <Answer name="Trust sign date"><DateValue>sometime in May</DateValue></Answer>
    </AnswerSet>"#;
    let table = parse_answer_set(markup).unwrap();

    assert_eq!(table.len(), 4);
    assert!(!table.contains("Client first name"));
    assert!(!table.contains("Trust name"));
    assert_eq!(table.text("Trust sign date"), Some("sometime in May"));
    assert_eq!(table.date("Trust sign date"), None);
}

proptest! {
    #[test]
    fn prop_one_occurrence_is_scalar_two_are_ordered_list(
        first in "[A-Z][a-z]{2,10}",
        second in "[A-Z][a-z]{2,10}",
    ) {
        let once = parse_answer_set(&answer_set(&[answer("Field", &first)])).unwrap();
        prop_assert_eq!(once.get("Field"), Some(&FieldEntry::Scalar(Some(FieldValue::Text(first.clone())))));

        let twice = parse_answer_set(&answer_set(&[answer("Field", &first), answer("Field", &second)])).unwrap();
        prop_assert_eq!(
            twice.get("Field"),
            Some(&FieldEntry::List(vec![
                Some(FieldValue::Text(first)),
                Some(FieldValue::Text(second)),
            ]))
        );
    }

    #[test]
    fn prop_valid_day_first_dates_normalize(day in 1u32..=28, month in 1u32..=12, year in 1900i32..=2099) {
        let raw = format!("{day}/{month}/{year}");
        prop_assert_eq!(normalize_date(&raw), format!("{year:04}-{month:02}-{day:02}"));
    }

    #[test]
    fn prop_coercion_never_yields_empty_text(raw in ".{0,24}") {
        if let Some(FieldValue::Text(s)) = coerce(ValueKind::Text, &raw) {
            prop_assert!(!s.is_empty());
            prop_assert_eq!(s.trim(), s.as_str());
        }
    }
}
