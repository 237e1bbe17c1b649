//! Testing utilities for the estate import workspace
//!
//! Answer-set fixtures, a markup builder, and registry seeding helpers.

#![allow(missing_docs)]

use chrono::NaiveDate;
use estate_fields::ValueKind;
use estate_model::{MemoryStore, Person, PersonRegistry, Provenance};
use std::fmt::Write as _;

/// Builds answer-set markup one answer at a time
#[derive(Debug, Default, Clone)]
pub struct AnswerSetBuilder {
    answers: Vec<String>,
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn element(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Text => "TextValue",
        ValueKind::Bool => "TFValue",
        ValueKind::Number => "NumValue",
        ValueKind::Date => "DateValue",
    }
}

impl AnswerSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn value(mut self, name: &str, kind: ValueKind, raw: &str) -> Self {
        let tag = element(kind);
        self.answers.push(format!(
            r#"<Answer name="{}"><{tag}>{}</{tag}></Answer>"#,
            escape(name),
            escape(raw)
        ));
        self
    }

    pub fn text(self, name: &str, value: &str) -> Self {
        self.value(name, ValueKind::Text, value)
    }

    pub fn flag(self, name: &str, value: bool) -> Self {
        self.value(name, ValueKind::Bool, if value { "true" } else { "false" })
    }

    pub fn number(self, name: &str, value: f64) -> Self {
        self.value(name, ValueKind::Number, &value.to_string())
    }

    /// Date in the export's day-first form, e.g. `25/12/2020`
    pub fn date(self, name: &str, value: &str) -> Self {
        self.value(name, ValueKind::Date, value)
    }

    /// Repeated answer; `None` entries are written as unanswered slots
    pub fn list(mut self, name: &str, kind: ValueKind, values: &[Option<&str>]) -> Self {
        let tag = element(kind);
        let mut body = String::new();
        for value in values {
            match value {
                Some(v) => {
                    let _ = write!(body, "<{tag}>{}</{tag}>", escape(v));
                }
                None => {
                    let _ = write!(body, r#"<{tag} unans="true"/>"#);
                }
            }
        }
        self.answers.push(format!(
            r#"<Answer name="{}"><RptValue>{body}</RptValue></Answer>"#,
            escape(name)
        ));
        self
    }

    pub fn texts(self, name: &str, values: &[&str]) -> Self {
        let values: Vec<Option<&str>> = values.iter().copied().map(Some).collect();
        self.list(name, ValueKind::Text, &values)
    }

    pub fn unanswered(mut self, name: &str, kind: ValueKind) -> Self {
        let tag = element(kind);
        self.answers
            .push(format!(r#"<Answer name="{}"><{tag} unans="true"/></Answer>"#, escape(name)));
        self
    }

    pub fn build(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><AnswerSet title="Estate Planning" version="1.1">{}</AnswerSet>"#,
            self.answers.concat()
        )
    }
}

pub const CLIENT_NAME: &str = "Matthew Christensen";
pub const SPOUSE_NAME: &str = "Desiree Christensen";
pub const CHILD_NAME: &str = "Emma Christensen";
pub const BENEFICIARY_NAME: &str = "Olivia Hart";
pub const SUCCESSOR_TRUSTEE_NAME: &str = "Kim Larsen";
pub const TRUST_NAME: &str = "Christensen Family Trust";

/// Joint revocable trust for a married couple with one child and one
/// outside beneficiary
pub fn joint_trust_builder() -> AnswerSetBuilder {
    AnswerSetBuilder::new()
        .text("Client first name", "Matthew")
        .text("Client last name", "Christensen")
        .text("Client email", "matthew@christensen.example")
        .date("Client DOB", "15/03/1970")
        .text("Client SSN", "123-45-6789")
        .text("Spouse first name", "Desiree")
        .text("Spouse last name", "Christensen")
        .text("Spouse email", "desiree@christensen.example")
        .date("Spouse DOB", "02/11/1972")
        .text("Trust name", TRUST_NAME)
        .flag("Joint trust TF", true)
        .date("Trust sign date", "01/06/2021")
        .text("Trust state", "Utah")
        .texts("Trustee name", &[CLIENT_NAME, SPOUSE_NAME])
        .text("Successor trustee name", SUCCESSOR_TRUSTEE_NAME)
        .text("Financial agent name", SPOUSE_NAME)
        .text("Financial agent name SP", CLIENT_NAME)
        .text("Healthcare agent name", SPOUSE_NAME)
        .text("Healthcare agent name SP", CLIENT_NAME)
        .text("Executor name", SPOUSE_NAME)
        .text("Executor name SP", CLIENT_NAME)
        .texts("Child name", &[CHILD_NAME])
        .list("Child DOB", ValueKind::Date, &[Some("20/08/2005")])
        .texts("Beneficiary name", &[BENEFICIARY_NAME])
        .list("Beneficiary percentage", ValueKind::Number, &[Some("100")])
        .texts("Beneficiary relationship", &["Friend"])
}

pub fn joint_trust_answer_set() -> String {
    joint_trust_builder().build()
}

pub const WILL_CLIENT_NAME: &str = "Patricia Doe";
pub const WILL_EXECUTOR_NAME: &str = "Samuel Doe";

/// Single client with a will and no trust
pub fn will_based_answer_set() -> String {
    AnswerSetBuilder::new()
        .text("Client first name", "Patricia")
        .text("Client last name", "Doe")
        .text("Client email", "pat@doe.example")
        .date("Will execution date", "14/02/2019")
        .text("Executor name", WILL_EXECUTOR_NAME)
        .text("Guardian name", "Rachel Doe")
        .flag("HIPAA TF", false)
        .build()
}

/// Answer set missing its closing tag
pub const MALFORMED_ANSWER_SET: &str =
    r#"<AnswerSet><Answer name="Client first name"><TextValue>Matthew</TextValue></Answer>"#;

/// Person built from a display name, optionally with email and birth date
pub fn person(display: &str) -> Person {
    Person::from_display_name(display).with_provenance(Provenance::new("fixture"))
}

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Store pre-populated with `people`
pub async fn seeded_store(people: Vec<Person>) -> MemoryStore {
    let store = MemoryStore::new();
    for p in people {
        store.insert_person(p).await.unwrap();
    }
    store
}
