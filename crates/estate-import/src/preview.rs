//! Normalized preview shown to the operator before decisions are made
//!
//! Best effort: missing fields are simply omitted.

use crate::extract::Extraction;
use crate::fields::{
    has_trust, parse_share, Principal, RoleScope, BENEFICIARY_NAME, BENEFICIARY_PERCENTAGE,
    BENEFICIARY_RELATIONSHIP, CHILD_DOB, CHILD_NAME, FIDUCIARY_CATEGORIES, TRUST_NAME, TRUST_SIGN_DATE, TRUST_STATE,
    WILL_EXECUTION_DATE,
};
use chrono::NaiveDate;
use estate_fields::{FieldTable, FieldValue};
use estate_match::ExtractedPerson;
use estate_model::RoleType;
use serde::{Deserialize, Serialize};

/// A named person with optional contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    /// Name as written in the export
    pub name: String,
    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Date of birth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

/// Trust as the export describes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustSummary {
    /// Name as written in the export
    pub name: String,
    /// Whether both principals are grantors
    pub is_joint: bool,
    /// Trust signing date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_date: Option<NaiveDate>,
    /// Governing state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub governing_state: Option<String>,
}

/// Wills as the export describes them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WillSummary {
    /// Will signing date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_date: Option<NaiveDate>,
    /// Wills pour over into the trust
    pub pour_over: bool,
}

/// Appointments in one fiduciary category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiduciarySummary {
    /// Role appointed
    pub role: RoleType,
    /// Principal whose document makes the appointment; `None` is plan-level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub for_principal: Option<String>,
    /// Names appointed, in order
    pub names: Vec<String>,
}

/// One beneficiary and their share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneficiarySummary {
    /// Name as written in the export
    pub name: String,
    /// Share, in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    /// Relationship to the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

/// Everything the operator reviews before committing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportPreview {
    /// First principal
    pub client: Option<PersonSummary>,
    /// Second principal
    pub spouse: Option<PersonSummary>,
    /// Children
    pub children: Vec<PersonSummary>,
    /// Trust, for trust-based plans
    pub trust: Option<TrustSummary>,
    /// Wills, when any are drawn up
    pub will: Option<WillSummary>,
    /// Fiduciary appointments by category
    pub fiduciaries: Vec<FiduciarySummary>,
    /// Beneficiaries
    pub beneficiaries: Vec<BeneficiarySummary>,
    /// Every distinct person the export names
    pub extracted_people: Vec<ExtractedPerson>,
}

fn principal_summary(table: &FieldTable, extraction: &Extraction, principal: Principal) -> Option<PersonSummary> {
    extraction.principal_name(principal).map(|name| PersonSummary {
        name: name.to_string(),
        email: principal.email(table),
        date_of_birth: principal.date_of_birth(table),
    })
}

/// Build the preview for a parsed export
#[must_use]
pub fn build_preview(table: &FieldTable, extraction: &Extraction, suffix: &str) -> ImportPreview {
    let child_dobs = table.slots(CHILD_DOB);
    let children = table
        .texts(CHILD_NAME)
        .into_iter()
        .enumerate()
        .filter_map(|(i, name)| {
            name.map(|name| PersonSummary {
                name: name.to_string(),
                email: None,
                date_of_birth: child_dobs.get(i).and_then(Option::as_ref).and_then(FieldValue::as_date),
            })
        })
        .collect();

    let trust = table.text(TRUST_NAME).filter(|_| has_trust(table)).map(|name| TrustSummary {
        name: name.to_string(),
        is_joint: extraction.is_joint,
        sign_date: table.date(TRUST_SIGN_DATE),
        governing_state: table.text(TRUST_STATE).map(str::to_string),
    });

    let has_executor = FIDUCIARY_CATEGORIES
        .iter()
        .filter(|c| c.in_will)
        .any(|c| extraction.principals().any(|(p, _)| !c.names(table, p, suffix).is_empty()));
    let will = (trust.is_none() || table.contains(WILL_EXECUTION_DATE) || has_executor).then(|| WillSummary {
        execution_date: table.date(WILL_EXECUTION_DATE),
        pour_over: trust.is_some(),
    });

    let mut fiduciaries = Vec::new();
    for category in FIDUCIARY_CATEGORIES {
        let scopes: Vec<(Principal, Option<&str>)> = match category.scope {
            RoleScope::Plan => vec![(Principal::Client, None)],
            RoleScope::Principal => extraction.principals().map(|(p, n)| (p, Some(n))).collect(),
        };
        for (principal, for_principal) in scopes {
            let names = category.names(table, principal, suffix);
            if names.is_empty() {
                continue;
            }
            fiduciaries.push(FiduciarySummary {
                role: category.role,
                for_principal: for_principal.map(str::to_string),
                names: names.into_iter().map(str::to_string).collect(),
            });
        }
    }

    let percentages = table.slots(BENEFICIARY_PERCENTAGE);
    let relationships = table.texts(BENEFICIARY_RELATIONSHIP);
    let beneficiaries = table
        .texts(BENEFICIARY_NAME)
        .into_iter()
        .enumerate()
        .filter_map(|(i, name)| {
            name.map(|name| BeneficiarySummary {
                name: name.to_string(),
                percentage: percentages.get(i).and_then(Option::as_ref).and_then(parse_share),
                relationship: relationships.get(i).copied().flatten().map(str::to_string),
            })
        })
        .collect();

    ImportPreview {
        client: principal_summary(table, extraction, Principal::Client),
        spouse: principal_summary(table, extraction, Principal::Spouse),
        children,
        trust,
        will,
        fiduciaries,
        beneficiaries,
        extracted_people: extraction.extractor.people().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_people;

    fn record(t: &mut FieldTable, name: &str, value: &str) {
        t.record(name, Some(FieldValue::Text(value.to_string())));
    }

    #[test]
    fn test_will_based_preview() {
        let mut t = FieldTable::new();
        record(&mut t, "Client full name", "Pat Doe");
        record(&mut t, "Executor name", "Sam Doe");
        record(&mut t, "Beneficiary name", "Sam Doe");
        record(&mut t, "Beneficiary name", "Lee Doe");
        t.record("Beneficiary percentage", Some(FieldValue::Text("60%".into())));
        t.record("Beneficiary percentage", Some(FieldValue::Text("forty".into())));

        let x = extract_people(&t, " SP");
        let preview = build_preview(&t, &x, " SP");

        assert_eq!(preview.client.as_ref().map(|c| c.name.as_str()), Some("Pat Doe"));
        assert!(preview.spouse.is_none());
        assert!(preview.trust.is_none());
        assert_eq!(preview.will.as_ref().map(|w| w.pour_over), Some(false));
        assert_eq!(preview.fiduciaries.len(), 1);
        assert_eq!(preview.fiduciaries[0].for_principal.as_deref(), Some("Pat Doe"));
        assert_eq!(preview.beneficiaries[0].percentage, Some(60.0));
        assert_eq!(preview.beneficiaries[1].percentage, None);
        assert_eq!(preview.extracted_people.len(), 3);
    }

    #[test]
    fn test_trust_without_wills() {
        let mut t = FieldTable::new();
        record(&mut t, "Client full name", "Pat Doe");
        record(&mut t, "Trust name", "Doe Living Trust");
        record(&mut t, "Trust state", "Utah");

        let x = extract_people(&t, " SP");
        let preview = build_preview(&t, &x, " SP");
        let trust = preview.trust.unwrap();
        assert_eq!(trust.name, "Doe Living Trust");
        assert_eq!(trust.governing_state.as_deref(), Some("Utah"));
        assert!(!trust.is_joint);
        assert!(preview.will.is_none());
    }
}
