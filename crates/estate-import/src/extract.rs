//! Extraction policy: which people an export names, and in what capacity
//!
//! Categories are walked in a fixed order (client, spouse, children,
//! beneficiaries, then every fiduciary category) so the first capacity a
//! person is seen in decides their role tag.

use crate::fields::{
    is_joint_trust, FiduciaryCategory, Principal, RoleScope, BENEFICIARY_NAME, CHILD_DOB, CHILD_NAME,
    FIDUCIARY_CATEGORIES,
};
use estate_fields::{FieldTable, FieldValue};
use estate_match::{PersonExtractor, PersonRoleTag};
use serde::{Deserialize, Serialize};

/// People found in one export, plus who the principals are
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    pub extractor: PersonExtractor,
    pub client_name: Option<String>,
    pub spouse_name: Option<String>,
    /// Both principals share one trust as peer grantors
    pub is_joint: bool,
}

impl Extraction {
    /// Name of a principal, when present
    #[must_use]
    pub fn principal_name(&self, principal: Principal) -> Option<&str> {
        match principal {
            Principal::Client => self.client_name.as_deref(),
            Principal::Spouse => self.spouse_name.as_deref(),
        }
    }

    /// Present principals with their names, client first
    pub fn principals(&self) -> impl Iterator<Item = (Principal, &str)> {
        Principal::BOTH
            .into_iter()
            .filter_map(|p| self.principal_name(p).map(|name| (p, name)))
    }
}

/// Label for an appointment, naming the principal for document-level roles
#[must_use]
pub fn role_label(category: &FiduciaryCategory, principal_name: Option<&str>) -> String {
    match (category.scope, principal_name) {
        (RoleScope::Principal, Some(name)) => format!("{} for {name}", category.role.label()),
        _ => category.role.label().to_string(),
    }
}

/// Register every person the export names
#[must_use]
pub fn extract_people(table: &FieldTable, suffix: &str) -> Extraction {
    let mut extractor = PersonExtractor::new();
    let client_name = Principal::Client.name(table);
    let spouse_name = Principal::Spouse.name(table);
    let is_joint = is_joint_trust(table, spouse_name.is_some());

    let principals = [(Principal::Client, &client_name), (Principal::Spouse, &spouse_name)];
    for (principal, name) in principals {
        let Some(name) = name else { continue };
        let (tag, label) = match principal {
            Principal::Client => (PersonRoleTag::Client, "Client"),
            Principal::Spouse if is_joint => (PersonRoleTag::Client, "Client"),
            Principal::Spouse => (PersonRoleTag::Spouse, "Spouse"),
        };
        let email = principal.email(table);
        extractor.add(name, tag, [label, "Grantor"], email.as_deref(), principal.date_of_birth(table));
        if let Some(last4) = principal.ssn_last4(table) {
            extractor.set_ssn_last4(name, last4);
        }
    }

    let child_dobs = table.slots(CHILD_DOB);
    for (i, name) in table.texts(CHILD_NAME).into_iter().enumerate() {
        let Some(name) = name else { continue };
        let dob = child_dobs.get(i).and_then(Option::as_ref).and_then(FieldValue::as_date);
        extractor.add(name, PersonRoleTag::Child, ["Child"], None, dob);
    }

    for name in table.present_texts(BENEFICIARY_NAME) {
        extractor.add(name, PersonRoleTag::Beneficiary, ["Beneficiary"], None, None);
    }

    for category in FIDUCIARY_CATEGORIES {
        match category.scope {
            RoleScope::Plan => {
                let label = role_label(category, None);
                for name in category.names(table, Principal::Client, suffix) {
                    extractor.add(name, PersonRoleTag::Fiduciary, [label.as_str()], None, None);
                }
            }
            RoleScope::Principal => {
                for (principal, principal_name) in principals
                    .iter()
                    .filter_map(|(p, n)| n.as_deref().map(|n| (*p, n)))
                {
                    let label = role_label(category, Some(principal_name));
                    for name in category.names(table, principal, suffix) {
                        extractor.add(name, PersonRoleTag::Fiduciary, [label.as_str()], None, None);
                    }
                }
            }
        }
    }

    tracing::debug!(
        people = extractor.len(),
        client = ?client_name,
        spouse = ?spouse_name,
        is_joint,
        "people extracted"
    );

    Extraction {
        extractor,
        client_name,
        spouse_name,
        is_joint,
    }
}
