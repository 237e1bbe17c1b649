//! Answer-file field vocabulary
//!
//! Exports name the same concept several ways, so most lookups go through a
//! list of variants tried in order. The second principal's document fields
//! carry a configurable suffix (`" SP"` by default).

use estate_fields::{FieldTable, FieldValue};
use estate_model::{DocumentKind, RoleType};
use serde::{Deserialize, Serialize};

/// Name of the trust; its presence makes the plan trust-based
pub const TRUST_NAME: &str = "Trust name";
/// Explicit joint-trust flag
pub const JOINT_TRUST_TF: &str = "Joint trust TF";
/// Trust signing date
pub const TRUST_SIGN_DATE: &str = "Trust sign date";
/// Governing state of the trust
pub const TRUST_STATE: &str = "Trust state";
/// Will signing date
pub const WILL_EXECUTION_DATE: &str = "Will execution date";
/// `false` declines the HIPAA authorization
pub const HIPAA_TF: &str = "HIPAA TF";

/// Children (list)
pub const CHILD_NAME: &str = "Child name";
/// Children's birth dates, parallel to `CHILD_NAME`
pub const CHILD_DOB: &str = "Child DOB";

/// Beneficiaries (list)
pub const BENEFICIARY_NAME: &str = "Beneficiary name";
/// Shares, parallel to `BENEFICIARY_NAME`
pub const BENEFICIARY_PERCENTAGE: &str = "Beneficiary percentage";
/// Relationship to the client, parallel to `BENEFICIARY_NAME`
pub const BENEFICIARY_RELATIONSHIP: &str = "Beneficiary relationship";

/// One of the (at most two) people whose plan this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Principal {
    /// First principal
    Client,
    /// Second principal
    Spouse,
}

impl Principal {
    /// Both principals, client first
    pub const BOTH: [Principal; 2] = [Principal::Client, Principal::Spouse];

    fn prefix(self) -> &'static str {
        match self {
            Principal::Client => "Client",
            Principal::Spouse => "Spouse",
        }
    }

    /// Identity field, e.g. `Spouse first name`
    #[must_use]
    pub fn identity_field(self, attribute: &str) -> String {
        format!("{} {attribute}", self.prefix())
    }

    /// Individual-document field: the base name for the client, base plus
    /// `suffix` for the spouse
    #[must_use]
    pub fn document_field(self, base: &str, suffix: &str) -> String {
        match self {
            Principal::Client => base.to_string(),
            Principal::Spouse => format!("{base}{suffix}"),
        }
    }

    /// Display name assembled from the identity fields.
    ///
    /// First, middle and last name when any of first/last is present,
    /// otherwise the full-name field.
    #[must_use]
    pub fn name(self, table: &FieldTable) -> Option<String> {
        let part = |attr: &str| table.text(&self.identity_field(attr)).map(str::trim).filter(|s| !s.is_empty());

        let (first, last) = (part("first name"), part("last name"));
        if first.is_some() || last.is_some() {
            let parts: Vec<&str> = [first, part("middle name"), last].into_iter().flatten().collect();
            return Some(parts.join(" "));
        }
        part("full name").map(str::to_string)
    }

    /// Email address
    #[must_use]
    pub fn email(self, table: &FieldTable) -> Option<String> {
        table.text(&self.identity_field("email")).map(str::to_string)
    }

    /// Date of birth
    #[must_use]
    pub fn date_of_birth(self, table: &FieldTable) -> Option<chrono::NaiveDate> {
        table.date(&self.identity_field("DOB"))
    }

    /// Last four SSN digits, when at least four digits were given
    #[must_use]
    pub fn ssn_last4(self, table: &FieldTable) -> Option<String> {
        let raw = table.value(&self.identity_field("SSN")).map(FieldValue::to_string)?;
        let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
        (digits.len() >= 4).then(|| digits[digits.len() - 4..].iter().collect())
    }

    /// Phone number
    #[must_use]
    pub fn phone(self, table: &FieldTable) -> Option<String> {
        table.text(&self.identity_field("phone")).map(str::to_string)
    }
}

/// Whether a fiduciary category appoints for the plan or for one principal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleScope {
    /// Plan-level (trust) appointment
    Plan,
    /// Appointment under one principal's own document
    Principal,
}

/// A fiduciary field category and the role it produces
#[derive(Debug, Clone, Copy)]
pub struct FiduciaryCategory {
    /// Role produced
    pub role: RoleType,
    /// Field name variants, tried in order
    pub fields: &'static [&'static str],
    /// Whose document the role belongs to
    pub scope: RoleScope,
    /// Ancillary document the appointment is made in
    pub document: Option<DocumentKind>,
    /// Appointment is made in the principal's will
    pub in_will: bool,
}

const fn plan(role: RoleType, fields: &'static [&'static str]) -> FiduciaryCategory {
    FiduciaryCategory {
        role,
        fields,
        scope: RoleScope::Plan,
        document: None,
        in_will: false,
    }
}

const fn principal(
    role: RoleType,
    fields: &'static [&'static str],
    document: Option<DocumentKind>,
    in_will: bool,
) -> FiduciaryCategory {
    FiduciaryCategory {
        role,
        fields,
        scope: RoleScope::Principal,
        document,
        in_will,
    }
}

/// Every fiduciary category, in extraction order
pub const FIDUCIARY_CATEGORIES: &[FiduciaryCategory] = &[
    plan(RoleType::Trustee, &["Trustee name", "Initial trustee name"]),
    plan(RoleType::SuccessorTrustee, &["Successor trustee name"]),
    plan(RoleType::TrustProtector, &["Trust protector name"]),
    principal(
        RoleType::FinancialAgent,
        &["Financial agent name"],
        Some(DocumentKind::FinancialPowerOfAttorney),
        false,
    ),
    principal(
        RoleType::SuccessorFinancialAgent,
        &["Successor financial agent name"],
        Some(DocumentKind::FinancialPowerOfAttorney),
        false,
    ),
    principal(
        RoleType::HealthcareAgent,
        &["Healthcare agent name"],
        Some(DocumentKind::HealthcareDirective),
        false,
    ),
    principal(
        RoleType::SuccessorHealthcareAgent,
        &["Successor healthcare agent name"],
        Some(DocumentKind::HealthcareDirective),
        false,
    ),
    principal(
        RoleType::Executor,
        &["Executor name", "Personal representative name"],
        None,
        true,
    ),
    principal(RoleType::SuccessorExecutor, &["Successor executor name"], None, true),
    principal(
        RoleType::Guardian,
        &["Guardian name"],
        Some(DocumentKind::GuardianshipNomination),
        false,
    ),
    principal(
        RoleType::SuccessorGuardian,
        &["Successor guardian name"],
        Some(DocumentKind::GuardianshipNomination),
        false,
    ),
];

impl FiduciaryCategory {
    /// Names appointed in this category, across all field variants in order.
    ///
    /// `principal` selects the suffixed variants for principal-scoped
    /// categories and is ignored for plan-level ones. Duplicates are kept.
    #[must_use]
    pub fn names<'t>(&self, table: &'t FieldTable, principal: Principal, suffix: &str) -> Vec<&'t str> {
        self.fields
            .iter()
            .flat_map(|base| {
                let field = match self.scope {
                    RoleScope::Plan => (*base).to_string(),
                    RoleScope::Principal => principal.document_field(base, suffix),
                };
                table.present_texts(&field)
            })
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect()
    }
}

/// Whether the plan is built around a trust
#[must_use]
pub fn has_trust(table: &FieldTable) -> bool {
    table.contains(TRUST_NAME)
}

/// Whether the plan's trust is joint.
///
/// The explicit flag wins; without it a trust with two principals is joint.
#[must_use]
pub fn is_joint_trust(table: &FieldTable, has_spouse: bool) -> bool {
    has_trust(table) && table.bool(JOINT_TRUST_TF).unwrap_or(has_spouse)
}

/// Parse a beneficiary share: `50`, `"50%"`, `"33.33 %"`
#[must_use]
pub fn parse_share(value: &FieldValue) -> Option<f64> {
    let share = match value {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => s.trim().trim_end_matches('%').trim().parse().ok()?,
        FieldValue::Bool(_) | FieldValue::Date(_) => return None,
    };
    (share.is_finite() && share >= 0.0).then_some(share)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, FieldValue)]) -> FieldTable {
        let mut t = FieldTable::new();
        for (name, value) in entries {
            t.record(*name, Some(value.clone()));
        }
        t
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn test_principal_name_assembly() {
        let t = table(&[
            ("Client first name", text("Matthew")),
            ("Client middle name", text("James")),
            ("Client last name", text("Christensen")),
            ("Spouse full name", text("Desiree Christensen")),
        ]);
        assert_eq!(Principal::Client.name(&t).as_deref(), Some("Matthew James Christensen"));
        assert_eq!(Principal::Spouse.name(&t).as_deref(), Some("Desiree Christensen"));
        assert_eq!(Principal::Spouse.name(&FieldTable::new()), None);
    }

    #[test]
    fn test_ssn_keeps_last_four() {
        let t = table(&[
            ("Client SSN", text("123-45-6789")),
            ("Spouse SSN", text("12")),
        ]);
        assert_eq!(Principal::Client.ssn_last4(&t).as_deref(), Some("6789"));
        assert_eq!(Principal::Spouse.ssn_last4(&t), None);
    }

    #[test]
    fn test_category_names_follow_suffix() {
        let t = table(&[
            ("Financial agent name", text("Desiree Christensen")),
            ("Financial agent name SP", text("Matthew Christensen")),
            ("Trustee name", text("Matthew Christensen")),
            ("Initial trustee name", text("Matthew Christensen")),
        ]);
        let agent = FIDUCIARY_CATEGORIES
            .iter()
            .find(|c| c.role == RoleType::FinancialAgent)
            .unwrap();
        assert_eq!(agent.names(&t, Principal::Client, " SP"), vec!["Desiree Christensen"]);
        assert_eq!(agent.names(&t, Principal::Spouse, " SP"), vec!["Matthew Christensen"]);

        let trustee = &FIDUCIARY_CATEGORIES[0];
        assert_eq!(
            trustee.names(&t, Principal::Spouse, " SP"),
            vec!["Matthew Christensen", "Matthew Christensen"]
        );
    }

    #[test]
    fn test_joint_trust_detection() {
        let trust = table(&[(TRUST_NAME, text("Family Trust"))]);
        assert!(is_joint_trust(&trust, true));
        assert!(!is_joint_trust(&trust, false));

        let explicit = table(&[(TRUST_NAME, text("Family Trust")), (JOINT_TRUST_TF, FieldValue::Bool(false))]);
        assert!(!is_joint_trust(&explicit, true));
        assert!(!is_joint_trust(&FieldTable::new(), true));
    }

    #[test]
    fn test_share_parsing() {
        assert_eq!(parse_share(&text("50%")), Some(50.0));
        assert_eq!(parse_share(&text("33.33 %")), Some(33.33));
        assert_eq!(parse_share(&text("25")), Some(25.0));
        assert_eq!(parse_share(&FieldValue::Number(12.5)), Some(12.5));
        assert_eq!(parse_share(&text("half")), None);
        assert_eq!(parse_share(&text("-5")), None);
        assert_eq!(parse_share(&FieldValue::Bool(true)), None);
    }
}
