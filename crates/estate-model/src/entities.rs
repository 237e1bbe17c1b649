//! Entities of the estate plan graph
//!
//! People exist independently. Everything else hangs off a [`EstatePlan`] and
//! references people and sibling entities by id.

use crate::error::TransitionError;
use crate::ids::{
    ClientId, DocumentId, PersonId, PlanId, RelationshipId, RoleId, TrustId, UserId, WillId,
};
use crate::status::{validate_transition, PlanStatus, StatusChange};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Generational suffixes kept apart from the last name
const NAME_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv", "v"];

/// Where a record came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Originating system or process
    pub source: String,
    /// Import session that produced the record, if any
    pub session_id: Option<String>,
    /// When the record was produced
    pub recorded_at: DateTime<Utc>,
}

impl Provenance {
    /// Provenance stamped now
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            session_id: None,
            recorded_at: Utc::now(),
        }
    }

    /// Attach the producing session
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Independent identity record for a natural person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique id
    pub id: PersonId,
    /// Given name
    pub first_name: String,
    /// Middle name or initial
    pub middle_name: Option<String>,
    /// Family name
    pub last_name: String,
    /// Generational suffix (Jr, Sr, III)
    pub suffix: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Date of birth
    pub date_of_birth: Option<NaiveDate>,
    /// Last four digits of the SSN only
    pub ssn_last4: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Origin of the record, when imported
    pub provenance: Option<Provenance>,
}

impl Person {
    /// Person with a first and last name
    #[must_use]
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: PersonId::new(),
            first_name: first_name.into(),
            middle_name: None,
            last_name: last_name.into(),
            suffix: None,
            email: None,
            phone: None,
            date_of_birth: None,
            ssn_last4: None,
            notes: None,
            provenance: None,
        }
    }

    /// Split a display name into name parts.
    ///
    /// `"Mary Ann Smith Jr."` becomes first `Mary`, middle `Ann`, last `Smith`,
    /// suffix `Jr.`. A single word is taken as the first name.
    #[must_use]
    pub fn from_display_name(display: &str) -> Self {
        let mut words: Vec<&str> = display.split_whitespace().collect();

        let has_suffix = words.len() > 2 && words.last().is_some_and(|w| is_name_suffix(w));
        let suffix = if has_suffix {
            words.pop().map(str::to_string)
        } else {
            None
        };

        let mut person = match words.as_slice() {
            [] => Self::new("", ""),
            [only] => Self::new(*only, ""),
            [first, last] => Self::new(*first, *last),
            [first, middle @ .., last] => {
                let mut p = Self::new(*first, *last);
                p.middle_name = Some(middle.join(" "));
                p
            }
        };
        person.suffix = suffix;
        person
    }

    /// Full display name (first, middle, last, suffix)
    #[must_use]
    pub fn full_name(&self) -> String {
        [
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
            Some(self.last_name.as_str()),
            self.suffix.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// With email
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// With date of birth
    #[must_use]
    pub fn with_date_of_birth(mut self, dob: NaiveDate) -> Self {
        self.date_of_birth = Some(dob);
        self
    }

    /// With the last four SSN digits
    #[must_use]
    pub fn with_ssn_last4(mut self, last4: impl Into<String>) -> Self {
        self.ssn_last4 = Some(last4.into());
        self
    }

    /// With provenance
    #[must_use]
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }
}

fn is_name_suffix(word: &str) -> bool {
    let bare = word.trim_end_matches('.').to_ascii_lowercase();
    NAME_SUFFIXES.contains(&bare.as_str())
}

/// Login specialization of a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique id
    pub id: UserId,
    /// Person this record refers to
    pub person_id: PersonId,
    /// Email address
    pub email: String,
}

impl User {
    /// New user for an existing person
    #[must_use]
    pub fn new(person_id: PersonId, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            person_id,
            email: email.into(),
        }
    }
}

/// Client specialization of a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Unique id
    pub id: ClientId,
    /// Person this record refers to
    pub person_id: PersonId,
    /// When the person became a client
    pub since: DateTime<Utc>,
}

impl Client {
    /// New client for an existing person
    #[must_use]
    pub fn new(person_id: PersonId) -> Self {
        Self {
            id: ClientId::new(),
            person_id,
            since: Utc::now(),
        }
    }
}

/// Kind of person-to-person link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Married or partnered
    Spouse,
    /// `to_person` is a child of `from_person`
    Child,
    /// `to_person` is a parent of `from_person`
    Parent,
    /// Siblings
    Sibling,
    /// Any other link
    Other,
}

/// Directed link between two people
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique id
    pub id: RelationshipId,
    /// Source of the link
    pub from_person_id: PersonId,
    /// Target of the link
    pub to_person_id: PersonId,
    /// How `to_person` relates to `from_person`
    pub kind: RelationshipKind,
}

impl Relationship {
    /// New relationship
    #[must_use]
    pub fn new(from: PersonId, to: PersonId, kind: RelationshipKind) -> Self {
        Self {
            id: RelationshipId::new(),
            from_person_id: from,
            to_person_id: to,
            kind,
        }
    }
}

/// Whether the plan is built around a trust or a will
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    /// Built around a revocable trust
    TrustBased,
    /// Built around wills only
    WillBased,
}

/// Root aggregate: one client's (or one couple's) estate plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstatePlan {
    /// Unique id
    pub id: PlanId,
    /// Plan name, usually the trust name
    pub name: String,
    /// Trust- or will-based
    pub plan_type: PlanType,
    /// First grantor. Joint grantors have equal standing; order carries no meaning.
    pub grantor_id: PersonId,
    /// Second grantor of a joint plan
    pub co_grantor_id: Option<PersonId>,
    /// Amendment counter, starting at 1
    pub version: u32,
    /// Date the plan took effect
    pub effective_date: Option<NaiveDate>,
    status: PlanStatus,
    history: Vec<StatusChange>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl EstatePlan {
    /// New draft plan at version 1
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        plan_type: PlanType,
        grantor_id: PersonId,
        co_grantor_id: Option<PersonId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PlanId::new(),
            name: name.into(),
            plan_type,
            grantor_id,
            co_grantor_id,
            version: 1,
            effective_date: None,
            status: PlanStatus::Draft,
            history: vec![StatusChange {
                from: None,
                to: PlanStatus::Draft,
                at: now,
            }],
            created_at: now,
        }
    }

    /// Current status
    #[inline]
    #[must_use]
    pub fn status(&self) -> PlanStatus {
        self.status
    }

    /// Recorded status changes, oldest first
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[StatusChange] {
        &self.history
    }

    /// Both grantors (one for an individual plan)
    pub fn grantors(&self) -> impl Iterator<Item = PersonId> + '_ {
        std::iter::once(self.grantor_id).chain(self.co_grantor_id)
    }

    /// Whether the plan has two grantors
    #[inline]
    #[must_use]
    pub fn is_joint(&self) -> bool {
        self.co_grantor_id.is_some()
    }

    /// Set the effective date and move to Active
    pub fn activate(&mut self, effective_date: NaiveDate) -> Result<(), TransitionError> {
        validate_transition(self.status, PlanStatus::Active)?;
        self.effective_date = Some(effective_date);
        self.record(PlanStatus::Active);
        Ok(())
    }

    /// Record an amendment, bumping the version. Returns the new version.
    pub fn amend(&mut self) -> Result<u32, TransitionError> {
        self.transition(PlanStatus::Amended)?;
        Ok(self.version)
    }

    /// Move to `to`, validating against the lifecycle table
    pub fn transition(&mut self, to: PlanStatus) -> Result<(), TransitionError> {
        validate_transition(self.status, to)?;
        if to == PlanStatus::Active && self.effective_date.is_none() {
            return Err(TransitionError::MissingEffectiveDate);
        }
        if to == PlanStatus::Amended {
            self.version += 1;
        }
        self.record(to);
        Ok(())
    }

    fn record(&mut self, to: PlanStatus) {
        self.history.push(StatusChange {
            from: Some(self.status),
            to,
            at: Utc::now(),
        });
        self.status = to;
    }
}

/// Trust belonging to exactly one plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trust {
    /// Unique id
    pub id: TrustId,
    /// Owning plan
    pub plan_id: PlanId,
    /// Trust name as written in the instrument
    pub name: String,
    /// Whether two grantors share the trust
    pub is_joint: bool,
    /// Date the trust was signed
    pub trust_date: Option<NaiveDate>,
    /// Governing state
    pub governing_state: Option<String>,
}

impl Trust {
    /// New trust within a plan
    #[must_use]
    pub fn new(plan_id: PlanId, name: impl Into<String>, is_joint: bool) -> Self {
        Self {
            id: TrustId::new(),
            plan_id,
            name: name.into(),
            is_joint,
            trust_date: None,
            governing_state: None,
        }
    }
}

/// Will belonging to exactly one plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Will {
    /// Unique id
    pub id: WillId,
    /// Owning plan
    pub plan_id: PlanId,
    /// Person whose will this is
    pub testator_id: Option<PersonId>,
    /// Date the document was signed
    pub execution_date: Option<NaiveDate>,
    /// Pour-over target; must belong to the same plan
    pub pour_over_trust_id: Option<TrustId>,
}

impl Will {
    /// New will within a plan
    #[must_use]
    pub fn new(plan_id: PlanId) -> Self {
        Self {
            id: WillId::new(),
            plan_id,
            testator_id: None,
            execution_date: None,
            pour_over_trust_id: None,
        }
    }
}

/// Non-trust, non-will legal document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    /// Durable financial power of attorney
    FinancialPowerOfAttorney,
    /// Advance healthcare directive
    HealthcareDirective,
    /// HIPAA release
    HipaaAuthorization,
    /// Nomination of guardians for minor children
    GuardianshipNomination,
}

/// Ancillary document owned by one plan and one principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncillaryDocument {
    /// Unique id
    pub id: DocumentId,
    /// Owning plan
    pub plan_id: PlanId,
    /// Principal the document is drawn up for
    pub person_id: PersonId,
    /// Which document this is
    pub kind: DocumentKind,
    /// Date the document was signed
    pub execution_date: Option<NaiveDate>,
}

impl AncillaryDocument {
    /// New document for a principal within a plan
    #[must_use]
    pub fn new(plan_id: PlanId, person_id: PersonId, kind: DocumentKind) -> Self {
        Self {
            id: DocumentId::new(),
            plan_id,
            person_id,
            kind,
            execution_date: None,
        }
    }
}

/// Capacity a person holds within a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleType {
    /// Principal establishing the plan
    Grantor,
    /// Acting trustee
    Trustee,
    /// Trustee after the acting trustee
    SuccessorTrustee,
    /// Oversees the trustee
    TrustProtector,
    /// Agent under the financial power of attorney
    FinancialAgent,
    /// Backup financial agent
    SuccessorFinancialAgent,
    /// Agent under the healthcare directive
    HealthcareAgent,
    /// Backup healthcare agent
    SuccessorHealthcareAgent,
    /// Personal representative under a will
    Executor,
    /// Backup executor
    SuccessorExecutor,
    /// Guardian for minor children
    Guardian,
    /// Backup guardian
    SuccessorGuardian,
    /// Receives a share of the estate
    Beneficiary,
}

impl RoleType {
    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RoleType::Grantor => "Grantor",
            RoleType::Trustee => "Trustee",
            RoleType::SuccessorTrustee => "Successor Trustee",
            RoleType::TrustProtector => "Trust Protector",
            RoleType::FinancialAgent => "Financial Agent",
            RoleType::SuccessorFinancialAgent => "Successor Financial Agent",
            RoleType::HealthcareAgent => "Healthcare Agent",
            RoleType::SuccessorHealthcareAgent => "Successor Healthcare Agent",
            RoleType::Executor => "Executor",
            RoleType::SuccessorExecutor => "Successor Executor",
            RoleType::Guardian => "Guardian",
            RoleType::SuccessorGuardian => "Successor Guardian",
            RoleType::Beneficiary => "Beneficiary",
        }
    }

    /// Whether the role carries a duty to act for another
    #[must_use]
    pub fn is_fiduciary(self) -> bool {
        !matches!(self, RoleType::Grantor | RoleType::Beneficiary)
    }
}

impl std::fmt::Display for RoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Assignment of a person to a capacity within a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRole {
    /// Unique id
    pub id: RoleId,
    /// Owning plan
    pub plan_id: PlanId,
    /// Person holding the role
    pub person_id: PersonId,
    /// Capacity held
    pub role_type: RoleType,
    /// Principal whose individual document this role concerns; `None` is plan-level
    pub for_person_id: Option<PersonId>,
    /// Trust the role is appointed under
    pub trust_id: Option<TrustId>,
    /// Will the role is appointed under
    pub will_id: Option<WillId>,
    /// Ancillary document the role is appointed under
    pub document_id: Option<DocumentId>,
    /// Beneficiary share, in percent
    pub share_percentage: Option<f64>,
    /// 1-based order among repeated appointments (first successor = 1)
    pub ordinal: Option<u32>,
}

impl PlanRole {
    /// Plan-level role
    #[must_use]
    pub fn new(plan_id: PlanId, person_id: PersonId, role_type: RoleType) -> Self {
        Self {
            id: RoleId::new(),
            plan_id,
            person_id,
            role_type,
            for_person_id: None,
            trust_id: None,
            will_id: None,
            document_id: None,
            share_percentage: None,
            ordinal: None,
        }
    }

    /// Scope to a principal's individual document
    #[must_use]
    pub fn for_person(mut self, principal: PersonId) -> Self {
        self.for_person_id = Some(principal);
        self
    }

    /// Scope to a trust
    #[must_use]
    pub fn in_trust(mut self, trust_id: TrustId) -> Self {
        self.trust_id = Some(trust_id);
        self
    }

    /// Scope to a will
    #[must_use]
    pub fn in_will(mut self, will_id: WillId) -> Self {
        self.will_id = Some(will_id);
        self
    }

    /// Scope to an ancillary document
    #[must_use]
    pub fn in_document(mut self, document_id: DocumentId) -> Self {
        self.document_id = Some(document_id);
        self
    }

    /// With a beneficiary share
    #[must_use]
    pub fn with_share(mut self, percentage: f64) -> Self {
        self.share_percentage = Some(percentage);
        self
    }

    /// With appointment order
    #[must_use]
    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    /// Deduplication key: the same person cannot hold the same role for the
    /// same document owner twice
    #[inline]
    #[must_use]
    pub fn dedup_key(&self) -> (PersonId, RoleType, Option<PersonId>) {
        (self.person_id, self.role_type, self.for_person_id)
    }
}
