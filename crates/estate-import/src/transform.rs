//! Domain transformer: field table + decisions → entities ready to persist
//!
//! Nothing here touches a store. Every entity is created with its final id so
//! cross-references can be wired before the first write.

use crate::error::TransformError;
use crate::extract::Extraction;
use crate::fields::{
    has_trust, parse_share, FiduciaryCategory, Principal, RoleScope, BENEFICIARY_NAME, BENEFICIARY_PERCENTAGE,
    CHILD_NAME, FIDUCIARY_CATEGORIES, HIPAA_TF, TRUST_NAME, TRUST_SIGN_DATE, TRUST_STATE, WILL_EXECUTION_DATE,
};
use estate_fields::{FieldError, FieldTable};
use estate_match::ExtractedPerson;
use estate_model::names::{normalize_name, tokens_contained};
use estate_model::{
    AncillaryDocument, DocumentId, DocumentKind, EstatePlan, Person, PersonId, PlanRole, PlanType, Provenance,
    Relationship, RelationshipKind, RoleType, Trust, Will, WillId,
};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Provenance source recorded on people created by an import
pub const IMPORT_SOURCE: &str = "answer-file import";

/// What to do with one extracted person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PersonDecision {
    /// The person already exists in the registry
    UseExisting {
        /// Registry id
        id: PersonId,
    },
    /// Create a new person record
    CreateNew,
}

/// Name → person id table used to resolve every name the export mentions
#[derive(Debug, Clone, Default)]
pub struct PersonLookup {
    ids: IndexMap<String, PersonId>,
}

impl PersonLookup {
    /// Empty lookup
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name
    pub fn insert(&mut self, name: impl Into<String>, id: PersonId) {
        self.ids.insert(name.into(), id);
    }

    /// Resolve a name: exact, then case-insensitive, then every word of
    /// `name` appearing in a registered name
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<PersonId> {
        let name = name.trim();
        if let Some(id) = self.ids.get(name) {
            return Some(*id);
        }

        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        self.ids
            .iter()
            .find(|(known, _)| normalize_name(known) == wanted)
            .or_else(|| self.ids.iter().find(|(known, _)| tokens_contained(name, known)))
            .map(|(_, id)| *id)
    }

    /// Number of registered names
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing was registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Entities produced for one import, in persistence order
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub new_people: Vec<Person>,
    /// Client then spouse
    pub principal_ids: Vec<PersonId>,
    pub relationships: Vec<Relationship>,
    pub plan: EstatePlan,
    pub trust: Option<Trust>,
    pub wills: Vec<Will>,
    pub documents: Vec<AncillaryDocument>,
    pub roles: Vec<PlanRole>,
    /// Names whose roles were dropped for lack of a resolvable person
    pub unresolved: Vec<String>,
}

/// Builds the plan aggregate from a parsed export
#[derive(Debug, Clone)]
pub struct DomainTransformer {
    suffix: String,
}

impl Default for DomainTransformer {
    fn default() -> Self {
        Self::new(" SP")
    }
}

struct PrincipalDocs {
    principal: Principal,
    person_id: PersonId,
    will_id: Option<WillId>,
    documents: IndexMap<DocumentKind, DocumentId>,
}

impl DomainTransformer {
    /// Transformer reading second-principal fields with `suffix`
    #[must_use]
    pub fn new(suffix: impl Into<String>) -> Self {
        Self { suffix: suffix.into() }
    }

    /// Produce the entities for an import.
    ///
    /// # Errors
    ///
    /// [`TransformError::MissingField`] when the export names no client,
    /// [`TransformError::UnresolvedPerson`] when a principal has no decision,
    /// [`TransformError::Transition`] if the plan cannot be activated.
    pub fn transform(
        &self,
        table: &FieldTable,
        extraction: &Extraction,
        decisions: &IndexMap<String, PersonDecision>,
        session_id: &str,
    ) -> Result<TransformOutput, TransformError> {
        let (lookup, new_people) = resolve_people(extraction, decisions, session_id);

        let client_name = extraction
            .client_name
            .as_deref()
            .ok_or_else(|| FieldError::missing(Principal::Client.identity_field("full name")))?;
        let client_id = lookup
            .resolve(client_name)
            .ok_or_else(|| TransformError::unresolved(client_name, "grantor"))?;
        let spouse_id = extraction
            .spouse_name
            .as_deref()
            .map(|name| lookup.resolve(name).ok_or_else(|| TransformError::unresolved(name, "grantor")))
            .transpose()?;

        let plan = build_plan(table, client_name, client_id, spouse_id)?;

        let trust = table.text(TRUST_NAME).filter(|_| has_trust(table)).map(|name| {
            let mut trust = Trust::new(plan.id, name, extraction.is_joint);
            trust.trust_date = table.date(TRUST_SIGN_DATE);
            trust.governing_state = table.text(TRUST_STATE).map(str::to_string);
            trust
        });

        let principals: Vec<(Principal, PersonId)> = [(Principal::Client, Some(client_id)), (Principal::Spouse, spouse_id)]
            .into_iter()
            .filter_map(|(p, id)| id.map(|id| (p, id)))
            .collect();

        let mut wills = Vec::new();
        let mut documents = Vec::new();
        let mut docs = Vec::new();
        for &(principal, person_id) in &principals {
            let will = self.will_for(table, &plan, trust.as_ref(), principal, person_id);
            let mut entry = PrincipalDocs {
                principal,
                person_id,
                will_id: will.as_ref().map(|w| w.id),
                documents: IndexMap::new(),
            };
            wills.extend(will);
            for kind in self.document_kinds(table, principal) {
                let mut document = AncillaryDocument::new(plan.id, person_id, kind);
                document.execution_date = plan.effective_date;
                entry.documents.insert(kind, document.id);
                documents.push(document);
            }
            docs.push(entry);
        }

        let mut unresolved = Vec::new();
        let mut roles = Vec::new();

        for &(_, person_id) in &principals {
            roles.push(PlanRole::new(plan.id, person_id, RoleType::Grantor));
        }

        for category in FIDUCIARY_CATEGORIES {
            match category.scope {
                RoleScope::Plan => {
                    let names = category.names(table, Principal::Client, &self.suffix);
                    for (i, name) in names.into_iter().enumerate() {
                        let Some(person_id) = resolve_or_note(&lookup, name, &mut unresolved) else { continue };
                        let mut role = PlanRole::new(plan.id, person_id, category.role).with_ordinal(ordinal(i));
                        if let Some(trust) = &trust {
                            role = role.in_trust(trust.id);
                        }
                        roles.push(role);
                    }
                }
                RoleScope::Principal => {
                    for entry in &docs {
                        self.principal_roles(table, &lookup, &plan, category, entry, &mut roles, &mut unresolved);
                    }
                }
            }
        }

        let shares = table.slots(BENEFICIARY_PERCENTAGE);
        for (i, name) in table.texts(BENEFICIARY_NAME).into_iter().enumerate() {
            let Some(name) = name else { continue };
            let Some(person_id) = resolve_or_note(&lookup, name, &mut unresolved) else { continue };
            let mut role = PlanRole::new(plan.id, person_id, RoleType::Beneficiary);
            if let Some(share) = shares.get(i).and_then(Option::as_ref).and_then(parse_share) {
                role = role.with_share(share);
            }
            if let Some(trust) = &trust {
                role = role.in_trust(trust.id);
            }
            roles.push(role);
        }

        let generated = roles.len();
        let roles = dedup_roles(roles);
        tracing::debug!(generated, kept = roles.len(), "roles built");

        let relationships = relationships(table, &lookup, &principals);

        Ok(TransformOutput {
            new_people,
            principal_ids: principals.iter().map(|(_, id)| *id).collect(),
            relationships,
            plan,
            trust,
            wills,
            documents,
            roles,
            unresolved,
        })
    }

    fn will_for(
        &self,
        table: &FieldTable,
        plan: &EstatePlan,
        trust: Option<&Trust>,
        principal: Principal,
        person_id: PersonId,
    ) -> Option<Will> {
        let names_executor = FIDUCIARY_CATEGORIES
            .iter()
            .filter(|c| c.in_will)
            .any(|c| !c.names(table, principal, &self.suffix).is_empty());
        let wanted =
            plan.plan_type == PlanType::WillBased || table.contains(WILL_EXECUTION_DATE) || names_executor;
        if !wanted {
            return None;
        }

        let mut will = Will::new(plan.id);
        will.testator_id = Some(person_id);
        will.execution_date = table.date(WILL_EXECUTION_DATE);
        will.pour_over_trust_id = trust.map(|t| t.id);
        Some(will)
    }

    fn document_kinds(&self, table: &FieldTable, principal: Principal) -> Vec<DocumentKind> {
        let named = |kind: DocumentKind| {
            FIDUCIARY_CATEGORIES
                .iter()
                .filter(|c| c.document == Some(kind))
                .any(|c| !c.names(table, principal, &self.suffix).is_empty())
        };

        let mut kinds = Vec::new();
        if named(DocumentKind::FinancialPowerOfAttorney) {
            kinds.push(DocumentKind::FinancialPowerOfAttorney);
        }
        if named(DocumentKind::HealthcareDirective) {
            kinds.push(DocumentKind::HealthcareDirective);
            if table.bool(HIPAA_TF) != Some(false) {
                kinds.push(DocumentKind::HipaaAuthorization);
            }
        }
        if named(DocumentKind::GuardianshipNomination) {
            kinds.push(DocumentKind::GuardianshipNomination);
        }
        kinds
    }

    #[allow(clippy::too_many_arguments)]
    fn principal_roles(
        &self,
        table: &FieldTable,
        lookup: &PersonLookup,
        plan: &EstatePlan,
        category: &FiduciaryCategory,
        entry: &PrincipalDocs,
        roles: &mut Vec<PlanRole>,
        unresolved: &mut Vec<String>,
    ) {
        let names = category.names(table, entry.principal, &self.suffix);
        for (i, name) in names.into_iter().enumerate() {
            let Some(person_id) = resolve_or_note(lookup, name, unresolved) else { continue };
            let mut role = PlanRole::new(plan.id, person_id, category.role)
                .for_person(entry.person_id)
                .with_ordinal(ordinal(i));
            if category.in_will {
                if let Some(will_id) = entry.will_id {
                    role = role.in_will(will_id);
                }
            }
            if let Some(document_id) = category.document.and_then(|k| entry.documents.get(&k)) {
                role = role.in_document(*document_id);
            }
            roles.push(role);
        }
    }
}

fn ordinal(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

fn resolve_or_note(lookup: &PersonLookup, name: &str, unresolved: &mut Vec<String>) -> Option<PersonId> {
    let id = lookup.resolve(name);
    if id.is_none() {
        tracing::debug!(name, "no person resolved; role dropped");
        if !unresolved.iter().any(|n| n == name) {
            unresolved.push(name.to_string());
        }
    }
    id
}

/// Apply decisions to extracted people: existing ids are registered, new
/// people are built (with provenance) and registered under their name
fn resolve_people(
    extraction: &Extraction,
    decisions: &IndexMap<String, PersonDecision>,
    session_id: &str,
) -> (PersonLookup, Vec<Person>) {
    let mut lookup = PersonLookup::new();
    let mut new_people = Vec::new();

    for extracted in extraction.extractor.people() {
        match decisions.get(&extracted.name) {
            Some(PersonDecision::UseExisting { id }) => lookup.insert(extracted.name.clone(), *id),
            Some(PersonDecision::CreateNew) => {
                let person = new_person(extracted, session_id);
                lookup.insert(extracted.name.clone(), person.id);
                new_people.push(person);
            }
            None => tracing::debug!(name = %extracted.name, "no decision for extracted person"),
        }
    }
    (lookup, new_people)
}

fn new_person(extracted: &ExtractedPerson, session_id: &str) -> Person {
    let mut person = Person::from_display_name(&extracted.name)
        .with_provenance(Provenance::new(IMPORT_SOURCE).with_session(session_id));
    person.email.clone_from(&extracted.email);
    person.date_of_birth = extracted.date_of_birth;
    person.ssn_last4.clone_from(&extracted.ssn_last4);
    person
}

fn build_plan(
    table: &FieldTable,
    client_name: &str,
    client_id: PersonId,
    spouse_id: Option<PersonId>,
) -> Result<EstatePlan, TransformError> {
    let trust_name = table.text(TRUST_NAME).filter(|_| has_trust(table));
    let plan_type = if trust_name.is_some() {
        PlanType::TrustBased
    } else {
        PlanType::WillBased
    };
    let name = trust_name.map_or_else(|| format!("{client_name} Estate Plan"), str::to_string);

    let mut plan = EstatePlan::new(name, plan_type, client_id, spouse_id);
    if let Some(effective) = table.date(TRUST_SIGN_DATE).or_else(|| table.date(WILL_EXECUTION_DATE)) {
        plan.activate(effective)?;
    }
    Ok(plan)
}

/// Keep the first role for each (person, role type, for-person)
#[must_use]
pub fn dedup_roles(roles: Vec<PlanRole>) -> Vec<PlanRole> {
    let mut seen = IndexSet::new();
    roles.into_iter().filter(|r| seen.insert(r.dedup_key())).collect()
}

fn relationships(table: &FieldTable, lookup: &PersonLookup, principals: &[(Principal, PersonId)]) -> Vec<Relationship> {
    let mut out = Vec::new();
    if let [(_, a), (_, b)] = principals {
        if a != b {
            out.push(Relationship::new(*a, *b, RelationshipKind::Spouse));
            out.push(Relationship::new(*b, *a, RelationshipKind::Spouse));
        }
    }

    let mut seen = IndexSet::new();
    for name in table.present_texts(CHILD_NAME) {
        let Some(child) = lookup.resolve(name) else { continue };
        for &(_, parent) in principals {
            if parent != child && seen.insert((parent, child)) {
                out.push(Relationship::new(parent, child, RelationshipKind::Child));
            }
        }
    }
    out
}
