//! Person extractor
//!
//! One extractor per import session. It holds every distinct person named in
//! the export, keyed by exact display name, along with the role labels each
//! one holds in the plan.

use crate::error::MatchError;
use crate::scoring::{rank, score, MatchCandidate};
use chrono::NaiveDate;
use estate_model::{Person, PersonId, PersonRegistry};
use futures::future::try_join_all;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Category a person was first found under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonRoleTag {
    /// A principal (both grantors of a joint trust carry this tag)
    Client,
    /// Second principal of a non-joint plan
    Spouse,
    /// Child of the principals
    Child,
    /// Named beneficiary
    Beneficiary,
    /// Named only in a fiduciary capacity
    Fiduciary,
}

impl PersonRoleTag {
    /// Whether the tag marks a principal of the plan
    #[must_use]
    pub fn is_principal(self) -> bool {
        matches!(self, PersonRoleTag::Client | PersonRoleTag::Spouse)
    }
}

/// A natural person referenced by the export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPerson {
    pub name: String,
    pub role_tag: PersonRoleTag,
    /// Labels accumulate across categories, in first-seen order
    pub role_labels: IndexSet<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub ssn_last4: Option<String>,
}

impl ExtractedPerson {
    /// Person with no labels or contact details
    #[must_use]
    pub fn new(name: impl Into<String>, role_tag: PersonRoleTag) -> Self {
        Self {
            name: name.into(),
            role_tag,
            role_labels: IndexSet::new(),
            email: None,
            date_of_birth: None,
            ssn_last4: None,
        }
    }
}

/// Options for [`PersonExtractor::find_matches_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Maximum candidates kept per person
    pub limit: usize,
    /// Candidates below this confidence are dropped
    pub min_confidence: u8,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            limit: 5,
            min_confidence: 0,
        }
    }
}

/// Registry of the people found in one export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonExtractor {
    people: IndexMap<String, ExtractedPerson>,
}

impl PersonExtractor {
    /// Empty extractor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a person, or augment the one already registered under the
    /// same exact name.
    ///
    /// Labels are unioned. Contact details fill gaps but never overwrite, and
    /// the first role tag sticks. Blank names are ignored. Returns whether a
    /// new person was registered.
    pub fn add<I, S>(
        &mut self,
        name: &str,
        role_tag: PersonRoleTag,
        role_labels: I,
        email: Option<&str>,
        date_of_birth: Option<NaiveDate>,
    ) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        let is_new = !self.people.contains_key(name);
        let person = self
            .people
            .entry(name.to_string())
            .or_insert_with(|| ExtractedPerson::new(name, role_tag));

        person.role_labels.extend(role_labels.into_iter().map(Into::into));
        if person.email.is_none() {
            person.email = email.map(str::trim).filter(|e| !e.is_empty()).map(str::to_string);
        }
        if person.date_of_birth.is_none() {
            person.date_of_birth = date_of_birth;
        }

        if is_new {
            tracing::debug!(name, tag = ?role_tag, "registered extracted person");
        }
        is_new
    }

    /// Append a role label to an already-registered person.
    /// Returns `false` when no person has that exact name.
    pub fn add_role(&mut self, name: &str, label: impl Into<String>) -> bool {
        match self.people.get_mut(name.trim()) {
            Some(person) => {
                person.role_labels.insert(label.into());
                true
            }
            None => false,
        }
    }

    /// Record the last four SSN digits of a registered person
    pub fn set_ssn_last4(&mut self, name: &str, last4: impl Into<String>) -> bool {
        match self.people.get_mut(name.trim()) {
            Some(person) => {
                person.ssn_last4 = Some(last4.into());
                true
            }
            None => false,
        }
    }

    /// Person registered under an exact name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ExtractedPerson> {
        self.people.get(name.trim())
    }

    /// All people, in registration order
    pub fn people(&self) -> impl Iterator<Item = &ExtractedPerson> {
        self.people.values()
    }

    /// Number of distinct people
    #[must_use]
    pub fn len(&self) -> usize {
        self.people.len()
    }

    /// Whether nobody was registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Names holding each role label, labels in first-seen order
    #[must_use]
    pub fn roles_by_label(&self) -> IndexMap<&str, Vec<&str>> {
        let mut table: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for person in self.people.values() {
            for label in &person.role_labels {
                table.entry(label.as_str()).or_default().push(person.name.as_str());
            }
        }
        table
    }

    /// Registry candidates for every registered person, keyed by name.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError`] when a registry lookup fails.
    pub async fn find_all_matches<R>(
        &self,
        registry: &R,
        limit: usize,
    ) -> Result<IndexMap<String, Vec<MatchCandidate>>, MatchError>
    where
        R: PersonRegistry + ?Sized,
    {
        self.find_matches_with(
            registry,
            MatchOptions {
                limit,
                ..MatchOptions::default()
            },
        )
        .await
    }

    /// [`find_all_matches`](Self::find_all_matches) with a confidence floor.
    /// People are matched concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError`] when a registry lookup fails.
    pub async fn find_matches_with<R>(
        &self,
        registry: &R,
        options: MatchOptions,
    ) -> Result<IndexMap<String, Vec<MatchCandidate>>, MatchError>
    where
        R: PersonRegistry + ?Sized,
    {
        let lookups = self.people.values().map(|person| async move {
            let candidates = candidates_for(registry, person, options).await?;
            Ok::<_, MatchError>((person.name.clone(), candidates))
        });
        let results: IndexMap<String, Vec<MatchCandidate>> = try_join_all(lookups).await?.into_iter().collect();

        let matched = results.values().filter(|c| !c.is_empty()).count();
        tracing::info!(people = self.people.len(), matched, "person matching complete");
        Ok(results)
    }
}

async fn candidates_for<R>(
    registry: &R,
    person: &ExtractedPerson,
    options: MatchOptions,
) -> Result<Vec<MatchCandidate>, MatchError>
where
    R: PersonRegistry + ?Sized,
{
    let by_name = registry.find_by_attributes(Some(person.name.as_str()), None);
    let found = match person.email.as_deref() {
        Some(email) => {
            let by_email = registry.find_by_attributes(None, Some(email));
            let (mut named, emailed) = futures::try_join!(by_name, by_email)
                .map_err(|err| MatchError::registry(&person.name, err))?;
            named.extend(emailed);
            named
        }
        None => by_name.await.map_err(|err| MatchError::registry(&person.name, err))?,
    };

    // Same person may come back from both lookups.
    let unique: IndexMap<PersonId, Person> = found.into_iter().map(|p| (p.id, p)).collect();

    let mut candidates: Vec<MatchCandidate> = unique
        .values()
        .filter_map(|existing| score(person, existing))
        .filter(|c| c.confidence >= options.min_confidence)
        .collect();
    rank(&mut candidates, options.limit);

    tracing::debug!(name = %person.name, candidates = candidates.len(), "matched extracted person");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent_and_unions_labels() {
        let mut x = PersonExtractor::new();
        assert!(x.add("Desiree Christensen", PersonRoleTag::Client, ["Grantor"], None, None));
        assert!(!x.add(
            "Desiree Christensen",
            PersonRoleTag::Fiduciary,
            ["Trustee", "Grantor"],
            Some("desi@example.com"),
            None,
        ));

        assert_eq!(x.len(), 1);
        let p = x.get("Desiree Christensen").unwrap();
        assert_eq!(p.role_tag, PersonRoleTag::Client);
        assert_eq!(p.role_labels.iter().collect::<Vec<_>>(), vec!["Grantor", "Trustee"]);
        assert_eq!(p.email.as_deref(), Some("desi@example.com"));
    }

    #[test]
    fn test_add_role_requires_registration() {
        let mut x = PersonExtractor::new();
        assert!(!x.add_role("Nobody", "Trustee"));
        x.add("Anna", PersonRoleTag::Child, Vec::<String>::new(), None, None);
        assert!(x.add_role("Anna", "Beneficiary"));
        assert!(x.get("Anna").unwrap().role_labels.contains("Beneficiary"));
    }

    #[test]
    fn test_blank_names_ignored() {
        let mut x = PersonExtractor::new();
        assert!(!x.add("   ", PersonRoleTag::Beneficiary, ["Beneficiary"], None, None));
        assert!(x.is_empty());
    }

    #[test]
    fn test_roles_by_label() {
        let mut x = PersonExtractor::new();
        x.add("A", PersonRoleTag::Fiduciary, ["Trustee"], None, None);
        x.add("B", PersonRoleTag::Fiduciary, ["Successor Trustee", "Trustee"], None, None);

        let table = x.roles_by_label();
        assert_eq!(table.get("Trustee"), Some(&vec!["A", "B"]));
        assert_eq!(table.get("Successor Trustee"), Some(&vec!["B"]));
    }
}
