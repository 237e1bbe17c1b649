//! In-memory reference store
//!
//! Flat id-keyed arenas behind a single lock. Every insert re-runs the graph
//! invariants, so a caller that skips validation still cannot corrupt the graph.

use crate::entities::{AncillaryDocument, Client, EstatePlan, Person, PlanRole, Relationship, Trust, User, Will};
use crate::error::StoreError;
use crate::ids::{ClientId, DocumentId, PersonId, PlanId, RelationshipId, RoleId, TrustId, UserId, WillId};
use crate::invariants::{EntityLookup, GraphValidator};
use crate::names::names_match;
use crate::store::{PersonRegistry, PlanStore};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct Arenas {
    people: IndexMap<PersonId, Person>,
    users: IndexMap<UserId, User>,
    clients: IndexMap<ClientId, Client>,
    relationships: IndexMap<RelationshipId, Relationship>,
    plans: IndexMap<PlanId, EstatePlan>,
    trusts: IndexMap<TrustId, Trust>,
    wills: IndexMap<WillId, Will>,
    documents: IndexMap<DocumentId, AncillaryDocument>,
    roles: IndexMap<RoleId, PlanRole>,
}

/// Entity counts, for assertions and reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    /// People
    pub people: usize,
    /// Users
    pub users: usize,
    /// Clients
    pub clients: usize,
    /// Relationships
    pub relationships: usize,
    /// Plans
    pub plans: usize,
    /// Trusts
    pub trusts: usize,
    /// Wills
    pub wills: usize,
    /// Ancillary documents
    pub documents: usize,
    /// Plan roles
    pub roles: usize,
}

/// Thread-safe in-memory implementation of every persistence interface
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Arenas>,
}

macro_rules! insert_unique {
    ($map:expr, $entity:literal, $id:expr, $value:expr) => {{
        let id = $id;
        if $map.contains_key(&id) {
            tracing::debug!(entity = $entity, %id, "duplicate id rejected");
            return Err(StoreError::Duplicate {
                entity: $entity,
                id: id.to_string(),
            });
        }
        $map.insert(id, $value);
        Ok(id)
    }};
}

fn rejected<T>(entity: &'static str, result: Result<T, StoreError>) -> Result<T, StoreError> {
    if let Err(error) = &result {
        tracing::debug!(entity, %error, "write rejected by graph invariants");
    }
    result
}

impl MemoryStore {
    /// Empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entity counts
    #[must_use]
    pub fn counts(&self) -> StoreCounts {
        let a = self.inner.read();
        StoreCounts {
            people: a.people.len(),
            users: a.users.len(),
            clients: a.clients.len(),
            relationships: a.relationships.len(),
            plans: a.plans.len(),
            trusts: a.trusts.len(),
            wills: a.wills.len(),
            documents: a.documents.len(),
            roles: a.roles.len(),
        }
    }

    /// All people, in insertion order
    #[must_use]
    pub fn people(&self) -> Vec<Person> {
        self.inner.read().people.values().cloned().collect()
    }

    /// All clients, in insertion order
    #[must_use]
    pub fn clients(&self) -> Vec<Client> {
        self.inner.read().clients.values().cloned().collect()
    }

    /// All relationships, in insertion order
    #[must_use]
    pub fn relationships(&self) -> Vec<Relationship> {
        self.inner.read().relationships.values().cloned().collect()
    }

    /// All plans, in insertion order
    #[must_use]
    pub fn plans(&self) -> Vec<EstatePlan> {
        self.inner.read().plans.values().cloned().collect()
    }

    /// All trusts, in insertion order
    #[must_use]
    pub fn trusts(&self) -> Vec<Trust> {
        self.inner.read().trusts.values().cloned().collect()
    }

    /// All wills, in insertion order
    #[must_use]
    pub fn wills(&self) -> Vec<Will> {
        self.inner.read().wills.values().cloned().collect()
    }

    /// All ancillary documents, in insertion order
    #[must_use]
    pub fn documents(&self) -> Vec<AncillaryDocument> {
        self.inner.read().documents.values().cloned().collect()
    }

    /// All roles, in insertion order
    #[must_use]
    pub fn roles(&self) -> Vec<PlanRole> {
        self.inner.read().roles.values().cloned().collect()
    }
}

#[async_trait]
impl EntityLookup for MemoryStore {
    async fn person_exists(&self, id: PersonId) -> Result<bool, StoreError> {
        Ok(self.inner.read().people.contains_key(&id))
    }

    async fn plan_exists(&self, id: PlanId) -> Result<bool, StoreError> {
        Ok(self.inner.read().plans.contains_key(&id))
    }

    async fn trust_plan(&self, id: TrustId) -> Result<Option<PlanId>, StoreError> {
        Ok(self.inner.read().trusts.get(&id).map(|t| t.plan_id))
    }

    async fn will_plan(&self, id: WillId) -> Result<Option<PlanId>, StoreError> {
        Ok(self.inner.read().wills.get(&id).map(|w| w.plan_id))
    }

    async fn document_plan(&self, id: DocumentId) -> Result<Option<PlanId>, StoreError> {
        Ok(self.inner.read().documents.get(&id).map(|d| d.plan_id))
    }
}

#[async_trait]
impl PersonRegistry for MemoryStore {
    async fn find_by_attributes(
        &self,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Vec<Person>, StoreError> {
        let email = email.map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty());
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        if name.is_none() && email.is_none() {
            return Ok(Vec::new());
        }

        let arenas = self.inner.read();
        Ok(arenas
            .people
            .values()
            .filter(|p| {
                let by_name = name.is_some_and(|n| names_match(n, &p.full_name()));
                let by_email = match (&email, &p.email) {
                    (Some(wanted), Some(have)) => have.trim().to_lowercase() == *wanted,
                    _ => false,
                };
                by_name || by_email
            })
            .cloned()
            .collect())
    }

    async fn insert_person(&self, person: Person) -> Result<PersonId, StoreError> {
        let mut a = self.inner.write();
        insert_unique!(a.people, "person", person.id, person)
    }

    async fn get_person(&self, id: PersonId) -> Result<Option<Person>, StoreError> {
        Ok(self.inner.read().people.get(&id).cloned())
    }

    async fn insert_user(&self, user: User) -> Result<UserId, StoreError> {
        rejected("user", GraphValidator::new(self).check_user(&user).await)?;
        let mut a = self.inner.write();
        insert_unique!(a.users, "user", user.id, user)
    }

    async fn insert_client(&self, client: Client) -> Result<ClientId, StoreError> {
        rejected("client", GraphValidator::new(self).check_client(&client).await)?;
        let mut a = self.inner.write();
        insert_unique!(a.clients, "client", client.id, client)
    }

    async fn client_for_person(&self, person_id: PersonId) -> Result<Option<ClientId>, StoreError> {
        Ok(self
            .inner
            .read()
            .clients
            .values()
            .find(|c| c.person_id == person_id)
            .map(|c| c.id))
    }

    async fn insert_relationship(&self, relationship: Relationship) -> Result<RelationshipId, StoreError> {
        rejected("relationship", GraphValidator::new(self).check_relationship(&relationship).await)?;
        let mut a = self.inner.write();
        insert_unique!(a.relationships, "relationship", relationship.id, relationship)
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn insert_plan(&self, plan: EstatePlan) -> Result<PlanId, StoreError> {
        rejected("plan", GraphValidator::new(self).check_plan(&plan).await)?;
        let mut a = self.inner.write();
        insert_unique!(a.plans, "plan", plan.id, plan)
    }

    async fn update_plan(&self, plan: EstatePlan) -> Result<(), StoreError> {
        rejected("plan", GraphValidator::new(self).check_plan(&plan).await)?;
        let mut a = self.inner.write();
        match a.plans.get_mut(&plan.id) {
            Some(slot) => {
                *slot = plan;
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "plan",
                id: plan.id.to_string(),
            }),
        }
    }

    async fn get_plan(&self, id: PlanId) -> Result<Option<EstatePlan>, StoreError> {
        Ok(self.inner.read().plans.get(&id).cloned())
    }

    async fn insert_trust(&self, trust: Trust) -> Result<TrustId, StoreError> {
        rejected("trust", GraphValidator::new(self).check_trust(&trust).await)?;
        let mut a = self.inner.write();
        insert_unique!(a.trusts, "trust", trust.id, trust)
    }

    async fn insert_will(&self, will: Will) -> Result<WillId, StoreError> {
        rejected("will", GraphValidator::new(self).check_will(&will).await)?;
        let mut a = self.inner.write();
        insert_unique!(a.wills, "will", will.id, will)
    }

    async fn insert_document(&self, document: AncillaryDocument) -> Result<DocumentId, StoreError> {
        rejected("document", GraphValidator::new(self).check_document(&document).await)?;
        let mut a = self.inner.write();
        insert_unique!(a.documents, "document", document.id, document)
    }

    async fn insert_role(&self, role: PlanRole) -> Result<RoleId, StoreError> {
        rejected("role", GraphValidator::new(self).check_role(&role).await)?;
        let mut a = self.inner.write();
        insert_unique!(a.roles, "role", role.id, role)
    }

    async fn roles_for_plan(&self, plan_id: PlanId) -> Result<Vec<PlanRole>, StoreError> {
        Ok(self
            .inner
            .read()
            .roles
            .values()
            .filter(|r| r.plan_id == plan_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_by_name_or_email() {
        let store = MemoryStore::new();
        let matt = Person::new("Matthew", "Christensen").with_email("Matt@Example.com");
        let desi = Person::new("Desiree", "Christensen");
        store.insert_person(matt.clone()).await.unwrap();
        store.insert_person(desi.clone()).await.unwrap();

        let by_name = store.find_by_attributes(Some("matthew christensen"), None).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, matt.id);

        let by_email = store.find_by_attributes(None, Some("matt@example.com ")).await.unwrap();
        assert_eq!(by_email.len(), 1);

        let none = store.find_by_attributes(None, None).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = MemoryStore::new();
        let p = Person::new("A", "B");
        store.insert_person(p.clone()).await.unwrap();
        let err = store.insert_person(p).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { entity: "person", .. }));
    }

    #[tokio::test]
    async fn insert_rechecks_invariants() {
        let store = MemoryStore::new();
        let err = store.insert_client(Client::new(PersonId::new())).await.unwrap_err();
        assert!(matches!(err, StoreError::Invariant(_)));
        assert_eq!(store.counts().clients, 0);
    }

    #[tokio::test]
    async fn update_missing_plan_fails() {
        let store = MemoryStore::new();
        let p = Person::new("A", "B");
        store.insert_person(p.clone()).await.unwrap();
        let plan = crate::EstatePlan::new("x", crate::PlanType::WillBased, p.id, None);
        let err = store.update_plan(plan).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "plan", .. }));
    }

    #[tokio::test]
    async fn client_lookup_by_person() {
        let store = MemoryStore::new();
        let p = Person::new("A", "B");
        store.insert_person(p.clone()).await.unwrap();
        assert!(store.client_for_person(p.id).await.unwrap().is_none());
        let client = Client::new(p.id);
        store.insert_client(client.clone()).await.unwrap();
        assert_eq!(store.client_for_person(p.id).await.unwrap(), Some(client.id));
        assert_eq!(store.counts().clients, 1);
    }
}
