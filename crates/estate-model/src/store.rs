//! Persistence interfaces consumed by the import pipeline
//!
//! Implementations are expected to honor the ids carried by the entities they
//! receive. Callers validate with [`GraphValidator`](crate::GraphValidator)
//! before every insert; stores may enforce the same invariants again.

use crate::entities::{AncillaryDocument, Client, EstatePlan, Person, PlanRole, Relationship, Trust, User, Will};
use crate::error::StoreError;
use crate::ids::{ClientId, DocumentId, PersonId, PlanId, RelationshipId, RoleId, TrustId, UserId, WillId};
use async_trait::async_trait;

/// Registry of people and their specializations
#[async_trait]
pub trait PersonRegistry: Send + Sync {
    /// People whose name or email matches (either attribute may be omitted)
    async fn find_by_attributes(
        &self,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Vec<Person>, StoreError>;

    /// Insert a person
    async fn insert_person(&self, person: Person) -> Result<PersonId, StoreError>;

    /// Fetch a person by id
    async fn get_person(&self, id: PersonId) -> Result<Option<Person>, StoreError>;

    /// Insert a user specialization
    async fn insert_user(&self, user: User) -> Result<UserId, StoreError>;

    /// Insert a client specialization
    async fn insert_client(&self, client: Client) -> Result<ClientId, StoreError>;

    /// Existing client specialization of a person
    async fn client_for_person(&self, person_id: PersonId) -> Result<Option<ClientId>, StoreError>;

    /// Insert a person-to-person relationship
    async fn insert_relationship(&self, relationship: Relationship) -> Result<RelationshipId, StoreError>;
}

/// Store for the plan aggregate
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Insert a plan
    async fn insert_plan(&self, plan: EstatePlan) -> Result<PlanId, StoreError>;

    /// Replace a stored plan (status transitions, amendments)
    async fn update_plan(&self, plan: EstatePlan) -> Result<(), StoreError>;

    /// Fetch a plan by id
    async fn get_plan(&self, id: PlanId) -> Result<Option<EstatePlan>, StoreError>;

    /// Insert a trust
    async fn insert_trust(&self, trust: Trust) -> Result<TrustId, StoreError>;

    /// Insert a will
    async fn insert_will(&self, will: Will) -> Result<WillId, StoreError>;

    /// Insert an ancillary document
    async fn insert_document(&self, document: AncillaryDocument) -> Result<DocumentId, StoreError>;

    /// Insert a role
    async fn insert_role(&self, role: PlanRole) -> Result<RoleId, StoreError>;

    /// All roles of a plan, in insertion order
    async fn roles_for_plan(&self, plan_id: PlanId) -> Result<Vec<PlanRole>, StoreError>;
}
