//! Creation-time invariants of the entity graph
//!
//! Every write must pass the matching `check_*` before it reaches a store:
//! - people exist on their own; users, clients, and plans reference existing people
//! - relationships need both endpoints to exist
//! - trusts, wills, documents, and roles belong to an existing plan
//! - optional sibling references must exist and share the referencing record's plan
//!   (a role's for-person only needs to exist)

use crate::entities::{AncillaryDocument, Client, EstatePlan, PlanRole, Relationship, Trust, User, Will};
use crate::error::{GraphError, StoreError};
use crate::ids::{DocumentId, PersonId, PlanId, TrustId, WillId};
use async_trait::async_trait;

/// Existence and ownership queries the invariant layer needs
#[async_trait]
pub trait EntityLookup: Send + Sync {
    /// Whether a person with this id exists
    async fn person_exists(&self, id: PersonId) -> Result<bool, StoreError>;

    /// Whether a plan with this id exists
    async fn plan_exists(&self, id: PlanId) -> Result<bool, StoreError>;

    /// Owning plan of a trust, `None` if the trust does not exist
    async fn trust_plan(&self, id: TrustId) -> Result<Option<PlanId>, StoreError>;

    /// Owning plan of a will, `None` if the will does not exist
    async fn will_plan(&self, id: WillId) -> Result<Option<PlanId>, StoreError>;

    /// Owning plan of an ancillary document, `None` if it does not exist
    async fn document_plan(&self, id: DocumentId) -> Result<Option<PlanId>, StoreError>;
}

/// Validates entities against a lookup before they are written
pub struct GraphValidator<'a, L: ?Sized> {
    lookup: &'a L,
}

impl<'a, L: EntityLookup + ?Sized> GraphValidator<'a, L> {
    /// Validator backed by `lookup`
    #[inline]
    #[must_use]
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// A user may only specialize an existing person
    pub async fn check_user(&self, user: &User) -> Result<(), StoreError> {
        self.require_person("user", user.person_id).await
    }

    /// A client may only specialize an existing person
    pub async fn check_client(&self, client: &Client) -> Result<(), StoreError> {
        self.require_person("client", client.person_id).await
    }

    /// Both endpoints must already exist
    pub async fn check_relationship(&self, rel: &Relationship) -> Result<(), StoreError> {
        for (side, id) in [("from", rel.from_person_id), ("to", rel.to_person_id)] {
            if id.is_nil() {
                return Err(GraphError::relationship(format!("{side} person reference is empty")).into());
            }
            if !self.lookup.person_exists(id).await? {
                return Err(GraphError::relationship(format!("{side} person {id} does not exist")).into());
            }
        }
        if rel.from_person_id == rel.to_person_id {
            return Err(GraphError::relationship(format!(
                "person {} cannot be related to themselves",
                rel.from_person_id
            ))
            .into());
        }
        Ok(())
    }

    /// Grantors are a person-existence requirement
    pub async fn check_plan(&self, plan: &EstatePlan) -> Result<(), StoreError> {
        self.require_person("estate plan", plan.grantor_id).await?;
        if let Some(co) = plan.co_grantor_id {
            self.require_person("estate plan", co).await?;
            if co == plan.grantor_id {
                return Err(GraphError::identity(
                    "estate plan",
                    format!("lists person {co} as both grantors"),
                )
                .into());
            }
        }
        Ok(())
    }

    /// A trust belongs to an existing plan
    pub async fn check_trust(&self, trust: &Trust) -> Result<(), StoreError> {
        self.require_plan("trust", trust.plan_id).await
    }

    /// A will belongs to an existing plan; its pour-over trust shares that plan
    pub async fn check_will(&self, will: &Will) -> Result<(), StoreError> {
        self.require_plan("will", will.plan_id).await?;
        if let Some(testator) = will.testator_id {
            self.require_person("will", testator).await?;
        }
        if let Some(trust_id) = will.pour_over_trust_id {
            let owner = self.lookup.trust_plan(trust_id).await?;
            Self::same_plan("will", "pour-over trust", trust_id, owner, will.plan_id)?;
        }
        Ok(())
    }

    /// A document belongs to an existing plan and an existing principal
    pub async fn check_document(&self, doc: &AncillaryDocument) -> Result<(), StoreError> {
        self.require_person("ancillary document", doc.person_id).await?;
        self.require_plan("ancillary document", doc.plan_id).await
    }

    /// A role belongs to an existing plan and person; scoped references share the plan
    pub async fn check_role(&self, role: &PlanRole) -> Result<(), StoreError> {
        self.require_person("plan role", role.person_id).await?;
        self.require_plan("plan role", role.plan_id).await?;

        if let Some(principal) = role.for_person_id {
            self.require_person("plan role", principal).await?;
        }
        if let Some(trust_id) = role.trust_id {
            let owner = self.lookup.trust_plan(trust_id).await?;
            Self::same_plan("plan role", "trust", trust_id, owner, role.plan_id)?;
        }
        if let Some(will_id) = role.will_id {
            let owner = self.lookup.will_plan(will_id).await?;
            Self::same_plan("plan role", "will", will_id, owner, role.plan_id)?;
        }
        if let Some(doc_id) = role.document_id {
            let owner = self.lookup.document_plan(doc_id).await?;
            Self::same_plan("plan role", "document", doc_id, owner, role.plan_id)?;
        }
        Ok(())
    }

    async fn require_person(&self, entity: &'static str, id: PersonId) -> Result<(), StoreError> {
        if id.is_nil() {
            return Err(GraphError::identity(entity, "has an empty person reference").into());
        }
        if !self.lookup.person_exists(id).await? {
            return Err(GraphError::identity(entity, format!("references nonexistent person {id}")).into());
        }
        Ok(())
    }

    async fn require_plan(&self, entity: &'static str, id: PlanId) -> Result<(), StoreError> {
        if id.is_nil() {
            return Err(GraphError::plan_aggregate(entity, "has an empty plan reference").into());
        }
        if !self.lookup.plan_exists(id).await? {
            return Err(GraphError::plan_aggregate(entity, format!("references nonexistent plan {id}")).into());
        }
        Ok(())
    }

    fn same_plan(
        entity: &'static str,
        target: &str,
        target_id: impl std::fmt::Display,
        owner: Option<PlanId>,
        expected: PlanId,
    ) -> Result<(), StoreError> {
        match owner {
            None => Err(GraphError::plan_aggregate(
                entity,
                format!("references nonexistent {target} {target_id}"),
            )
            .into()),
            Some(plan) if plan != expected => Err(GraphError::plan_aggregate(
                entity,
                format!("in plan {expected} references {target} {target_id} of plan {plan}"),
            )
            .into()),
            Some(_) => Ok(()),
        }
    }
}
