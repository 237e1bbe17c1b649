//! Estate Plan Entity Graph
//!
//! The structural contract of an imported estate plan:
//!
//! - **Entities**: people (independent identities), their user/client
//!   specializations and relationships, and the plan aggregate (plan, trusts,
//!   wills, ancillary documents, role assignments)
//! - **Invariants**: creation-time preconditions checked by [`GraphValidator`]
//! - **Lifecycle**: the plan status state machine
//! - **Persistence seams**: [`PersonRegistry`] and [`PlanStore`], with
//!   [`MemoryStore`] as the reference implementation
//!
//! # Example
//!
//! ```rust,ignore
//! use estate_model::prelude::*;
//!
//! let store = MemoryStore::new();
//! let grantor = Person::new("Matthew", "Christensen");
//! store.insert_person(grantor.clone()).await?;
//!
//! let plan = EstatePlan::new("Christensen Family Trust", PlanType::TrustBased, grantor.id, None);
//! GraphValidator::new(&store).check_plan(&plan).await?;
//! store.insert_plan(plan).await?;
//! ```

pub mod entities;
pub mod error;
pub mod ids;
pub mod invariants;
pub mod memory;
pub mod names;
pub mod status;
pub mod store;

// Re-exports for convenience
pub use entities::{
    AncillaryDocument, Client, DocumentKind, EstatePlan, Person, PlanRole, PlanType, Provenance,
    Relationship, RelationshipKind, RoleType, Trust, User, Will,
};
pub use error::{GraphError, StoreError, TransitionError};
pub use ids::{
    ClientId, DocumentId, PersonId, PlanId, RelationshipId, RoleId, TrustId, UserId, WillId,
};
pub use invariants::{EntityLookup, GraphValidator};
pub use memory::{MemoryStore, StoreCounts};
pub use status::{allowed_transitions, validate_transition, PlanStatus, StatusChange};
pub use store::{PersonRegistry, PlanStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the entity graph
    pub use crate::{
        AncillaryDocument, Client, DocumentKind, EntityLookup, EstatePlan, GraphError,
        GraphValidator, MemoryStore, Person, PersonId, PersonRegistry, PlanId, PlanRole,
        PlanStatus, PlanStore, PlanType, Relationship, RelationshipKind, RoleType, StoreError,
        Trust, User, Will,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
