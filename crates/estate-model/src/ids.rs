//! Entity identifiers
//!
//! Every entity lives in a flat collection keyed by its own id type.
//! Cross-references between entities are ids, never embedded values.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random id
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// The nil id, used by callers to signal a missing reference
            #[inline]
            #[must_use]
            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }

            /// Whether this id is the nil (empty) reference
            #[inline]
            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

entity_id!(
    /// Person identity record id
    PersonId
);
entity_id!(
    /// Login user specialization id
    UserId
);
entity_id!(
    /// Client specialization id
    ClientId
);
entity_id!(
    /// Person-to-person relationship id
    RelationshipId
);
entity_id!(
    /// Estate plan (root aggregate) id
    PlanId
);
entity_id!(
    /// Trust id
    TrustId
);
entity_id!(
    /// Will id
    WillId
);
entity_id!(
    /// Ancillary document id
    DocumentId
);
entity_id!(
    /// Plan role assignment id
    RoleId
);
