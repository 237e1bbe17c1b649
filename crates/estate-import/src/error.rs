//! Error types for the import pipeline
//!
//! Anything raised before persistence begins leaves the store untouched.
//! Persistence failures carry the ids written so far in [`PartialImport`].

use estate_fields::{FieldError, ParseError};
use estate_match::MatchError;
use estate_model::{
    ClientId, DocumentId, PersonId, PlanId, RelationshipId, RoleId, RoleType, StoreError, TransitionError, TrustId,
    WillId,
};
use serde::{Deserialize, Serialize};

/// Main import error type
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Markup could not be parsed
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    /// Registry matching failed
    #[error("matching failed: {0}")]
    Match(#[from] MatchError),

    /// Decisions could not be turned into entities
    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),

    /// Session is unknown or has expired; parse again
    #[error("import session '{session_id}' has expired or does not exist")]
    SessionExpired {
        /// Session id the caller supplied
        session_id: String,
    },

    /// Session cache failure
    #[error("session cache error: {0}")]
    Session(#[from] SessionError),

    /// A fatal write failed after persistence began
    #[error("persisting {stage} failed: {source}")]
    Persistence {
        /// Entity kind being written
        stage: &'static str,
        #[source]
        source: StoreError,
        /// Ids written before the failure
        partial: Box<PartialImport>,
    },
}

impl ImportError {
    /// Ids written before the failure, if persistence had begun
    #[must_use]
    pub fn partial(&self) -> Option<&PartialImport> {
        match self {
            Self::Persistence { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// Check if resubmitting the same request may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Match(e) => e.is_retryable(),
            Self::Persistence { source, .. } => source.is_retryable(),
            Self::Session(SessionError::Backend(_)) => true,
            _ => false,
        }
    }

    /// Check if the caller must parse the answer file again
    #[must_use]
    pub fn requires_reparse(&self) -> bool {
        matches!(self, Self::SessionExpired { .. } | Self::Session(SessionError::Corrupt(_)))
    }
}

/// Failures turning a field table and decisions into entities
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// A plan-critical field is missing
    #[error(transparent)]
    MissingField(#[from] FieldError),

    /// A required person has no decision and no resolvable id
    #[error("no resolvable person for {role} '{name}'")]
    UnresolvedPerson {
        /// Name as it appears in the export
        name: String,
        /// Capacity the person was needed for
        role: &'static str,
    },

    /// The plan could not enter its initial status
    #[error("plan status: {0}")]
    Transition(#[from] TransitionError),
}

impl TransformError {
    /// Create unresolved-person error
    pub fn unresolved(name: impl Into<String>, role: &'static str) -> Self {
        Self::UnresolvedPerson {
            name: name.into(),
            role,
        }
    }
}

/// Session cache failures
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Cache backend failed
    #[error("backend: {0}")]
    Backend(String),

    /// Stored session could not be encoded or decoded
    #[error("corrupt session: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A role that could not be written; the import continues without it
#[derive(Debug, thiserror::Error)]
#[error("{role_type} role for person {person_id}: {source}")]
pub struct RoleCreationError {
    /// Role being written
    pub role_type: RoleType,
    /// Person holding the role
    pub person_id: PersonId,
    #[source]
    pub source: StoreError,
}

/// Ids written before a fatal persistence failure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialImport {
    /// People written
    pub people: Vec<PersonId>,
    /// Clients written
    pub clients: Vec<ClientId>,
    /// Relationships written
    pub relationships: Vec<RelationshipId>,
    /// Plan, once written
    pub plan_id: Option<PlanId>,
    /// Trust, once written
    pub trust_id: Option<TrustId>,
    /// Wills written
    pub wills: Vec<WillId>,
    /// Ancillary documents written
    pub documents: Vec<DocumentId>,
    /// Roles written
    pub roles: Vec<RoleId>,
}

impl PartialImport {
    /// Whether nothing was written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_model::GraphError;

    #[test]
    fn test_error_predicates() {
        let expired = ImportError::SessionExpired {
            session_id: "abc".into(),
        };
        assert!(expired.requires_reparse());
        assert!(!expired.is_retryable());
        assert!(expired.partial().is_none());

        let backend = ImportError::Persistence {
            stage: "plan",
            source: StoreError::Backend("timeout".into()),
            partial: Box::default(),
        };
        assert!(backend.is_retryable());
        assert!(backend.partial().is_some_and(PartialImport::is_empty));

        let invariant = ImportError::Persistence {
            stage: "trust",
            source: StoreError::Invariant(GraphError::plan_aggregate("trust", "plan does not exist")),
            partial: Box::default(),
        };
        assert!(!invariant.is_retryable());
        assert!(invariant.to_string().starts_with("persisting trust failed"));
    }

    #[test]
    fn test_transform_error_display() {
        let err = TransformError::unresolved("Matthew Christensen", "grantor");
        assert_eq!(err.to_string(), "no resolvable person for grantor 'Matthew Christensen'");

        let err: TransformError = FieldError::missing("Client full name").into();
        assert_eq!(err.to_string(), "required field missing: Client full name");
    }
}
