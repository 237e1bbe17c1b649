//! Error types for the entity graph
//!
//! - [`GraphError`]: creation-time invariant violations
//! - [`TransitionError`]: illegal plan status changes
//! - [`StoreError`]: persistence failures surfaced by store implementations

use crate::status::PlanStatus;

/// Invariant violations raised before (or while) an entity is written
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Missing, empty, or nonexistent person reference
    #[error("identity violation: {entity} {reason}")]
    IdentityViolation {
        /// Kind of entity being created
        entity: &'static str,
        /// What was wrong with the person reference
        reason: String,
    },

    /// Person-to-person link with a nonexistent endpoint
    #[error("relationship violation: {reason}")]
    RelationshipViolation {
        /// What was wrong with the endpoints
        reason: String,
    },

    /// Missing, nonexistent, or cross-plan aggregate reference
    #[error("plan aggregate violation: {entity} {reason}")]
    PlanAggregateViolation {
        /// Kind of entity being created
        entity: &'static str,
        /// What was wrong with the aggregate reference
        reason: String,
    },
}

impl GraphError {
    /// Create identity violation
    pub fn identity(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::IdentityViolation {
            entity,
            reason: reason.into(),
        }
    }

    /// Create relationship violation
    pub fn relationship(reason: impl Into<String>) -> Self {
        Self::RelationshipViolation {
            reason: reason.into(),
        }
    }

    /// Create plan aggregate violation
    pub fn plan_aggregate(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::PlanAggregateViolation {
            entity,
            reason: reason.into(),
        }
    }
}

/// Illegal plan lifecycle change
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition not in the allowed table
    #[error("illegal plan status transition: {from} -> {to}")]
    Illegal {
        /// Current status
        from: PlanStatus,
        /// Requested status
        to: PlanStatus,
    },

    /// Activation requested without an effective date
    #[error("plan cannot become active without an effective date")]
    MissingEffectiveDate,
}

/// Persistence failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The write would break a graph invariant
    #[error(transparent)]
    Invariant(#[from] GraphError),

    /// Entity with this id already stored
    #[error("duplicate {entity} id: {id}")]
    Duplicate {
        /// Kind of entity
        entity: &'static str,
        /// Offending id
        id: String,
    },

    /// Update target does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity
        entity: &'static str,
        /// Missing id
        id: String,
    },

    /// Backend failure
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether retrying the same write could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}
