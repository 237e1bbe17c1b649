//! Plan lifecycle state machine
//!
//! ```text
//! Draft -> Active -> Amended* -> Incapacitated / Administered -> Distributed -> Closed
//! ```
//!
//! Any non-terminal state may be closed. Transitions are recorded on the plan,
//! never inferred from other fields.

use crate::error::TransitionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an estate plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    /// Imported or drafted, no effective date yet
    Draft,
    /// Signed and in force
    Active,
    /// Amended at least once after activation
    Amended,
    /// A grantor has been declared incapacitated
    Incapacitated,
    /// Under administration after death
    Administered,
    /// Assets distributed to beneficiaries
    Distributed,
    /// Terminal
    Closed,
}

impl PlanStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [PlanStatus; 7] = [
        PlanStatus::Draft,
        PlanStatus::Active,
        PlanStatus::Amended,
        PlanStatus::Incapacitated,
        PlanStatus::Administered,
        PlanStatus::Distributed,
        PlanStatus::Closed,
    ];

    /// Whether no further transition is possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, PlanStatus::Closed)
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PlanStatus::Draft => "DRAFT",
            PlanStatus::Active => "ACTIVE",
            PlanStatus::Amended => "AMENDED",
            PlanStatus::Incapacitated => "INCAPACITATED",
            PlanStatus::Administered => "ADMINISTERED",
            PlanStatus::Distributed => "DISTRIBUTED",
            PlanStatus::Closed => "CLOSED",
        };
        f.write_str(s)
    }
}

/// States reachable in one step from `from`
#[must_use]
pub fn allowed_transitions(from: PlanStatus) -> Vec<PlanStatus> {
    use PlanStatus::*;
    match from {
        Draft => vec![Active, Closed],
        Active => vec![Amended, Incapacitated, Administered, Closed],
        Amended => vec![Amended, Incapacitated, Administered, Closed],
        Incapacitated => vec![Administered, Closed],
        Administered => vec![Distributed, Closed],
        Distributed => vec![Closed],
        Closed => vec![],
    }
}

/// Validate a single status transition
pub fn validate_transition(from: PlanStatus, to: PlanStatus) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError::Illegal { from, to })
    }
}

/// One recorded status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Status before the change (`None` for the initial status)
    pub from: Option<PlanStatus>,
    /// Status after the change
    pub to: PlanStatus,
    /// When the change was recorded
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_can_only_activate_or_close() {
        assert!(validate_transition(PlanStatus::Draft, PlanStatus::Active).is_ok());
        assert!(validate_transition(PlanStatus::Draft, PlanStatus::Closed).is_ok());
        assert!(validate_transition(PlanStatus::Draft, PlanStatus::Amended).is_err());
    }

    #[test]
    fn amended_is_repeatable() {
        assert!(validate_transition(PlanStatus::Amended, PlanStatus::Amended).is_ok());
    }

    #[test]
    fn closed_is_terminal() {
        assert!(PlanStatus::Closed.is_terminal());
        for to in PlanStatus::ALL {
            assert!(validate_transition(PlanStatus::Closed, to).is_err());
        }
    }

    #[test]
    fn display_is_screaming_case() {
        assert_eq!(PlanStatus::Incapacitated.to_string(), "INCAPACITATED");
    }
}
