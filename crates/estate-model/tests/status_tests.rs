use chrono::NaiveDate;
use estate_model::{allowed_transitions, validate_transition, EstatePlan, PersonId, PlanStatus, PlanType};
use proptest::prelude::*;

fn any_status() -> impl Strategy<Value = PlanStatus> {
    prop_oneof![
        Just(PlanStatus::Draft),
        Just(PlanStatus::Active),
        Just(PlanStatus::Amended),
        Just(PlanStatus::Incapacitated),
        Just(PlanStatus::Administered),
        Just(PlanStatus::Distributed),
        Just(PlanStatus::Closed),
    ]
}

#[test]
fn test_draft_transitions() {
    assert!(validate_transition(PlanStatus::Draft, PlanStatus::Active).is_ok());
    assert!(validate_transition(PlanStatus::Draft, PlanStatus::Distributed).is_err());
    assert!(validate_transition(PlanStatus::Draft, PlanStatus::Incapacitated).is_err());
}

#[test]
fn test_every_live_state_can_close() {
    for from in PlanStatus::ALL {
        if !from.is_terminal() {
            assert!(validate_transition(from, PlanStatus::Closed).is_ok(), "{from} should close");
        }
    }
}

#[test]
fn test_incapacity_leads_to_administration() {
    assert!(validate_transition(PlanStatus::Incapacitated, PlanStatus::Administered).is_ok());
    assert!(validate_transition(PlanStatus::Incapacitated, PlanStatus::Amended).is_err());
    assert!(validate_transition(PlanStatus::Administered, PlanStatus::Distributed).is_ok());
}

proptest! {
    #[test]
    fn prop_validation_agrees_with_table(from in any_status(), to in any_status()) {
        let res = validate_transition(from, to);
        let allowed = allowed_transitions(from);

        if res.is_ok() {
            prop_assert!(allowed.contains(&to));
        } else {
            prop_assert!(!allowed.contains(&to));
        }
    }

    #[test]
    fn prop_plan_history_tracks_every_accepted_step(steps in prop::collection::vec(any_status(), 0..12)) {
        let mut plan = EstatePlan::new("Plan", PlanType::TrustBased, PersonId::new(), None);
        plan.effective_date = NaiveDate::from_ymd_opt(2020, 1, 1);
        let mut accepted = 1;
        let mut amendments = 0;

        for to in steps {
            let before = plan.status();
            match plan.transition(to) {
                Ok(()) => {
                    accepted += 1;
                    if to == PlanStatus::Amended {
                        amendments += 1;
                    }
                    prop_assert_eq!(plan.history().last().map(|c| c.from), Some(Some(before)));
                }
                Err(_) => prop_assert_eq!(plan.status(), before),
            }
        }

        prop_assert_eq!(plan.history().len(), accepted);
        prop_assert_eq!(plan.version, 1 + amendments);
    }
}
