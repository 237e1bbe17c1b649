//! Property tests for the transform helpers

use estate_fields::FieldValue;
use estate_import::fields::parse_share;
use estate_import::{dedup_roles, PersonLookup};
use estate_model::{PersonId, PlanId, PlanRole, RoleType};
use proptest::prelude::*;
use std::collections::HashSet;

const ROLE_TYPES: [RoleType; 4] = [
    RoleType::Trustee,
    RoleType::SuccessorTrustee,
    RoleType::Executor,
    RoleType::Beneficiary,
];

proptest! {
    #[test]
    fn dedup_keeps_one_role_per_key(picks in prop::collection::vec((0usize..3, 0usize..4, 0usize..3), 0..40)) {
        let plan = PlanId::new();
        let people: Vec<PersonId> = (0..3).map(|_| PersonId::new()).collect();

        let roles: Vec<PlanRole> = picks
            .iter()
            .map(|&(person, role, principal)| {
                let role = PlanRole::new(plan, people[person], ROLE_TYPES[role]);
                // principal index 2 means plan-level
                match people.get(principal).filter(|_| principal < 2) {
                    Some(p) => role.for_person(*p),
                    None => role,
                }
            })
            .collect();

        let distinct: HashSet<_> = roles.iter().map(PlanRole::dedup_key).collect();
        let kept = dedup_roles(roles.clone());
        prop_assert_eq!(kept.len(), distinct.len());

        // first occurrence wins
        for role in &kept {
            let first = roles.iter().find(|r| r.dedup_key() == role.dedup_key()).unwrap();
            prop_assert_eq!(first.id, role.id);
        }

        prop_assert_eq!(dedup_roles(kept.clone()), kept);
    }

    #[test]
    fn percent_text_matches_numeric_share(hundredths in 0u32..100_000) {
        let share = f64::from(hundredths) / 100.0;
        let numeric = parse_share(&FieldValue::Number(share));
        prop_assert_eq!(numeric, Some(share));
        prop_assert_eq!(parse_share(&FieldValue::Text(format!("{share}%"))), numeric);
        prop_assert_eq!(parse_share(&FieldValue::Text(format!(" {share} % "))), numeric);
    }

    #[test]
    fn registered_names_resolve_case_insensitively(first in "[A-Z][a-z]{2,8}", last in "[A-Z][a-z]{2,8}") {
        let mut lookup = PersonLookup::new();
        let id = PersonId::new();
        let name = format!("{first} {last}");
        lookup.insert(name.clone(), id);

        prop_assert_eq!(lookup.resolve(&name), Some(id));
        prop_assert_eq!(lookup.resolve(&name.to_uppercase()), Some(id));
        prop_assert_eq!(lookup.resolve(&format!("  {}  ", name.to_lowercase())), Some(id));
    }
}
