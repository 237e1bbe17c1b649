//! Creation-time invariants, exercised directly against the reference store.

use estate_model::prelude::*;
use estate_model::{Client, DocumentId, StoreCounts, TrustId, User, WillId};

struct Seeded {
    store: MemoryStore,
    matt: Person,
    desi: Person,
    plan: EstatePlan,
}

async fn seeded() -> Seeded {
    let store = MemoryStore::new();
    let matt = Person::new("Matthew", "Christensen");
    let desi = Person::new("Desiree", "Christensen");
    store.insert_person(matt.clone()).await.unwrap();
    store.insert_person(desi.clone()).await.unwrap();

    let plan = EstatePlan::new("Christensen Family Trust", PlanType::TrustBased, matt.id, Some(desi.id));
    store.insert_plan(plan.clone()).await.unwrap();
    Seeded { store, matt, desi, plan }
}

fn is_identity(err: &StoreError) -> bool {
    matches!(err, StoreError::Invariant(GraphError::IdentityViolation { .. }))
}

fn is_plan_aggregate(err: &StoreError) -> bool {
    matches!(err, StoreError::Invariant(GraphError::PlanAggregateViolation { .. }))
}

fn is_relationship(err: &StoreError) -> bool {
    matches!(err, StoreError::Invariant(GraphError::RelationshipViolation { .. }))
}

#[tokio::test]
async fn person_needs_no_user_or_client() {
    let store = MemoryStore::new();
    store.insert_person(Person::new("Solo", "Person")).await.unwrap();
    assert_eq!(
        store.counts(),
        StoreCounts {
            people: 1,
            ..StoreCounts::default()
        }
    );
}

#[tokio::test]
async fn user_and_client_need_existing_person() {
    let s = seeded().await;
    let v = GraphValidator::new(&s.store);

    assert!(v.check_user(&User::new(s.matt.id, "m@example.com")).await.is_ok());
    assert!(v.check_client(&Client::new(s.desi.id)).await.is_ok());

    let err = v.check_user(&User::new(PersonId::nil(), "x@example.com")).await.unwrap_err();
    assert!(is_identity(&err));
    let err = v.check_client(&Client::new(PersonId::new())).await.unwrap_err();
    assert!(is_identity(&err));

    let err = s.store.insert_client(Client::new(PersonId::new())).await.unwrap_err();
    assert!(is_identity(&err), "store enforces the invariant as well");
}

#[tokio::test]
async fn relationship_needs_both_endpoints() {
    let s = seeded().await;
    let v = GraphValidator::new(&s.store);

    let ok = Relationship::new(s.matt.id, s.desi.id, RelationshipKind::Spouse);
    assert!(v.check_relationship(&ok).await.is_ok());

    let missing = Relationship::new(s.matt.id, PersonId::new(), RelationshipKind::Child);
    assert!(is_relationship(&v.check_relationship(&missing).await.unwrap_err()));

    let empty = Relationship::new(PersonId::nil(), s.desi.id, RelationshipKind::Spouse);
    assert!(is_relationship(&v.check_relationship(&empty).await.unwrap_err()));

    let selfish = Relationship::new(s.matt.id, s.matt.id, RelationshipKind::Sibling);
    assert!(is_relationship(&v.check_relationship(&selfish).await.unwrap_err()));
}

#[tokio::test]
async fn plan_grantors_are_identity_requirements() {
    let s = seeded().await;
    let v = GraphValidator::new(&s.store);

    let missing_first = EstatePlan::new("x", PlanType::WillBased, PersonId::new(), None);
    assert!(is_identity(&v.check_plan(&missing_first).await.unwrap_err()));

    let missing_second = EstatePlan::new("x", PlanType::WillBased, s.matt.id, Some(PersonId::new()));
    assert!(is_identity(&v.check_plan(&missing_second).await.unwrap_err()));

    let empty = EstatePlan::new("x", PlanType::WillBased, PersonId::nil(), None);
    assert!(is_identity(&v.check_plan(&empty).await.unwrap_err()));

    let same_twice = EstatePlan::new("x", PlanType::WillBased, s.matt.id, Some(s.matt.id));
    assert!(is_identity(&v.check_plan(&same_twice).await.unwrap_err()));
}

#[tokio::test]
async fn aggregate_members_need_existing_plan() {
    let s = seeded().await;
    let v = GraphValidator::new(&s.store);
    let ghost = PlanId::new();

    assert!(is_plan_aggregate(&v.check_trust(&Trust::new(ghost, "t", false)).await.unwrap_err()));
    assert!(is_plan_aggregate(&v.check_will(&Will::new(ghost)).await.unwrap_err()));
    assert!(is_plan_aggregate(
        &v.check_document(&AncillaryDocument::new(ghost, s.matt.id, DocumentKind::HealthcareDirective))
            .await
            .unwrap_err()
    ));
    assert!(is_plan_aggregate(
        &v.check_role(&PlanRole::new(ghost, s.matt.id, RoleType::Trustee)).await.unwrap_err()
    ));
    assert!(is_plan_aggregate(
        &v.check_trust(&Trust::new(PlanId::nil(), "t", false)).await.unwrap_err()
    ));
}

#[tokio::test]
async fn documents_and_roles_need_existing_person() {
    let s = seeded().await;
    let v = GraphValidator::new(&s.store);

    let doc = AncillaryDocument::new(s.plan.id, PersonId::nil(), DocumentKind::FinancialPowerOfAttorney);
    assert!(is_identity(&v.check_document(&doc).await.unwrap_err()));

    let role = PlanRole::new(s.plan.id, PersonId::nil(), RoleType::Beneficiary);
    assert!(is_identity(&v.check_role(&role).await.unwrap_err()));

    let role = PlanRole::new(s.plan.id, PersonId::new(), RoleType::Beneficiary);
    assert!(is_identity(&v.check_role(&role).await.unwrap_err()));

    let role = PlanRole::new(s.plan.id, s.matt.id, RoleType::HealthcareAgent).for_person(PersonId::new());
    assert!(is_identity(&v.check_role(&role).await.unwrap_err()));
}

#[tokio::test]
async fn cross_plan_references_are_rejected() {
    let s = seeded().await;

    let other_plan = EstatePlan::new("Other", PlanType::TrustBased, s.desi.id, None);
    s.store.insert_plan(other_plan.clone()).await.unwrap();
    let foreign_trust = Trust::new(other_plan.id, "Other Trust", false);
    s.store.insert_trust(foreign_trust.clone()).await.unwrap();
    let foreign_will = Will::new(other_plan.id);
    s.store.insert_will(foreign_will.clone()).await.unwrap();
    let foreign_doc = AncillaryDocument::new(other_plan.id, s.desi.id, DocumentKind::HipaaAuthorization);
    s.store.insert_document(foreign_doc.clone()).await.unwrap();

    let v = GraphValidator::new(&s.store);

    let role = PlanRole::new(s.plan.id, s.matt.id, RoleType::Beneficiary).in_trust(foreign_trust.id);
    assert!(is_plan_aggregate(&v.check_role(&role).await.unwrap_err()));

    let role = PlanRole::new(s.plan.id, s.matt.id, RoleType::Executor).in_will(foreign_will.id);
    assert!(is_plan_aggregate(&v.check_role(&role).await.unwrap_err()));

    let role = PlanRole::new(s.plan.id, s.matt.id, RoleType::HealthcareAgent).in_document(foreign_doc.id);
    assert!(is_plan_aggregate(&v.check_role(&role).await.unwrap_err()));

    let mut will = Will::new(s.plan.id);
    will.pour_over_trust_id = Some(foreign_trust.id);
    assert!(is_plan_aggregate(&v.check_will(&will).await.unwrap_err()));
}

#[tokio::test]
async fn dangling_sibling_references_are_rejected() {
    let s = seeded().await;
    let v = GraphValidator::new(&s.store);

    let role = PlanRole::new(s.plan.id, s.matt.id, RoleType::Beneficiary).in_trust(TrustId::new());
    assert!(is_plan_aggregate(&v.check_role(&role).await.unwrap_err()));
    let role = PlanRole::new(s.plan.id, s.matt.id, RoleType::Executor).in_will(WillId::new());
    assert!(is_plan_aggregate(&v.check_role(&role).await.unwrap_err()));
    let role = PlanRole::new(s.plan.id, s.matt.id, RoleType::FinancialAgent).in_document(DocumentId::new());
    assert!(is_plan_aggregate(&v.check_role(&role).await.unwrap_err()));
}

#[tokio::test]
async fn fully_linked_aggregate_is_accepted() {
    let s = seeded().await;

    let trust = Trust::new(s.plan.id, "Christensen Family Trust", true);
    s.store.insert_trust(trust.clone()).await.unwrap();

    let mut will = Will::new(s.plan.id);
    will.testator_id = Some(s.matt.id);
    will.pour_over_trust_id = Some(trust.id);
    s.store.insert_will(will.clone()).await.unwrap();

    let poa = AncillaryDocument::new(s.plan.id, s.matt.id, DocumentKind::FinancialPowerOfAttorney);
    s.store.insert_document(poa.clone()).await.unwrap();

    let roles = [
        PlanRole::new(s.plan.id, s.matt.id, RoleType::Grantor),
        PlanRole::new(s.plan.id, s.desi.id, RoleType::Grantor),
        PlanRole::new(s.plan.id, s.desi.id, RoleType::Executor)
            .for_person(s.matt.id)
            .in_will(will.id),
        PlanRole::new(s.plan.id, s.desi.id, RoleType::FinancialAgent)
            .for_person(s.matt.id)
            .in_document(poa.id),
        PlanRole::new(s.plan.id, s.desi.id, RoleType::Beneficiary)
            .in_trust(trust.id)
            .with_share(100.0),
    ];
    for role in roles {
        s.store.insert_role(role).await.unwrap();
    }

    assert_eq!(s.store.roles_for_plan(s.plan.id).await.unwrap().len(), 5);
    let counts = s.store.counts();
    assert_eq!((counts.trusts, counts.wills, counts.documents), (1, 1, 1));
}
