use axum::http::StatusCode;
use clinicapi::auth::{
    AccessError, Action, AuthenticatedUser, AuthorizationEngine, DenyReason, PermissionSet, ResourceKind,
    ResourceRef, Tenant,
};
use uuid::Uuid;

fn tenant(company: u128, plant: u128) -> Tenant {
    Tenant::new(Uuid::from_u128(company), Uuid::from_u128(plant))
}

fn lab_master_in(owner: Tenant, id: u128) -> ResourceRef {
    ResourceRef::new(ResourceKind::LabMaster, Uuid::from_u128(id), owner)
}

fn analyst() -> AuthenticatedUser {
    let grants: PermissionSet = [
        ("lab_master.create", "laboratorium"),
        ("lab_master.update", "laboratorium"),
        ("outpatient_queue.delete", "outpatient"),
    ]
    .into_iter()
    .collect();

    AuthenticatedUser::scoped(Uuid::from_u128(50), "analyst@clinic.test", "lab_analyst", tenant(1, 1), grants)
}

#[test]
fn scoped_user_updates_only_own_tenant() {
    let engine = AuthorizationEngine::new();
    let user = analyst();

    let own = lab_master_in(tenant(1, 1), 100);
    let foreign = lab_master_in(tenant(2, 2), 101);

    assert!(engine.can_perform(Some(&user), Action::Update, Some(&own)).unwrap().is_allowed());

    let err = engine
        .authorize(Some(&user), Action::Update, Some(&foreign))
        .unwrap_err();
    assert!(matches!(err, AccessError::Forbidden(DenyReason::TenantMismatch)));
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
}

#[test]
fn same_company_other_plant_is_foreign() {
    let engine = AuthorizationEngine::new();
    let other_plant = lab_master_in(tenant(1, 2), 102);

    assert!(engine
        .can_perform(Some(&analyst()), Action::View, Some(&other_plant))
        .unwrap()
        .is_denied());
}

#[test]
fn super_admin_crosses_tenants() {
    let engine = AuthorizationEngine::new();
    let root = AuthenticatedUser::super_admin(Uuid::from_u128(1), "root@clinic.test");

    for owner in [tenant(1, 1), tenant(2, 2)] {
        let record = lab_master_in(owner, 200);
        for action in Action::RECORD_ACTIONS {
            assert!(engine.authorize(Some(&root), action, Some(&record)).is_ok(), "{action}");
        }
    }
}

#[test]
fn anonymous_caller_is_unauthenticated_not_forbidden() {
    let engine = AuthorizationEngine::new();
    let record = lab_master_in(tenant(1, 1), 300);

    let err = engine.authorize(None, Action::View, Some(&record)).unwrap_err();
    assert!(matches!(err, AccessError::Unauthenticated));
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

    assert!(engine.has_module_access(None, "laboratorium").is_err());
}

#[test]
fn queue_tickets_cannot_be_deleted_below_super_admin() {
    let engine = AuthorizationEngine::new();
    let ticket = ResourceRef::new(ResourceKind::OutpatientQueue, Uuid::from_u128(400), tenant(1, 1));

    // Holding the permission and owning the tenant is not enough.
    let decision = engine
        .can_perform(Some(&analyst()), Action::Delete, Some(&ticket))
        .unwrap();
    assert!(decision.is_denied());
    assert!(engine.has_permission(Some(&analyst()), "outpatient_queue.delete").unwrap().is_allowed());

    let root = AuthenticatedUser::super_admin(Uuid::from_u128(1), "root@clinic.test");
    assert!(engine.authorize(Some(&root), Action::Delete, Some(&ticket)).is_ok());
}

#[test]
fn module_access_follows_grants() {
    let engine = AuthorizationEngine::new();
    let user = analyst();

    assert!(engine.has_module_access(Some(&user), "laboratorium").unwrap().is_allowed());
    assert!(engine.has_module_access(Some(&user), "inventory").unwrap().is_denied());
    assert!(engine.has_permission(Some(&user), "lab_master.delete").unwrap().is_denied());
}
