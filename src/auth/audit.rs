//! Audit trail for authorization decisions.
//!
//! Events go to the `clinicapi::audit` target: allowances at `info`, denials and
//! anonymous attempts at `warn`. Both tenancy pairs are always recorded so a
//! mismatch can be read straight off the log line.

use tracing::{info, warn};

use crate::auth::{Action, AuthenticatedUser, Decision, ResourceRef};

pub(crate) fn record(
    user: &AuthenticatedUser,
    action: Action<'_>,
    resource: Option<&ResourceRef>,
    decision: &Decision,
) {
    let user_tenant = user.tenant();
    let user_company_id = user_tenant.map(|t| t.company_id);
    let user_plant_id = user_tenant.map(|t| t.plant_id);
    let resource_kind = resource.map(|r| r.kind.as_ref());
    let resource_id = resource.map(|r| r.id);
    let resource_company_id = resource.map(|r| r.tenant.company_id);
    let resource_plant_id = resource.map(|r| r.tenant.plant_id);

    match decision {
        Decision::Allowed(grant) => info!(
            target: "clinicapi::audit",
            user_id = %user.id,
            role = %user.role_name,
            action = %action,
            resource_kind = ?resource_kind,
            resource_id = ?resource_id,
            ?user_company_id,
            ?user_plant_id,
            ?resource_company_id,
            ?resource_plant_id,
            grant = %grant,
            "access allowed"
        ),
        Decision::Denied(reason) => warn!(
            target: "clinicapi::audit",
            user_id = %user.id,
            role = %user.role_name,
            action = %action,
            resource_kind = ?resource_kind,
            resource_id = ?resource_id,
            ?user_company_id,
            ?user_plant_id,
            ?resource_company_id,
            ?resource_plant_id,
            reason = %reason,
            "access denied"
        ),
    }
}

pub(crate) fn unauthenticated(action: Action<'_>, resource: Option<&ResourceRef>) {
    warn!(
        target: "clinicapi::audit",
        action = %action,
        resource_kind = ?resource.map(|r| r.kind.as_ref()),
        resource_id = ?resource.map(|r| r.id),
        "unauthenticated access attempt"
    );
}
