use async_graphql::{Context, ErrorExtensions, Result};

use crate::auth::{AccessError, AuthenticatedUser, AuthorizationEngine};

/// The caller, or an `UNAUTHENTICATED` error.
pub fn require_auth<'ctx>(ctx: &'ctx Context<'_>) -> Result<&'ctx AuthenticatedUser> {
    ctx.data_opt::<AuthenticatedUser>()
        .ok_or_else(|| AccessError::Unauthenticated.extend())
}

/// GraphQL counterpart of the module route gate.
pub fn require_module<'ctx>(ctx: &'ctx Context<'_>, module: &str) -> Result<&'ctx AuthenticatedUser> {
    let user = ctx.data_opt::<AuthenticatedUser>();
    AuthorizationEngine::new()
        .has_module_access(user, module)
        .and_then(|decision| decision.into_result())
        .map_err(|e| e.extend())?;
    user.ok_or_else(|| AccessError::Unauthenticated.extend())
}

/// GraphQL counterpart of the permission route gate.
pub fn require_permission<'ctx>(
    ctx: &'ctx Context<'_>,
    permission: &str,
) -> Result<&'ctx AuthenticatedUser> {
    let user = ctx.data_opt::<AuthenticatedUser>();
    AuthorizationEngine::new()
        .has_permission(user, permission)
        .and_then(|decision| decision.into_result())
        .map_err(|e| e.extend())?;
    user.ok_or_else(|| AccessError::Unauthenticated.extend())
}
