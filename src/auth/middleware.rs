use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::auth::{AccessError, AuthenticatedUser, AuthorizationEngine, JwtService, PermissionService};

#[derive(Clone)]
pub struct AuthState {
    pub jwt_service: JwtService,
    pub permission_service: PermissionService,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

/// Resolves the caller and stores `Option<AuthenticatedUser>` in the request extensions.
///
/// A missing or invalid token yields `None`; the gates and resolvers downstream
/// decide whether that is acceptable.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer_token(request.headers()).map(str::to_owned);

    let user = match token {
        None => None,
        Some(token) => match state.jwt_service.verify_token(&token) {
            Ok(claims) => match state.permission_service.load_user(claims.sub).await {
                Ok(user) => user,
                Err(err) => return err.into_response(),
            },
            Err(err) => {
                debug!(error = %err, "rejected bearer token, continuing unauthenticated");
                None
            }
        },
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// The user stored by [`auth_middleware`], if any.
pub fn current_user(request: &Request) -> Option<&AuthenticatedUser> {
    request
        .extensions()
        .get::<Option<AuthenticatedUser>>()
        .and_then(Option::as_ref)
}

/// Route gate requiring access to a module.
#[derive(Debug, Clone, Copy)]
pub struct ModuleGate {
    engine: AuthorizationEngine,
    module: &'static str,
}

impl ModuleGate {
    pub fn new(module: &'static str) -> Self {
        Self {
            engine: AuthorizationEngine::new(),
            module,
        }
    }
}

/// Route gate requiring one exact permission.
#[derive(Debug, Clone, Copy)]
pub struct PermissionGate {
    engine: AuthorizationEngine,
    permission: &'static str,
}

impl PermissionGate {
    pub fn new(permission: &'static str) -> Self {
        Self {
            engine: AuthorizationEngine::new(),
            permission,
        }
    }
}

/// 401 without a user, 403 without module access; super admins always pass.
pub async fn module_gate(
    State(gate): State<ModuleGate>,
    request: Request,
    next: Next,
) -> Result<Response, AccessError> {
    gate.engine
        .has_module_access(current_user(&request), gate.module)?
        .into_result()?;
    Ok(next.run(request).await)
}

/// 401 without a user, 403 without the permission; super admins always pass.
pub async fn permission_gate(
    State(gate): State<PermissionGate>,
    request: Request,
    next: Next,
) -> Result<Response, AccessError> {
    gate.engine
        .has_permission(current_user(&request), gate.permission)?
        .into_result()?;
    Ok(next.run(request).await)
}
