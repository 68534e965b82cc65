//! HTTP surface: GraphQL endpoint, health check and the gated REST reads.

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::auth::catalog::{modules, permissions};
use crate::auth::{
    auth_middleware, module_gate, permission_gate, AccessError, AuthState, AuthenticatedUser, JwtService,
    ModuleGate, PermissionGate, PermissionService,
};
use crate::graphql::{create_schema, ClinicSchema, InventoryItem, LabMaster, OutpatientQueue};
use crate::services::{DepartmentService, InventoryService, LabMasterService, OutpatientQueueService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub schema: ClinicSchema,
    pub jwt_service: JwtService,
    pub permission_service: PermissionService,
    pub user_service: UserService,
    pub lab_master_service: LabMasterService,
    pub queue_service: OutpatientQueueService,
    pub department_service: DepartmentService,
    pub inventory_service: InventoryService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self {
            schema: create_schema(),
            permission_service: PermissionService::new(db.clone()),
            user_service: UserService::new(db.clone(), jwt_service.clone()),
            lab_master_service: LabMasterService::new(db.clone()),
            queue_service: OutpatientQueueService::new(db.clone()),
            department_service: DepartmentService::new(db.clone()),
            inventory_service: InventoryService::new(db),
            jwt_service,
        }
    }

    fn auth_state(&self) -> AuthState {
        AuthState {
            jwt_service: self.jwt_service.clone(),
            permission_service: self.permission_service.clone(),
        }
    }
}

#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self { success: true, data })
    }
}

async fn graphql_handler(
    State(state): State<AppState>,
    Extension(user): Extension<Option<AuthenticatedUser>>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    if let Some(user) = user {
        request = request.data(user);
    }

    request = request
        .data(state.user_service.clone())
        .data(state.lab_master_service.clone())
        .data(state.queue_service.clone())
        .data(state.department_service.clone())
        .data(state.inventory_service.clone());

    state.schema.execute(request).await.into()
}

async fn health() -> impl IntoResponse {
    "OK"
}

fn caller(user: Option<AuthenticatedUser>) -> Result<AuthenticatedUser, AccessError> {
    user.ok_or(AccessError::Unauthenticated)
}

async fn list_lab_masters(
    State(state): State<AppState>,
    Extension(user): Extension<Option<AuthenticatedUser>>,
) -> Result<Json<ApiResponse<Vec<LabMaster>>>, AccessError> {
    let user = caller(user)?;
    let labs = state
        .lab_master_service
        .list_lab_masters(&user, false, None, None)
        .await?;
    Ok(ApiResponse::ok(labs.into_iter().map(LabMaster::from).collect()))
}

async fn list_outpatient_queues(
    State(state): State<AppState>,
    Extension(user): Extension<Option<AuthenticatedUser>>,
) -> Result<Json<ApiResponse<Vec<OutpatientQueue>>>, AccessError> {
    let user = caller(user)?;
    let queues = state.queue_service.list_queues(&user, None, None).await?;
    Ok(ApiResponse::ok(queues.into_iter().map(OutpatientQueue::from).collect()))
}

async fn list_inventory_items(
    State(state): State<AppState>,
    Extension(user): Extension<Option<AuthenticatedUser>>,
) -> Result<Json<ApiResponse<Vec<InventoryItem>>>, AccessError> {
    let user = caller(user)?;
    let items = state.inventory_service.list_items(&user, None).await?;
    Ok(ApiResponse::ok(items.into_iter().map(InventoryItem::from).collect()))
}

/// CORS from a comma separated origin list, or `*` for any origin.
pub fn cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        warn!("CORS set to accept ANY origin (*), only use in development");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
}

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let laboratorium = Router::new()
        .route("/api/laboratorium/lab-masters", get(list_lab_masters))
        .route_layer(middleware::from_fn_with_state(
            ModuleGate::new(modules::LABORATORIUM),
            module_gate,
        ));

    let outpatient = Router::new()
        .route("/api/outpatient/queues", get(list_outpatient_queues))
        .route_layer(middleware::from_fn_with_state(
            ModuleGate::new(modules::OUTPATIENT),
            module_gate,
        ));

    let inventory = Router::new()
        .route("/api/inventory/items", get(list_inventory_items))
        .route_layer(middleware::from_fn_with_state(
            PermissionGate::new(permissions::INVENTORY_ITEM_VIEW),
            permission_gate,
        ));

    let auth_state = state.auth_state();

    // `/health` is added after the auth layer so it never touches the database;
    // CORS wraps auth so its error responses still carry the headers.
    Router::new()
        .route("/graphql", post(graphql_handler))
        .merge(laboratorium)
        .merge(outpatient)
        .merge(inventory)
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::ORIGIN, StatusCode},
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app() -> Router {
        let state = AppState::new(DatabaseConnection::Disconnected, JwtService::new("test-secret", 1));
        build_router(state, cors_layer("http://localhost:5173"))
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let request = axum::http::Request::get("/health").body(Body::empty()).unwrap();
        let resp = app().oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_gated_routes_reject_anonymous() {
        for path in ["/api/laboratorium/lab-masters", "/api/outpatient/queues", "/api/inventory/items"] {
            let request = axum::http::Request::get(path).body(Body::empty()).unwrap();
            let resp = app().oneshot(request).await.unwrap();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{path}");
        }
    }

    #[tokio::test]
    async fn test_invalid_token_is_treated_as_anonymous() {
        let request = axum::http::Request::get("/api/inventory/items")
            .header(AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health_skips_user_lookup() {
        // A valid token would normally trigger a database read.
        let token = JwtService::new("test-secret", 1)
            .generate_token(Uuid::from_u128(7), "nurse@clinic.test")
            .unwrap();
        let request = axum::http::Request::get("/health")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();

        let resp = app().oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_gate_rejection_carries_cors_headers() {
        let request = axum::http::Request::get("/api/laboratorium/lab-masters")
            .header(ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();

        let resp = app().oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );
    }
}
