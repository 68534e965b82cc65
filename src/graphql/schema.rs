use async_graphql::{EmptySubscription, Schema};

use crate::graphql::{MutationRoot, QueryRoot};

pub type ClinicSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Services and the caller are attached per request, not at build time.
pub fn create_schema() -> ClinicSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .limit_depth(12)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, PermissionSet, Tenant};
    use async_graphql::{Request, Response, Value};
    use uuid::Uuid;

    fn analyst() -> AuthenticatedUser {
        AuthenticatedUser::scoped(
            Uuid::from_u128(2),
            "analyst@clinic.test",
            "lab_analyst",
            Tenant::new(Uuid::from_u128(1), Uuid::from_u128(1)),
            [("lab_master.update", "laboratorium")]
                .into_iter()
                .collect::<PermissionSet>(),
        )
    }

    async fn run(query: &str, user: Option<AuthenticatedUser>) -> Response {
        let mut request = Request::new(query);
        if let Some(user) = user {
            request = request.data(user);
        }
        create_schema().execute(request).await
    }

    fn error_code(response: &Response) -> Option<Value> {
        response
            .errors
            .first()
            .and_then(|err| err.extensions.as_ref())
            .and_then(|ext| ext.get("code"))
            .cloned()
    }

    #[tokio::test]
    async fn test_module_guard_rejects_anonymous() {
        let response = run("{ labMasters { id } }", None).await;
        assert_eq!(error_code(&response), Some(Value::from("UNAUTHENTICATED")));
    }

    #[tokio::test]
    async fn test_module_guard_forbids_missing_module() {
        let response = run("{ outpatientQueues { id } }", Some(analyst())).await;
        assert_eq!(error_code(&response), Some(Value::from("FORBIDDEN")));
    }

    #[tokio::test]
    async fn test_permission_guard_codes() {
        let anonymous = run("{ inventoryItems { id } }", None).await;
        assert_eq!(error_code(&anonymous), Some(Value::from("UNAUTHENTICATED")));

        let forbidden = run("{ inventoryItems { id } }", Some(analyst())).await;
        assert_eq!(error_code(&forbidden), Some(Value::from("FORBIDDEN")));
    }

    #[tokio::test]
    async fn test_mutation_guard_forbids_missing_permission() {
        let mutation = format!(
            r#"mutation {{ deleteLabMaster(labMasterId: "{}") {{ message }} }}"#,
            Uuid::from_u128(10)
        );
        let response = run(&mutation, Some(analyst())).await;
        assert_eq!(error_code(&response), Some(Value::from("FORBIDDEN")));
    }

    #[tokio::test]
    async fn test_me_reports_snapshot() {
        let response = run("{ me { email isSuperAdmin } myModules myPermissions }", Some(analyst())).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let data = response.data.into_json().unwrap();
        assert_eq!(data["me"]["email"], "analyst@clinic.test");
        assert_eq!(data["me"]["isSuperAdmin"], false);
        assert_eq!(data["myModules"], serde_json::json!(["laboratorium"]));
        assert_eq!(data["myPermissions"], serde_json::json!(["lab_master.update"]));
    }
}
