//! API key management tests

use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::TestApp;

const BULLET: char = '\u{2022}';

#[tokio::test]
async fn test_requires_session() {
    let app = TestApp::new().await;

    app.get("/api/v1/keys/api").await.assert_unauthorized();
    app.get_as("/api/v1/keys/api", "not-a-session")
        .await
        .assert_unauthorized();
}

#[tokio::test]
async fn test_expired_session_rejected() {
    let app = TestApp::new().await;
    let user = app.seed_user("late@example.com").await;
    let token = app
        .seed_session_expiring(user, chrono::Utc::now() - chrono::Duration::minutes(1))
        .await;

    let response = app.get_as("/api/v1/keys/api", &token).await;
    response.assert_unauthorized();
    assert_eq!(response.message(), "Unauthorized");
}

#[tokio::test]
async fn test_session_cookie_accepted() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("cookie@example.com").await;

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/v1/keys/api")
        .header(
            "Cookie",
            format!("theme=dark; session_token={}", tenant.session_token),
        )
        .body(axum::body::Body::empty())
        .unwrap();

    app.request(request).await.assert_ok();
}

#[tokio::test]
async fn test_create_returns_token_once_and_list_masks_it() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("owner@example.com").await;

    let response = app
        .post_json_as(
            "/api/v1/keys/api",
            &tenant.session_token,
            json!({ "description": "ci", "projectId": tenant.project_id }),
        )
        .await;
    response.assert_ok();

    let created: Value = response.json();
    let token = created["apiKey"]["token"].as_str().unwrap().to_string();
    assert!(token.starts_with("sk-"));
    assert_eq!(token.len(), 51);
    assert_eq!(created["apiKey"]["description"], "ci");
    assert_eq!(created["apiKey"]["projectId"], tenant.project_id.to_string());

    let list = app
        .get_as("/api/v1/keys/api", &tenant.session_token)
        .await;
    list.assert_ok();
    assert!(!list.text().contains(&token));

    let json: Value = list.json();
    let keys = json["apiKeys"].as_array().unwrap();
    assert_eq!(keys.len(), 1);

    let masked = keys[0]["maskedToken"].as_str().unwrap();
    let expected: String = token
        .chars()
        .take(12)
        .chain(std::iter::repeat(BULLET).take(token.len() - 12))
        .collect();
    assert_eq!(masked, expected);
    assert_eq!(keys[0]["status"], "active");
    assert!(keys[0].get("token").is_none());
    assert!(keys[0].get("tokenHash").is_none());
}

#[tokio::test]
async fn test_issued_key_authorizes_requests() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("issuer@example.com").await;

    let created: Value = app
        .post_json_as(
            "/api/v1/keys/api",
            &tenant.session_token,
            json!({ "description": "", "projectId": tenant.project_id }),
        )
        .await
        .json();
    let token = created["apiKey"]["token"].as_str().unwrap();

    let verified = app
        .post_json("/api/v1/keys/verify", json!({ "apiKey": token }))
        .await;
    verified.assert_ok();
    let json: Value = verified.json();
    assert_eq!(json["apiKey"]["id"], created["apiKey"]["id"]);
}

#[tokio::test]
async fn test_create_for_foreign_project_is_forbidden() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("member@example.com").await;
    let other = app.seed_tenant("stranger@example.com").await;

    let response = app
        .post_json_as(
            "/api/v1/keys/api",
            &tenant.session_token,
            json!({ "description": "x", "projectId": other.project_id }),
        )
        .await;

    response.assert_forbidden();
    assert_eq!(response.message(), "Access denied to this project");
}

#[tokio::test]
async fn test_create_for_unknown_project_is_forbidden() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("member@example.com").await;

    app.post_json_as(
        "/api/v1/keys/api",
        &tenant.session_token,
        json!({ "description": "x", "projectId": Uuid::new_v4() }),
    )
    .await
    .assert_forbidden();
}

#[tokio::test]
async fn test_list_filters_by_project_and_orders_newest_first() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("lister@example.com").await;
    let second_project = app.seed_project(tenant.organization_id, "active").await;

    let mut ids = Vec::new();
    for project in [tenant.project_id, second_project, tenant.project_id] {
        let created: Value = app
            .post_json_as(
                "/api/v1/keys/api",
                &tenant.session_token,
                json!({ "description": "k", "projectId": project }),
            )
            .await
            .json();
        ids.push(created["apiKey"]["id"].as_str().unwrap().to_string());
    }

    let all: Value = app
        .get_as("/api/v1/keys/api", &tenant.session_token)
        .await
        .json();
    let listed: Vec<&str> = all["apiKeys"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k["id"].as_str().unwrap())
        .collect();
    assert_eq!(listed, vec![ids[2].as_str(), ids[1].as_str(), ids[0].as_str()]);

    let filtered: Value = app
        .get_as(
            &format!("/api/v1/keys/api?projectId={}", second_project),
            &tenant.session_token,
        )
        .await
        .json();
    let filtered = filtered["apiKeys"].as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["id"], ids[1].as_str());
}

#[tokio::test]
async fn test_list_hides_other_tenants_keys() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("mine@example.com").await;
    let other = app.seed_tenant("theirs@example.com").await;
    app.seed_api_key(other.project_id, "active").await;

    let json: Value = app
        .get_as("/api/v1/keys/api", &tenant.session_token)
        .await
        .json();
    assert!(json["apiKeys"].as_array().unwrap().is_empty());

    let json: Value = app
        .get_as(
            &format!("/api/v1/keys/api?projectId={}", other.project_id),
            &tenant.session_token,
        )
        .await
        .json();
    assert!(json["apiKeys"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_unknown_key_is_not_found() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("owner@example.com").await;

    let response = app
        .patch_json_as(
            &format!("/api/v1/keys/api/{}", Uuid::new_v4()),
            &tenant.session_token,
            json!({ "status": "inactive" }),
        )
        .await;

    response.assert_not_found();
    assert_eq!(response.message(), "API key not found");
}

#[tokio::test]
async fn test_update_foreign_key_is_forbidden_and_unchanged() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("owner@example.com").await;
    let other = app.seed_tenant("victim@example.com").await;
    let key = app.seed_api_key(other.project_id, "active").await;

    let response = app
        .patch_json_as(
            &format!("/api/v1/keys/api/{}", key.id),
            &tenant.session_token,
            json!({ "status": "inactive" }),
        )
        .await;
    response.assert_forbidden();
    assert_eq!(response.message(), "Access denied to this API key");

    // Still usable by its owner
    app.post_json("/api/v1/keys/verify", json!({ "apiKey": key.token }))
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_delete_foreign_key_is_forbidden() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("owner@example.com").await;
    let other = app.seed_tenant("victim@example.com").await;
    let key = app.seed_api_key(other.project_id, "active").await;

    app.delete_as(&format!("/api/v1/keys/api/{}", key.id), &tenant.session_token)
        .await
        .assert_forbidden();
    app.delete_as(
        &format!("/api/v1/keys/api/{}", Uuid::new_v4()),
        &tenant.session_token,
    )
    .await
    .assert_not_found();
}

#[tokio::test]
async fn test_deactivate_then_reactivate() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("owner@example.com").await;
    let key = app.seed_api_key(tenant.project_id, "active").await;
    let uri = format!("/api/v1/keys/api/{}", key.id);

    let response = app
        .patch_json_as(&uri, &tenant.session_token, json!({ "status": "inactive" }))
        .await;
    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["apiKey"]["status"], "inactive");
    assert_eq!(json["apiKey"]["description"], "seeded");

    let rejected = app
        .post_json("/api/v1/keys/verify", json!({ "apiKey": key.token }))
        .await;
    rejected.assert_unauthorized();
    assert_eq!(rejected.message(), "Invalid or inactive API key");

    app.patch_json_as(&uri, &tenant.session_token, json!({ "status": "active" }))
        .await
        .assert_ok();
    app.post_json("/api/v1/keys/verify", json!({ "apiKey": key.token }))
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_update_description_and_ignore_blank() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("owner@example.com").await;
    let key = app.seed_api_key(tenant.project_id, "active").await;
    let uri = format!("/api/v1/keys/api/{}", key.id);

    let json: Value = app
        .patch_json_as(&uri, &tenant.session_token, json!({ "description": "prod" }))
        .await
        .json();
    assert_eq!(json["apiKey"]["description"], "prod");
    assert_eq!(json["apiKey"]["status"], "active");

    let json: Value = app
        .patch_json_as(&uri, &tenant.session_token, json!({ "description": "" }))
        .await
        .json();
    assert_eq!(json["apiKey"]["description"], "prod");
}

#[tokio::test]
async fn test_update_rejects_deleted_status_value() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("owner@example.com").await;
    let key = app.seed_api_key(tenant.project_id, "active").await;

    let response = app
        .patch_json_as(
            &format!("/api/v1/keys/api/{}", key.id),
            &tenant.session_token,
            json!({ "status": "deleted" }),
        )
        .await;
    assert!(response.status.is_client_error());

    app.post_json("/api/v1/keys/verify", json!({ "apiKey": key.token }))
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_soft_delete_is_terminal() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("owner@example.com").await;
    let key = app.seed_api_key(tenant.project_id, "active").await;
    let uri = format!("/api/v1/keys/api/{}", key.id);

    let response = app.delete_as(&uri, &tenant.session_token).await;
    response.assert_ok();
    assert_eq!(response.message(), "API key deleted successfully");

    // Row survives with deleted status
    let json: Value = app
        .get_as("/api/v1/keys/api", &tenant.session_token)
        .await
        .json();
    assert_eq!(json["apiKeys"][0]["status"], "deleted");

    app.post_json("/api/v1/keys/verify", json!({ "apiKey": key.token }))
        .await
        .assert_unauthorized();

    app.patch_json_as(&uri, &tenant.session_token, json!({ "status": "active" }))
        .await
        .assert_conflict();

    // Deleting again is a no-op
    app.delete_as(&uri, &tenant.session_token).await.assert_ok();
}

#[tokio::test]
async fn test_description_too_long_is_rejected() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("owner@example.com").await;

    let response = app
        .post_json_as(
            "/api/v1/keys/api",
            &tenant.session_token,
            json!({ "description": "x".repeat(300), "projectId": tenant.project_id }),
        )
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

/// Store that removes one key row while access is being checked
struct VanishingKeyStore {
    inner: agentic_api::SqliteCredentialStore,
    pool: agentic_api::DbPool,
    key_id: Uuid,
}

#[async_trait::async_trait]
impl agentic_api::CredentialStore for VanishingKeyStore {
    async fn find_active_key_by_token(
        &self,
        token: &str,
    ) -> anyhow::Result<Option<agentic_api::models::ApiKey>> {
        self.inner.find_active_key_by_token(token).await
    }

    async fn find_project_by_id(
        &self,
        id: Uuid,
    ) -> anyhow::Result<Option<agentic_api::models::Project>> {
        self.inner.find_project_by_id(id).await
    }

    async fn find_organization_by_id(
        &self,
        id: Uuid,
    ) -> anyhow::Result<Option<agentic_api::models::Organization>> {
        self.inner.find_organization_by_id(id).await
    }

    async fn find_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> anyhow::Result<Option<agentic_api::models::Membership>> {
        sqlx::query("DELETE FROM api_keys WHERE id = ?")
            .bind(self.key_id.to_string())
            .execute(&self.pool)
            .await?;
        self.inner.find_membership(user_id, organization_id).await
    }
}

#[tokio::test]
async fn test_delete_of_vanished_key_is_not_found() {
    use agentic_api::services::{ApiKeyError, ApiKeyService};

    let app = TestApp::new().await;
    let tenant = app.seed_tenant("owner@example.com").await;
    let key = app.seed_api_key(tenant.project_id, "active").await;

    let store = VanishingKeyStore {
        inner: agentic_api::SqliteCredentialStore::new(app.state.db.clone()),
        pool: app.state.db.clone(),
        key_id: key.id,
    };

    let result = ApiKeyService::new(&app.state.db, &store)
        .delete(tenant.user_id, key.id)
        .await;
    assert!(matches!(result, Err(ApiKeyError::NotFound)));
}
