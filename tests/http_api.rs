//! HTTP surface tests
//!
//! Drive the axum router with `oneshot` against memory backends and a
//! temporary onboarding file.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use smartzap_builder::config::Settings;
use smartzap_builder::onboarding::{OnboardingService, OnboardingStore};
use smartzap_builder::persistence::{Backends, MemoryFlowBackend, MemoryTemplateBackend};
use smartzap_builder::server::{create_app, AppState};

struct TestApp {
    router: Router,
    _dir: TempDir,
}

async fn test_app(api_key: Option<&str>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.api.key = api_key.map(str::to_string);
    settings.onboarding.storage_path = dir
        .path()
        .join("onboarding.json")
        .to_string_lossy()
        .into_owned();

    let backends = Backends {
        templates: Arc::new(MemoryTemplateBackend::new()),
        flows: Arc::new(MemoryFlowBackend::new()),
    };
    let onboarding =
        OnboardingService::load(OnboardingStore::new(&settings.onboarding.storage_path)).await;

    TestApp {
        router: create_app(AppState::from_parts(settings, backends, onboarding)),
        _dir: dir,
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

#[tokio::test]
async fn test_health() {
    let app = test_app(None).await;
    let (status, body) = app.send(Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"]["templates"], "memory");
}

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let app = test_app(Some("secret")).await;

    let (status, _) = app.send(Method::GET, "/api/v1/templates", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/v1/templates")
        .header("X-API-Key", "secret")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Health stays open
    let (status, _) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_template_draft_lifecycle() {
    let app = test_app(None).await;

    let (status, draft) = app
        .send(
            Method::POST,
            "/api/v1/templates",
            Some(json!({ "name": "pedido_enviado", "content": "Seu pedido chegou" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(draft["spec"]["body"]["text"], "Seu pedido chegou");
    let id = draft["id"].as_str().unwrap().to_string();

    let (status, updated) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/templates/{}", id),
            Some(json!({ "footer": { "text": "Equipe SmartZap" } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["spec"]["footer"]["text"], "Equipe SmartZap");
    assert_eq!(updated["spec"]["name"], "pedido_enviado");

    let (status, doc) = app
        .send(
            Method::POST,
            &format!("/api/v1/templates/{}/variables", id),
            Some(json!({ "target": "body" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["document"]["body"]["text"], "Seu pedido chegou{{1}}");
    assert_eq!(doc["cursor"], 22);

    let (status, preview) = app
        .send(Method::GET, &format!("/api/v1/templates/{}/preview", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["footer"], "Equipe SmartZap");

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/templates/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .send(Method::GET, &format!("/api/v1/templates/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_button_admission_over_http() {
    let app = test_app(None).await;
    let (_, draft) = app
        .send(Method::POST, "/api/v1/templates", Some(json!({})))
        .await;
    let uri = format!("/api/v1/templates/{}/buttons", draft["id"].as_str().unwrap());

    let (status, doc) = app
        .send(Method::POST, &uri, Some(json!({ "type": "PHONE_NUMBER" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["buttons"][0]["type"], "PHONE_NUMBER");

    let (status, body) = app
        .send(Method::POST, &uri, Some(json!({ "type": "PHONE_NUMBER" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_rejected_patch_is_surfaced_verbatim() {
    let app = test_app(None).await;
    let (_, draft) = app
        .send(Method::POST, "/api/v1/templates", Some(json!({})))
        .await;
    let id = draft["id"].as_str().unwrap();

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/templates/{}", id),
            Some(json!({ "body": { "text": "x".repeat(1100) } })),
        )
        .await;

    // Patches merge without clamping, so the store refuses the length
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_REJECTED");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("body.text:"));

    let (_, report) = app
        .send(Method::GET, &format!("/api/v1/templates/{}/validation", id), None)
        .await;
    assert_eq!(report["hasErrors"], false);
}

#[tokio::test]
async fn test_flows_from_catalog() {
    let app = test_app(None).await;

    let (status, templates) = app.send(Method::GET, "/api/v1/flow-templates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(templates.as_array().unwrap().len(), 3);

    let (status, flow) = app
        .send(
            Method::POST,
            "/api/v1/flows",
            Some(json!({ "name": "Agenda", "templateKey": "agendamento_v1" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(flow["spec"]["name"], "Agenda");
    assert_eq!(flow["spec"]["specJson"]["screens"][0]["id"], "AGENDAMENTO");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/flows",
            Some(json!({ "name": "X", "templateKey": "does_not_exist" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = flow["id"].as_str().unwrap();
    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/flows/{}", id),
            Some(json!({ "metaFlowId": "987", "metaStatus": "PUBLISHED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, picker) = app.send(Method::GET, "/api/v1/flows/picker", None).await;
    assert_eq!(picker[0]["metaFlowId"], "987");
    assert_eq!(picker[0]["statusLabel"], "PUBLISHED");

    let (_, listed) = app.send(Method::GET, "/api/v1/flows?q=agen", None).await;
    assert_eq!(listed["total"], 1);
    let (_, listed) = app.send(Method::GET, "/api/v1/flows?q=zzz", None).await;
    assert_eq!(listed["total"], 0);
}

#[tokio::test]
async fn test_onboarding_progress_persists() {
    let app = test_app(None).await;

    let (status, view) = app.send(Method::GET, "/api/v1/onboarding", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["progress"]["currentStep"], "welcome");

    let (status, view) = app
        .send(
            Method::POST,
            "/api/v1/onboarding/actions",
            Some(json!({ "action": "start", "path": "guided" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["progress"]["currentStep"], "requirements");
    assert_eq!(view["totalSteps"], 9);

    let (_, view) = app
        .send(
            Method::POST,
            "/api/v1/onboarding/actions",
            Some(json!({ "action": "next" })),
        )
        .await;
    assert_eq!(view["progress"]["currentStep"], "create-app");

    let (status, view) = app.send(Method::DELETE, "/api/v1/onboarding", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["progress"]["currentStep"], "welcome");
}
