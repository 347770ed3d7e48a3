use super::*;
use axum::{body, body::Body, http::Request};
use tower::ServiceExt;

async fn test_app() -> (Router, Arc<AppState>) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let settings = Settings::default();
    let api = build_context(&settings, storage.clone()).expect("context");
    let state = Arc::new(AppState { api, storage });
    (build_router(state.clone()), state)
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

async fn logged_in(app: &Router) -> SessionId {
    let request = Request::post("/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "email": "donor@example.com" }).to_string(),
        ))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    json_body::<LoginResponse>(response).await.session_id
}

async fn new_lpa(app: &Router, session_id: SessionId) -> LpaId {
    let request = Request::post("/lpa")
        .header(SESSION_HEADER, session_id.to_string())
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    json_body::<CreateLpaResponse>(response).await.lpa_id
}

fn page_get(lpa_id: LpaId, step: &str, session_id: SessionId) -> Request<Body> {
    Request::get(format!("/lpa/{lpa_id}/{step}"))
        .header(SESSION_HEADER, session_id.to_string())
        .body(Body::empty())
        .expect("request")
}

fn page_post(lpa_id: LpaId, step: &str, session_id: SessionId, form: &str) -> Request<Body> {
    Request::post(format!("/lpa/{lpa_id}/{step}"))
        .header(SESSION_HEADER, session_id.to_string())
        .header("content-type", "application/x-www-form-urlencoded")
        .header("content-length", form.len())
        .body(Body::from(form.to_string()))
        .expect("request")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _state) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn login_requires_an_email() {
    let (app, _state) = test_app().await;
    let request = Request::post("/login")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::json!({ "email": "  " }).to_string()))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wizard_pages_render_and_redirect() {
    let (app, state) = test_app().await;
    let session_id = logged_in(&app).await;
    let lpa_id = new_lpa(&app, session_id).await;

    let response = app
        .clone()
        .oneshot(page_get(lpa_id, "your-name", session_id))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let rendered: serde_json::Value = json_body(response).await;
    assert_eq!(rendered["page"], "your-name");
    assert_eq!(rendered["data"]["errors"], serde_json::json!([]));

    let response = app
        .clone()
        .oneshot(page_post(
            lpa_id,
            "your-name",
            session_id,
            "first-names=Jamie&last-name=Smith",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        format!("/lpa/{lpa_id}/your-date-of-birth")
    );

    let stored = load_lpa(&state.api, lpa_id, session_id)
        .await
        .expect("stored lpa");
    assert_eq!(stored.donor.full_name(), "Jamie Smith");
}

#[tokio::test]
async fn invalid_answers_render_errors() {
    let (app, _state) = test_app().await;
    let session_id = logged_in(&app).await;
    let lpa_id = new_lpa(&app, session_id).await;

    let response = app
        .oneshot(page_post(lpa_id, "your-name", session_id, "first-names=Jamie"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let rendered: serde_json::Value = json_body(response).await;
    assert_eq!(rendered["data"]["errors"][0]["name"], "last-name");
}

#[tokio::test]
async fn unknown_pages_and_lpas_are_not_found() {
    let (app, _state) = test_app().await;
    let session_id = logged_in(&app).await;
    let lpa_id = new_lpa(&app, session_id).await;

    let response = app
        .clone()
        .oneshot(page_get(lpa_id, "no-such-page", session_id))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(page_get(LpaId::new(), "your-name", session_id))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lpas_are_private_to_their_session() {
    let (app, _state) = test_app().await;
    let owner = logged_in(&app).await;
    let other = logged_in(&app).await;
    let lpa_id = new_lpa(&app, owner).await;

    let response = app
        .clone()
        .oneshot(page_get(lpa_id, "your-name", other))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let anonymous = Request::get(format!("/lpa/{lpa_id}/your-name"))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(anonymous).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let list = Request::get("/lpa")
        .header(SESSION_HEADER, other.to_string())
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(list).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let lpas: Vec<serde_json::Value> = json_body(response).await;
    assert!(lpas.is_empty());
}

#[tokio::test]
async fn oversized_forms_are_rejected() {
    let (app, _state) = test_app().await;
    let session_id = logged_in(&app).await;
    let lpa_id = new_lpa(&app, session_id).await;

    let form = format!("restrictions={}", "a".repeat(MAX_FORM_BYTES + 1));
    let response = app
        .oneshot(page_post(lpa_id, "restrictions", session_id, &form))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
