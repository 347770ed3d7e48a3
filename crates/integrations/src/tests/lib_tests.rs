use super::*;
use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use shared::domain::{LpaId, LpaType};
use std::collections::HashMap;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}/api")
}

#[test]
fn base_url_always_ends_with_a_slash() {
    assert_eq!(
        base_url("http://localhost:9000/api")
            .expect("url")
            .join("lpas/M-1")
            .expect("join")
            .as_str(),
        "http://localhost:9000/api/lpas/M-1"
    );
}

#[test]
fn random_codes_have_witness_code_length() {
    let code = RandomCodeGenerator.generate();
    assert_eq!(code.len(), shared::witness::WITNESS_CODE_LENGTH);
}

#[tokio::test]
async fn session_store_round_trips_a_login() {
    let store = InMemorySessionStore::new();
    let session = store
        .create("donor@example.com", Utc::now())
        .await
        .expect("create");

    let found = store.login(session.session_id).await.expect("login");
    assert_eq!(found, Some(session));
    assert!(store.create("  ", Utc::now()).await.is_err());
    assert_eq!(store.login(SessionId::new()).await.expect("login"), None);
}

#[tokio::test]
async fn broadcast_events_reach_subscribers() {
    let client = BroadcastEventClient::new(8);
    let mut events = client.subscribe();

    client
        .send_certificate_provider_started("M-1111")
        .await
        .expect("send");

    assert_eq!(
        events.recv().await.expect("event"),
        LpaEvent::CertificateProviderStarted {
            lpa_uid: "M-1111".into()
        }
    );
}

#[tokio::test]
async fn uid_request_needs_an_lpa_type() {
    let client = BroadcastEventClient::new(8);
    let mut provided = Provided::default();
    assert!(client.send_uid_requested(&provided).await.is_err());

    provided.lpa_id = LpaId::new();
    provided.lpa_type = Some(LpaType::PropertyAndAffairs);
    client.send_uid_requested(&provided).await.expect("send");
}

#[tokio::test]
async fn address_client_maps_lookup_results() {
    let router = Router::new().route(
        "/api/addresses",
        get(|Query(query): Query<HashMap<String, String>>| async move {
            Json(serde_json::json!({
                "results": [
                    { "line1": "1 Road", "town": "Town", "postcode": query["postcode"] }
                ]
            }))
        }),
    );
    let client = HttpAddressClient::new(&serve(router).await).expect("client");

    let addresses = client.lookup_postcode(" B14 7ED ").await.expect("lookup");
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].postcode, "B14 7ED");
    assert_eq!(addresses[0].country, "GB");
}

#[tokio::test]
async fn lpa_store_not_found_is_distinguished() {
    let router = Router::new()
        .route("/api/lpas/M-MISSING", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/api/lpas/M-BROKEN",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/api/lpas/M-FOUND",
            get(|| async {
                Json(serde_json::json!({ "lpa_uid": "M-FOUND", "status": "in-progress" }))
            }),
        );
    let client = HttpLpaStoreClient::new(&serve(router).await).expect("client");

    assert!(matches!(
        client.lpa("M-MISSING").await,
        Err(LpaStoreError::NotFound)
    ));
    assert!(matches!(
        client.lpa("M-BROKEN").await,
        Err(LpaStoreError::Other(_))
    ));
    let found = client.lpa("M-FOUND").await.expect("lpa");
    assert_eq!(found.status, "in-progress");
}

#[tokio::test]
async fn send_lpa_requires_a_uid() {
    let client = HttpLpaStoreClient::new("http://127.0.0.1:9").expect("client");
    assert!(client.send_lpa(&Provided::default()).await.is_err());
}
