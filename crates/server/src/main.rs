use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path as UrlPath, RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use integrations::{
    BroadcastEventClient, HttpAddressClient, HttpLpaStoreClient, InMemorySessionStore,
    LoggingNotificationSender, RandomCodeGenerator,
};
use serde::{Deserialize, Serialize};
use server_api::{create_lpa, handle, load_lpa, ApiContext, FormValues, PageOutcome, PageRequest};
use shared::{
    domain::{LpaId, SessionId},
    error::{ApiError, ErrorCode},
    path::{Path, Query},
    protocol::LpaSummary,
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

mod config;

use config::{load_settings, prepare_database_url, Settings};

const MAX_FORM_BYTES: usize = 64 * 1024;
const SESSION_HEADER: &str = "x-session-id";

#[derive(Clone)]
struct AppState {
    api: ApiContext,
    storage: Storage,
}

type HttpError = (StatusCode, Json<ApiError>);

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LoginResponse {
    session_id: SessionId,
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateLpaResponse {
    lpa_id: LpaId,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let api = build_context(&settings, storage.clone())?;

    let app = build_router(Arc::new(AppState { api, storage }));

    let addr: SocketAddr = settings.bind.parse()?;
    info!(%addr, public_url = ?settings.public_url, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_context(settings: &Settings, storage: Storage) -> anyhow::Result<ApiContext> {
    Ok(ApiContext {
        store: Arc::new(storage),
        address_client: Arc::new(HttpAddressClient::new(&settings.address_lookup_url)?),
        event_client: Arc::new(BroadcastEventClient::new(settings.event_capacity)),
        lpa_store_client: Arc::new(HttpLpaStoreClient::new(&settings.lpa_store_url)?),
        notification_sender: Arc::new(LoggingNotificationSender),
        session_store: Arc::new(InMemorySessionStore::new()),
        code_generator: Arc::new(RandomCodeGenerator),
        clock: Arc::new(Utc::now),
    })
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/login", post(login))
        .route("/lpa", get(http_list_lpas).post(http_create_lpa))
        .route("/lpa/:lpa_id/:step", get(http_page).post(http_page))
        .layer(RequestBodyLimitLayer::new(MAX_FORM_BYTES))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, HttpError> {
    state.storage.health_check().await.map_err(|e| {
        error!(error = %e, "health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(ErrorCode::Internal, "storage unavailable")),
        )
    })?;
    Ok("ok")
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    let session = state
        .api
        .session_store
        .create(&req.email, state.api.now())
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError::new(ErrorCode::Validation, e.to_string())),
            )
        })?;

    info!(session_id = %session.session_id, "donor logged in");
    Ok(Json(LoginResponse {
        session_id: session.session_id,
    }))
}

async fn http_create_lpa(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CreateLpaResponse>, HttpError> {
    let session_id = session_from_headers(&state, &headers).await?;
    let provided = create_lpa(&state.api, session_id)
        .await
        .map_err(http_error)?;
    Ok(Json(CreateLpaResponse {
        lpa_id: provided.lpa_id,
    }))
}

async fn http_list_lpas(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<LpaSummary>>, HttpError> {
    let session_id = session_from_headers(&state, &headers).await?;
    let lpas = state
        .storage
        .list_for_session(session_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(ErrorCode::Internal, e.to_string())),
            )
        })?;
    Ok(Json(lpas))
}

/// Every wizard page. The step decides between rendering view data and
/// redirecting; this only translates that into HTTP.
async fn http_page(
    State(state): State<Arc<AppState>>,
    method: Method,
    UrlPath((lpa_id, step)): UrlPath<(String, String)>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpError> {
    let path = Path::from_slug(&step)
        .ok_or_else(|| http_error(ApiError::not_found(format!("unknown page {step}"))))?;
    let lpa_id: LpaId = lpa_id
        .parse()
        .map_err(|_| http_error(ApiError::not_found("lpa not found")))?;

    let session_id = session_from_headers(&state, &headers).await?;
    let provided = load_lpa(&state.api, lpa_id, session_id)
        .await
        .map_err(http_error)?;

    let query = Query::parse(raw_query.as_deref().unwrap_or_default());
    let req = if method == Method::POST {
        let form = std::str::from_utf8(&body).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError::new(ErrorCode::Validation, "form body is not utf-8")),
            )
        })?;
        PageRequest::post(path, FormValues::parse(form))
    } else {
        PageRequest::get(path)
    }
    .with_query(query);

    let outcome = handle(&state.api, &req, &provided).await.map_err(|err| {
        warn!(%lpa_id, page = %path, code = ?err.code, message = %err.message, "page failed");
        http_error(err)
    })?;

    Ok(match outcome {
        PageOutcome::Render { page, data } => {
            Json(serde_json::json!({ "page": page, "data": data })).into_response()
        }
        PageOutcome::Redirect(location) => {
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
    })
}

async fn session_from_headers(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<SessionId, HttpError> {
    let unauthorized = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new(ErrorCode::Unauthorized, "login required")),
        )
    };

    let session_id: SessionId = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .ok_or_else(unauthorized)?;

    let session = state
        .api
        .session_store
        .login(session_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(ErrorCode::Internal, e.to_string())),
            )
        })?;

    session.map(|s| s.session_id).ok_or_else(unauthorized)
}

fn http_error(err: ApiError) -> HttpError {
    let status = match err.code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
