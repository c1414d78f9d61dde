use std::net::SocketAddr;
use std::time::Instant;

use axum::Json;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use kiln_core::{EntryKind, ViewQuery};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use crate::AppState;
use crate::error::ApiError;
use crate::passphrase;
use crate::rate_limit::RateDecision;
use crate::session::{expired_cookie, session_cookie, token_from_cookie_header};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub word1: String,
    pub word2: String,
    pub word3: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user_identifier: String,
}

#[derive(Debug, Deserialize)]
pub struct SecretQuery {
    pub slug: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let client = client_id(&headers, addr);

    let decision = state.limiter.check(&client);
    if let RateDecision::Blocked { .. } = decision {
        warn!(client = %&client[..12], "login rate limited");
        return Err(ApiError::RateLimited {
            retry_after: decision.retry_after_secs(),
        });
    }

    let Some(master) = state
        .secret
        .master_password
        .as_deref()
        .filter(|master| !master.is_empty())
    else {
        error!("secret.master_password is not configured; refusing login");
        return Err(ApiError::ServerError("master password missing"));
    };

    let words = [
        request.word1.as_str(),
        request.word2.as_str(),
        request.word3.as_str(),
    ];
    let accepted = state.secret.user(&request.identifier).is_some_and(|user| {
        passphrase::verify(master, &user.identifier, words, &user.passphrase_sha256)
    });

    if !accepted {
        warn!(client = %&client[..12], "login failed");
        tokio::time::sleep(state.secret.failure_delay()).await;
        return Err(ApiError::InvalidCredentials);
    }

    state.limiter.reset(&client);
    let token = state.sessions.create_at(&request.identifier, Instant::now());
    info!(identifier = %request.identifier, "login succeeded");

    let cookie = session_cookie(&token, state.sessions.ttl(), state.secret.secure_cookie);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            user_identifier: request.identifier,
        }),
    )
        .into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers)
        && state.sessions.remove(token)
    {
        info!("session closed");
    }

    (
        [(header::SET_COOKIE, expired_cookie(state.secret.secure_cookie))],
        Json(json!({ "success": true })),
    )
        .into_response()
}

pub async fn secret_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SecretQuery>,
) -> Result<Response, ApiError> {
    let identifier = session_user(&state, &headers)?;
    let library = state.library.read().await;
    let mut visible = library
        .secrets()
        .iter()
        .filter(|doc| doc.visible_to(&identifier));

    match query.slug {
        Some(slug) => visible
            .find(|doc| doc.slug == slug)
            .map(|doc| Json(doc).into_response())
            .ok_or(ApiError::NotFound),
        None => Ok(Json(visible.collect::<Vec<_>>()).into_response()),
    }
}

pub async fn secret_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    session_user(&state, &headers)?;
    let users: Vec<&str> = state
        .secret
        .users
        .iter()
        .map(|user| user.identifier.as_str())
        .collect();
    Ok(Json(json!({ "users": users })).into_response())
}

/// Derived view of one kind, shaped by `tag`, `status`, `sort` and
/// `direction` query parameters.
pub async fn entries(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let kind: EntryKind = kind.parse().map_err(|_| ApiError::NotFound)?;
    let query = ViewQuery::from_params(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let library = state.library.read().await;
    let mut store = library.store(kind);
    store.apply(&query);
    let view = store
        .view()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    Ok(Json(view).into_response())
}

/// Hex SHA-256 of the client address and user agent. The address is the
/// first `X-Forwarded-For` hop when present.
pub fn client_id(headers: &HeaderMap, addr: SocketAddr) -> String {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| addr.ip().to_string());
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    passphrase::sha256_hex(&format!("{ip}|{user_agent}"))
}

fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(token_from_cookie_header)
}

fn session_user(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    session_token(headers)
        .and_then(|token| state.sessions.identify_at(token, Instant::now()))
        .ok_or(ApiError::Unauthorized)
}
