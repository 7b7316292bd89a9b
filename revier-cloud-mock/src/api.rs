//! HTTP surface of the mock, in the hosted service's dialect: auth under
//! `/auth/v1`, tables under `/rest/v1` with PostgREST-style filters.
//!
//! POST   /auth/v1/token?grant_type=password — password sign-in
//! GET    /auth/v1/user                      — token introspection
//! POST   /auth/v1/logout                    — sign-out (always 204)
//! GET    /rest/v1/user_roles                — role rows, object or array form
//! GET    /rest/v1/zones                     — list zones
//! POST   /rest/v1/zones                     — insert, admins only
//! PATCH  /rest/v1/zones                     — update by `id=eq.` filter
//! DELETE /rest/v1/zones                     — delete by `id=eq.` filter
//!
//! The zones table carries the production row-level rules: anyone with the
//! anon key reads, only admins write. A non-admin insert fails loudly, a
//! non-admin update or delete silently matches no rows.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use shared::{Principal, Zone, ZoneInsertRow, ZoneUpdateRow};

use crate::state::AppState;

const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    role: String,
    exp: usize,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    email: String,
    password: String,
}

// ── Helpers ──

fn error_body(status: StatusCode, msg: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": msg })))
}

/// Every route sits behind the project's anon key, like the hosted
/// gateway.
fn check_api_key(state: &AppState, headers: &HeaderMap) -> Option<(StatusCode, Json<Value>)> {
    let Some(key) = headers.get("apikey").and_then(|value| value.to_str().ok()) else {
        return Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "message": "No API key found in request",
                "hint": "No `apikey` request header or url param was found."
            })),
        ));
    };
    if key != state.anon_key {
        return Some(error_body(StatusCode::UNAUTHORIZED, "Invalid API key"));
    }
    None
}

fn issue_token(state: &AppState, user: &Principal) -> String {
    let exp = Utc::now() + Duration::seconds(TOKEN_TTL_SECS);
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: "authenticated".to_owned(),
        exp: exp.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )
    .unwrap_or_default()
}

/// Identity behind the bearer token. The anon key is not a signed token,
/// so anything that fails to verify reads as anonymous.
fn caller(state: &AppState, headers: &HeaderMap) -> Option<Principal> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;
    let token = auth.strip_prefix("Bearer ")?;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .ok()?;
    let id = Uuid::parse_str(&data.claims.sub).ok()?;
    Some(Principal {
        id,
        email: data.claims.email,
    })
}

async fn is_admin(state: &AppState, headers: &HeaderMap) -> bool {
    match caller(state, headers) {
        Some(user) => state
            .role_for(user.id)
            .await
            .is_some_and(|role| role == "admin"),
        None => false,
    }
}

/// `id=eq.<uuid>` filter, the only row filter the client uses.
fn id_filter(params: &HashMap<String, String>) -> Option<Uuid> {
    params
        .get("id")?
        .strip_prefix("eq.")
        .and_then(|raw| Uuid::parse_str(raw).ok())
}

fn wants_single_object(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("application/vnd.pgrst.object+json"))
}

// ── POST /auth/v1/token ──

async fn token(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(req): Json<TokenRequest>,
) -> (StatusCode, Json<Value>) {
    if let Some(denied) = check_api_key(&state, &headers) {
        return denied;
    }
    if params.get("grant_type").map(String::as_str) != Some("password") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "unsupported_grant_type",
                "error_description": "grant_type must be password"
            })),
        );
    }
    match state.authenticate(&req.email, &req.password).await {
        Some(user) => {
            tracing::info!(email = %user.email, "password sign-in");
            let access_token = issue_token(&state, &user);
            (
                StatusCode::OK,
                Json(json!({
                    "access_token": access_token,
                    "token_type": "bearer",
                    "expires_in": TOKEN_TTL_SECS,
                    "refresh_token": format!("mock-refresh-{}", user.id),
                    "user": user
                })),
            )
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })),
        ),
    }
}

// ── GET /auth/v1/user ──

async fn current_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if let Some(denied) = check_api_key(&state, &headers) {
        return denied;
    }
    match caller(&state, &headers) {
        Some(user) => (
            StatusCode::OK,
            Json(json!({ "id": user.id, "email": user.email })),
        ),
        None => error_body(
            StatusCode::UNAUTHORIZED,
            "invalid JWT: unable to parse or verify signature",
        ),
    }
}

// ── POST /auth/v1/logout ──

async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    if let Some(denied) = check_api_key(&state, &headers) {
        return Err(denied);
    }
    if let Some(user) = caller(&state, &headers) {
        tracing::info!(email = %user.email, "sign-out");
    }
    // Tokens are not tracked server-side, so there is nothing to revoke.
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /rest/v1/user_roles ──

async fn user_roles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if let Some(denied) = check_api_key(&state, &headers) {
        return denied;
    }
    let user_id = params
        .get("user_id")
        .and_then(|raw| raw.strip_prefix("eq."))
        .and_then(|raw| Uuid::parse_str(raw).ok());
    let row = match user_id {
        Some(id) => state.role_for(id).await.map(|role| json!({ "role": role })),
        None => None,
    };
    if wants_single_object(&headers) {
        // Object form turns a miss into an error instead of an empty list.
        match row {
            Some(row) => (StatusCode::OK, Json(row)),
            None => (
                StatusCode::NOT_ACCEPTABLE,
                Json(json!({
                    "code": "PGRST116",
                    "message": "JSON object requested, multiple (or no) rows returned",
                    "details": "The result contains 0 rows",
                    "hint": null
                })),
            ),
        }
    } else {
        let rows: Vec<Value> = row.into_iter().collect();
        (StatusCode::OK, Json(json!(rows)))
    }
}

// ── GET /rest/v1/zones ──

async fn list_zones(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if let Some(denied) = check_api_key(&state, &headers) {
        return denied;
    }
    let mut zones = state.zones.read().await.clone();
    zones.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    (StatusCode::OK, Json(json!(zones)))
}

// ── POST /rest/v1/zones ──

async fn insert_zone(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(row): Json<ZoneInsertRow>,
) -> (StatusCode, Json<Value>) {
    if let Some(denied) = check_api_key(&state, &headers) {
        return denied;
    }
    if !is_admin(&state, &headers).await {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "code": "42501",
                "message": "new row violates row-level security policy for table \"zones\"",
                "details": null,
                "hint": null
            })),
        );
    }
    let now = Utc::now();
    let zone = Zone {
        id: Uuid::new_v4(),
        name: row.draft.name,
        plz: row.draft.plz,
        zone_type: row.draft.zone_type,
        shape: row.draft.shape,
        geometry: row.draft.geometry,
        radius: row.draft.radius,
        center: row.draft.center,
        created_by: row.created_by,
        created_at: now,
        updated_at: now,
    };
    state.zones.write().await.push(zone.clone());
    tracing::info!(zone_id = %zone.id, name = %zone.name, "zone inserted");
    (StatusCode::CREATED, Json(json!([zone])))
}

// ── PATCH /rest/v1/zones ──

async fn update_zone(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(row): Json<ZoneUpdateRow>,
) -> (StatusCode, Json<Value>) {
    if let Some(denied) = check_api_key(&state, &headers) {
        return denied;
    }
    let Some(id) = id_filter(&params) else {
        return error_body(StatusCode::BAD_REQUEST, "update requires an id filter");
    };
    // Row-level rules hide every row from non-admins: the update matches
    // nothing rather than failing.
    if !is_admin(&state, &headers).await {
        return (StatusCode::OK, Json(json!([])));
    }
    let mut zones = state.zones.write().await;
    match zones.iter_mut().find(|zone| zone.id == id) {
        Some(zone) => {
            row.patch.apply_to(zone);
            zone.updated_at = row.updated_at;
            tracing::info!(zone_id = %zone.id, "zone updated");
            (StatusCode::OK, Json(json!([zone.clone()])))
        }
        None => (StatusCode::OK, Json(json!([]))),
    }
}

// ── DELETE /rest/v1/zones ──

async fn delete_zone(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    if let Some(denied) = check_api_key(&state, &headers) {
        return Err(denied);
    }
    let Some(id) = id_filter(&params) else {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            "delete requires an id filter",
        ));
    };
    if is_admin(&state, &headers).await {
        let mut zones = state.zones.write().await;
        let before = zones.len();
        zones.retain(|zone| zone.id != id);
        if zones.len() < before {
            tracing::info!(zone_id = %id, "zone deleted");
        }
    }
    // Like the real table, a delete that matched nothing still reports
    // success.
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: Arc<AppState>) -> Router {
    use tower::limit::ConcurrencyLimitLayer;
    use tower_http::cors::CorsLayer;
    use tower_http::trace::TraceLayer;

    // Cap concurrent requests like the hosted gateway does.
    let concurrency_limit = ConcurrencyLimitLayer::new(100);

    Router::new()
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/user", get(current_user))
        .route("/auth/v1/logout", post(logout))
        .route("/rest/v1/user_roles", get(user_roles))
        .route(
            "/rest/v1/zones",
            get(list_zones)
                .post(insert_zone)
                .patch(update_zone)
                .delete(delete_zone),
        )
        .layer(concurrency_limit)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
