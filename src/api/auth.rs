/// Authentication endpoints: login, refresh, logout, session listing
use crate::{
    account::LoginRequest,
    auth::{sign_access_token, AuthContext},
    context::AppContext,
    error::ConsoleResult,
    session::secret::RawRefreshToken,
};
use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/logout-others", post(logout_others))
        .route("/api/auth/logout-all", post(logout_all))
        .route("/api/auth/sessions", get(list_sessions))
}

/// Token pair handed to the client
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub session_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_expires_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// One row of the "your active sessions" view
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub device_info: String,
    pub ip_address: Option<String>,
    pub last_activity_at: i64,
    pub created_at: i64,
    pub current: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokedResponse {
    pub revoked_sessions: u64,
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
}

fn client_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

/// Login endpoint
async fn login(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ConsoleResult<Json<TokenResponse>> {
    let user = ctx
        .account_manager
        .verify_credentials(&req.email, &req.password)
        .await?;

    let login = ctx
        .session_manager
        .login(
            &user.id,
            client_ip(&headers).as_deref(),
            client_user_agent(&headers).as_deref(),
        )
        .await?;

    let access_token = sign_access_token(
        &user.id,
        &login.session.id,
        &ctx.config.authentication.jwt_secret,
        ctx.config.authentication.session_ttl_secs,
    )?;

    Ok(Json(TokenResponse {
        session_id: login.session.id,
        access_token,
        refresh_token: login.refresh_token.reveal().to_string(),
        refresh_expires_at: login.refresh_expires_at,
    }))
}

/// Rotate a refresh token into a new access/refresh pair
async fn refresh(
    State(ctx): State<AppContext>,
    Json(req): Json<RefreshRequest>,
) -> ConsoleResult<Json<TokenResponse>> {
    let presented = RawRefreshToken::from_presented(req.refresh_token);
    let rotated = ctx.session_manager.refresh(&presented).await?;

    let access_token = sign_access_token(
        &rotated.user_id,
        &rotated.session_id,
        &ctx.config.authentication.jwt_secret,
        ctx.config.authentication.session_ttl_secs,
    )?;

    Ok(Json(TokenResponse {
        session_id: rotated.session_id,
        access_token,
        refresh_token: rotated.refresh_token.reveal().to_string(),
        refresh_expires_at: rotated.refresh_expires_at,
    }))
}

/// Log out the calling device
async fn logout(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ConsoleResult<Json<serde_json::Value>> {
    ctx.session_manager.logout(&auth.session.id).await?;
    Ok(Json(serde_json::json!({})))
}

/// Log out every other device
async fn logout_others(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ConsoleResult<Json<RevokedResponse>> {
    let revoked_sessions = ctx
        .session_manager
        .logout_others(&auth.user_id, &auth.session.id)
        .await?;

    Ok(Json(RevokedResponse { revoked_sessions }))
}

/// Log out everywhere, including the caller. The caller's own access token
/// stops working on its next request.
async fn logout_all(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ConsoleResult<Json<RevokedResponse>> {
    let revoked_sessions = ctx.session_manager.logout_all(&auth.user_id).await?;

    Ok(Json(RevokedResponse { revoked_sessions }))
}

/// List the caller's active sessions, most recently active first
async fn list_sessions(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ConsoleResult<Json<Vec<SessionView>>> {
    let sessions = ctx.session_manager.list_sessions(&auth.user_id).await?;

    let views = sessions
        .into_iter()
        .map(|s| SessionView {
            current: s.id == auth.session.id,
            id: s.id,
            device_info: s.device_info,
            ip_address: s.ip_address,
            last_activity_at: s.last_activity_at,
            created_at: s.created_at,
        })
        .collect();

    Ok(Json(views))
}
