/// Account endpoints: registration and credential changes
use crate::{
    account::{AccountInfo, ChangeEmailRequest, ChangePasswordRequest, CreateAccountRequest},
    auth::AuthContext,
    context::AppContext,
    error::{ConsoleError, ConsoleResult},
};
use axum::{
    extract::State,
    routing::{post, put},
    Json, Router,
};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/account", post(create_account).get(get_account))
        .route("/api/account/password", put(change_password))
        .route("/api/account/email", put(change_email))
}

/// Register a new console account
async fn create_account(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateAccountRequest>,
) -> ConsoleResult<Json<AccountInfo>> {
    let user = ctx
        .account_manager
        .create_account(&req.email, &req.password, req.display_name.as_deref())
        .await?;

    tracing::info!(user_id = %user.id, "account created");

    Ok(Json(user.into()))
}

/// Current account info
async fn get_account(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ConsoleResult<Json<AccountInfo>> {
    let user = ctx
        .account_manager
        .get_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| ConsoleError::NotFound("Account not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Change password, then force a global logout so no session keeps working
/// under the old secret. The caller must log in again.
async fn change_password(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(req): Json<ChangePasswordRequest>,
) -> ConsoleResult<Json<serde_json::Value>> {
    ctx.account_manager
        .change_password(&auth.user_id, &req.current_password, &req.new_password)
        .await?;

    let revoked = ctx.session_manager.logout_all(&auth.user_id).await?;
    tracing::info!(user_id = %auth.user_id, revoked, "password changed, all sessions revoked");

    Ok(Json(serde_json::json!({})))
}

/// Change the account email after re-verifying the password
async fn change_email(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(req): Json<ChangeEmailRequest>,
) -> ConsoleResult<Json<serde_json::Value>> {
    ctx.account_manager
        .change_email(&auth.user_id, &req.password, &req.new_email)
        .await?;

    Ok(Json(serde_json::json!({})))
}
