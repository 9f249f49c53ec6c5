/// Background task implementations
use crate::{context::AppContext, error::ConsoleResult};

/// Hard-delete session rows past their expiry
pub async fn sweep_expired_sessions(ctx: &AppContext) -> ConsoleResult<u64> {
    ctx.session_manager.session_store().sweep_expired().await
}

/// Hard-delete refresh tokens that are both revoked and expired
pub async fn sweep_refresh_tokens(ctx: &AppContext) -> ConsoleResult<u64> {
    ctx.session_manager.token_store().sweep().await
}

/// Health check - verify the database is reachable
pub async fn health_check(ctx: &AppContext) -> ConsoleResult<()> {
    sqlx::query("SELECT 1").fetch_one(&ctx.console_db).await?;

    Ok(())
}
