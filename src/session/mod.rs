/// Session and refresh-token lifecycle subsystem
///
/// The core of the console's self-hosted account system. Sessions are
/// soft-deleted rows in the `sessions` table; refresh tokens are stored as
/// SHA-256 digests in `refresh_tokens` and rotated single-use. All state
/// lives in SQLite, which is the sole serialization point; every mutation
/// is a WHERE-guarded conditional update.

pub mod device;
pub mod ids;
mod manager;
pub mod refresh;
pub mod secret;
pub mod store;

#[cfg(test)]
mod tests;

pub use manager::{NewLogin, RotatedTokens, SessionManager};
