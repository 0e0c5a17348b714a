//! Accounts and authentication.
//!
//! Bearer tokens are opaque: the client holds `vx_<kind>_<uuid>.<secret>`
//! and the database stores only an HMAC of the secret material, so a
//! leaked table cannot be replayed. Logging out revokes the refresh-token
//! row, which doubles as the blacklist.

pub mod errors;
pub mod models;
mod password;
mod repository;
pub mod service;
pub mod token;

pub use errors::AuthServiceError;
pub use service::*;
pub use token::{AuthTokenError, TokenKey, TokenKind};
