//! psyscale-auth
//!
//! Local accounts: Argon2 password hashes, HS256 session tokens, login
//! lockout and per-resource authorization policies.

pub mod credentials;
pub mod error;
pub mod jwt;
pub mod lockout;
pub mod password;
pub mod policy;
