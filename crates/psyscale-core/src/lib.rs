//! psyscale-core
//!
//! Pure domain types, scored result shapes, input validation and object-store
//! key conventions. No storage or HTTP dependency; this is the shared
//! vocabulary of the Psyscale system.

pub mod error;
pub mod keys;
pub mod models;
pub mod validation;
