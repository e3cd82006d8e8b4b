//! Authentication for Support Pulse.
//!
//! Dashboard clients authenticate with a static API key, sent either as
//! `X-API-Key` or as a bearer token. Health and docs stay public.

mod api_key;
mod middleware;

pub use api_key::*;
pub use middleware::*;
