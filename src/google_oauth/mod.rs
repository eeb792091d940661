//! Google OAuth2 authorization-code flow.
//!
//! - `secrets.rs`: client-secrets file loading
//! - `endpoints.rs`: authorization URL and code exchange via the `oauth2` crate
//! - `credentials.rs`: the credential kept in a browser session

pub mod credentials;
pub mod endpoints;
pub mod secrets;
