pub mod config;
pub mod db;
pub mod drive;
pub mod error;
pub mod google_oauth;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;

pub use error::SyncError;
pub use google_oauth::credentials::Credential;
pub use service::gateway::StorageGateway;
