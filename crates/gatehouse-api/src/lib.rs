// gatehouse-api: Async Rust client for a bearer-token authentication backend

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod protected;
pub mod transport;

pub use client::AuthClient;
pub use error::Error;
pub use models::{ApiActivity, ApiProfile, ApiProtectedData, ApiStats, ApiUser, LoginResponse};
pub use transport::{TlsMode, TransportConfig};
