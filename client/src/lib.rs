//! HTTP client for the specter backend.
//!
//! The backend is an external collaborator: this crate consumes its JSON
//! contract (auth, search, stats, admin, billing) and nothing more. The
//! bearer token lives in the session cache; a 401 from any endpoint clears
//! it so the host falls back to the signed-out path.

pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{
    AuthResponse, CheckoutResponse, SearchResponse, StatsResponse, Team, TeamUpdate,
    UploadStarted, UploadStatus, UserProfile,
};
