//! Wire types of the backend contract, mirrored only as far as the client
//! reads them. Unknown fields are ignored; optional fields default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: UserProfile,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UserProfile {
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub plan_type: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub team_id: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    /// Result rows keyed by dataset kind. Row schemas differ per dataset;
    /// the client passes them through untyped.
    #[serde(default)]
    pub results_by_type: HashMap<String, Vec<serde_json::Value>>,
    #[serde(default)]
    pub total: u64,
}

impl SearchResponse {
    pub fn result_count(&self) -> usize {
        self.results_by_type.values().map(Vec::len).sum()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub total_sources: u64,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// One team row of `GET /admin/teams`. `POST /admin/teams` answers with only
/// `id` and `name`, so everything else defaults.
#[derive(Clone, Debug, Deserialize)]
pub struct Team {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub plan_type: Option<String>,
    #[serde(default)]
    pub total_searches: u64,
    #[serde(default)]
    pub limit_allocation: Option<String>,
    #[serde(default)]
    pub admin_user_id: Option<u64>,
    #[serde(default)]
    pub members_count: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Wrapper object around the team list.
#[derive(Debug, Deserialize)]
pub struct TeamsResponse {
    #[serde(default)]
    pub teams: Vec<Team>,
}

/// Wrapper object around the user list. Row shapes vary with the backend
/// version, so they are passed through untyped.
#[derive(Debug, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub users: Vec<serde_json::Value>,
}

/// Optional team fields for `PUT /admin/teams/{id}`; sent as query
/// parameters, absent fields are omitted.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TeamUpdate {
    pub name: Option<String>,
    pub plan_type: Option<String>,
    pub total_searches: Option<u64>,
}

/// Answer of `POST /admin/upload-data`.
#[derive(Clone, Debug, Deserialize)]
pub struct UploadStarted {
    pub job_id: String,
}

/// Answer of `GET /admin/upload-status?job_id=`: the job record itself,
/// without the id.
#[derive(Clone, Debug, Deserialize)]
pub struct UploadStatus {
    pub status: String,
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub error: Option<String>,
}

/// Answer of `POST /billing/create-checkout-session`: the processor session
/// id and the hosted payment page URL.
#[derive(Clone, Debug, Deserialize)]
pub struct CheckoutResponse {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}
