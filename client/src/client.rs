//! The backend client: reqwest with timeouts, bearer injection from the
//! session cache, and a single response path that turns 401 into a cleared
//! session.

use crate::error::ApiError;
use crate::types::{
    AuthResponse, CheckoutResponse, SearchResponse, StatsResponse, Team, TeamUpdate, TeamsResponse,
    UploadStarted, UploadStatus, UserProfile, UsersResponse,
};
use serde::de::DeserializeOwned;
use specter_storage::SessionCache;
use std::time::Duration;

/// Default timeout for backend requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ApiClient {
    /// HTTP client (reusable connection pool).
    http: reqwest::Client,
    base_url: String,
    session: SessionCache,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionCache) -> Self {
        Self::with_timeout(base_url, session, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        session: SessionCache,
        timeout: Duration,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- auth ---------------------------------------------------------------

    /// `POST /auth/register`. On success the token and profile are cached.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "full_name": full_name,
        });
        let auth: AuthResponse = self.post_json("/auth/register", &body).await?;
        self.remember_session(&auth)?;
        Ok(auth)
    }

    /// `POST /auth/login`. On success the token and profile are cached.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let auth: AuthResponse = self.post_json("/auth/login", &body).await?;
        self.remember_session(&auth)?;
        Ok(auth)
    }

    /// `GET /auth/me` — the profile behind the cached token.
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.get_json("/auth/me", &[]).await
    }

    /// Drop the cached token and profile. Purely local.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.clear_session()?;
        Ok(())
    }

    // -- search -------------------------------------------------------------

    /// `GET /api/search?q=&type=`. The query is recorded in the recent-query
    /// cache on success.
    pub async fn search(
        &self,
        query: &str,
        kind: Option<&str>,
    ) -> Result<SearchResponse, ApiError> {
        let mut params = vec![("q", query)];
        if let Some(kind) = kind {
            params.push(("type", kind));
        }
        let resp: SearchResponse = self.get_json("/api/search", &params).await?;
        self.session.push_recent_query(query)?;
        Ok(resp)
    }

    /// `GET /api/stats`.
    pub async fn stats(&self) -> Result<StatsResponse, ApiError> {
        self.get_json("/api/stats", &[]).await
    }

    // -- admin --------------------------------------------------------------

    /// `GET /admin/users`.
    pub async fn admin_users(&self) -> Result<Vec<serde_json::Value>, ApiError> {
        let resp: UsersResponse = self.get_json("/admin/users", &[]).await?;
        Ok(resp.users)
    }

    /// `GET /admin/teams`.
    pub async fn admin_teams(&self) -> Result<Vec<Team>, ApiError> {
        let resp: TeamsResponse = self.get_json("/admin/teams", &[]).await?;
        Ok(resp.teams)
    }

    /// `GET /admin/analytics`.
    pub async fn admin_analytics(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/admin/analytics", &[]).await
    }

    /// `POST /admin/teams`. The backend takes every field as a query
    /// parameter, not a JSON body.
    pub async fn create_team(
        &self,
        name: &str,
        plan_type: &str,
        total_searches: u64,
        limit_allocation: &str,
        admin_user_id: u64,
    ) -> Result<Team, ApiError> {
        let url = self.url("/admin/teams");
        let req = self.authorized(self.http.post(&url))?.query(&[
            ("name", name),
            ("plan_type", plan_type),
            ("total_searches", &total_searches.to_string()),
            ("limit_allocation", limit_allocation),
            ("admin_user_id", &admin_user_id.to_string()),
        ]);
        self.dispatch(req).await
    }

    /// `PUT /admin/teams/{id}` — optional updates as query parameters.
    pub async fn update_team(&self, team_id: u64, updates: &TeamUpdate) -> Result<(), ApiError> {
        let url = self.url(&format!("/admin/teams/{team_id}"));
        let req = self.authorized(self.http.put(&url))?.query(updates);
        let response = send(req).await?;
        self.check_status(&response)?;
        Ok(())
    }

    /// `POST /admin/teams/{id}/members?user_id=`.
    pub async fn add_team_member(&self, team_id: u64, user_id: u64) -> Result<(), ApiError> {
        let url = self.url(&format!("/admin/teams/{team_id}/members"));
        let req = self
            .authorized(self.http.post(&url))?
            .query(&[("user_id", user_id.to_string())]);
        let response = send(req).await?;
        self.check_status(&response)?;
        Ok(())
    }

    /// `DELETE /admin/teams/{id}/members/{user_id}`.
    pub async fn remove_team_member(&self, team_id: u64, user_id: u64) -> Result<(), ApiError> {
        let url = self.url(&format!("/admin/teams/{team_id}/members/{user_id}"));
        let req = self.authorized(self.http.delete(&url))?;
        let response = send(req).await?;
        self.check_status(&response)?;
        Ok(())
    }

    /// `POST /admin/upload-data` — multipart dataset upload, answered with a
    /// job id to poll.
    pub async fn upload_data(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadStarted, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let url = self.url("/admin/upload-data");
        let req = self.authorized(self.http.post(&url))?.multipart(form);
        self.dispatch(req).await
    }

    /// `GET /admin/upload-status?job_id=`.
    pub async fn upload_status(&self, job_id: &str) -> Result<UploadStatus, ApiError> {
        self.get_json("/admin/upload-status", &[("job_id", job_id)])
            .await
    }

    // -- billing ------------------------------------------------------------

    /// `POST /billing/create-checkout-session`. The returned URL is handed to
    /// the user; payment happens entirely on the external processor.
    pub async fn create_checkout_session(
        &self,
        plan_key: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutResponse, ApiError> {
        self.post_json(
            "/billing/create-checkout-session",
            &serde_json::json!({
                "plan_key": plan_key,
                "success_url": success_url,
                "cancel_url": cancel_url,
            }),
        )
        .await
    }

    // -- plumbing -----------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn remember_session(&self, auth: &AuthResponse) -> Result<(), ApiError> {
        self.session.set_token(&auth.access_token)?;
        let profile = serde_json::json!({
            "email": auth.user.email,
            "full_name": auth.user.full_name,
            "plan_type": auth.user.plan_type,
            "is_admin": auth.user.is_admin,
        });
        self.session.set_user(&profile)?;
        Ok(())
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(match self.session.token()? {
            Some(token) => req.bearer_auth(token),
            None => req,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let req = self.authorized(self.http.get(self.url(path)).query(params))?;
        self.dispatch(req).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let req = self.authorized(self.http.post(self.url(path)))?.json(body);
        self.dispatch(req).await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = send(req).await?;
        self.check_status(&response)?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    fn check_status(&self, response: &reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // The stored token is no longer honored; drop it so the host
            // falls back to the signed-out path.
            if let Err(e) = self.session.clear_session() {
                tracing::warn!(error = %e, "failed to clear rejected session");
            }
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::RequestFailed(format!("HTTP status {status}")));
        }
        Ok(())
    }
}

async fn send(req: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
    req.send().await.map_err(|e| {
        if e.is_timeout() {
            ApiError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            ApiError::Unreachable(format!("connection failed: {e}"))
        } else {
            ApiError::RequestFailed(e.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use specter_storage::{MemoryStore, SessionCache};
    use std::sync::Arc;

    fn client() -> ApiClient {
        ApiClient::new(
            "https://api.example.test/",
            SessionCache::new(Arc::new(MemoryStore::new())),
        )
    }

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(client().base_url(), "https://api.example.test");
    }

    #[test]
    fn url_joins_paths() {
        assert_eq!(
            client().url("/api/search"),
            "https://api.example.test/api/search"
        );
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_unreachable() {
        let session = SessionCache::new(Arc::new(MemoryStore::new()));
        // Reserved TEST-NET address, nothing listens there.
        let client =
            ApiClient::with_timeout("http://192.0.2.1:9", session, Duration::from_millis(200));
        let err = client.stats().await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Unreachable(_) | ApiError::RequestFailed(_)
        ));
    }
}
