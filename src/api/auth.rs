use crate::api::client::ApiClient;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Canonical user shape. The server has shipped several historical layouts
/// (`first_name` at the top level or nested under `profile`); everything is
/// normalized here before it leaves the auth boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    #[serde(default)]
    pub profile: Value,
    #[serde(default)]
    pub preferences: Value,
}

impl User {
    fn normalize(payload: Value) -> Result<Self, ApiError> {
        let id = payload
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ApiError::Decode("user payload missing id".to_string()))?
            .to_string();
        let email = payload
            .get("email")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let first_name = payload
            .get("first_name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                payload
                    .get("profile")
                    .and_then(|p| p.get("first_name"))
                    .and_then(|v| v.as_str())
            })
            .unwrap_or_default()
            .to_string();
        let profile = payload.get("profile").cloned().unwrap_or(Value::Null);
        let preferences = payload.get("preferences").cloned().unwrap_or(Value::Null);
        Ok(User {
            id,
            email,
            first_name,
            profile,
            preferences,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    user: Value,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: Value,
}

/// Authentication service boundary: login, register, verify, logout.
#[derive(Clone)]
pub struct AuthClient {
    client: ApiClient,
}

impl AuthClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let response: AuthResponse = self
            .client
            .post_json(
                "/api/login",
                &serde_json::json!({"email": email, "password": password}),
            )
            .await?;
        self.client.store().save(&response.token, &response.user);
        let user = User::normalize(response.user)?;
        info!("logged in as {}", user.email);
        Ok(user)
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
    ) -> Result<User, ApiError> {
        let response: AuthResponse = self
            .client
            .post_json(
                "/api/register",
                &serde_json::json!({
                    "email": email,
                    "password": password,
                    "firstName": first_name,
                }),
            )
            .await?;
        self.client.store().save(&response.token, &response.user);
        User::normalize(response.user)
    }

    /// Verify the stored token against the backend and refresh the cached
    /// user blob. A 401 clears the store on the way through.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let response: MeResponse = self.client.get_json("/api/me").await?;
        if let Some(token) = self.client.store().token() {
            self.client.store().save(&token, &response.user);
        }
        User::normalize(response.user)
    }

    /// Purely local: drop the persisted token and user blob.
    pub fn logout(&self) {
        info!("logging out");
        self.client.store().clear();
    }
}
