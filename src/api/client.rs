use crate::api::token::TokenStore;
use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared HTTP plumbing for every remote service boundary.
///
/// Attaches the bearer token when one is stored, maps non-2xx responses to
/// [`ApiError`], and treats 401 as session invalidation: the persisted auth
/// state is cleared before the error is surfaced.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.store.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a prepared request and map the response status.
    pub async fn execute(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self.authorize(builder).send().await?;
        let status = response.status();
        if status.as_u16() == 401 {
            warn!("401 from server, clearing persisted auth state");
            self.store.clear();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }
        Ok(response)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!("GET {}", path);
        let response = self.execute(self.http.get(self.url(path))).await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!("POST {}", path);
        let response = self
            .execute(self.http.post(self.url(path)).json(body))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!("PUT {}", path);
        let response = self
            .execute(self.http.put(self.url(path)).json(body))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        debug!("DELETE {}", path);
        self.execute(self.http.delete(self.url(path))).await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        debug!("POST {} (multipart)", path);
        let response = self
            .execute(self.http.post(self.url(path)).multipart(form))
            .await?;
        Ok(response.json().await?)
    }
}

/// Prefer the server-provided message (`{"error": "..."}` or plain text);
/// fall back to a generic one.
fn status_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|m| m.as_str()).map(String::from))
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| "request failed".to_string());
    ApiError::Status { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::token::MemoryTokenStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on an ephemeral local port.
    async fn one_shot_server(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn status_error_prefers_server_message() {
        let err = status_error(500, r#"{"error": "model not loaded"}"#);
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "model not loaded");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn status_error_falls_back_to_body_then_generic() {
        match status_error(502, "bad gateway") {
            ApiError::Status { message, .. } => assert_eq!(message, "bad gateway"),
            other => panic!("unexpected: {other:?}"),
        }
        match status_error(500, "") {
            ApiError::Status { message, .. } => assert_eq!(message, "request failed"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn a_401_clears_the_token_store() {
        let base = one_shot_server(
            "HTTP/1.1 401 Unauthorized\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let store = Arc::new(MemoryTokenStore::new());
        store.save("tok", &serde_json::json!({"id": "u1"}));

        let client = ApiClient::new(base, store.clone());
        let err = client
            .get_json::<serde_json::Value>("/api/me")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized));
        assert!(store.token().is_none());
        assert!(store.user().is_none());
    }

    #[tokio::test]
    async fn success_with_token_reaches_the_body() {
        let base = one_shot_server(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 13\r\nconnection: close\r\n\r\n{\"ok\": true}\n",
        )
        .await;
        let store = Arc::new(MemoryTokenStore::new());
        let client = ApiClient::new(base, store);
        let body: serde_json::Value = client.get_json("/health").await.unwrap();
        assert_eq!(body["ok"], true);
    }
}
