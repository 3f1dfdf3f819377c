use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// Durable client-side auth state: the bearer token plus the last known user
/// blob. Cleared on logout or whenever any call comes back 401.
pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn user(&self) -> Option<serde_json::Value>;
    fn save(&self, token: &str, user: &serde_json::Value);
    fn clear(&self);
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredAuth {
    token: Option<String>,
    user: Option<serde_json::Value>,
}

/// Volatile store for tests and one-shot CLI runs.
#[derive(Default)]
pub struct MemoryTokenStore {
    state: Mutex<StoredAuth>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).token.clone()
    }

    fn user(&self) -> Option<serde_json::Value> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).user.clone()
    }

    fn save(&self, token: &str, user: &serde_json::Value) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.token = Some(token.to_string());
        state.user = Some(user.clone());
    }

    fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *state = StoredAuth::default();
    }
}

/// JSON-file-backed store, the durable-browser-storage equivalent. Storage
/// failures are logged and otherwise ignored; losing a cached token only
/// means logging in again.
pub struct FileTokenStore {
    path: PathBuf,
    state: Mutex<StoredAuth>,
}

impl FileTokenStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let state = std::fs::read_to_string(&path)
            .ok()
            .and_then(|data| serde_json::from_str(&data).ok())
            .unwrap_or_default();
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    fn persist(&self, state: &StoredAuth) {
        let serialized = match serde_json::to_string_pretty(state) {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to serialize auth state: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, serialized) {
            warn!("failed to persist auth state to {}: {e}", self.path.display());
        }
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).token.clone()
    }

    fn user(&self) -> Option<serde_json::Value> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).user.clone()
    }

    fn save(&self, token: &str, user: &serde_json::Value) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.token = Some(token.to_string());
        state.user = Some(user.clone());
        self.persist(&state);
    }

    fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *state = StoredAuth::default();
        self.persist(&state);
    }
}
