use crate::analysis::Level;
use crate::api::client::ApiClient;
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One past analysis session as the history endpoint reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub pose_name: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub average_score: f32,
    #[serde(default)]
    pub level_distribution: HashMap<String, u64>,
    #[serde(default)]
    pub favorite_pose: Option<String>,
}

/// Dashboard aggregate. Trend/activity payloads vary between server
/// versions, so they stay loosely typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailedStats {
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub average_score: f32,
    #[serde(default)]
    pub progress_trend: String,
    #[serde(default)]
    pub level_distribution: HashMap<String, u64>,
    #[serde(default)]
    pub weekly_activity: Vec<serde_json::Value>,
    #[serde(default)]
    pub favorite_pose: Option<String>,
    #[serde(default)]
    pub recent_improvements: Vec<serde_json::Value>,
    #[serde(default)]
    pub best_session: Option<serde_json::Value>,
    #[serde(default)]
    pub current_streak: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<String>>,
}

/// History/stats/profile service boundary.
#[derive(Clone)]
pub struct UserClient {
    client: ApiClient,
}

impl UserClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>, ApiError> {
        self.client.get_json("/api/user/history").await
    }

    pub async fn stats(&self) -> Result<UserStats, ApiError> {
        self.client.get_json("/api/user/stats").await
    }

    pub async fn detailed_stats(&self) -> Result<DetailedStats, ApiError> {
        self.client.get_json("/api/user/detailed-stats").await
    }

    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<serde_json::Value, ApiError> {
        self.client.put_json("/api/user/profile", update).await
    }

    pub async fn clear_history(&self) -> Result<(), ApiError> {
        self.client.delete("/api/user/history").await
    }
}
