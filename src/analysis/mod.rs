//! Canonical model of a remote scoring response.
//!
//! The service's historical payloads omit fields freely; everything here is
//! normalized at the serde boundary so the rest of the crate never deals
//! with absent-field ambiguity.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    /// Anything the server invents later.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExerciseRecommendation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub benefit: String,
}

/// One scored analysis, produced exactly once per successful remote call and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: f32,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub pose_name: String,
    #[serde(default)]
    pub level: Level,
    /// Per-metric quality breakdown, 0..100.
    #[serde(default)]
    pub quality_metrics: HashMap<String, f32>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub priority_feedback: Vec<String>,
    /// Joint name to measured angle in degrees.
    #[serde(default)]
    pub angles: HashMap<String, f32>,
    #[serde(default)]
    pub exercise_recommendation: Option<ExerciseRecommendation>,
}
