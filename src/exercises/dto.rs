use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{exercises::services::serialize_duration, extract::loose_text};

#[derive(Debug, Deserialize)]
pub struct CreateExerciseRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub date: Option<String>,
}

/// Echoes the owning user's id as `_id`, not the exercise's.
#[derive(Debug, Serialize)]
pub struct ExerciseResponse {
    pub username: String,
    pub description: String,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: f64,
    pub date: String,
    #[serde(rename = "_id")]
    pub user_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogEntry {
    pub description: String,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: f64,
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub username: String,
    pub count: usize,
    #[serde(rename = "_id")]
    pub user_id: Uuid,
    pub log: Vec<LogEntry>,
}
