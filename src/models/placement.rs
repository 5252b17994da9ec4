// src/models/placement.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Represents the 'placement_records' table.
/// The latest diagnostic outcome of a user for a course.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRecord {
    pub user_id: i64,
    pub course_id: i64,
    pub max_level: i32,
    pub levels_passed: i32,
    pub recommended_starting_section: String,
    pub overall_result: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
