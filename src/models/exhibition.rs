//! Exhibition domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::user::UserResponse;

/// Exhibition
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Exhibition {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create exhibition request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExhibitionRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50, message = "An exhibition holds at most 50 images"))]
    pub images: Vec<String>,
}

/// Update exhibition request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateExhibitionRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 50, message = "An exhibition holds at most 50 images"))]
    pub images: Option<Vec<String>>,
}

/// Query filter for listing
#[derive(Debug, Default, Deserialize)]
pub struct ExhibitionQuery {
    /// Owner id
    pub user: Option<String>,
}

/// Exhibition with its owner populated
#[derive(Debug, Serialize)]
pub struct ExhibitionWithOwner {
    #[serde(flatten)]
    pub exhibition: Exhibition,
    pub user: Option<UserResponse>,
}
