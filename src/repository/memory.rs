//! In-memory store implementing both repository traits.
//! Used by the test suite and for running without PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ExhibitionRepository, UserRepository};
use crate::{
    error::AppError,
    models::{exhibition::*, user::*},
};

#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    exhibitions: RwLock<HashMap<Uuid, Exhibition>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.username == new_user.username) {
            return Err(AppError::Duplicate {
                field: "username".to_string(),
                value: new_user.username.clone(),
            });
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            name: new_user.name.clone(),
            tagline: None,
            bio: None,
            profile_pic: DEFAULT_PICTURE.to_string(),
            cover_pic: DEFAULT_PICTURE.to_string(),
            password_reset_token: None,
            password_reset_expires_at: None,
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(users
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        req: &UpdateProfileRequest,
    ) -> Result<Option<User>, AppError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = &req.name {
            user.name = Some(name.clone());
        }
        if let Some(tagline) = &req.tagline {
            user.tagline = Some(tagline.clone());
        }
        if let Some(bio) = &req.bio {
            user.bio = Some(bio.clone());
        }
        if let Some(pic) = &req.profile_pic {
            user.profile_pic = pic.clone();
        }
        if let Some(pic) = &req.cover_pic {
            user.cover_pic = pic.clone();
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let removed = self.users.write().await.remove(&id).is_some();
        if removed {
            self.exhibitions.write().await.retain(|_, e| e.user_id != id);
        }
        Ok(removed)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.password_reset_token = Some(token_hash.to_string());
            user.password_reset_expires_at = Some(expires_at);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn clear_reset_token(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.password_reset_token = None;
            user.password_reset_expires_at = None;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&id) else {
            return Ok(false);
        };

        let now = Utc::now();
        user.password_hash = password_hash.to_string();
        user.password_changed_at = Some(now);
        user.password_reset_token = None;
        user.password_reset_expires_at = None;
        user.updated_at = now;

        Ok(true)
    }
}

#[async_trait]
impl ExhibitionRepository for InMemoryStore {
    async fn list(&self, owner: Option<Uuid>) -> Result<Vec<Exhibition>, AppError> {
        let mut exhibitions: Vec<Exhibition> = self
            .exhibitions
            .read()
            .await
            .values()
            .filter(|e| owner.map_or(true, |o| e.user_id == o))
            .cloned()
            .collect();
        exhibitions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(exhibitions)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Exhibition>, AppError> {
        Ok(self.exhibitions.read().await.get(&id).cloned())
    }

    async fn create(
        &self,
        owner: Uuid,
        req: &CreateExhibitionRequest,
    ) -> Result<Exhibition, AppError> {
        let now = Utc::now();
        let exhibition = Exhibition {
            id: Uuid::new_v4(),
            user_id: owner,
            title: req.title.clone(),
            description: req.description.clone(),
            images: req.images.clone(),
            created_at: now,
            updated_at: now,
        };
        self.exhibitions
            .write()
            .await
            .insert(exhibition.id, exhibition.clone());

        Ok(exhibition)
    }

    async fn update(
        &self,
        id: Uuid,
        req: &UpdateExhibitionRequest,
    ) -> Result<Option<Exhibition>, AppError> {
        let mut exhibitions = self.exhibitions.write().await;
        let Some(exhibition) = exhibitions.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = &req.title {
            exhibition.title = title.clone();
        }
        if let Some(description) = &req.description {
            exhibition.description = Some(description.clone());
        }
        if let Some(images) = &req.images {
            exhibition.images = images.clone();
        }
        exhibition.updated_at = Utc::now();

        Ok(Some(exhibition.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.exhibitions.write().await.remove(&id).is_some())
    }
}
