//! 展览服务：CRUD 与所有权检查

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{exhibition::*, user::UserResponse},
    repository::{ExhibitionRepository, UserRepository},
};

pub struct ExhibitionService {
    exhibitions: Arc<dyn ExhibitionRepository>,
    users: Arc<dyn UserRepository>,
}

/// Parses an id taken from the URL or query string.
pub fn parse_id(path: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::cast(path, raw))
}

fn missing() -> AppError {
    AppError::bad_request("No exhibition of this ID found")
}

impl ExhibitionService {
    pub fn new(exhibitions: Arc<dyn ExhibitionRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { exhibitions, users }
    }

    async fn with_owner(&self, exhibition: Exhibition) -> Result<ExhibitionWithOwner, AppError> {
        let user = self
            .users
            .find_by_id(exhibition.user_id)
            .await?
            .map(UserResponse::from);
        Ok(ExhibitionWithOwner { exhibition, user })
    }

    /// 列出展览，`owner` 为可选的用户 ID 过滤
    pub async fn list(&self, owner: Option<&str>) -> Result<Vec<ExhibitionWithOwner>, AppError> {
        let owner = owner.map(|raw| parse_id("user", raw)).transpose()?;
        let exhibitions = self.exhibitions.list(owner).await?;

        let mut populated = Vec::with_capacity(exhibitions.len());
        for exhibition in exhibitions {
            populated.push(self.with_owner(exhibition).await?);
        }
        Ok(populated)
    }

    pub async fn get(&self, id: &str) -> Result<ExhibitionWithOwner, AppError> {
        let id = parse_id("exhibitionID", id)?;
        let exhibition = self.exhibitions.find_by_id(id).await?.ok_or_else(missing)?;
        self.with_owner(exhibition).await
    }

    pub async fn create(
        &self,
        owner: Uuid,
        req: CreateExhibitionRequest,
    ) -> Result<Exhibition, AppError> {
        req.validate()?;
        let exhibition = self.exhibitions.create(owner, &req).await?;

        tracing::info!(exhibition_id = %exhibition.id, user_id = %owner, "Exhibition created");
        Ok(exhibition)
    }

    /// 加载展览并确认调用者是所有者
    async fn owned(&self, caller: Uuid, id: &str) -> Result<Exhibition, AppError> {
        let id = parse_id("exhibitionID", id)?;
        let exhibition = self.exhibitions.find_by_id(id).await?.ok_or_else(missing)?;

        if exhibition.user_id != caller {
            tracing::warn!(exhibition_id = %id, user_id = %caller, "Non-owner tried to modify exhibition");
            return Err(AppError::forbidden("You do not own this exhibition"));
        }
        Ok(exhibition)
    }

    pub async fn update(
        &self,
        caller: Uuid,
        id: &str,
        req: UpdateExhibitionRequest,
    ) -> Result<Exhibition, AppError> {
        req.validate()?;
        let exhibition = self.owned(caller, id).await?;

        self.exhibitions
            .update(exhibition.id, &req)
            .await?
            .ok_or_else(missing)
    }

    pub async fn delete(&self, caller: Uuid, id: &str) -> Result<(), AppError> {
        let exhibition = self.owned(caller, id).await?;

        if !self.exhibitions.delete(exhibition.id).await? {
            return Err(missing());
        }

        tracing::info!(exhibition_id = %exhibition.id, user_id = %caller, "Exhibition deleted");
        Ok(())
    }
}
