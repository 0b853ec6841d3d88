//! Exhibition repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppError, models::exhibition::*};

#[async_trait]
pub trait ExhibitionRepository: Send + Sync {
    /// 列出展览，可按所有者过滤
    async fn list(&self, owner: Option<Uuid>) -> Result<Vec<Exhibition>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Exhibition>, AppError>;

    async fn create(
        &self,
        owner: Uuid,
        req: &CreateExhibitionRequest,
    ) -> Result<Exhibition, AppError>;

    async fn update(
        &self,
        id: Uuid,
        req: &UpdateExhibitionRequest,
    ) -> Result<Option<Exhibition>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

pub struct PgExhibitionRepository {
    db: PgPool,
}

impl PgExhibitionRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ExhibitionRepository for PgExhibitionRepository {
    async fn list(&self, owner: Option<Uuid>) -> Result<Vec<Exhibition>, AppError> {
        let exhibitions = if let Some(owner) = owner {
            sqlx::query_as::<_, Exhibition>(
                "SELECT * FROM exhibitions WHERE user_id = $1 ORDER BY created_at DESC",
            )
            .bind(owner)
            .fetch_all(&self.db)
            .await?
        } else {
            sqlx::query_as::<_, Exhibition>("SELECT * FROM exhibitions ORDER BY created_at DESC")
                .fetch_all(&self.db)
                .await?
        };

        Ok(exhibitions)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Exhibition>, AppError> {
        let exhibition = sqlx::query_as::<_, Exhibition>("SELECT * FROM exhibitions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(exhibition)
    }

    async fn create(
        &self,
        owner: Uuid,
        req: &CreateExhibitionRequest,
    ) -> Result<Exhibition, AppError> {
        let exhibition = sqlx::query_as::<_, Exhibition>(
            r#"
            INSERT INTO exhibitions (user_id, title, description, images)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(owner)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.images)
        .fetch_one(&self.db)
        .await?;

        Ok(exhibition)
    }

    async fn update(
        &self,
        id: Uuid,
        req: &UpdateExhibitionRequest,
    ) -> Result<Option<Exhibition>, AppError> {
        let exhibition = sqlx::query_as::<_, Exhibition>(
            r#"
            UPDATE exhibitions
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                images = COALESCE($4, images),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.images)
        .fetch_optional(&self.db)
        .await?;

        Ok(exhibition)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM exhibitions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
