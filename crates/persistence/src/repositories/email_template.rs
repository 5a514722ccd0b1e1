//! Email template repository for database operations.
//!
//! Default handling is transactional: promoting a template to default
//! clears the owner's previous default in the same transaction, so at
//! most one default exists per user at any commit point.

use domain::models::email_template::{CreateTemplateRequest, EmailTemplate, UpdateTemplateRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::EmailTemplateEntity;

const TEMPLATE_COLUMNS: &str =
    "id, user_id, name, subject, body, is_default, created_at, updated_at";

/// Repository for email template database operations.
#[derive(Clone)]
pub struct EmailTemplateRepository {
    pool: PgPool,
}

impl EmailTemplateRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a template for a user.
    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreateTemplateRequest,
    ) -> Result<EmailTemplate, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if request.is_default {
            sqlx::query("UPDATE email_templates SET is_default = FALSE, updated_at = NOW() WHERE user_id = $1 AND is_default = TRUE")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let entity = sqlx::query_as::<_, EmailTemplateEntity>(&format!(
            r#"
            INSERT INTO email_templates (user_id, name, subject, body, is_default)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            TEMPLATE_COLUMNS
        ))
        .bind(user_id)
        .bind(&request.name)
        .bind(&request.subject)
        .bind(&request.body)
        .bind(request.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(entity.into())
    }

    /// Find a template by ID, scoped to its owner.
    pub async fn find_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EmailTemplate>, sqlx::Error> {
        let entity = sqlx::query_as::<_, EmailTemplateEntity>(&format!(
            "SELECT {} FROM email_templates WHERE id = $1 AND user_id = $2",
            TEMPLATE_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// The user's default template, if one is set.
    pub async fn find_default(&self, user_id: Uuid) -> Result<Option<EmailTemplate>, sqlx::Error> {
        let entity = sqlx::query_as::<_, EmailTemplateEntity>(&format!(
            "SELECT {} FROM email_templates WHERE user_id = $1 AND is_default = TRUE",
            TEMPLATE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// All templates for a user, default first, then most recent.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<EmailTemplate>, sqlx::Error> {
        let entities = sqlx::query_as::<_, EmailTemplateEntity>(&format!(
            r#"
            SELECT {}
            FROM email_templates
            WHERE user_id = $1
            ORDER BY is_default DESC, updated_at DESC
            "#,
            TEMPLATE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Apply a partial update. Returns `None` when the template is missing
    /// or not owned by the user.
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        request: &UpdateTemplateRequest,
    ) -> Result<Option<EmailTemplate>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if request.is_default == Some(true) {
            sqlx::query("UPDATE email_templates SET is_default = FALSE, updated_at = NOW() WHERE user_id = $1 AND is_default = TRUE AND id <> $2")
                .bind(user_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        let entity = sqlx::query_as::<_, EmailTemplateEntity>(&format!(
            r#"
            UPDATE email_templates
            SET name = COALESCE($3, name),
                subject = COALESCE($4, subject),
                body = COALESCE($5, body),
                is_default = COALESCE($6, is_default),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            TEMPLATE_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(&request.name)
        .bind(&request.subject)
        .bind(&request.body)
        .bind(request.is_default)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(entity.map(Into::into))
    }

    /// Delete a template. Idempotent: returns `false` when already gone.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM email_templates WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
