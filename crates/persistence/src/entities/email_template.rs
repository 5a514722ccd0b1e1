//! Email template entity for database operations.

use chrono::{DateTime, Utc};
use domain::models::email_template::EmailTemplate;
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for email templates.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EmailTemplateEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EmailTemplateEntity> for EmailTemplate {
    fn from(entity: EmailTemplateEntity) -> Self {
        EmailTemplate {
            id: entity.id,
            user_id: entity.user_id,
            name: entity.name,
            subject: entity.subject,
            body: entity.body,
            is_default: entity.is_default,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_entity_to_domain() {
        let now = Utc::now();
        let entity = EmailTemplateEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Follow-up".to_string(),
            subject: "Proposal: {proposalTitle}".to_string(),
            body: "Hi {clientName}".to_string(),
            is_default: true,
            created_at: now,
            updated_at: now,
        };
        let template: EmailTemplate = entity.clone().into();
        assert_eq!(template.id, entity.id);
        assert!(template.is_default);
    }
}
