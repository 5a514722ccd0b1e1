//! Email template domain model with placeholder rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Placeholder tokens recognized in template subjects and bodies.
const PLACEHOLDER_CLIENT_NAME: &str = "{clientName}";
const PLACEHOLDER_PROPOSAL_TITLE: &str = "{proposalTitle}";
const PLACEHOLDER_USER_NAME: &str = "{userName}";

/// Reusable email template owned by a user. At most one template per user
/// carries `is_default`, enforced at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmailTemplate {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values substituted into template placeholders.
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub client_name: &'a str,
    pub proposal_title: &'a str,
    pub user_name: &'a str,
}

/// A template after placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RenderedTemplate {
    pub subject: String,
    pub body: String,
}

fn substitute(text: &str, vars: &TemplateVars<'_>) -> String {
    text.replace(PLACEHOLDER_CLIENT_NAME, vars.client_name)
        .replace(PLACEHOLDER_PROPOSAL_TITLE, vars.proposal_title)
        .replace(PLACEHOLDER_USER_NAME, vars.user_name)
}

impl EmailTemplate {
    /// Substitute placeholders in subject and body. Unknown brace tokens
    /// are left untouched.
    pub fn render(&self, vars: &TemplateVars<'_>) -> RenderedTemplate {
        RenderedTemplate {
            subject: substitute(&self.subject, vars),
            body: substitute(&self.body, vars),
        }
    }
}

/// Request to create a template.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 100, message = "Template name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Request to update a template. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateTemplateRequest {
    #[validate(length(min = 1, max = 100, message = "Template name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500, message = "Subject must not be empty"))]
    pub subject: Option<String>,
    #[validate(length(min = 1, message = "Body must not be empty"))]
    pub body: Option<String>,
    pub is_default: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(subject: &str, body: &str) -> EmailTemplate {
        EmailTemplate {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Follow-up".to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            is_default: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let template = template(
            "Proposal: {proposalTitle}",
            "Hi {clientName},\n\nPlease review {proposalTitle}.\n\nBest,\n{userName}",
        );
        let rendered = template.render(&TemplateVars {
            client_name: "Acme Corp",
            proposal_title: "Website redesign",
            user_name: "Jamie",
        });
        assert_eq!(rendered.subject, "Proposal: Website redesign");
        assert!(rendered.body.contains("Hi Acme Corp,"));
        assert!(rendered.body.contains("review Website redesign."));
        assert!(rendered.body.ends_with("Jamie"));
    }

    #[test]
    fn test_render_repeated_placeholder() {
        let template = template("{clientName} / {clientName}", "");
        let rendered = template.render(&TemplateVars {
            client_name: "Acme",
            proposal_title: "",
            user_name: "",
        });
        assert_eq!(rendered.subject, "Acme / Acme");
    }

    #[test]
    fn test_render_leaves_unknown_tokens() {
        let template = template("{unknownToken}", "{alsoUnknown}");
        let rendered = template.render(&TemplateVars {
            client_name: "Acme",
            proposal_title: "T",
            user_name: "U",
        });
        assert_eq!(rendered.subject, "{unknownToken}");
        assert_eq!(rendered.body, "{alsoUnknown}");
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateTemplateRequest {
            name: "Default".to_string(),
            subject: "Proposal from {userName}".to_string(),
            body: "Hi {clientName}".to_string(),
            is_default: true,
        };
        assert!(request.validate().is_ok());

        let empty_name = CreateTemplateRequest {
            name: "".to_string(),
            ..request
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_update_request_empty_fields_rejected() {
        let request = UpdateTemplateRequest {
            subject: Some("".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());

        let none = UpdateTemplateRequest::default();
        assert!(none.validate().is_ok());
    }
}
