use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A stored contact form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Server-generated identifier.
    pub id: String,
    pub name: String,
    pub email: String,
    /// Service the visitor is interested in.
    pub service: String,
    pub message: String,
    /// Submission time (RFC 3339, UTC).
    pub created_at: DateTime<Utc>,
}

/// A validated, trimmed submission that has not been stored yet.
///
/// The `validate` attributes cover the upper bounds and the email syntax;
/// presence, type and emptiness are checked before these run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewContact {
    #[validate(length(max = 200, code = "too_long"))]
    pub name: String,
    #[validate(email(code = "invalid_email"), length(max = 254, code = "too_long"))]
    pub email: String,
    #[validate(length(max = 120, code = "too_long"))]
    pub service: String,
    #[validate(length(max = 5000, code = "too_long"))]
    pub message: String,
}

impl NewContact {
    /// Attaches the server-assigned identity.
    pub(crate) fn into_contact(self, id: String, created_at: DateTime<Utc>) -> Contact {
        Contact {
            id,
            name: self.name,
            email: self.email,
            service: self.service,
            message: self.message,
            created_at,
        }
    }
}

/// Successful `POST /api/contacts` body.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponse {
    pub success: bool,
    pub contact: Contact,
    pub message: &'static str,
}

/// `GET /api/stats` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub happy_clients: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn contact_serializes_camel_case() {
        let created_at = Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).single().expect("timestamp");
        let contact = NewContact {
            name: "Abdi".into(),
            email: "a@b.com".into(),
            service: "erp".into(),
            message: "hi".into(),
        }
        .into_contact("abc".into(), created_at);

        let json = serde_json::to_value(&contact).expect("serialize");
        assert_eq!(json["id"], "abc");
        assert_eq!(json["createdAt"], "2025-03-01T08:30:00Z");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn stats_serializes_camel_case() {
        let json = serde_json::to_value(StatsResponse { happy_clients: 590 }).expect("serialize");
        assert_eq!(json, serde_json::json!({ "happyClients": 590 }));
    }
}
