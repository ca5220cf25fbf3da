use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The authenticated principal as returned by the login procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub email: String,
    pub role: String,
}

/// One active admin login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: AdminUser,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of a login attempt; also the wire shape of the `admin_login` procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AdminUser>,
}

impl LoginOutcome {
    #[must_use]
    pub fn succeeded(user: AdminUser) -> Self {
        Self {
            success: true,
            message: None,
            user: Some(user),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            user: None,
        }
    }
}

// Ids come back as text or integers depending on the table definition.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(id) => id,
        Id::Number(id) => id.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn auth_session_uses_camel_case() {
        let session = AuthSession {
            user: AdminUser {
                id: "1".to_string(),
                email: "admin@example.com".to_string(),
                role: "admin".to_string(),
            },
            session_token: "tok".to_string(),
            expires_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        };

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["sessionToken"], "tok");
        assert_eq!(value["expiresAt"], "2025-01-02T03:04:05Z");
        assert_eq!(value["user"]["email"], "admin@example.com");

        let back: AuthSession = serde_json::from_value(value).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn admin_user_accepts_numeric_id() {
        let user: AdminUser =
            serde_json::from_value(json!({"id": 42, "email": "a@b.c", "role": "admin"})).unwrap();
        assert_eq!(user.id, "42");
    }

    #[test]
    fn login_outcome_parses_failure_without_user() {
        let outcome: LoginOutcome =
            serde_json::from_value(json!({"success": false, "message": "Invalid credentials"}))
                .unwrap();
        assert_eq!(outcome, LoginOutcome::failed("Invalid credentials"));
    }

    #[test]
    fn login_outcome_omits_empty_fields() {
        let value = serde_json::to_value(LoginOutcome::failed("nope")).unwrap();
        assert_eq!(value, json!({"success": false, "message": "nope"}));
    }
}
