use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "session";

/// Session payload stored in the encrypted `session` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: i64,
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub expires_at: DateTime<Utc>,
    pub session_id: String,
}

impl UserSession {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_elevated(&self) -> bool {
        self.is_staff || self.is_superuser
    }

    pub fn to_cookie(&self, secure: bool) -> Result<Cookie<'static>, ApiError> {
        let value = serde_json::to_string(self).map_err(ApiError::Serialization)?;

        Ok(Cookie::build((SESSION_COOKIE, value))
            .path("/")
            .secure(secure)
            .http_only(true)
            .same_site(SameSite::Lax)
            .build())
    }

    /// The session from the jar, if it decrypts and parses. Expiry is not checked here.
    pub fn from_jar(jar: &PrivateCookieJar) -> Option<Self> {
        let cookie = jar.get(SESSION_COOKIE)?;
        serde_json::from_str(cookie.value()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_in: i64) -> UserSession {
        UserSession {
            user_id: 1,
            username: "curator".to_string(),
            is_staff: false,
            is_superuser: true,
            expires_at: Utc::now() + Duration::seconds(expires_in),
            session_id: "abc".to_string(),
        }
    }

    #[test]
    fn test_expiry_and_elevation() {
        assert!(!session(60).is_expired());
        assert!(session(-60).is_expired());
        assert!(session(60).is_elevated());
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session(60).to_cookie(true).unwrap();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));

        let parsed: UserSession = serde_json::from_str(cookie.value()).unwrap();
        assert_eq!(parsed.username, "curator");
    }
}
