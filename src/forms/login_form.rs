use serde::Deserialize;

use super::{non_blank, FieldErrors, REQUIRED};

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    /// Returns `(username, password)`. The password is not trimmed.
    pub fn credentials(&self) -> Result<(String, String), FieldErrors> {
        let mut errors = FieldErrors::default();

        let username = non_blank(self.username.as_deref());
        if username.is_none() {
            errors.add("username", REQUIRED);
        }
        let password = self.password.as_deref().filter(|p| !p.is_empty());
        if password.is_none() {
            errors.add("password", REQUIRED);
        }

        match (username, password) {
            (Some(u), Some(p)) => Ok((u.to_string(), p.to_string())),
            _ => Err(errors),
        }
    }
}

/// Accepts only local absolute paths so a login cannot bounce to another host.
///
/// Browsers strip tab and newline from URLs (`/\t/host` becomes `//host`),
/// so any control character rejects the path.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.map(str::trim).filter(|n| {
        n.starts_with('/')
            && !n.starts_with("//")
            && !n.contains('\\')
            && !n.chars().any(char::is_control)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_required() {
        let errors = LoginForm::default().credentials().unwrap_err();
        assert_eq!(errors.field_names(), vec!["password", "username"]);

        let form = LoginForm {
            username: Some(" curator ".to_string()),
            password: Some(" secret ".to_string()),
            next: None,
        };
        assert_eq!(
            form.credentials().unwrap(),
            ("curator".to_string(), " secret ".to_string())
        );
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/document/add/")), Some("/document/add/"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example/")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(Some("/\t/evil.example")), None);
        assert_eq!(safe_next(Some("/a\nb")), None);
        assert_eq!(safe_next(Some("/a\r\nSet-Cookie: x=1")), None);
        assert_eq!(safe_next(Some("  /search/?query=harbour ")), Some("/search/?query=harbour"));
        assert_eq!(safe_next(None), None);
    }
}
