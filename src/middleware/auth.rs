use crate::auth::{UserContext, UserSession};
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::PrivateCookieJar;

/// Requires a valid, unexpired session for an active user.
///
/// Anonymous requests are redirected to the login page with the original
/// path in `next`.
pub async fn require_login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = authenticate(&state, &jar, request.uri()).await?;
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// As [`require_login`], then rejects users that are neither staff nor superuser.
pub async fn require_staff(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = authenticate(&state, &jar, request.uri()).await?;

    if !context.is_elevated() {
        tracing::warn!(
            user_id = context.user_id,
            path = %request.uri().path(),
            "staff access denied"
        );
        return Err(ApiError::Authorization(
            "Staff privileges required".to_string(),
        ));
    }

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

async fn authenticate(
    state: &AppState,
    jar: &PrivateCookieJar,
    uri: &Uri,
) -> Result<UserContext, ApiError> {
    if let Some(session) = UserSession::from_jar(jar) {
        if let Some(context) = state.auth_service.resolve(&session).await? {
            return Ok(context);
        }
    }

    tracing::debug!(path = %uri.path(), "authentication required");
    let original = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    Err(ApiError::LoginRequired(login_location(
        &state.config.login_url,
        original,
    )))
}

pub fn login_location(login_url: &str, next: &str) -> String {
    format!("{}?next={}", login_url, urlencoding::encode(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_location_encodes_next() {
        assert_eq!(
            login_location("/auth/login/", "/document/add/"),
            "/auth/login/?next=%2Fdocument%2Fadd%2F"
        );
        assert_eq!(
            login_location("/auth/login/", "/search/?query=a b"),
            "/auth/login/?next=%2Fsearch%2F%3Fquery%3Da%20b"
        );
    }
}
