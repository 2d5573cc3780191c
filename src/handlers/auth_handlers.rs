use axum::{
    extract::{Query, State},
    response::Redirect,
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar};
use serde::{Deserialize, Serialize};

use crate::{
    auth::SESSION_COOKIE,
    error::ApiError,
    forms::{safe_next, LoginForm},
    AppState,
};

#[derive(Deserialize)]
pub struct LoginPageParams {
    next: Option<String>,
}

#[derive(Serialize)]
pub struct LoginPage {
    fields: [&'static str; 2],
    next: Option<String>,
}

pub async fn login_page(Query(params): Query<LoginPageParams>) -> Json<LoginPage> {
    Json(LoginPage {
        fields: ["username", "password"],
        next: safe_next(params.next.as_deref()).map(str::to_string),
    })
}

/// Sets the session cookie and redirects to `next` when it is a local path.
pub async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(PrivateCookieJar, Redirect), ApiError> {
    let (username, password) = form.credentials().map_err(ApiError::Form)?;

    let session = state.auth_service.login(&username, &password).await?;
    let cookie = session.to_cookie(state.config.is_production())?;

    let target = safe_next(form.next.as_deref()).unwrap_or("/");
    Ok((jar.add(cookie), Redirect::to(target)))
}

pub async fn logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/"))
}
