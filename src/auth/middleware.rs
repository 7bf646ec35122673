//! Authentication middleware that validates cookies, extends sessions, and handles redirects.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        UserID,
        cookie::{
            DEFAULT_COOKIE_DURATION, extend_auth_cookie_duration_if_needed,
            get_token_from_cookies,
        },
        redirect::build_log_in_redirect_url,
    },
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// The session cookie jar and the user it belongs to, if the request carries a valid auth cookie.
async fn authenticate(
    state: &AuthState,
    parts: &mut Parts,
) -> Option<(PrivateCookieJar, UserID)> {
    let jar = PrivateCookieJar::from_request_parts(parts, state)
        .await
        .inspect_err(|error| tracing::error!("Could not read the cookie jar: {error:?}"))
        .ok()?;

    match get_token_from_cookies(&jar) {
        Ok(token) => Some((jar, token.user_id)),
        Err(error) => {
            tracing::debug!("Rejected auth cookie: {error}");
            None
        }
    }
}

/// Copy the `Set-Cookie` headers of `jar` onto `headers`.
fn append_cookies(jar: PrivateCookieJar, headers: &mut HeaderMap) {
    let jar_response = jar.into_response();

    for value in jar_response.headers().get_all(SET_COOKIE) {
        headers.append(SET_COOKIE, value.to_owned());
    }
}

/// Runs `next` with the user ID in the request extensions, or answers with
/// `reject(log_in_url)` when the request has no valid auth cookie.
///
/// Every authenticated request keeps the session alive for at least
/// another [DEFAULT_COOKIE_DURATION].
async fn guard(
    state: AuthState,
    request: Request,
    next: Next,
    reject: impl Fn(&str) -> Response,
) -> Response {
    let log_in_url = build_log_in_redirect_url(&request);
    let (mut parts, body) = request.into_parts();

    let Some((jar, user_id)) = authenticate(&state, &mut parts).await else {
        return reject(&log_in_url);
    };

    parts.extensions.insert(user_id);
    let mut response = next.run(Request::from_parts(parts, body)).await;

    let duration = state.cookie_duration.max(DEFAULT_COOKIE_DURATION);
    match extend_auth_cookie_duration_if_needed(jar, duration) {
        Ok(jar) => append_cookies(jar, response.headers_mut()),
        Err(error) => tracing::error!("Could not extend the session of user {user_id}: {error}"),
    }

    response
}

/// Middleware function that checks for a valid authorization cookie.
/// The user ID is placed into request and then the request executed normally if the cookie is valid, otherwise a redirect to the log-in page is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware function that checks for a valid authorization cookie.
/// The user ID is placed into request and then the request executed normally if the cookie is valid, otherwise a HTMX redirect to the log-in page is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
