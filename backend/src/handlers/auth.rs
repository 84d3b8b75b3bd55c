//! Authentication HTTP handlers
//!
//! The refresh token only ever crosses the wire inside the `refresh-token`
//! cookie; these handlers own reading, setting and clearing it.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use validator::Validate;

use super::AuthenticatedUser;
use crate::app_state::AppState;
use crate::auth::{AuthError, SessionCookie};
use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse};

type CookieResult<T> = Result<(CookieJar, T), (CookieJar, ApiError)>;

/// Map a service error to a response, dropping the cookie when required
fn reject(state: &AppState, jar: CookieJar, err: AuthError) -> (CookieJar, ApiError) {
    let jar = if err.clears_session_cookie() {
        state.session_cookie.clear(jar)
    } else {
        jar
    };
    (jar, err.into())
}

/// POST /api/auth/login - Check credentials, issue tokens and set the refresh cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> CookieResult<Json<LoginResponse>> {
    if let Err(e) = req.validate() {
        return Err((jar, e.into()));
    }

    match state.auth_service.login(&req.username, &req.password).await {
        Ok(outcome) => {
            let jar = state.session_cookie.set(jar, outcome.refresh_token);
            Ok((jar, Json(outcome.response)))
        }
        Err(e) => Err(reject(&state, jar, e)),
    }
}

/// POST /api/auth/refresh - Exchange the refresh cookie for a new access token
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> CookieResult<Json<LoginResponse>> {
    let refresh_token = SessionCookie::read(&jar);

    match state.auth_service.refresh(refresh_token.as_deref()).await {
        Ok(response) => Ok((jar, Json(response))),
        Err(e) => Err(reject(&state, jar, e)),
    }
}

/// POST /api/auth/logout - End the current session
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    user: AuthenticatedUser,
) -> CookieResult<StatusCode> {
    match state.auth_service.logout(user.user_id).await {
        Ok(()) => Ok((state.session_cookie.clear(jar), StatusCode::NO_CONTENT)),
        Err(e) => Err((jar, ApiError::from(e))),
    }
}
