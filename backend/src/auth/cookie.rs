//! Refresh token cookie

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const REFRESH_COOKIE_NAME: &str = "refresh-token";

/// How the refresh cookie is written and cleared
#[derive(Debug, Clone, Copy)]
pub struct SessionCookie {
    /// Adds the `Secure` attribute; off only for local development over HTTP
    pub secure: bool,
}

impl SessionCookie {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Refresh token presented by the client, if any
    pub fn read(jar: &CookieJar) -> Option<String> {
        jar.get(REFRESH_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn build(&self, refresh_token: String) -> Cookie<'static> {
        Cookie::build((REFRESH_COOKIE_NAME, refresh_token))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .path("/")
            .build()
    }

    pub fn set(&self, jar: CookieJar, refresh_token: String) -> CookieJar {
        jar.add(self.build(refresh_token))
    }

    /// Expire the cookie on the client
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(
            Cookie::build(REFRESH_COOKIE_NAME)
                .http_only(true)
                .secure(self.secure)
                .same_site(SameSite::Strict)
                .path("/"),
        )
    }
}
