//! Cookie transport for session tokens.
//!
//! Both tokens travel as `HttpOnly`, `SameSite=Strict` cookies scoped to `/`.
//! The `Secure` attribute is set unless the server runs in development mode.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use session_auth::auth::IssuedToken;

use crate::config::CookieConfig;

/// Name of the access token cookie
pub const ACCESS_COOKIE: &str = "access_token";

/// Name of the refresh token cookie
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Maps issued tokens to cookie attributes.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    secure: bool,
    access_max_age: time::Duration,
    refresh_max_age: time::Duration,
}

impl CookiePolicy {
    pub fn new(config: &CookieConfig) -> Self {
        Self {
            secure: !config.dev_mode,
            access_max_age: time::Duration::seconds(config.access_max_age.num_seconds()),
            refresh_max_age: time::Duration::seconds(config.refresh_max_age.num_seconds()),
        }
    }

    /// Cookie carrying an access token
    pub fn access_cookie(&self, token: &IssuedToken) -> Cookie<'static> {
        self.build(ACCESS_COOKIE, token.token.clone(), self.access_max_age)
    }

    /// Cookie carrying a refresh token
    pub fn refresh_cookie(&self, token: &IssuedToken) -> Cookie<'static> {
        self.build(REFRESH_COOKIE, token.token.clone(), self.refresh_max_age)
    }

    /// Cookie that instructs the client to drop `name`.
    ///
    /// Attributes match the original cookie so the browser treats it as the
    /// same cookie.
    pub fn removal(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.build(name, String::new(), time::Duration::ZERO);
        cookie.make_removal();
        cookie
    }

    /// Add removals for both session cookies.
    ///
    /// Emitted whether or not the request carried the cookies.
    pub fn clear_all(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.removal(ACCESS_COOKIE))
            .add(self.removal(REFRESH_COOKIE))
    }

    fn build(&self, name: &'static str, value: String, max_age: time::Duration) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure)
            .max_age(max_age)
            .build()
    }
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self::new(&CookieConfig::default())
    }
}
