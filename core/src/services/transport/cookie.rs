//! Cookie transport directives

use tk_shared::CookieConfig;

use crate::domain::entities::token::{IssuedToken, TokenPair};

/// One `Set-Cookie` the HTTP layer must emit. Always HTTP-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDirective {
    pub name: String,
    /// Empty when clearing
    pub value: String,
    /// Seconds; zero clears the cookie
    pub max_age_seconds: i64,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub same_site: String,
}

impl CookieDirective {
    fn new(name: &str, value: String, max_age_seconds: i64, config: &CookieConfig) -> Self {
        Self {
            name: name.to_string(),
            value,
            max_age_seconds,
            path: config.path.clone(),
            domain: config.domain.clone(),
            secure: config.secure,
            same_site: config.same_site.clone(),
        }
    }

    fn for_token(name: &str, token: &IssuedToken, config: &CookieConfig) -> Self {
        Self::new(name, token.token.clone(), token.ttl_seconds, config)
    }

    pub fn is_removal(&self) -> bool {
        self.max_age_seconds == 0
    }
}

/// Access and refresh cookies, each living as long as its credential
pub fn set_directives(pair: &TokenPair, config: &CookieConfig) -> Vec<CookieDirective> {
    vec![
        CookieDirective::for_token(&config.access_name, &pair.access, config),
        CookieDirective::for_token(&config.refresh_name, &pair.refresh, config),
    ]
}

/// Removal of both auth cookies on logout
pub fn clear_directives(config: &CookieConfig) -> Vec<CookieDirective> {
    vec![
        CookieDirective::new(&config.access_name, String::new(), 0, config),
        CookieDirective::new(&config.refresh_name, String::new(), 0, config),
    ]
}
