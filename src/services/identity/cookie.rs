use serde::Serialize;

use crate::config::ConfigError;

/// Application cookie settings handed to the sign-in transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationCookie {
    pub scheme: String,
    pub login_path: String,
    pub logout_path: String,
}

impl ApplicationCookie {
    /// Paths get a leading `/` when missing, matching how route constants are mounted.
    pub fn new(scheme: &str, login_path: &str, logout_path: &str) -> Result<Self, ConfigError> {
        let scheme = scheme.trim();
        if scheme.is_empty() || scheme.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid("AUTHENTICATION_SCHEME"));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            login_path: cookie_path(login_path).ok_or(ConfigError::Invalid("LOGIN_PATH"))?,
            logout_path: cookie_path(logout_path).ok_or(ConfigError::Invalid("LOGOUT_PATH"))?,
        })
    }
}

fn cookie_path(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let body = raw.trim_start_matches('/');
    if body.is_empty()
        || body
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '?' | '#'))
    {
        return None;
    }
    Some(format!("/{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_relative_paths() {
        let cookie = ApplicationCookie::new("idsrv", "account/login", "/account/logout").unwrap();
        assert_eq!(cookie.login_path, "/account/login");
        assert_eq!(cookie.logout_path, "/account/logout");
    }

    #[test]
    fn rejects_unusable_values() {
        assert!(matches!(
            ApplicationCookie::new("", "/a", "/b"),
            Err(ConfigError::Invalid("AUTHENTICATION_SCHEME"))
        ));
        assert!(matches!(
            ApplicationCookie::new("id srv", "/a", "/b"),
            Err(ConfigError::Invalid("AUTHENTICATION_SCHEME"))
        ));
        assert!(matches!(
            ApplicationCookie::new("idsrv", "/", "/b"),
            Err(ConfigError::Invalid("LOGIN_PATH"))
        ));
        assert!(matches!(
            ApplicationCookie::new("idsrv", "/a", "/logout?next=/"),
            Err(ConfigError::Invalid("LOGOUT_PATH"))
        ));
    }
}
