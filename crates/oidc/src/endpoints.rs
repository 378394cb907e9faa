//! Realm-scoped provider endpoint URLs
//!
//! The provider exposes its OIDC operations under
//! `<base>/realms/<realm>/protocol/openid-connect/<op>`. Endpoints are
//! derived once from the configured base URL and realm name rather than
//! discovered, so a typo fails fast at startup instead of at first login.

/// The three provider endpoints the broker talks to.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    authorize: String,
    token: String,
    end_session: String,
}

impl ProviderEndpoints {
    /// Derive endpoint URLs from the provider base URL and realm name.
    /// A trailing slash on the base URL is tolerated.
    pub fn new(base_url: &str, realm: &str) -> Self {
        let root = format!(
            "{}/realms/{realm}/protocol/openid-connect",
            base_url.trim_end_matches('/')
        );
        Self {
            authorize: format!("{root}/auth"),
            token: format!("{root}/token"),
            end_session: format!("{root}/logout"),
        }
    }

    /// Authorization endpoint (browser redirect target).
    pub fn authorize(&self) -> &str {
        &self.authorize
    }

    /// Token endpoint (code exchange and refresh grants).
    pub fn token(&self) -> &str {
        &self.token
    }

    /// End-session endpoint (logout notification).
    pub fn end_session(&self) -> &str {
        &self.end_session
    }
}

/// Build the authorization redirect URL the browser is sent to at login.
///
/// Carries exactly the parameters the provider needs to run the code flow:
/// `client_id`, `response_type=code`, `scope=openid profile email`, and the
/// callback `redirect_uri`.
pub fn build_authorization_url(
    endpoints: &ProviderEndpoints,
    client_id: &str,
    redirect_uri: &str,
) -> String {
    format!(
        "{}?client_id={}&response_type=code&scope=openid%20profile%20email&redirect_uri={}",
        endpoints.authorize(),
        urlencoded(client_id),
        urlencoded(redirect_uri),
    )
}

/// Minimal URL encoding for parameter values.
/// Only encodes characters that would break URL parameter parsing.
fn urlencoded(s: &str) -> String {
    s.replace(' ', "%20")
        .replace(':', "%3A")
        .replace('/', "%2F")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_realm_layout() {
        let endpoints = ProviderEndpoints::new("https://id.example.com", "demo");
        assert_eq!(
            endpoints.authorize(),
            "https://id.example.com/realms/demo/protocol/openid-connect/auth"
        );
        assert_eq!(
            endpoints.token(),
            "https://id.example.com/realms/demo/protocol/openid-connect/token"
        );
        assert_eq!(
            endpoints.end_session(),
            "https://id.example.com/realms/demo/protocol/openid-connect/logout"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        let endpoints = ProviderEndpoints::new("https://id.example.com/", "demo");
        assert_eq!(
            endpoints.token(),
            "https://id.example.com/realms/demo/protocol/openid-connect/token"
        );
    }

    #[test]
    fn authorization_url_contains_required_params() {
        let endpoints = ProviderEndpoints::new("https://id.example.com", "demo");
        let url =
            build_authorization_url(&endpoints, "web-app", "http://localhost:8080/auth/callback");

        assert!(url.starts_with(endpoints.authorize()));
        assert!(url.contains("client_id=web-app"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid%20profile%20email"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fcallback"));
    }
}
