//! Error types for session lifecycle operations

/// Errors from session lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backing key-value store could not serve the operation.
    #[error("session store unavailable: {0}")]
    StoreUnavailable(String),

    /// The presented token resolves to no record. Never-created, expired
    /// and revoked are indistinguishable here.
    #[error("session expired")]
    SessionExpired,

    /// A resolved record is missing a field the operation needs.
    #[error("malformed session record: {0}")]
    MalformedSession(String),

    /// A provider call made on behalf of the session failed.
    #[error(transparent)]
    Provider(#[from] oidc::Error),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_pass_through_transparently() {
        let err: Error = oidc::Error::Rejected("no refresh_token".into()).into();
        assert!(err.to_string().contains("no refresh_token"));
        assert!(matches!(err, Error::Provider(oidc::Error::Rejected(_))));
    }

    #[test]
    fn session_expired_has_fixed_message() {
        assert_eq!(Error::SessionExpired.to_string(), "session expired");
    }
}
