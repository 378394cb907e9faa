//! Error types for provider operations

/// Errors from OIDC provider interactions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure: the provider could not be reached or the
    /// request timed out before a response arrived.
    #[error("identity provider unreachable: {0}")]
    Unreachable(String),

    /// The provider answered, but with a non-success status or a body
    /// missing required fields (for example no new refresh token).
    #[error("identity provider rejected the request: {0}")]
    Rejected(String),

    /// An identity token that cannot be decoded into a claim set.
    #[error("malformed identity token: {0}")]
    MalformedToken(String),
}

/// Result alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;
