//! Unsigned ID-token claim decoding
//!
//! An identity token is three dot-separated base64url segments: header,
//! payload, signature. Only the payload is decoded here. The signature is
//! NOT verified: callers must treat the resulting claims as
//! provider-asserted, not cryptographically proven by this component. The
//! token arrives over the broker's own TLS channel to the provider, which
//! is the trust boundary this design accepts.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

use crate::error::{Error, Result};

/// Decoded claim set of an identity token.
pub type ClaimMap = serde_json::Map<String, Value>;

/// Decode the payload segment of an identity token into a claim map.
///
/// Fails with `MalformedToken` when the token does not have exactly three
/// segments or the payload is not base64url-encoded JSON object.
pub fn decode(id_token: &str) -> Result<ClaimMap> {
    let segments: Vec<&str> = id_token.split('.').collect();
    if segments.len() != 3 {
        return Err(Error::MalformedToken(format!(
            "expected 3 token segments, got {}",
            segments.len()
        )));
    }

    // Providers emit unpadded base64url, but tolerate padded input.
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| Error::MalformedToken(format!("payload is not base64url: {e}")))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Ok(claims),
        Ok(other) => Err(Error::MalformedToken(format!(
            "payload is not a JSON object, got {}",
            kind(&other)
        ))),
        Err(e) => Err(Error::MalformedToken(format!("payload is not JSON: {e}"))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The identity fields the broker snapshots into a session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider subject identifier (`sub` claim).
    pub user_id: String,
    /// `preferred_username` claim, empty when the provider omits it.
    pub username: String,
    /// `email` claim, empty when the provider omits it.
    pub email: String,
}

impl Identity {
    /// Extract the identity fields from a decoded claim map.
    ///
    /// `sub` is mandatory; a payload without it cannot identify a user and
    /// fails with `MalformedToken`. Username and email default to empty.
    pub fn from_claims(claims: &ClaimMap) -> Result<Self> {
        let user_id = claims
            .get("sub")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MalformedToken("payload has no sub claim".into()))?;

        Ok(Self {
            user_id: user_id.to_owned(),
            username: str_claim(claims, "preferred_username"),
            email: str_claim(claims, "email"),
        })
    }
}

fn str_claim(claims: &ClaimMap, name: &str) -> String {
    claims
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble an identity token from a JSON payload. The header and
    /// signature segments are arbitrary, decode() never inspects them.
    fn fake_id_token(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{header}.{body}.not-a-real-signature")
    }

    #[test]
    fn decodes_payload_claims() {
        let token = fake_id_token(&serde_json::json!({
            "sub": "f3b0c1d2",
            "preferred_username": "alice",
            "email": "alice@example.com",
        }));

        let claims = decode(&token).unwrap();
        assert_eq!(claims["sub"], "f3b0c1d2");
        assert_eq!(claims["preferred_username"], "alice");
    }

    #[test]
    fn signature_segment_is_ignored() {
        let token = fake_id_token(&serde_json::json!({"sub": "u1"}));
        let tampered = format!("{}.{}", token.rsplit_once('.').unwrap().0, "garbage!!");
        let claims = decode(&tampered).unwrap();
        assert_eq!(claims["sub"], "u1");
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        let err = decode("only.two").unwrap_err();
        assert!(matches!(err, Error::MalformedToken(_)), "got: {err:?}");
        assert!(err.to_string().contains("got 2"));

        let err = decode("a.b.c.d").unwrap_err();
        assert!(err.to_string().contains("got 4"));
    }

    #[test]
    fn invalid_base64_payload_is_malformed() {
        let err = decode("header.!!!not-base64!!!.sig").unwrap_err();
        assert!(matches!(err, Error::MalformedToken(_)), "got: {err:?}");
    }

    #[test]
    fn non_object_payload_is_malformed() {
        let body = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        let err = decode(&format!("h.{body}.s")).unwrap_err();
        assert!(err.to_string().contains("array"), "got: {err}");
    }

    #[test]
    fn padded_payload_is_tolerated() {
        use base64::engine::general_purpose::URL_SAFE;
        // URL_SAFE (with padding) on a 10-byte input produces trailing '='
        let body = URL_SAFE.encode(br#"{"sub":"x"}"#);
        assert!(body.ends_with('='));
        let claims = decode(&format!("h.{body}.s")).unwrap();
        assert_eq!(claims["sub"], "x");
    }

    #[test]
    fn identity_requires_sub() {
        let claims = decode(&fake_id_token(&serde_json::json!({
            "preferred_username": "alice"
        })))
        .unwrap();

        let err = Identity::from_claims(&claims).unwrap_err();
        assert!(err.to_string().contains("sub"), "got: {err}");
    }

    #[test]
    fn identity_defaults_optional_claims_to_empty() {
        let claims = decode(&fake_id_token(&serde_json::json!({"sub": "u42"}))).unwrap();
        let identity = Identity::from_claims(&claims).unwrap();
        assert_eq!(identity.user_id, "u42");
        assert_eq!(identity.username, "");
        assert_eq!(identity.email, "");
    }

    #[test]
    fn identity_copies_all_three_claims() {
        let claims = decode(&fake_id_token(&serde_json::json!({
            "sub": "u42",
            "preferred_username": "bob",
            "email": "bob@example.com",
            "realm_access": {"roles": ["user"]},
        })))
        .unwrap();

        let identity = Identity::from_claims(&claims).unwrap();
        assert_eq!(
            identity,
            Identity {
                user_id: "u42".into(),
                username: "bob".into(),
                email: "bob@example.com".into(),
            }
        );
    }
}
