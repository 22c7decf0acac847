//! HTTP Basic authentication.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};

use super::{AuthError, AuthRequest, Authenticator, Identity};

const CHALLENGE: &str = r#"Basic realm="Please authenticate for uploading""#;

/// Authenticator that checks `Authorization: Basic` credentials against a
/// single configured user.
pub struct BasicAuthenticator {
    username: String,
    password: String,
}

impl BasicAuthenticator {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    /// Decode `Authorization: Basic <base64(user:pass)>` into its parts.
    fn extract_credentials(request: &AuthRequest) -> Option<(String, String)> {
        let header = request.header("authorization")?;
        let (scheme, encoded) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, pass) = decoded.split_once(':')?;
        Some((user.to_string(), pass.to_string()))
    }
}

#[async_trait]
impl Authenticator for BasicAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let (user, pass) =
            Self::extract_credentials(request).ok_or(AuthError::NotAuthenticated)?;

        // Evaluate both comparisons so timing does not reveal which one failed
        let user_ok = constant_time_eq(user.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(pass.as_bytes(), self.password.as_bytes());

        if user_ok & pass_ok {
            Ok(Identity {
                user_id: user,
                method: "basic".to_string(),
            })
        } else {
            Err(AuthError::InvalidCredentials(
                "authorization failed".to_string(),
            ))
        }
    }

    fn method_name(&self) -> &'static str {
        "basic"
    }

    fn challenge(&self) -> Option<&str> {
        Some(CHALLENGE)
    }
}

/// Constant-time byte comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn make_request(headers: Vec<(&str, &str)>) -> AuthRequest {
        AuthRequest {
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
            source_ip: "127.0.0.1".parse::<IpAddr>().unwrap(),
        }
    }

    fn basic_header(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass)))
    }

    fn authenticator() -> BasicAuthenticator {
        BasicAuthenticator::new("uploader".to_string(), "s3cret:with:colons".to_string())
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let header = basic_header("uploader", "s3cret:with:colons");
        let request = make_request(vec![("Authorization", &header)]);

        let identity = authenticator().authenticate(&request).await.unwrap();

        assert_eq!(identity.user_id, "uploader");
        assert_eq!(identity.method, "basic");
    }

    #[tokio::test]
    async fn test_scheme_is_case_insensitive() {
        let header = basic_header("uploader", "s3cret:with:colons").replace("Basic", "basic");
        let request = make_request(vec![("Authorization", &header)]);

        assert!(authenticator().authenticate(&request).await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let header = basic_header("uploader", "nope");
        let request = make_request(vec![("Authorization", &header)]);

        let result = authenticator().authenticate(&request).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn test_wrong_user() {
        let header = basic_header("intruder", "s3cret:with:colons");
        let request = make_request(vec![("Authorization", &header)]);

        let result = authenticator().authenticate(&request).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn test_missing_header() {
        let result = authenticator().authenticate(&make_request(vec![])).await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_bearer_scheme_not_accepted() {
        let request = make_request(vec![("Authorization", "Bearer token")]);
        let result = authenticator().authenticate(&request).await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_garbage_base64() {
        let request = make_request(vec![("Authorization", "Basic !!!not-base64")]);
        let result = authenticator().authenticate(&request).await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[test]
    fn test_challenge_realm() {
        assert_eq!(
            authenticator().challenge(),
            Some(r#"Basic realm="Please authenticate for uploading""#)
        );
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
        assert!(constant_time_eq(b"", b""));
    }
}
