mod basic;
mod none;
mod traits;
mod types;

pub use basic::*;
pub use none::*;
pub use traits::*;
pub use types::*;

use crate::config::AuthConfig;

/// Factory function to create authenticator from config
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    use crate::config::AuthMethod;

    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator::new())),
        AuthMethod::Basic => {
            let (Some(username), Some(password)) =
                (config.username.clone(), config.password.clone())
            else {
                return Err(AuthError::ConfigurationError(
                    "username and password must be set when using Basic auth method".to_string(),
                ));
            };
            Ok(Box::new(BasicAuthenticator::new(username, password)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthMethod;

    #[test]
    fn test_create_authenticator_none() {
        let auth = create_authenticator(&AuthConfig::none()).unwrap();
        assert_eq!(auth.method_name(), "none");
        assert!(auth.challenge().is_none());
    }

    #[test]
    fn test_create_authenticator_basic() {
        let auth = create_authenticator(&AuthConfig::basic("user", "secret")).unwrap();
        assert_eq!(auth.method_name(), "basic");
        assert!(auth.challenge().unwrap().starts_with("Basic realm="));
    }

    #[test]
    fn test_create_authenticator_basic_missing_password() {
        let config = AuthConfig {
            method: AuthMethod::Basic,
            username: Some("user".to_string()),
            password: None,
        };
        let result = create_authenticator(&config);
        assert!(matches!(result, Err(AuthError::ConfigurationError(_))));
    }
}
