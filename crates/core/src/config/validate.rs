use super::{
    types::{AuthMethod, Config},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Storage root is set and the upload limit is positive
/// - Basic auth has both credentials
/// - Fetch timeouts are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.storage.root.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.root cannot be empty".to_string(),
        ));
    }

    if config.storage.max_upload_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "storage.max_upload_bytes cannot be 0".to_string(),
        ));
    }

    if matches!(config.auth.method, AuthMethod::Basic) {
        let user_ok = config.auth.username.as_deref().is_some_and(|u| !u.is_empty());
        let pass_ok = config.auth.password.as_deref().is_some_and(|p| !p.is_empty());
        if !user_ok || !pass_ok {
            return Err(ConfigError::ValidationError(
                "auth.username and auth.password must be set when using basic auth".to_string(),
            ));
        }
    }

    if config.fetch.timeout_secs == Some(0) || config.fetch.connect_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "fetch timeouts cannot be 0".to_string(),
        ));
    }

    Ok(())
}
