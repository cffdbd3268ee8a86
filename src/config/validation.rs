//! Configuration error type and value-expansion helpers.

use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    Validation(String),
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `${VAR:-default}` syntax; an unset variable with no
/// default expands to the empty string. Used for header values so secrets
/// stay out of config files.
pub fn expand_env_vars(input: &str) -> String {
    static ENV_VAR_REGEX: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();

    let regex = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("failed to compile env var regex")
    });

    regex
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var_name).unwrap_or_else(|_| default_value.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars_no_vars() {
        assert_eq!(expand_env_vars("plain value"), "plain value");
    }

    #[test]
    fn test_expand_env_vars_unset_with_default() {
        let result = expand_env_vars("Bearer ${ARGUS_UNSET_TOKEN_98765:-fallback}");
        assert_eq!(result, "Bearer fallback");
    }

    #[test]
    fn test_expand_env_vars_unset_without_default() {
        assert_eq!(expand_env_vars("${ARGUS_UNSET_TOKEN_98765}"), "");
    }

    #[test]
    fn test_expand_env_vars_from_env() {
        // SAFETY: This test runs in isolation and only modifies a test-specific variable.
        unsafe {
            std::env::set_var("ARGUS_TEST_EXPAND_VAR", "secret");
        }
        assert_eq!(
            expand_env_vars("token=${ARGUS_TEST_EXPAND_VAR}"),
            "token=secret"
        );
        // SAFETY: Cleanup test variable.
        unsafe {
            std::env::remove_var("ARGUS_TEST_EXPAND_VAR");
        }
    }
}
