/// Get environment variable with ACCOUNT_ prefix, falling back to unprefixed version
///
/// Checks `ACCOUNT_{key}` first, then `{key}`.
///
/// # Examples
///
/// ```rust
/// use tideway_account::utils::get_env_with_prefix;
///
/// // Checks ACCOUNT_RESET_THRESHOLD first, then RESET_THRESHOLD
/// let threshold = get_env_with_prefix("RESET_THRESHOLD");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("ACCOUNT_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_with_prefix() {
        unsafe {
            std::env::set_var("ACCOUNT_ENV_TEST_VAR", "prefixed_value");
        }
        assert_eq!(get_env_with_prefix("ENV_TEST_VAR"), Some("prefixed_value".to_string()));
        unsafe {
            std::env::remove_var("ACCOUNT_ENV_TEST_VAR");
        }

        unsafe {
            std::env::set_var("ENV_FALLBACK_VAR", "unprefixed_value");
        }
        assert_eq!(get_env_with_prefix("ENV_FALLBACK_VAR"), Some("unprefixed_value".to_string()));
        unsafe {
            std::env::remove_var("ENV_FALLBACK_VAR");
        }

        assert_eq!(get_env_with_prefix("ENV_NON_EXISTENT_VAR"), None);
    }
}
