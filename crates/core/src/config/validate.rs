use chrono_tz::Tz;

use super::{types::Config, ConfigError};
use crate::race::MAX_PRELOAD_LEAD_SECS;

/// Validate configuration
/// Currently validates:
/// - A session token is present
/// - The base URL is http(s)
/// - Timeouts are non-zero
/// - The timezone is a known IANA identifier
/// - At least one booking attempt is allowed
/// - The preload lead is shorter than a day
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // API validation
    if config.api.token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.token is empty (set BUS_TOKEN)".to_string(),
        ));
    }

    if !config.api.base_url.starts_with("http://") && !config.api.base_url.starts_with("https://")
    {
        return Err(ConfigError::ValidationError(format!(
            "api.base_url must be an http(s) URL, got {:?}",
            config.api.base_url
        )));
    }

    if config.api.timeout_secs == 0 || config.api.connect_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api timeouts cannot be 0".to_string(),
        ));
    }

    // Race validation
    if config.race.timezone.parse::<Tz>().is_err() {
        return Err(ConfigError::ValidationError(format!(
            "race.timezone is not a known IANA timezone: {}",
            config.race.timezone
        )));
    }

    if config.race.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "race.max_attempts cannot be 0".to_string(),
        ));
    }

    if config.race.preload_lead_secs >= MAX_PRELOAD_LEAD_SECS {
        return Err(ConfigError::ValidationError(format!(
            "race.preload_lead_secs must be below {}, got {}",
            MAX_PRELOAD_LEAD_SECS, config.race.preload_lead_secs
        )));
    }

    if config.race.route.is_empty() {
        return Err(ConfigError::ValidationError(
            "race.route cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.api.token = "token".to_string();
        config
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_missing_token_fails() {
        let config = Config::default();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("BUS_TOKEN"));
    }

    #[test]
    fn test_validate_bad_base_url_fails() {
        let mut config = valid_config();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = valid_config();
        config.api.connect_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_unknown_timezone_fails() {
        let mut config = valid_config();
        config.race.timezone = "Mars/Olympus_Mons".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn test_validate_zero_attempts_fails() {
        let mut config = valid_config();
        config.race.max_attempts = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_preload_lead_of_a_day_or_more_fails() {
        let mut config = valid_config();
        config.race.preload_lead_secs = MAX_PRELOAD_LEAD_SECS - 1;
        assert!(validate_config(&config).is_ok());

        for lead in [MAX_PRELOAD_LEAD_SECS, 100_000_000_000_000_000, u64::MAX] {
            config.race.preload_lead_secs = lead;
            let err = validate_config(&config).unwrap_err();
            assert!(err.to_string().contains("preload_lead_secs"), "lead {}", lead);
        }
    }
}
