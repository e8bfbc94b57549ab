use std::time::Duration;

use crate::{HttpError, Result};

const ENV_MAX_ATTEMPTS: &str = "HTTP_RETRY_MAX_ATTEMPTS";
const ENV_BACKOFF_SECS: &str = "HTTP_RETRY_BACKOFF_SECS";

/// Configures the retry policy of [`RetryTransport`](crate::RetryTransport).
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Total number of tries, including the first one.
    pub max_attempts: u32,
    /// Backoff base in seconds; attempt `n` waits `backoff_base_secs ^ n`.
    pub backoff_base_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_secs: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, backoff_base_secs: f64) -> Self {
        Self {
            max_attempts,
            backoff_base_secs,
        }
    }

    /// Reads the policy from the environment.
    ///
    /// Reads:
    /// - `HTTP_RETRY_MAX_ATTEMPTS` — total attempts (default `3`)
    /// - `HTTP_RETRY_BACKOFF_SECS` — backoff base in seconds (default `2`)
    ///
    /// Unset variables keep their default; set but unparsable values are
    /// reported as errors.
    pub fn from_env() -> std::result::Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> std::result::Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_MAX_ATTEMPTS) {
            config.max_attempts = raw
                .trim()
                .parse()
                .map_err(|err| format!("invalid {ENV_MAX_ATTEMPTS} '{raw}': {err}"))?;
        }
        if let Some(raw) = lookup(ENV_BACKOFF_SECS) {
            config.backoff_base_secs = raw
                .trim()
                .parse()
                .map_err(|err| format!("invalid {ENV_BACKOFF_SECS} '{raw}': {err}"))?;
        }
        config.validate().map_err(|err| err.to_string())?;
        Ok(config)
    }

    /// Rejects zero attempts and non-positive or non-finite backoff bases.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(HttpError::InvalidConfig(
                "max_attempts must be at least 1".to_owned(),
            ));
        }
        if !self.backoff_base_secs.is_finite() || self.backoff_base_secs <= 0.0 {
            return Err(HttpError::InvalidConfig(format!(
                "backoff_base_secs must be a positive number, got {}",
                self.backoff_base_secs
            )));
        }
        Ok(())
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        Duration::try_from_secs_f64(self.backoff_base_secs.powi(exp)).unwrap_or(Duration::MAX)
    }
}

/// Configures [`ReqwestTransport`](crate::ReqwestTransport).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use super::RetryConfig;
    use crate::HttpError;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_parameterless_policy() {
        assert_eq!(RetryConfig::default(), RetryConfig::new(3, 2.0));
    }

    #[test]
    fn backoff_is_exponential_in_attempt_number() {
        let config = RetryConfig::new(5, 2.0);
        assert_eq!(config.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(4));
        assert_eq!(config.backoff_delay(3), Duration::from_secs(8));

        let config = RetryConfig::new(3, 1.0);
        assert_eq!(config.backoff_delay(1), Duration::from_secs(1));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(1));
    }

    #[test]
    fn huge_backoff_saturates() {
        let config = RetryConfig::new(3, 1.0e300);
        assert_eq!(config.backoff_delay(4), Duration::MAX);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(matches!(
            RetryConfig::new(0, 1.0).validate(),
            Err(HttpError::InvalidConfig(_))
        ));
        assert!(RetryConfig::new(1, 0.0).validate().is_err());
        assert!(RetryConfig::new(1, -2.0).validate().is_err());
        assert!(RetryConfig::new(1, f64::NAN).validate().is_err());
        assert!(RetryConfig::new(1, 0.5).validate().is_ok());
    }

    #[test]
    fn env_lookup_overrides_defaults() {
        let config = RetryConfig::from_lookup(lookup(&[
            ("HTTP_RETRY_MAX_ATTEMPTS", "5"),
            ("HTTP_RETRY_BACKOFF_SECS", " 1.5 "),
        ]))
        .unwrap();
        assert_eq!(config, RetryConfig::new(5, 1.5));

        let config = RetryConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RetryConfig::default());
    }

    #[test]
    fn env_lookup_reports_bad_values() {
        let err = RetryConfig::from_lookup(lookup(&[("HTTP_RETRY_MAX_ATTEMPTS", "three")]))
            .unwrap_err();
        assert!(err.contains("HTTP_RETRY_MAX_ATTEMPTS"));

        let err = RetryConfig::from_lookup(lookup(&[("HTTP_RETRY_MAX_ATTEMPTS", "0")]))
            .unwrap_err();
        assert!(err.contains("max_attempts"));
    }
}
