//! Service configuration for the OpenRouteService adapters.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::retry::RetryPolicy;

pub const ORS_DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

pub const ENV_API_KEY: &str = "ORS_API_KEY";
pub const ENV_BASE_URL: &str = "ORS_BASE_URL";
pub const ENV_PROFILE: &str = "ORS_PROFILE";
pub const ENV_TIMEOUT_SECS: &str = "ORS_TIMEOUT_SECS";
pub const ENV_COUNTRY: &str = "ORS_COUNTRY";

const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Travel mode used for distance lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingProfile {
    #[default]
    DrivingCar,
    DrivingHgv,
    CyclingRegular,
    FootWalking,
}

impl fmt::Display for RoutingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RoutingProfile::DrivingCar => "driving-car",
                RoutingProfile::DrivingHgv => "driving-hgv",
                RoutingProfile::CyclingRegular => "cycling-regular",
                RoutingProfile::FootWalking => "foot-walking",
            }
        )
    }
}

impl FromStr for RoutingProfile {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "driving-car" => Ok(RoutingProfile::DrivingCar),
            "driving-hgv" => Ok(RoutingProfile::DrivingHgv),
            "cycling-regular" => Ok(RoutingProfile::CyclingRegular),
            "foot-walking" => Ok(RoutingProfile::FootWalking),
            other => Err(ConfigError::InvalidValue {
                var: ENV_PROFILE,
                value: other.to_string(),
            }),
        }
    }
}

/// Credentials and transport settings for one planning session.
#[derive(Clone)]
pub struct ServiceConfig {
    pub api_key: String,
    pub base_url: String,
    pub profile: RoutingProfile,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// ISO 3166 country code restricting geocoding results.
    pub country: Option<String>,
}

impl ServiceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: ORS_DEFAULT_BASE_URL.to_string(),
            profile: RoutingProfile::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            country: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds a config from any variable source; `from_env` uses the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(ENV_API_KEY)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey(ENV_API_KEY))?;

        let mut config = Self::new(api_key);

        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|url| !url.trim().is_empty()) {
            config.base_url = base_url.trim().trim_end_matches('/').to_string();
        }

        if let Some(profile) = lookup(ENV_PROFILE) {
            config.profile = profile.parse()?;
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            let secs = timeout
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: ENV_TIMEOUT_SECS,
                    value: timeout.clone(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        config.country = lookup(ENV_COUNTRY)
            .map(|country| country.trim().to_string())
            .filter(|country| !country.is_empty());

        Ok(config)
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("profile", &self.profile)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("country", &self.country)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_requires_api_key() {
        let err = ServiceConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey(ENV_API_KEY));

        let err = ServiceConfig::from_lookup(lookup(&[(ENV_API_KEY, "   ")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey(ENV_API_KEY));
    }

    #[test]
    fn test_defaults() {
        let config =
            ServiceConfig::from_lookup(lookup(&[(ENV_API_KEY, "secret")])).expect("config");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.base_url, ORS_DEFAULT_BASE_URL);
        assert_eq!(config.profile, RoutingProfile::DrivingCar);
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.country, None);
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "secret"),
            (ENV_BASE_URL, "http://localhost:8080/"),
            (ENV_PROFILE, "driving-hgv"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_COUNTRY, "US"),
        ]))
        .expect("config");

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.profile, RoutingProfile::DrivingHgv);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.country.as_deref(), Some("US"));
    }

    #[test]
    fn test_rejects_bad_values() {
        let err =
            ServiceConfig::from_lookup(lookup(&[(ENV_API_KEY, "k"), (ENV_PROFILE, "rocket")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: ENV_PROFILE, .. }));

        let err =
            ServiceConfig::from_lookup(lookup(&[(ENV_API_KEY, "k"), (ENV_TIMEOUT_SECS, "0")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: ENV_TIMEOUT_SECS, .. }));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ServiceConfig::new("very-secret-key");
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("very-secret-key"));
        assert!(debug_str.contains("redacted"));
    }

    #[test]
    fn test_profile_round_trip() {
        for profile in [
            RoutingProfile::DrivingCar,
            RoutingProfile::DrivingHgv,
            RoutingProfile::CyclingRegular,
            RoutingProfile::FootWalking,
        ] {
            assert_eq!(profile.to_string().parse::<RoutingProfile>(), Ok(profile));
        }
    }
}
