//! Gateway runtime configuration.
//!
//! Resolved once at process startup and passed into [`crate::ContentService`]; nothing in this
//! crate reads environment variables while serving requests. Binaries call
//! [`GatewayConfig::from_env`] after loading `.env`; tests build a config with
//! [`GatewayConfig::new`] directly.

use nexus_schema::{FallbackPolicy, UnknownPolicy};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 3;
pub const MAX_REQUESTS_PER_SECOND: u32 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("STORYBLOK_ACCESS_TOKEN must be set")]
    MissingAccessToken,
    #[error("unknown CMS region '{0}' (expected eu, us, ap, ca or cn)")]
    InvalidRegion(String),
    #[error("invalid API base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),
    #[error("invalid request rate '{0}': must be an integer between 1 and 1000")]
    InvalidRequestRate(String),
    #[error("invalid request timeout '{0}': must be a positive number of seconds")]
    InvalidTimeout(String),
    #[error(transparent)]
    InvalidValidationMode(#[from] UnknownPolicy),
}

/// Hosting region of the CMS space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Region {
    #[default]
    Eu,
    Us,
    Ap,
    Ca,
    Cn,
}

impl Region {
    /// Content Delivery API base URL for the region.
    pub fn api_base_url(self) -> &'static str {
        match self {
            Region::Eu => "https://api.storyblok.com/v2",
            Region::Us => "https://api-us.storyblok.com/v2",
            Region::Ap => "https://api-ap.storyblok.com/v2",
            Region::Ca => "https://api-ca.storyblok.com/v2",
            Region::Cn => "https://app.storyblokchina.cn/v2",
        }
    }
}

impl FromStr for Region {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eu" => Ok(Region::Eu),
            "us" => Ok(Region::Us),
            "ap" => Ok(Region::Ap),
            "ca" => Ok(Region::Ca),
            "cn" => Ok(Region::Cn),
            other => Err(ConfigError::InvalidRegion(other.to_string())),
        }
    }
}

/// Gateway configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    access_token: String,
    api_base_url: String,
    requests_per_second: u32,
    request_timeout: Duration,
    validation: FallbackPolicy,
}

impl GatewayConfig {
    pub fn new(
        access_token: String,
        api_base_url: String,
        requests_per_second: u32,
        request_timeout: Duration,
        validation: FallbackPolicy,
    ) -> Result<Self, ConfigError> {
        if access_token.trim().is_empty() {
            return Err(ConfigError::MissingAccessToken);
        }
        if !(1..=MAX_REQUESTS_PER_SECOND).contains(&requests_per_second) {
            return Err(ConfigError::InvalidRequestRate(
                requests_per_second.to_string(),
            ));
        }
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("0".into()));
        }

        Ok(Self {
            access_token,
            api_base_url: validated_base_url(&api_base_url)?,
            requests_per_second,
            request_timeout,
            validation,
        })
    }

    /// Reads every `STORYBLOK_*` variable plus `CONTENT_VALIDATION`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_token = std::env::var("STORYBLOK_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingAccessToken)?;
        let region = region_from_env_value(std::env::var("STORYBLOK_REGION").ok())?;
        let api_base_url =
            api_base_url_from_env_value(region, std::env::var("STORYBLOK_API_BASE_URL").ok());
        let requests_per_second = requests_per_second_from_env_value(
            std::env::var("STORYBLOK_REQUESTS_PER_SECOND").ok(),
        )?;
        let request_timeout =
            request_timeout_from_env_value(std::env::var("STORYBLOK_REQUEST_TIMEOUT_SECS").ok())?;
        let validation = validation_from_env_value(std::env::var("CONTENT_VALIDATION").ok())?;

        let cfg = Self::new(
            access_token,
            api_base_url,
            requests_per_second,
            request_timeout,
            validation,
        )?;

        tracing::info!(
            api_base_url = %cfg.api_base_url,
            requests_per_second = cfg.requests_per_second,
            timeout_secs = cfg.request_timeout.as_secs(),
            validation = cfg.validation.as_str(),
            "gateway configuration loaded"
        );

        Ok(cfg)
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn validation(&self) -> FallbackPolicy {
        self.validation
    }

    /// Returns a copy with a different fallback policy.
    pub fn with_validation(mut self, validation: FallbackPolicy) -> Self {
        self.validation = validation;
        self
    }
}

fn validated_base_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
        return Err(ConfigError::InvalidBaseUrl(url.to_string()));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the CMS region; unset or blank means [`Region::Eu`].
pub fn region_from_env_value(value: Option<String>) -> Result<Region, ConfigError> {
    Ok(non_blank(value)
        .map(|v| v.parse::<Region>())
        .transpose()?
        .unwrap_or_default())
}

/// An explicit base URL wins over the region's URL.
pub fn api_base_url_from_env_value(region: Region, value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| region.api_base_url().to_string())
}

pub fn requests_per_second_from_env_value(value: Option<String>) -> Result<u32, ConfigError> {
    let Some(value) = non_blank(value) else {
        return Ok(DEFAULT_REQUESTS_PER_SECOND);
    };
    match value.parse::<u32>() {
        Ok(rps) if (1..=MAX_REQUESTS_PER_SECOND).contains(&rps) => Ok(rps),
        _ => Err(ConfigError::InvalidRequestRate(value)),
    }
}

pub fn request_timeout_from_env_value(value: Option<String>) -> Result<Duration, ConfigError> {
    let Some(value) = non_blank(value) else {
        return Ok(DEFAULT_REQUEST_TIMEOUT);
    };
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(value)),
    }
}

pub fn validation_from_env_value(value: Option<String>) -> Result<FallbackPolicy, ConfigError> {
    Ok(non_blank(value)
        .map(|v| v.parse::<FallbackPolicy>())
        .transpose()
        .map_err(ConfigError::InvalidValidationMode)?
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_defaults_to_eu() {
        assert_eq!(region_from_env_value(None).expect("default"), Region::Eu);
        assert_eq!(
            region_from_env_value(Some("  ".into())).expect("blank"),
            Region::Eu
        );
        assert_eq!(
            region_from_env_value(Some("US".into())).expect("us"),
            Region::Us
        );
        assert!(matches!(
            region_from_env_value(Some("mars".into())),
            Err(ConfigError::InvalidRegion(r)) if r == "mars"
        ));
    }

    #[test]
    fn region_urls() {
        assert_eq!(Region::Eu.api_base_url(), "https://api.storyblok.com/v2");
        assert_eq!(Region::Ca.api_base_url(), "https://api-ca.storyblok.com/v2");
        assert_eq!(Region::Cn.api_base_url(), "https://app.storyblokchina.cn/v2");
    }

    #[test]
    fn base_url_override_wins() {
        assert_eq!(
            api_base_url_from_env_value(Region::Us, Some("http://127.0.0.1:9000".into())),
            "http://127.0.0.1:9000"
        );
        assert_eq!(
            api_base_url_from_env_value(Region::Us, None),
            "https://api-us.storyblok.com/v2"
        );
    }

    #[test]
    fn request_rate_bounds() {
        assert_eq!(requests_per_second_from_env_value(None), Ok(3));
        assert_eq!(requests_per_second_from_env_value(Some("1000".into())), Ok(1000));
        assert!(requests_per_second_from_env_value(Some("0".into())).is_err());
        assert!(requests_per_second_from_env_value(Some("1001".into())).is_err());
        assert!(requests_per_second_from_env_value(Some("fast".into())).is_err());
    }

    #[test]
    fn timeout_parsing() {
        assert_eq!(request_timeout_from_env_value(None), Ok(DEFAULT_REQUEST_TIMEOUT));
        assert_eq!(
            request_timeout_from_env_value(Some("30".into())),
            Ok(Duration::from_secs(30))
        );
        assert!(request_timeout_from_env_value(Some("0".into())).is_err());
    }

    #[test]
    fn validation_mode_parsing() {
        assert_eq!(validation_from_env_value(None), Ok(FallbackPolicy::Lenient));
        assert_eq!(
            validation_from_env_value(Some("strict".into())),
            Ok(FallbackPolicy::Strict)
        );
        assert!(matches!(
            validation_from_env_value(Some("paranoid".into())),
            Err(ConfigError::InvalidValidationMode(_))
        ));
    }

    #[test]
    fn config_rejects_blank_token_and_bad_url() {
        let build = |token: &str, url: &str| {
            GatewayConfig::new(
                token.into(),
                url.into(),
                3,
                DEFAULT_REQUEST_TIMEOUT,
                FallbackPolicy::Lenient,
            )
        };
        assert_eq!(
            build(" ", "https://api.storyblok.com/v2").expect_err("blank token"),
            ConfigError::MissingAccessToken
        );
        assert!(matches!(
            build("token", "api.storyblok.com"),
            Err(ConfigError::InvalidBaseUrl(_))
        ));

        let cfg = build("token", "https://api.storyblok.com/v2/").expect("valid");
        assert_eq!(cfg.api_base_url(), "https://api.storyblok.com/v2");
    }
}
