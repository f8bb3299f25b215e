use crate::core::rate_limit::{DegradationPolicy, RateLimitKey, RateLimitQuota};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// API key pair for one exchange account.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: Secret<String>,
    pub api_secret: Secret<String>,
}

// Custom Serialize implementation - never expose secrets in serialization
impl Serialize for Credentials {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Credentials", 2)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("api_secret", "[REDACTED]")?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Credentials {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct CredentialsHelper {
            api_key: String,
            api_secret: String,
        }

        let helper = CredentialsHelper::deserialize(deserializer)?;
        Ok(Self::new(helper.api_key, helper.api_secret))
    }
}

impl Credentials {
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            api_secret: Secret::new(api_secret.into()),
        }
    }

    /// Read credentials from the environment.
    ///
    /// Expected environment variables:
    /// - `{EXCHANGE}_API_KEY` (e.g., `BITFLYER_API_KEY`)
    /// - `{EXCHANGE}_API_SECRET` (e.g., `BITFLYER_API_SECRET`)
    pub fn from_env(exchange_prefix: &str) -> Result<Self, ConfigError> {
        let api_key_var = format!("{}_API_KEY", exchange_prefix.to_uppercase());
        let api_secret_var = format!("{}_API_SECRET", exchange_prefix.to_uppercase());

        let api_key = env::var(&api_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(api_key_var))?;
        let api_secret = env::var(&api_secret_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(api_secret_var))?;

        Ok(Self::new(api_key, api_secret))
    }

    /// Load a .env file (if present) and then read the environment.
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(exchange_prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(exchange_prefix, ".env")
    }

    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(
        exchange_prefix: &str,
        env_file_path: &str,
    ) -> Result<Self, ConfigError> {
        load_env_file(env_file_path)?;
        Self::from_env(exchange_prefix)
    }

    /// Try `.env.local`, `.env.{ENVIRONMENT}` and `.env` in that order, loading
    /// only the first one found, then read the environment.
    #[cfg(feature = "env-file")]
    pub fn from_env_auto(exchange_prefix: &str) -> Result<Self, ConfigError> {
        let env_files = [
            ".env.local".to_string(),
            format!(
                ".env.{}",
                env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
            ),
            ".env".to_string(),
        ];

        for env_file in &env_files {
            if load_env_file(env_file)? {
                break;
            }
        }

        Self::from_env(exchange_prefix)
    }

    /// Empty credentials for public endpoints only.
    #[must_use]
    pub fn read_only() -> Self {
        Self::new(String::new(), String::new())
    }

    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.api_secret.expose_secret().is_empty()
    }

    /// Get API key (use carefully - exposes secret)
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Get API secret (use carefully - exposes secret)
    pub fn api_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }
}

/// Returns whether the file existed and was loaded.
#[cfg(feature = "env-file")]
fn load_env_file(path: &str) -> Result<bool, ConfigError> {
    match dotenv::from_path(path) {
        Ok(()) => Ok(true),
        Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
            Ok(false)
        }
        Err(e) => Err(ConfigError::InvalidConfiguration(format!(
            "Failed to load .env file '{}': {}",
            path, e
        ))),
    }
}

/// Forward proxy for all outgoing requests.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
}

impl ProxyConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(Secret::new(password.into()));
        self
    }
}

/// HTTP client settings shared by every call of a session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_idle_connections_per_host: usize,
    pub pool_idle_timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    /// Transport I/O timeout for one request.
    pub request_timeout_seconds: u64,
    /// Maximum time a call may wait for a rate-limit slot.
    pub acquire_timeout_ms: u64,
    pub http2_enabled: bool,
    pub user_agent: String,
    #[serde(skip)]
    pub proxy: Option<ProxyConfig>,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub trust_env: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_idle_connections_per_host: 30,
            pool_idle_timeout_seconds: 30,
            connect_timeout_seconds: 5,
            request_timeout_seconds: 10,
            acquire_timeout_ms: 30_000,
            http2_enabled: true,
            user_agent: "coinbridge/0.1".to_string(),
            proxy: None,
            trust_env: false,
        }
    }
}

impl SessionConfig {
    pub fn with_request_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_seconds = seconds;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_http2(mut self, enabled: bool) -> Self {
        self.http2_enabled = enabled;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConfig {
    pub capacity: u32,
    pub window_ms: u64,
}

impl From<QuotaConfig> for RateLimitQuota {
    fn from(config: QuotaConfig) -> Self {
        Self::new(config.capacity, Duration::from_millis(config.window_ms))
    }
}

/// Rate-limit quotas and shared-backend behaviour.
///
/// Overrides are keyed by `exchange:endpoint_class` or by the bare exchange
/// identifier; the more specific key wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub default_quota: QuotaConfig,
    pub overrides: HashMap<String, QuotaConfig>,
    pub key_prefix: String,
    pub degradation: DegradationPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            default_quota: QuotaConfig {
                capacity: 200,
                window_ms: 300_000,
            },
            overrides: HashMap::new(),
            key_prefix: "RATE_LIMIT:URL_PATTERN".to_string(),
            degradation: DegradationPolicy::FailClosed,
        }
    }
}

impl RateLimitConfig {
    pub fn with_default_quota(mut self, capacity: u32, window: Duration) -> Self {
        self.default_quota = QuotaConfig {
            capacity,
            window_ms: window.as_millis() as u64,
        };
        self
    }

    pub fn with_override(
        mut self,
        key: impl Into<String>,
        capacity: u32,
        window: Duration,
    ) -> Self {
        self.overrides.insert(
            key.into(),
            QuotaConfig {
                capacity,
                window_ms: window.as_millis() as u64,
            },
        );
        self
    }

    pub fn with_degradation(mut self, degradation: DegradationPolicy) -> Self {
        self.degradation = degradation;
        self
    }

    pub fn quota_for(&self, key: &RateLimitKey) -> RateLimitQuota {
        self.overrides
            .get(&key.to_string())
            .or_else(|| self.overrides.get(key.exchange.as_str()))
            .copied()
            .unwrap_or(self.default_quota)
            .into()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
