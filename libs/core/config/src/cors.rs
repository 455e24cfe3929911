use crate::{env_or_default, ConfigError, FromEnv};

/// Origins allowed to make cross-origin requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// Any origin (`*`). Credentials are not allowed in this mode.
    Any,
    /// An explicit allow-list.
    List(Vec<String>),
}

/// CORS configuration for HTTP APIs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: AllowedOrigins,
}

impl CorsConfig {
    pub fn any() -> Self {
        Self {
            allowed_origins: AllowedOrigins::Any,
        }
    }

    fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed == "*" {
            return Ok(Self::any());
        }

        let origins: Vec<String> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() {
            return Err(ConfigError::ParseError {
                key: "CORS_ALLOWED_ORIGIN".to_string(),
                details: "no origins given".to_string(),
            });
        }

        if origins.iter().any(|o| o == "*") {
            return Ok(Self::any());
        }

        Ok(Self {
            allowed_origins: AllowedOrigins::List(origins),
        })
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self::any()
    }
}

impl FromEnv for CorsConfig {
    /// Reads `CORS_ALLOWED_ORIGIN`: unset or `*` allows any origin,
    /// otherwise a comma-separated allow-list.
    fn from_env() -> Result<Self, ConfigError> {
        Self::parse(&env_or_default("CORS_ALLOWED_ORIGIN", "*"))
    }
}
