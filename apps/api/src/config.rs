use anyhow::{Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_EXTRACTION_URL: &str = "http://localhost:8080";
const DEFAULT_SITE_URL: &str = "http://localhost:3000";

/// Server configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Auth provider settings. Both values are needed to talk to the provider.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub url: String,
    pub anon_key: String,
}

/// Client configuration for the `tailor` binary.
///
/// Everything is optional: without auth or a database the client runs with
/// local, ephemeral history.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub extraction_url: String,
    /// Public site URL used as the OAuth redirect target.
    pub site_url: String,
    pub auth: Option<AuthConfig>,
    pub database_url: Option<String>,
    pub access_token: Option<String>,
    pub rust_log: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let auth = match (optional_env("SUPABASE_URL"), optional_env("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(AuthConfig { url, anon_key }),
            (Some(_), None) => {
                anyhow::bail!("SUPABASE_ANON_KEY must be set when SUPABASE_URL is set")
            }
            _ => None,
        };

        Ok(ClientConfig {
            api_url: optional_env("TAILOR_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            extraction_url: optional_env("EXTRACTION_SERVICE_URL")
                .unwrap_or_else(|| DEFAULT_EXTRACTION_URL.to_string()),
            site_url: optional_env("NEXT_PUBLIC_SITE_URL")
                .or_else(|| optional_env("SITE_URL"))
                .unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            auth,
            database_url: optional_env("DATABASE_URL"),
            access_token: optional_env("TAILOR_ACCESS_TOKEN"),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Returns the variable when set to a non-blank value.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_env_names_missing_variable() {
        let err = require_env("TAILOR_TEST_SURELY_UNSET_VARIABLE").unwrap_err();
        assert!(err
            .to_string()
            .contains("TAILOR_TEST_SURELY_UNSET_VARIABLE"));
    }

    #[test]
    fn test_optional_env_ignores_blank_values() {
        std::env::set_var("TAILOR_TEST_BLANK_VARIABLE", "   ");
        assert_eq!(optional_env("TAILOR_TEST_BLANK_VARIABLE"), None);
        std::env::set_var("TAILOR_TEST_BLANK_VARIABLE", " value ");
        assert_eq!(
            optional_env("TAILOR_TEST_BLANK_VARIABLE"),
            Some("value".to_string())
        );
    }
}
