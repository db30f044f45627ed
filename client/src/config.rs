//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_STORAGE_BUCKET: &str = "member-uploads";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const TOKEN_DIR: &str = ".parishat";

/// Which credential exchange backs `verify_credentials`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthVariant {
    /// Phone + 4-digit PIN against the membership API.
    Pin,
    /// Email + password against the storage/auth service, followed by set-PIN.
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Connection details for the hosted storage/auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaasConfig {
    pub url: String,
    pub anon_key: String,
    pub bucket: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub token_file: PathBuf,
    pub auth_variant: AuthVariant,
    pub baas: Option<BaasConfig>,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `PARISHAT_API_URL`: default `http://127.0.0.1:8000`
    /// - `PARISHAT_TOKEN_FILE`: default `$HOME/.parishat/auth_token`
    /// - `PARISHAT_AUTH_VARIANT`: `pin` (default) or `password`
    /// - `PARISHAT_BAAS_URL` + `PARISHAT_BAAS_ANON_KEY`: storage/auth service
    /// - `PARISHAT_STORAGE_BUCKET`: default `member-uploads`
    /// - `PARISHAT_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PARISHAT_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] for unknown variants, unparsable
    /// numbers, or the `password` variant without storage/auth settings.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_url = trim_url(&std::env::var("PARISHAT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned()));
        let token_file = std::env::var("PARISHAT_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_token_file());
        let auth_variant = parse_auth_variant(std::env::var("PARISHAT_AUTH_VARIANT").ok().as_deref())?;

        let baas = match (std::env::var("PARISHAT_BAAS_URL"), std::env::var("PARISHAT_BAAS_ANON_KEY")) {
            (Ok(url), Ok(anon_key)) => Some(BaasConfig {
                url: trim_url(&url),
                anon_key,
                bucket: std::env::var("PARISHAT_STORAGE_BUCKET").unwrap_or_else(|_| DEFAULT_STORAGE_BUCKET.to_owned()),
            }),
            _ => None,
        };
        if auth_variant == AuthVariant::Password && baas.is_none() {
            return Err(ClientError::Config(
                "password auth requires PARISHAT_BAAS_URL and PARISHAT_BAAS_ANON_KEY".into(),
            ));
        }

        let timeouts = Timeouts {
            request_secs: env_parse_u64("PARISHAT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_u64("PARISHAT_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { api_url, token_file, auth_variant, baas, timeouts })
    }

    /// Config pointing at `api_url` with defaults everywhere else.
    #[must_use]
    pub fn for_api(api_url: &str) -> Self {
        Self {
            api_url: trim_url(api_url),
            token_file: default_token_file(),
            auth_variant: AuthVariant::Pin,
            baas: None,
            timeouts: Timeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

fn trim_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn default_token_file() -> PathBuf {
    let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(TOKEN_DIR).join(crate::state::token::TOKEN_KEY)
}

fn env_parse_u64(key: &str, default: u64) -> Result<u64, ClientError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ClientError::Config(format!("{key} must be a whole number of seconds, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

fn parse_auth_variant(raw: Option<&str>) -> Result<AuthVariant, ClientError> {
    match raw.unwrap_or("pin") {
        "pin" => Ok(AuthVariant::Pin),
        "password" => Ok(AuthVariant::Password),
        other => Err(ClientError::Config(format!(
            "unknown PARISHAT_AUTH_VARIANT '{other}' (expected 'pin' or 'password')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
