//! Credential exchange: trading an identifier + secret for a bearer token.
//!
//! DESIGN
//! ======
//! Two backends sit behind [`CredentialExchange`]. [`PinExchange`] posts a
//! phone/email and 4-digit PIN to the membership API. [`PasswordExchange`]
//! signs in against the hosted auth service with email + password; the
//! resulting token is then accepted by the membership API, where a first-time
//! user sets a PIN. The session store does not care which one it holds.

#[cfg(test)]
#[path = "exchange_test.rs"]
mod exchange_test;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::api::MembershipApi;
use super::types::{AuthResponse, VerifyPinRequest};
use crate::config::{AuthVariant, BaasConfig, ClientConfig, Timeouts};
use crate::error::{self, ClientError};
use crate::util::validate;

pub const PASSWORD_GRANT_PATH: &str = "/auth/v1/token?grant_type=password";
pub const LOGOUT_PATH: &str = "/auth/v1/logout";

const EMAIL_REQUIRED_MESSAGE: &str = "Enter a valid email address";
const PASSWORD_REQUIRED_MESSAGE: &str = "Enter your password";

/// Server payload returned by a successful exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeResponse {
    Pin(AuthResponse),
    Password(PasswordGrant),
}

impl ExchangeResponse {
    #[must_use]
    pub fn access_token(&self) -> &str {
        match self {
            Self::Pin(resp) => &resp.access_token,
            Self::Password(grant) => &grant.access_token,
        }
    }
}

/// Password-grant response from the hosted auth service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PasswordGrant {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: BaasUser,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BaasUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

#[derive(Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[async_trait::async_trait]
pub trait CredentialExchange: Send + Sync {
    /// Exchange `identifier` and `secret` for a token.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input (no request is sent)
    /// or the server's error for rejected credentials.
    async fn exchange(&self, identifier: &str, secret: &str) -> Result<ExchangeResponse, ClientError>;

    /// Invalidate `token` on the issuing side. Best effort.
    ///
    /// # Errors
    ///
    /// Returns the transport or server error; callers log and move on.
    async fn revoke(&self, token: &str) -> Result<(), ClientError>;
}

/// Build the exchange selected by `config.auth_variant`.
///
/// # Errors
///
/// Returns [`ClientError::Config`] for the password variant without
/// storage/auth settings, or if its HTTP client cannot be built.
pub fn from_config(
    config: &ClientConfig,
    api: Arc<dyn MembershipApi>,
) -> Result<Arc<dyn CredentialExchange>, ClientError> {
    match (config.auth_variant, &config.baas) {
        (AuthVariant::Pin, _) => Ok(Arc::new(PinExchange::new(api))),
        (AuthVariant::Password, Some(baas)) => Ok(Arc::new(PasswordExchange::new(baas.clone(), config.timeouts)?)),
        (AuthVariant::Password, None) => Err(ClientError::Config("password auth requires storage/auth settings".into())),
    }
}

// =============================================================================
// PIN
// =============================================================================

pub struct PinExchange {
    api: Arc<dyn MembershipApi>,
}

impl PinExchange {
    #[must_use]
    pub fn new(api: Arc<dyn MembershipApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl CredentialExchange for PinExchange {
    async fn exchange(&self, identifier: &str, secret: &str) -> Result<ExchangeResponse, ClientError> {
        let identifier = validate::validate_identifier(identifier)?;
        validate::validate_pin(secret)?;
        let req = VerifyPinRequest { identifier, pin: secret.to_owned() };
        self.api.verify_pin(&req).await.map(ExchangeResponse::Pin)
    }

    async fn revoke(&self, _token: &str) -> Result<(), ClientError> {
        // PIN tokens are stateless on the server.
        Ok(())
    }
}

// =============================================================================
// PASSWORD
// =============================================================================

pub struct PasswordExchange {
    http: reqwest::Client,
    baas: BaasConfig,
}

impl PasswordExchange {
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the HTTP client cannot be built.
    pub fn new(baas: BaasConfig, timeouts: Timeouts) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("HTTP client build failed: {e}")))?;
        Ok(Self { http, baas })
    }
}

#[async_trait::async_trait]
impl CredentialExchange for PasswordExchange {
    async fn exchange(&self, identifier: &str, secret: &str) -> Result<ExchangeResponse, ClientError> {
        let email = validate::normalize_email(identifier)
            .ok_or_else(|| ClientError::Validation(EMAIL_REQUIRED_MESSAGE.into()))?;
        if secret.is_empty() {
            return Err(ClientError::Validation(PASSWORD_REQUIRED_MESSAGE.into()));
        }

        tracing::debug!(email = %email, "password grant");
        let response = self
            .http
            .post(format!("{}{PASSWORD_GRANT_PATH}", self.baas.url))
            .header("apikey", &self.baas.anon_key)
            .json(&PasswordGrantRequest { email: &email, password: secret })
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ClientError::Network(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(error::from_status(status, &text));
        }
        parse_grant(&text).map(ExchangeResponse::Password)
    }

    async fn revoke(&self, token: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}{LOGOUT_PATH}", self.baas.url))
            .header("apikey", &self.baas.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(error::from_status(status, &text))
    }
}

fn parse_grant(text: &str) -> Result<PasswordGrant, ClientError> {
    serde_json::from_str(text).map_err(|e| ClientError::Malformed(e.to_string()))
}
