//! REST client for the membership API.
//!
//! Every request reads the persisted token and attaches it as a bearer
//! `Authorization` header when present.
//!
//! ERROR HANDLING
//! ==============
//! A 401 on any endpoint other than the credential exchanges clears the
//! persisted token. The token store announces the removal, which is how the
//! session store learns about a silent logout triggered deep inside a form
//! submission or an admin action.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    ApplicationResponse, ApplicationStatus, ApprovalRequest, ApprovalResponse, AuthResponse, CreateMemberRequest,
    CreateMemberResponse, LoginRequest, MembershipApplication, MessageResponse, PendingRequest, RegisterRequest,
    SetPinRequest, UnlockAccountRequest, User, VerifyPinRequest,
};
use crate::config::ClientConfig;
use crate::error::{self, ClientError};
use crate::state::token::TokenStore;

pub const REGISTER: &str = "/auth/register";
pub const LOGIN: &str = "/auth/login";
pub const VERIFY_PIN: &str = "/auth/verify-pin";
pub const SET_PIN: &str = "/auth/set-pin";
pub const ME: &str = "/auth/me";
pub const UNLOCK_ACCOUNT: &str = "/auth/unlock-account";
pub const APPLY: &str = "/members/apply";
pub const APPLICATION_STATUS: &str = "/members/status";
pub const PENDING_REQUESTS: &str = "/admin/pending-requests";
pub const APPROVE_REQUEST: &str = "/admin/approve-request";
pub const CREATE_MEMBER: &str = "/admin/create-member";

/// Provider-neutral async trait for the membership API. Enables mocking in tests.
#[async_trait::async_trait]
pub trait MembershipApi: Send + Sync {
    /// `POST /auth/register`.
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError>;

    /// `POST /auth/login`.
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError>;

    /// `POST /auth/verify-pin`.
    async fn verify_pin(&self, req: &VerifyPinRequest) -> Result<AuthResponse, ClientError>;

    /// `POST /auth/set-pin`.
    async fn set_pin(&self, req: &SetPinRequest) -> Result<MessageResponse, ClientError>;

    /// `GET /auth/me`.
    async fn me(&self) -> Result<User, ClientError>;

    /// `POST /members/apply`.
    async fn apply(&self, application: &MembershipApplication) -> Result<ApplicationResponse, ClientError>;

    /// `GET /members/status`.
    async fn application_status(&self) -> Result<ApplicationStatus, ClientError>;

    /// `GET /admin/pending-requests`.
    async fn pending_requests(&self) -> Result<Vec<PendingRequest>, ClientError>;

    /// `POST /admin/approve-request`.
    async fn approve_request(&self, req: &ApprovalRequest) -> Result<ApprovalResponse, ClientError>;

    /// `POST /admin/create-member`.
    async fn create_member(&self, req: &CreateMemberRequest) -> Result<CreateMemberResponse, ClientError>;

    /// `POST /auth/unlock-account`.
    async fn unlock_account(&self, req: &UnlockAccountRequest) -> Result<MessageResponse, ClientError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// Whether a 401 from this call means "token expired" (clear it) or
/// "wrong credentials" (leave the slot alone).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum On401 {
    ClearToken,
    Keep,
}

pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpApi {
    /// Build a client for `config.api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("HTTP client build failed: {e}")))?;
        Ok(Self { http, base_url: config.api_url.clone(), tokens })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned + Send>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.http.get(endpoint(&self.base_url, path));
        self.send(path, request, On401::ClearToken).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned + Send>(
        &self,
        path: &str,
        body: &B,
        on_401: On401,
    ) -> Result<T, ClientError> {
        let request = self.http.post(endpoint(&self.base_url, path)).json(body);
        self.send(path, request, on_401).await
    }

    async fn send<T: DeserializeOwned + Send>(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
        on_401: On401,
    ) -> Result<T, ClientError> {
        let request = match self.tokens.load() {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(e) => {
                tracing::warn!(error = %e, "token unreadable; sending request anonymously");
                request
            }
        };

        tracing::debug!(path, "api request");
        let response = request.send().await.map_err(|e| ClientError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ClientError::Network(e.to_string()))?;

        if (200..300).contains(&status) {
            return parse_body(&text);
        }

        tracing::debug!(path, status, "api request failed");
        if status == 401 && on_401 == On401::ClearToken {
            tracing::warn!(path, "token rejected; clearing persisted token");
            if let Err(e) = self.tokens.clear() {
                tracing::warn!(error = %e, "failed to clear rejected token");
            }
        }
        Err(error::from_status(status, &text))
    }
}

#[async_trait::async_trait]
impl MembershipApi for HttpApi {
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.post(REGISTER, req, On401::Keep).await
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.post(LOGIN, req, On401::Keep).await
    }

    async fn verify_pin(&self, req: &VerifyPinRequest) -> Result<AuthResponse, ClientError> {
        self.post(VERIFY_PIN, req, On401::Keep).await
    }

    async fn set_pin(&self, req: &SetPinRequest) -> Result<MessageResponse, ClientError> {
        self.post(SET_PIN, req, On401::ClearToken).await
    }

    async fn me(&self) -> Result<User, ClientError> {
        self.get(ME).await
    }

    async fn apply(&self, application: &MembershipApplication) -> Result<ApplicationResponse, ClientError> {
        self.post(APPLY, application, On401::ClearToken).await
    }

    async fn application_status(&self) -> Result<ApplicationStatus, ClientError> {
        self.get(APPLICATION_STATUS).await
    }

    async fn pending_requests(&self) -> Result<Vec<PendingRequest>, ClientError> {
        self.get(PENDING_REQUESTS).await
    }

    async fn approve_request(&self, req: &ApprovalRequest) -> Result<ApprovalResponse, ClientError> {
        self.post(APPROVE_REQUEST, req, On401::ClearToken).await
    }

    async fn create_member(&self, req: &CreateMemberRequest) -> Result<CreateMemberResponse, ClientError> {
        self.post(CREATE_MEMBER, req, On401::ClearToken).await
    }

    async fn unlock_account(&self, req: &UnlockAccountRequest) -> Result<MessageResponse, ClientError> {
        self.post(UNLOCK_ACCOUNT, req, On401::ClearToken).await
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ClientError> {
    serde_json::from_str(text).map_err(|e| ClientError::Malformed(e.to_string()))
}
