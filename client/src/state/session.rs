//! Session store: who is signed in, and whether we know yet.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `SessionStore` per running client, constructed explicitly and shared
//! by `Arc`. Route guards read [`Session`] snapshots; front ends subscribe to
//! the watch channel to re-render on every transition.
//!
//! DESIGN
//! ======
//! The identity is never persisted; only the token is. Every transition ends
//! with `is_loading = false`. A background listener re-runs [`SessionStore::refresh`]
//! whenever the token store announces a change, so sessions sharing one slot
//! converge after any of them logs in or out.
//!
//! ERROR HANDLING
//! ==============
//! A 401 from `/auth/me` clears the token and the identity together. Any
//! other refresh failure drops the identity but keeps the token for the next
//! attempt.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::token::{TokenChange, TokenStore};
use crate::error::ClientError;
use crate::net::api::MembershipApi;
use crate::net::exchange::{CredentialExchange, ExchangeResponse};
use crate::net::types::{AuthResponse, MessageResponse, SetPinRequest, User};
use crate::util::validate;

/// Observable session state.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub identity: Option<User>,
    pub is_loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self { identity: None, is_loading: true }
    }
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

pub struct SessionStore {
    api: Arc<dyn MembershipApi>,
    tokens: Arc<dyn TokenStore>,
    exchange: Arc<dyn CredentialExchange>,
    state: watch::Sender<Session>,
}

impl SessionStore {
    #[must_use]
    pub fn new(
        api: Arc<dyn MembershipApi>,
        tokens: Arc<dyn TokenStore>,
        exchange: Arc<dyn CredentialExchange>,
    ) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { api, tokens, exchange, state }
    }

    /// Build the store, resolve the persisted token, and start listening for
    /// token changes.
    pub async fn start(
        api: Arc<dyn MembershipApi>,
        tokens: Arc<dyn TokenStore>,
        exchange: Arc<dyn CredentialExchange>,
    ) -> SessionHandle {
        let store = Arc::new(Self::new(api, tokens, exchange));
        // Subscribe first so a change racing with initialize is not lost.
        let changes = store.tokens.subscribe();
        store.initialize().await;
        let listener = tokio::spawn(listen(Arc::clone(&store), changes));
        SessionHandle { store, listener }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Resolve the persisted token into an identity.
    pub async fn initialize(&self) -> Option<User> {
        let identity = self.refresh().await;
        tracing::info!(
            authenticated = identity.is_some(),
            identifier = identity.as_ref().map_or("", |u| u.identifier.as_str()),
            "session initialized"
        );
        identity
    }

    /// Re-fetch the profile for the current token.
    ///
    /// If the token changes while `/auth/me` is in flight, the result is
    /// discarded and the fetch repeats for the new token.
    pub async fn refresh(&self) -> Option<User> {
        loop {
            let token = self.load_token();
            let identity = match token {
                Some(_) => self.fetch_profile().await,
                None => None,
            };
            if self.load_token() == token {
                self.publish(identity.clone());
                return identity;
            }
            tracing::debug!("token changed during refresh; retrying");
        }
    }

    /// Exchange credentials through the configured backend. On success the
    /// token is persisted and the profile refreshed before this returns.
    ///
    /// # Errors
    ///
    /// Returns the validation or server error; nothing is persisted.
    pub async fn verify_credentials(&self, identifier: &str, secret: &str) -> Result<ExchangeResponse, ClientError> {
        let resp = self.exchange.exchange(identifier, secret).await?;
        self.accept_token(resp.access_token()).await?;
        Ok(resp)
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or the server error.
    pub async fn register(
        &self,
        phone: &str,
        full_name: &str,
        pin: &str,
        confirm_pin: &str,
    ) -> Result<AuthResponse, ClientError> {
        let req = validate::validate_register(phone, full_name, pin, confirm_pin)?;
        let resp = self.api.register(&req).await?;
        self.accept_token(&resp.access_token).await?;
        Ok(resp)
    }

    /// Phone + PIN sign-in.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or the server error.
    pub async fn login(&self, phone: &str, pin: &str) -> Result<AuthResponse, ClientError> {
        let req = validate::validate_login(phone, pin)?;
        let resp = self.api.login(&req).await?;
        self.accept_token(&resp.access_token).await?;
        Ok(resp)
    }

    /// Set the PIN for the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or the server error.
    pub async fn set_pin(&self, pin: &str, confirm_pin: &str) -> Result<MessageResponse, ClientError> {
        validate::validate_pin_confirmation(pin, confirm_pin)?;
        self.api.set_pin(&SetPinRequest { pin: pin.to_owned() }).await
    }

    /// Clear the token and identity, then revoke the token upstream.
    pub async fn sign_out(&self) {
        let token = self.load_token();
        if let Err(e) = self.tokens.clear() {
            tracing::warn!(error = %e, "failed to clear token on sign-out");
        }
        self.publish(None);
        tracing::info!("signed out");

        if let Some(token) = token
            && let Err(e) = self.exchange.revoke(&token).await
        {
            tracing::warn!(error = %e, "token revocation failed");
        }
    }

    async fn accept_token(&self, token: &str) -> Result<(), ClientError> {
        self.tokens.store(token)?;
        let identity = self.refresh().await;
        tracing::info!(
            identifier = identity.as_ref().map_or("", |u| u.identifier.as_str()),
            "signed in"
        );
        Ok(())
    }

    async fn fetch_profile(&self) -> Option<User> {
        match self.api.me().await {
            Ok(user) => Some(user),
            Err(e) if e.is_unauthorized() => {
                tracing::warn!("token rejected by /auth/me; signing out");
                if let Err(e) = self.tokens.clear() {
                    tracing::warn!(error = %e, "failed to clear rejected token");
                }
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile refresh failed");
                None
            }
        }
    }

    fn load_token(&self) -> Option<String> {
        self.tokens.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "token unreadable; treating as signed out");
            None
        })
    }

    fn publish(&self, identity: Option<User>) {
        self.state.send_replace(Session { identity, is_loading: false });
    }
}

async fn listen(store: Arc<SessionStore>, mut changes: broadcast::Receiver<TokenChange>) {
    loop {
        match changes.recv().await {
            Ok(change) => tracing::debug!(key = change.key, present = change.present, "token changed"),
            Err(RecvError::Lagged(skipped)) => tracing::debug!(skipped, "token changes lagged"),
            Err(RecvError::Closed) => break,
        }
        store.refresh().await;
    }
}

// =============================================================================
// HANDLE
// =============================================================================

/// A started session: the store plus its token listener.
pub struct SessionHandle {
    store: Arc<SessionStore>,
    listener: JoinHandle<()>,
}

impl SessionHandle {
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Stop the token listener.
    pub async fn shutdown(self) {
        self.listener.abort();
        let _ = self.listener.await;
    }
}
