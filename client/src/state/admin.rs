//! Admin dashboard state: the pending-request queue and the actions on it.
//!
//! SYSTEM CONTEXT
//! ==============
//! Only reachable behind the HEAD + ACTIVE guard. Results of each action are
//! queued as [`Notice`]s for the front end to display.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use std::sync::Arc;

use uuid::Uuid;

use crate::error::ClientError;
use crate::net::api::MembershipApi;
use crate::net::types::{
    ApprovalAction, ApprovalRequest, ApprovalResponse, CreateMemberRequest, CreateMemberResponse, MessageResponse,
    PendingRequest, Role, UnlockAccountRequest,
};
use crate::util::notice::Notice;
use crate::util::validate;

pub const LOAD_FALLBACK: &str = "Failed to fetch requests";
pub const ACTION_FALLBACK: &str = "Action failed";
pub const ADMIN_NOTES: &str = "Approved via dashboard";
const NOT_AVAILABLE: &str = "N/A";

pub struct AdminDashboard {
    api: Arc<dyn MembershipApi>,
    requests: Vec<PendingRequest>,
    loading: bool,
    in_flight: Option<Uuid>,
    selected: Option<Uuid>,
    notices: Vec<Notice>,
}

impl AdminDashboard {
    #[must_use]
    pub fn new(api: Arc<dyn MembershipApi>) -> Self {
        Self { api, requests: Vec::new(), loading: true, in_flight: None, selected: None, notices: Vec::new() }
    }

    #[must_use]
    pub fn requests(&self) -> &[PendingRequest] {
        &self.requests
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// User whose approve/reject is currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> Option<Uuid> {
        self.in_flight
    }

    #[must_use]
    pub fn selected(&self) -> Option<&PendingRequest> {
        let id = self.selected?;
        self.requests.iter().find(|r| r.request.user_id == id)
    }

    /// Notices produced since the last drain, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Fetch the pending queue. The list is replaced only on success.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the notice always reads "Failed to fetch requests".
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let result = self.api.pending_requests().await;
        self.loading = false;
        match result {
            Ok(requests) => {
                tracing::debug!(count = requests.len(), "pending requests loaded");
                self.requests = requests;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "pending request fetch failed");
                self.notices.push(Notice::Error(LOAD_FALLBACK.into()));
                Err(e)
            }
        }
    }

    /// Open the detail view for `user_id`'s request.
    pub fn select(&mut self, user_id: Uuid) -> Option<&PendingRequest> {
        if self.requests.iter().any(|r| r.request.user_id == user_id) {
            self.selected = Some(user_id);
        }
        self.selected()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Approve or reject `user_id`'s request.
    ///
    /// # Errors
    ///
    /// See [`AdminDashboard::act_with_role`].
    pub async fn act(&mut self, user_id: Uuid, action: ApprovalAction) -> Result<ApprovalResponse, ClientError> {
        self.act_with_role(user_id, action, None).await
    }

    /// Approve or reject, optionally overriding the role granted. On success
    /// the selection is cleared and the queue reloaded.
    ///
    /// # Errors
    ///
    /// Returns the server error; its message (or "Action failed") is queued.
    pub async fn act_with_role(
        &mut self,
        user_id: Uuid,
        action: ApprovalAction,
        role: Option<Role>,
    ) -> Result<ApprovalResponse, ClientError> {
        self.in_flight = Some(user_id);
        let req = ApprovalRequest { user_id, action, admin_notes: Some(ADMIN_NOTES.into()), role };
        let result = self.api.approve_request(&req).await;
        self.in_flight = None;

        match result {
            Ok(resp) => {
                tracing::info!(%user_id, ?action, member_id = ?resp.member_id, "membership request decided");
                self.notices.push(Notice::Success(resp.message.clone()));
                self.selected = None;
                // A reload failure is queued as its own notice.
                let _ = self.load().await;
                Ok(resp)
            }
            Err(e) => {
                self.notices.push(Notice::from_error(&e, ACTION_FALLBACK));
                Err(e)
            }
        }
    }

    /// Create an already-approved member directly.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or the server error.
    pub async fn create_member(
        &mut self,
        phone: &str,
        full_name: &str,
        role: Role,
        pin: Option<&str>,
    ) -> Result<CreateMemberResponse, ClientError> {
        let phone = validate::normalize_phone(phone)?;
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(ClientError::Validation(validate::NAME_REQUIRED_MESSAGE.into()));
        }
        if let Some(pin) = pin {
            validate::validate_pin(pin)?;
        }

        let req = CreateMemberRequest { phone, full_name: full_name.to_owned(), role, pin: pin.map(str::to_owned) };
        match self.api.create_member(&req).await {
            Ok(resp) => {
                self.notices.push(Notice::Success(resp.message.clone()));
                Ok(resp)
            }
            Err(e) => {
                self.notices.push(Notice::from_error(&e, ACTION_FALLBACK));
                Err(e)
            }
        }
    }

    /// Reset a locked account's failed-attempt counter.
    ///
    /// # Errors
    ///
    /// Returns the server error; its message (or "Action failed") is queued.
    pub async fn unlock(&mut self, user_id: Uuid) -> Result<MessageResponse, ClientError> {
        match self.api.unlock_account(&UnlockAccountRequest { user_id }).await {
            Ok(resp) => {
                self.notices.push(Notice::Success(resp.message.clone()));
                Ok(resp)
            }
            Err(e) => {
                self.notices.push(Notice::from_error(&e, ACTION_FALLBACK));
                Err(e)
            }
        }
    }
}

/// Labelled rows of the request detail view. Missing values read "N/A".
#[must_use]
pub fn detail_items(req: &PendingRequest) -> Vec<(&'static str, String)> {
    let bio = req.request.application_data.clone().unwrap_or_default();
    let text = |value: Option<String>| value.filter(|v| !v.trim().is_empty()).unwrap_or_else(|| NOT_AVAILABLE.into());
    vec![
        ("Full Name", text(req.users.full_name.clone())),
        ("Phone", text(req.users.phone.clone().or_else(|| Some(req.users.identifier.clone())))),
        ("Requested Role", req.request.requested_role.to_string()),
        ("Father / Guardian", text(bio.father_guardian_name)),
        ("Age", text(bio.age.map(|a| a.to_string()))),
        ("DOB", text(bio.dob)),
        ("Time", text(bio.tob)),
        ("Gotram", text(bio.gotram)),
        ("Sub Sect", text(bio.sub_sect)),
        ("Cell No", text(bio.cell_no)),
        ("Email", text(bio.email)),
        ("Occupation", text(bio.occupation)),
        ("Annual Income", text(bio.annual_income.map(|v| v.to_string()))),
        ("Star/Pada", text(bio.star_pada)),
        ("Payment Proof (UTR/Link)", text(bio.payment_proof_url)),
        ("Address", text(bio.address)),
        ("Particulars", bio.particulars.filter(|p| !p.trim().is_empty()).unwrap_or_else(|| "None provided".into())),
    ]
}
