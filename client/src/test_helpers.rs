//! In-memory membership backend for unit tests.
//!
//! `MockApi` implements [`MembershipApi`] against a handful of seeded
//! accounts. Like the real client it reads the bearer token from the shared
//! [`TokenStore`] and clears it on a 401, so session tests observe the same
//! silent-logout path the HTTP client produces.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::error::ClientError;
use crate::net::api::{self, MembershipApi};
use crate::net::types::{
    ApplicationResponse, ApplicationStatus, ApprovalAction, ApprovalRequest, ApprovalResponse, ApprovalStatus,
    AuthResponse, CreateMemberRequest, CreateMemberResponse, LoginRequest, MembershipApplication,
    MembershipRequestRecord, MessageResponse, PendingRequest, RegisterRequest, Role, SetPinRequest, Status,
    UnlockAccountRequest, User, VerifyPinRequest,
};
use crate::state::token::{MemoryTokenStore, TokenStore};

pub const INVALID_CREDENTIALS: &str = "Invalid phone number or PIN";

struct Account {
    pin: String,
    user: User,
}

pub struct MockApi {
    tokens: Arc<dyn TokenStore>,
    accounts: Mutex<Vec<Account>>,
    failures: Mutex<HashMap<&'static str, ClientError>>,
    calls: Mutex<Vec<&'static str>>,
    pub applications: Mutex<Vec<MembershipApplication>>,
    pub pending: Mutex<Vec<PendingRequest>>,
    pub approvals: Mutex<Vec<ApprovalRequest>>,
    pub created: Mutex<Vec<CreateMemberRequest>>,
    pub unlocked: Mutex<Vec<Uuid>>,
}

impl MockApi {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            tokens,
            accounts: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            applications: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
            approvals: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            unlocked: Mutex::new(Vec::new()),
        }
    }

    /// Seed an account that can log in with `pin`.
    pub fn with_account(self, pin: &str, user: User) -> Self {
        self.accounts.lock().unwrap().push(Account { pin: pin.to_owned(), user });
        self
    }

    /// Make the next call to `path` fail with `err`.
    pub fn fail_next(&self, path: &'static str, err: ClientError) {
        self.failures.lock().unwrap().insert(path, err);
    }

    /// Endpoints hit so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pin_of(&self, identifier: &str) -> Option<String> {
        let accounts = self.accounts.lock().unwrap();
        accounts.iter().find(|a| a.user.identifier == identifier).map(|a| a.pin.clone())
    }

    fn record(&self, path: &'static str) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(path);
        match self.failures.lock().unwrap().remove(path) {
            Some(err) => {
                if err.is_unauthorized() {
                    let _ = self.tokens.clear();
                }
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn issue(&self, identifier: &str, pin: &str) -> Result<AuthResponse, ClientError> {
        let digits: String = identifier.chars().filter(char::is_ascii_digit).collect();
        let accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter()
            .find(|a| a.user.identifier == digits && a.pin == pin)
            .ok_or_else(|| ClientError::Unauthorized(INVALID_CREDENTIALS.into()))?;
        Ok(auth_response(&account.user))
    }

    fn current_user(&self) -> Result<User, ClientError> {
        let token = self.tokens.load()?;
        let accounts = self.accounts.lock().unwrap();
        let found = token
            .as_deref()
            .and_then(|t| accounts.iter().find(|a| token_for(&a.user) == t))
            .map(|a| a.user.clone());
        drop(accounts);
        found.ok_or_else(|| {
            let _ = self.tokens.clear();
            ClientError::Unauthorized("Could not validate credentials".into())
        })
    }
}

#[async_trait::async_trait]
impl MembershipApi for MockApi {
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.record(api::REGISTER)?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.user.identifier == req.phone) {
            return Err(ClientError::Server { status: 400, message: "Phone number already registered".into() });
        }
        let mut user = user_fixture(&req.phone, Some(Role::Normal), Status::Pending);
        user.full_name = Some(req.full_name.clone());
        let resp = auth_response(&user);
        accounts.push(Account { pin: req.pin.clone(), user });
        Ok(resp)
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.record(api::LOGIN)?;
        self.issue(&req.phone, &req.pin)
    }

    async fn verify_pin(&self, req: &VerifyPinRequest) -> Result<AuthResponse, ClientError> {
        self.record(api::VERIFY_PIN)?;
        self.issue(&req.identifier, &req.pin)
    }

    async fn set_pin(&self, req: &SetPinRequest) -> Result<MessageResponse, ClientError> {
        self.record(api::SET_PIN)?;
        let user = self.current_user()?;
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.iter_mut().find(|a| a.user.id == user.id) {
            account.pin.clone_from(&req.pin);
        }
        Ok(MessageResponse { message: "PIN set successfully".into() })
    }

    async fn me(&self) -> Result<User, ClientError> {
        self.record(api::ME)?;
        self.current_user()
    }

    async fn apply(&self, application: &MembershipApplication) -> Result<ApplicationResponse, ClientError> {
        self.record(api::APPLY)?;
        self.current_user()?;
        let mut applications = self.applications.lock().unwrap();
        applications.push(application.clone());
        Ok(ApplicationResponse {
            message: "Application submitted successfully".into(),
            application_id: format!("app-{}", applications.len()),
            status: Status::Pending,
        })
    }

    async fn application_status(&self) -> Result<ApplicationStatus, ClientError> {
        self.record(api::APPLICATION_STATUS)?;
        let user = self.current_user()?;
        let applications = self.applications.lock().unwrap();
        Ok(match applications.last() {
            Some(app) => ApplicationStatus::Submitted(MembershipRequestRecord {
                id: format!("app-{}", applications.len()),
                user_id: user.id,
                requested_role: app.requested_role,
                approval_status: ApprovalStatus::Pending,
                payment_status: Some("PENDING".into()),
                admin_notes: None,
                application_data: Some(app.bio_data.clone()),
                created_at: None,
            }),
            None => ApplicationStatus::NoApplication { message: "No application found".into() },
        })
    }

    async fn pending_requests(&self) -> Result<Vec<PendingRequest>, ClientError> {
        self.record(api::PENDING_REQUESTS)?;
        self.current_user()?;
        Ok(self.pending.lock().unwrap().clone())
    }

    async fn approve_request(&self, req: &ApprovalRequest) -> Result<ApprovalResponse, ClientError> {
        self.record(api::APPROVE_REQUEST)?;
        self.current_user()?;
        self.approvals.lock().unwrap().push(req.clone());
        let mut pending = self.pending.lock().unwrap();
        let before = pending.len();
        pending.retain(|p| p.request.user_id != req.user_id);
        if pending.len() == before {
            return Err(ClientError::Server { status: 404, message: "Membership request not found".into() });
        }
        Ok(match req.action {
            ApprovalAction::Approve => ApprovalResponse {
                message: "Request approved".into(),
                member_id: Some("Pid-001".into()),
                role: req.role,
            },
            ApprovalAction::Reject => {
                ApprovalResponse { message: "Request rejected".into(), member_id: None, role: None }
            }
        })
    }

    async fn create_member(&self, req: &CreateMemberRequest) -> Result<CreateMemberResponse, ClientError> {
        self.record(api::CREATE_MEMBER)?;
        self.current_user()?;
        self.created.lock().unwrap().push(req.clone());
        Ok(CreateMemberResponse {
            message: "Member created".into(),
            member_id: Some("Pid-002".into()),
            user_id: Some(Uuid::new_v4()),
        })
    }

    async fn unlock_account(&self, req: &UnlockAccountRequest) -> Result<MessageResponse, ClientError> {
        self.record(api::UNLOCK_ACCOUNT)?;
        self.current_user()?;
        self.unlocked.lock().unwrap().push(req.user_id);
        Ok(MessageResponse { message: "Account unlocked successfully".into() })
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

/// Bearer token the mock issues for `user`.
pub fn token_for(user: &User) -> String {
    format!("token-{}", user.identifier)
}

pub fn auth_response(user: &User) -> AuthResponse {
    AuthResponse {
        access_token: token_for(user),
        token_type: "bearer".into(),
        user_id: user.id,
        identifier: user.identifier.clone(),
        role: user.role,
        status: user.status,
    }
}

pub fn user_fixture(identifier: &str, role: Option<Role>, status: Status) -> User {
    User {
        id: Uuid::new_v4(),
        identifier: identifier.to_owned(),
        role,
        status,
        member_id: None,
        full_name: None,
        phone: Some(identifier.to_owned()),
        photo_url: None,
        gotram: None,
        father_guardian_name: None,
        address: None,
        occupation: None,
        zonal_committee: None,
        regional_committee: None,
        joined_at: None,
        created_at: None,
    }
}

pub fn pending_fixture(user: User, requested_role: Role) -> PendingRequest {
    PendingRequest {
        request: MembershipRequestRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            requested_role,
            approval_status: ApprovalStatus::Pending,
            payment_status: Some("PENDING".into()),
            admin_notes: None,
            application_data: None,
            created_at: Some("2024-01-15T10:30:00Z".into()),
        },
        users: user,
    }
}

/// An active member `9876543210` with PIN `1234`, plus its token store and API.
pub fn member_backend() -> (Arc<MemoryTokenStore>, Arc<MockApi>, User) {
    let tokens = Arc::new(MemoryTokenStore::new());
    let user = user_fixture("9876543210", Some(Role::Normal), Status::Active);
    let api = Arc::new(MockApi::new(tokens.clone()).with_account("1234", user.clone()));
    (tokens, api, user)
}

/// An active HEAD admin `9000000001` with PIN `4321`, already logged in.
pub fn admin_backend() -> (Arc<MemoryTokenStore>, Arc<MockApi>, User) {
    let admin = user_fixture("9000000001", Some(Role::Head), Status::Active);
    let tokens = Arc::new(MemoryTokenStore::with_token(&token_for(&admin)));
    let api = Arc::new(MockApi::new(tokens.clone()).with_account("4321", admin.clone()));
    (tokens, api, admin)
}
