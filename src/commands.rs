//! Command handlers. Each one drives a client model and prints the outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parishat_client::net::api::MembershipApi;
use parishat_client::net::storage::{self, StorageClient, Upload};
use parishat_client::net::types::{ApplicationStatus, ApprovalAction, Role, User};
use parishat_client::pages;
use parishat_client::state::admin::{self, AdminDashboard};
use parishat_client::state::card::IdCard;
use parishat_client::state::session::SessionStore;
use parishat_client::state::wizard::{ApplicationDraft, Step, SubmitState, Wizard};
use parishat_client::util::guard::{self, Decision, Route};
use parishat_client::util::notice::Notice;
use uuid::Uuid;

use crate::{AdminSubcommand, CliContext, CliError, prompt};

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

// =============================================================================
// AUTH
// =============================================================================

pub async fn register(
    session: &SessionStore,
    phone: &str,
    full_name: &str,
    pin: Option<String>,
) -> Result<(), CliError> {
    let (pin, confirm) = match pin {
        Some(pin) => (pin.clone(), pin),
        None => (prompt::pin("PIN")?, prompt::pin("Confirm PIN")?),
    };
    let resp = session.register(phone, full_name, &pin, &confirm).await?;
    println!("Registered {} ({})", resp.identifier, resp.status);
    land(session);
    Ok(())
}

pub async fn login(session: &SessionStore, phone: &str, pin: Option<String>) -> Result<(), CliError> {
    let pin = match pin {
        Some(pin) => pin,
        None => prompt::pin("PIN")?,
    };
    session.login(phone, &pin).await?;
    land(session);
    Ok(())
}

pub async fn verify(session: &SessionStore, identifier: &str, secret: Option<String>) -> Result<(), CliError> {
    let secret = match secret {
        Some(secret) => secret,
        None => prompt::line("PIN or password")?,
    };
    session.verify_credentials(identifier, &secret).await?;
    land(session);
    Ok(())
}

pub async fn set_pin(session: &SessionStore) -> Result<(), CliError> {
    let pin = prompt::pin("New PIN")?;
    let confirm = prompt::pin("Confirm PIN")?;
    let resp = session.set_pin(&pin, &confirm).await?;
    println!("{}", resp.message);
    Ok(())
}

/// Report where a fresh sign-in lands, following the guard.
fn land(session: &SessionStore) {
    let snapshot = session.snapshot();
    let Some(user) = &snapshot.identity else {
        println!("Signed in, but the profile could not be loaded");
        return;
    };
    println!("Signed in as {}", user.display_name());
    let target = match guard::check_route(&snapshot, guard::POST_LOGIN_ROUTE) {
        Decision::Redirect(route) => route,
        Decision::Allow | Decision::Suspend => guard::POST_LOGIN_ROUTE,
    };
    println!("→ {target}");
}

pub fn whoami(session: &SessionStore) -> Result<(), CliError> {
    let user = signed_in(session)?;
    println!("{}", user.display_name());
    println!("  identifier  {}", user.identifier);
    println!("  role        {}", user.role.map_or("N/A", Role::as_str));
    println!("  status      {}", user.status);
    if let Some(member_id) = &user.member_id {
        println!("  member id   {member_id}");
    }
    println!("  home        {}", guard::home_for(&user));
    Ok(())
}

fn signed_in(session: &SessionStore) -> Result<User, CliError> {
    session.snapshot().identity.ok_or(CliError::NotSignedIn)
}

fn require(session: &SessionStore, route: Route) -> Result<(), CliError> {
    match guard::check_route(&session.snapshot(), route) {
        Decision::Allow => Ok(()),
        Decision::Redirect(Route::Auth) | Decision::Suspend => Err(CliError::NotSignedIn),
        Decision::Redirect(to) => Err(CliError::Redirected(to.path())),
    }
}

// =============================================================================
// MEMBERSHIP
// =============================================================================

pub async fn status(ctx: &CliContext, session: &SessionStore) -> Result<(), CliError> {
    signed_in(session)?;
    match ctx.api.application_status().await? {
        ApplicationStatus::NoApplication { message } => println!("{message}"),
        ApplicationStatus::Submitted(record) => {
            println!("Application {}", record.id);
            println!("  requested   {}", record.requested_role);
            println!("  approval    {:?}", record.approval_status);
            if let Some(payment) = &record.payment_status {
                println!("  payment     {payment}");
            }
            if let Some(notes) = &record.admin_notes {
                println!("  notes       {notes}");
            }
        }
    }
    Ok(())
}

pub async fn apply(ctx: &CliContext, session: &SessionStore, file: Option<PathBuf>) -> Result<(), CliError> {
    require(session, Route::Membership)?;

    let mut wizard = match file {
        Some(path) => {
            let raw = tokio::fs::read_to_string(&path).await?;
            Wizard::from_draft(serde_json::from_str::<ApplicationDraft>(&raw)?)
        }
        None => {
            let mut wizard = Wizard::new();
            fill_interactively(&mut wizard)?;
            if !prompt::confirm("Submit application?")? {
                return Err(CliError::Cancelled);
            }
            wizard
        }
    };

    let api: &dyn MembershipApi = ctx.api.as_ref();
    match wizard.submit(api).await {
        Ok(resp) => {
            println!("{}", resp.message);
            println!("→ {}", Route::Dashboard);
            Ok(())
        }
        Err(e) => match wizard.submit_state() {
            SubmitState::Failed(message) => {
                eprintln!("error: {message}");
                Err(CliError::Reported)
            }
            _ => Err(e.into()),
        },
    }
}

fn fill_interactively(wizard: &mut Wizard) -> Result<(), CliError> {
    loop {
        let step = wizard.step();
        println!("\n[{}/{}] {}", step.index() + 1, Step::ALL.len(), step.title());
        match step {
            Step::MembershipType => {
                let current = wizard.draft().requested_role;
                let answer = prompt::line_or("PERMANENT, NORMAL or ASSOCIATED", current.as_str())?;
                let role = Role::parse(&answer).ok_or_else(|| CliError::InvalidRole(answer.clone()))?;
                wizard.set_role(role)?;
            }
            Step::Review => {
                println!("  Requested Role: {}", wizard.draft().requested_role);
                for (field, value) in wizard.review() {
                    println!("  {}: {value}", field.label());
                }
                return Ok(());
            }
            _ => {
                for field in wizard.visible_fields() {
                    let current = wizard.draft().bio_data.get(field).to_owned();
                    let value = prompt::line_or(field.label(), &current)?;
                    wizard.set_field(field, value);
                }
            }
        }
        wizard.handle_next();
    }
}

pub fn card(session: &SessionStore) -> Result<(), CliError> {
    let user = signed_in(session)?;
    let card = IdCard::from_user(&user);
    print!("{}", card.render_text());
    println!("Export file: {}", card.file_name());
    Ok(())
}

pub async fn upload(
    ctx: &CliContext,
    session: &SessionStore,
    file: &Path,
    bucket: Option<String>,
) -> Result<(), CliError> {
    let user = signed_in(session)?;
    let client = StorageClient::from_config(&ctx.config, ctx.tokens.clone())?;

    let name = file.file_name().and_then(|n| n.to_str()).unwrap_or("file");
    let bytes = tokio::fs::read(file).await?;
    let bucket = bucket.unwrap_or_else(|| client.default_bucket().to_owned());
    let path = storage::object_path(user.id, name);

    let mut upload = Upload::default();
    let url = upload.run(&client, &bucket, &path, bytes, storage::content_type_for(name)).await?;
    println!("{url}");
    Ok(())
}

// =============================================================================
// ROUTES / PAGES
// =============================================================================

pub fn route(session: &SessionStore, path: &str) -> Result<(), CliError> {
    let route = Route::parse(path).ok_or_else(|| CliError::UnknownRoute(path.to_owned()))?;
    match guard::check_route(&session.snapshot(), route) {
        Decision::Allow => println!("allow {route}"),
        Decision::Suspend => println!("suspend"),
        Decision::Redirect(to) => println!("redirect {to}"),
    }
    Ok(())
}

pub fn pages(name: Option<&str>) -> Result<(), CliError> {
    let Some(name) = name else {
        println!("{}", pages::ORG_NAME);
        for item in pages::NAV_ITEMS {
            println!("  {:<16} {}", item.name, item.route);
        }
        println!("  {:<16} {}", "Contact", Route::Contact);
        println!("{}", pages::footer(time::OffsetDateTime::now_utc().year()));
        return Ok(());
    };

    let path = if name.starts_with('/') { name.to_owned() } else { format!("/{name}") };
    let page = Route::parse(&path)
        .and_then(pages::page_for)
        .ok_or_else(|| CliError::UnknownPage(name.to_owned()))?;
    println!("{}", page.title);
    for section in page.sections {
        println!("  {section}");
    }
    Ok(())
}

// =============================================================================
// ADMIN
// =============================================================================

pub async fn admin(ctx: &CliContext, session: &SessionStore, command: AdminSubcommand) -> Result<(), CliError> {
    require(session, Route::Admin)?;
    let api: Arc<dyn MembershipApi> = ctx.api.clone();
    let mut dash = AdminDashboard::new(api);

    let result = run_admin(&mut dash, command).await;
    let notices = dash.drain_notices();
    for notice in &notices {
        if notice.is_error() {
            eprintln!("error: {notice}");
        } else {
            println!("{notice}");
        }
    }
    settle(result, &notices)
}

/// A client failure whose notice was already printed is not printed again.
fn settle(result: Result<(), CliError>, notices: &[Notice]) -> Result<(), CliError> {
    match result {
        Err(CliError::Client(_)) if notices.iter().any(Notice::is_error) => Err(CliError::Reported),
        other => other,
    }
}

async fn run_admin(dash: &mut AdminDashboard, command: AdminSubcommand) -> Result<(), CliError> {
    match command {
        AdminSubcommand::Pending => {
            dash.load().await?;
            println!("Active requests: {}", dash.requests().len());
            for req in dash.requests() {
                println!(
                    "  {}  {:<24} {:<10} {}",
                    req.request.user_id,
                    req.users.display_name(),
                    req.request.requested_role,
                    req.users.gotram.as_deref().unwrap_or("N/A"),
                );
            }
        }
        AdminSubcommand::Show { user_id } => {
            dash.load().await?;
            let req = dash.select(user_id).ok_or_else(|| not_pending(user_id))?;
            for (label, value) in admin::detail_items(req) {
                println!("  {label:<26} {value}");
            }
        }
        AdminSubcommand::Approve { user_id, role } => {
            let role = role.map(|r| Role::parse(&r).ok_or(CliError::InvalidRole(r))).transpose()?;
            let resp = dash.act_with_role(user_id, ApprovalAction::Approve, role).await?;
            if let Some(member_id) = resp.member_id {
                println!("Member ID: {member_id}");
            }
        }
        AdminSubcommand::Reject { user_id } => {
            dash.act(user_id, ApprovalAction::Reject).await?;
        }
        AdminSubcommand::CreateMember { phone, full_name, role, pin } => {
            let role = Role::parse(&role).ok_or(CliError::InvalidRole(role))?;
            let resp = dash.create_member(&phone, &full_name, role, pin.as_deref()).await?;
            if let Some(member_id) = resp.member_id {
                println!("Member ID: {member_id}");
            }
        }
        AdminSubcommand::Unlock { user_id } => {
            dash.unlock(user_id).await?;
        }
    }
    Ok(())
}

fn not_pending(user_id: Uuid) -> CliError {
    CliError::Client(parishat_client::error::ClientError::Validation(format!(
        "no pending request for {user_id}"
    )))
}
