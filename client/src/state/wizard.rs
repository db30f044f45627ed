//! Membership application wizard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Holds the in-progress application as raw text exactly as typed. Nothing
//! is parsed until submission, where [`ApplicationDraft::normalize`] turns the
//! draft into the wire [`MembershipApplication`].
//!
//! DESIGN
//! ======
//! Six fixed steps, navigated one at a time and clamped at both ends.
//! Submission is split into [`Wizard::begin_submit`] and
//! [`Wizard::finish_submit`] so a front end holding the wizard behind a lock
//! can release it while the request is in flight; a second `begin_submit`
//! during that window is rejected.

#[cfg(test)]
#[path = "wizard_test.rs"]
mod wizard_test;

use serde::{Deserialize, Serialize};
use time::macros::format_description;

use crate::error::ClientError;
use crate::net::api::MembershipApi;
use crate::net::types::{ApplicationResponse, BioData, MembershipApplication, Role};
use crate::util::guard::Route;
use crate::util::validate;

pub const SUBMIT_FALLBACK: &str = "Submission failed";
pub const SUBMIT_IN_PROGRESS: &str = "Submission already in progress";
pub const ALREADY_SUBMITTED: &str = "Application already submitted";

// =============================================================================
// STEPS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    MembershipType,
    PersonalDetails,
    ContactAndWork,
    OtherInfo,
    PaymentProof,
    Review,
}

impl Step {
    pub const ALL: [Self; 6] = [
        Self::MembershipType,
        Self::PersonalDetails,
        Self::ContactAndWork,
        Self::OtherInfo,
        Self::PaymentProof,
        Self::Review,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::MembershipType => "Membership Type",
            Self::PersonalDetails => "Personal Details",
            Self::ContactAndWork => "Contact & Work",
            Self::OtherInfo => "Other Info",
            Self::PaymentProof => "Payment Proof",
            Self::Review => "Review",
        }
    }

    /// Bio fields edited on this step, before role filtering.
    #[must_use]
    pub fn fields(self) -> &'static [Field] {
        match self {
            Self::MembershipType | Self::Review => &[],
            Self::PersonalDetails => &[Field::FatherGuardianName, Field::Age, Field::Dob, Field::Tob, Field::Gotram, Field::SubSect],
            Self::ContactAndWork => &[Field::Address, Field::CellNo, Field::Email, Field::Occupation, Field::AnnualIncome],
            Self::OtherInfo => &[Field::StarPada, Field::Requirement, Field::Particulars],
            Self::PaymentProof => &[Field::PaymentProofUrl],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    FatherGuardianName,
    Age,
    Dob,
    Tob,
    Gotram,
    SubSect,
    Occupation,
    AnnualIncome,
    StarPada,
    Address,
    CellNo,
    Email,
    PaymentProofUrl,
    Requirement,
    Particulars,
}

impl Field {
    pub const ALL: [Self; 15] = [
        Self::FatherGuardianName,
        Self::Age,
        Self::Dob,
        Self::Tob,
        Self::Gotram,
        Self::SubSect,
        Self::Occupation,
        Self::AnnualIncome,
        Self::StarPada,
        Self::Address,
        Self::CellNo,
        Self::Email,
        Self::PaymentProofUrl,
        Self::Requirement,
        Self::Particulars,
    ];

    /// Wire name inside `bio_data`.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::FatherGuardianName => "father_guardian_name",
            Self::Age => "age",
            Self::Dob => "dob",
            Self::Tob => "tob",
            Self::Gotram => "gotram",
            Self::SubSect => "sub_sect",
            Self::Occupation => "occupation",
            Self::AnnualIncome => "annual_income",
            Self::StarPada => "star_pada",
            Self::Address => "address",
            Self::CellNo => "cell_no",
            Self::Email => "email",
            Self::PaymentProofUrl => "payment_proof_url",
            Self::Requirement => "requirement",
            Self::Particulars => "particulars",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FatherGuardianName => "Father / Guardian Name",
            Self::Age => "Age",
            Self::Dob => "Date of Birth",
            Self::Tob => "Time of Birth",
            Self::Gotram => "Gotram",
            Self::SubSect => "Sub-Sect",
            Self::Occupation => "Occupation",
            Self::AnnualIncome => "Annual Income",
            Self::StarPada => "Star with Pada",
            Self::Address => "Address",
            Self::CellNo => "Cell No",
            Self::Email => "Email",
            Self::PaymentProofUrl => "Payment Receipt / Reference Number",
            Self::Requirement => "Requirement",
            Self::Particulars => "Particulars",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// `SubSect` is only asked of PERMANENT applicants.
    #[must_use]
    pub fn applies_to(self, role: Role) -> bool {
        self != Self::SubSect || role == Role::Permanent
    }
}

// =============================================================================
// DRAFT
// =============================================================================

/// Bio data as typed. Every field is raw text; empty means "not given".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BioDataDraft {
    pub father_guardian_name: String,
    pub age: String,
    pub dob: String,
    pub tob: String,
    pub gotram: String,
    pub sub_sect: String,
    pub occupation: String,
    pub annual_income: String,
    pub star_pada: String,
    pub address: String,
    pub cell_no: String,
    pub email: String,
    pub payment_proof_url: String,
    pub requirement: String,
    pub particulars: String,
}

impl BioDataDraft {
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FatherGuardianName => &self.father_guardian_name,
            Field::Age => &self.age,
            Field::Dob => &self.dob,
            Field::Tob => &self.tob,
            Field::Gotram => &self.gotram,
            Field::SubSect => &self.sub_sect,
            Field::Occupation => &self.occupation,
            Field::AnnualIncome => &self.annual_income,
            Field::StarPada => &self.star_pada,
            Field::Address => &self.address,
            Field::CellNo => &self.cell_no,
            Field::Email => &self.email,
            Field::PaymentProofUrl => &self.payment_proof_url,
            Field::Requirement => &self.requirement,
            Field::Particulars => &self.particulars,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::FatherGuardianName => &mut self.father_guardian_name,
            Field::Age => &mut self.age,
            Field::Dob => &mut self.dob,
            Field::Tob => &mut self.tob,
            Field::Gotram => &mut self.gotram,
            Field::SubSect => &mut self.sub_sect,
            Field::Occupation => &mut self.occupation,
            Field::AnnualIncome => &mut self.annual_income,
            Field::StarPada => &mut self.star_pada,
            Field::Address => &mut self.address,
            Field::CellNo => &mut self.cell_no,
            Field::Email => &mut self.email,
            Field::PaymentProofUrl => &mut self.payment_proof_url,
            Field::Requirement => &mut self.requirement,
            Field::Particulars => &mut self.particulars,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot(field) = value.into();
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    #[serde(default = "default_role")]
    pub requested_role: Role,
    #[serde(default)]
    pub bio_data: BioDataDraft,
}

fn default_role() -> Role {
    Role::Normal
}

impl Default for ApplicationDraft {
    fn default() -> Self {
        Self { requested_role: default_role(), bio_data: BioDataDraft::default() }
    }
}

impl ApplicationDraft {
    /// Convert to the wire form. Blank fields become absent, numbers and
    /// dates are parsed, and `sub_sect` is dropped unless the role is PERMANENT.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] naming the first malformed field.
    pub fn normalize(&self) -> Result<MembershipApplication, ClientError> {
        let role = self.requested_role;
        if !role.is_applicable() {
            return Err(ClientError::Validation(format!("{role} membership cannot be requested")));
        }
        let d = &self.bio_data;

        let age = optional(&d.age)
            .map(|raw| {
                raw.parse::<u32>()
                    .map_err(|_| ClientError::Validation("Age must be a whole number".into()))
            })
            .transpose()?;
        let annual_income = optional(&d.annual_income)
            .map(|raw| match raw.parse::<f64>() {
                Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
                _ => Err(ClientError::Validation("Annual income must be a number".into())),
            })
            .transpose()?;
        let dob = optional(&d.dob).map(parse_dob).transpose()?;
        let tob = optional(&d.tob).map(parse_tob).transpose()?;
        let email = optional(&d.email)
            .map(|raw| {
                validate::normalize_email(raw)
                    .ok_or_else(|| ClientError::Validation("Enter a valid email address".into()))
            })
            .transpose()?;

        let text = |raw: &str| optional(raw).map(str::to_owned);
        let bio_data = BioData {
            father_guardian_name: text(&d.father_guardian_name),
            age,
            dob,
            tob,
            gotram: text(&d.gotram),
            sub_sect: if Field::SubSect.applies_to(role) { text(&d.sub_sect) } else { None },
            occupation: text(&d.occupation),
            annual_income,
            star_pada: text(&d.star_pada),
            address: text(&d.address),
            cell_no: text(&d.cell_no),
            email,
            photo_url: None,
            payment_proof_url: text(&d.payment_proof_url),
            requirement: text(&d.requirement),
            particulars: text(&d.particulars),
        };
        Ok(MembershipApplication { requested_role: role, bio_data })
    }
}

fn optional(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_dob(raw: &str) -> Result<String, ClientError> {
    time::Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(|_| raw.to_owned())
        .map_err(|_| ClientError::Validation("Date of birth must be YYYY-MM-DD".into()))
}

fn parse_tob(raw: &str) -> Result<String, ClientError> {
    time::Time::parse(raw, format_description!("[hour]:[minute]"))
        .or_else(|_| time::Time::parse(raw, format_description!("[hour]:[minute]:[second]")))
        .map(|_| raw.to_owned())
        .map_err(|_| ClientError::Validation("Time of birth must be HH:MM".into()))
}

// =============================================================================
// WIZARD
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitState {
    Editing,
    Submitting,
    Submitted(ApplicationResponse),
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct Wizard {
    step: Step,
    draft: ApplicationDraft,
    submit: SubmitState,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    #[must_use]
    pub fn new() -> Self {
        Self::from_draft(ApplicationDraft::default())
    }

    #[must_use]
    pub fn from_draft(draft: ApplicationDraft) -> Self {
        Self { step: Step::MembershipType, draft, submit: SubmitState::Editing }
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    #[must_use]
    pub fn submit_state(&self) -> &SubmitState {
        &self.submit
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.step.index() == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.step.index() == Step::ALL.len() - 1
    }

    /// Advance one step; no-op on the last step.
    pub fn handle_next(&mut self) {
        if let Some(next) = Step::ALL.get(self.step.index() + 1) {
            self.step = *next;
        }
    }

    /// Go back one step; no-op on the first step.
    pub fn handle_back(&mut self) {
        if let Some(prev) = self.step.index().checked_sub(1) {
            self.step = Step::ALL[prev];
        }
    }

    /// # Errors
    ///
    /// Returns a validation error for roles that cannot be applied for.
    pub fn set_role(&mut self, role: Role) -> Result<(), ClientError> {
        if !role.is_applicable() {
            return Err(ClientError::Validation(format!("{role} membership cannot be requested")));
        }
        self.draft.requested_role = role;
        Ok(())
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.draft.bio_data.set(field, value);
    }

    /// Fields shown on the current step for the selected role.
    #[must_use]
    pub fn visible_fields(&self) -> Vec<Field> {
        let role = self.draft.requested_role;
        self.step.fields().iter().copied().filter(|f| f.applies_to(role)).collect()
    }

    /// Non-empty draft values for the review step, in form order.
    #[must_use]
    pub fn review(&self) -> Vec<(Field, &str)> {
        let role = self.draft.requested_role;
        Field::ALL
            .into_iter()
            .filter(|f| f.applies_to(role))
            .filter_map(|f| optional(self.draft.bio_data.get(f)).map(|v| (f, v)))
            .collect()
    }

    /// Start over with an empty draft on the first step.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Normalize the draft and mark the wizard as submitting.
    ///
    /// # Errors
    ///
    /// Rejects a submission while one is in flight or after one succeeded
    /// (state unchanged; call [`Wizard::reset`] to apply again), and
    /// validation failures (state becomes `Failed`).
    pub fn begin_submit(&mut self) -> Result<MembershipApplication, ClientError> {
        match self.submit {
            SubmitState::Submitting => return Err(ClientError::Validation(SUBMIT_IN_PROGRESS.into())),
            SubmitState::Submitted(_) => return Err(ClientError::Validation(ALREADY_SUBMITTED.into())),
            SubmitState::Editing | SubmitState::Failed(_) => {}
        }
        match self.draft.normalize() {
            Ok(application) => {
                self.submit = SubmitState::Submitting;
                Ok(application)
            }
            Err(e) => {
                self.submit = SubmitState::Failed(e.user_message(SUBMIT_FALLBACK));
                Err(e)
            }
        }
    }

    /// Record the outcome of the apply call. Returns where to navigate on
    /// success, where the draft is discarded; a failure keeps it as typed.
    pub fn finish_submit(&mut self, outcome: &Result<ApplicationResponse, ClientError>) -> Option<Route> {
        match outcome {
            Ok(resp) => {
                tracing::info!(application_id = %resp.application_id, "membership application submitted");
                self.draft = ApplicationDraft::default();
                self.step = Step::MembershipType;
                self.submit = SubmitState::Submitted(resp.clone());
                Some(Route::Dashboard)
            }
            Err(e) => {
                tracing::warn!(error = %e, "membership application failed");
                self.submit = SubmitState::Failed(e.user_message(SUBMIT_FALLBACK));
                None
            }
        }
    }

    /// Submit through `api` in one call.
    ///
    /// # Errors
    ///
    /// Returns the validation or server error; the message shown to the user
    /// is in [`SubmitState::Failed`].
    pub async fn submit(&mut self, api: &dyn MembershipApi) -> Result<ApplicationResponse, ClientError> {
        let application = self.begin_submit()?;
        let outcome = api.apply(&application).await;
        self.finish_submit(&outcome);
        outcome
    }
}
