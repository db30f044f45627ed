//! Digital member ID card.
//!
//! The card is a pure projection of the signed-in [`User`]. Rasterizing it
//! to an image is left to the front end; this module supplies the fields,
//! the role accent, and the export file name.

#[cfg(test)]
#[path = "card_test.rs"]
mod card_test;

use std::fmt::Write as _;

use crate::net::types::{Role, Status, User};

pub const ORG_SHORT_NAME: &str = "PARISHAT";
const PENDING_MEMBER_ID: &str = "PENDING";
const NOT_AVAILABLE: &str = "N/A";

/// Accent colour of the card header, by role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accent {
    Amber,
    Blue,
    Teal,
    Purple,
    Gray,
}

impl Accent {
    #[must_use]
    pub fn for_role(role: Option<Role>) -> Self {
        match role {
            Some(Role::Permanent) => Self::Amber,
            Some(Role::Normal) => Self::Blue,
            Some(Role::Associated) => Self::Teal,
            Some(Role::Head) => Self::Purple,
            None => Self::Gray,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Amber => "amber",
            Self::Blue => "blue",
            Self::Teal => "teal",
            Self::Purple => "purple",
            Self::Gray => "gray",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IdCard {
    pub full_name: String,
    pub member_id: Option<String>,
    pub role: Option<Role>,
    pub status: Status,
    pub gotram: Option<String>,
    pub photo_url: Option<String>,
    pub zonal_committee: Option<String>,
    pub regional_committee: Option<String>,
    pub accent: Accent,
}

impl IdCard {
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            full_name: user.display_name().to_owned(),
            member_id: user.member_id.clone().filter(|id| !id.trim().is_empty()),
            role: user.role,
            status: user.status,
            gotram: user.gotram.clone(),
            photo_url: user.photo_url.clone(),
            zonal_committee: user.zonal_committee.clone(),
            regional_committee: user.regional_committee.clone(),
            accent: Accent::for_role(user.role),
        }
    }

    /// Member id, or `PENDING` before approval.
    #[must_use]
    pub fn member_id_label(&self) -> &str {
        self.member_id.as_deref().unwrap_or(PENDING_MEMBER_ID)
    }

    #[must_use]
    pub fn role_label(&self) -> &str {
        self.role.map_or(NOT_AVAILABLE, Role::as_str)
    }

    /// `Parishat-ID-<member id>.jpg`, or `Parishat-ID-Member.jpg` before approval.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("Parishat-ID-{}.jpg", self.member_id.as_deref().unwrap_or("Member"))
    }

    /// Plain-text rendering for terminals.
    #[must_use]
    pub fn render_text(&self) -> String {
        let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_owned());
        let rows = [
            ("Name", self.full_name.clone()),
            ("Member ID", self.member_id_label().to_owned()),
            ("Role", self.role_label().to_owned()),
            ("Status", self.status.to_string()),
            ("Gotram", or_na(&self.gotram)),
            ("Zonal Committee", or_na(&self.zonal_committee)),
            ("Regional Office", or_na(&self.regional_committee)),
        ];

        let mut out = String::new();
        let _ = writeln!(out, "{ORG_SHORT_NAME} · Official Member ID [{}]", self.accent.name());
        for (label, value) in rows {
            let _ = writeln!(out, "  {label:<16} {value}");
        }
        out.push_str("  Verified by Parishat Govt.\n");
        out
    }
}
