//! Informational pages and site navigation.
//!
//! The public pages carry little beyond their headings and image captions;
//! the text here is what a non-graphical front end shows in their place.

#[cfg(test)]
#[path = "pages_test.rs"]
mod pages_test;

use crate::state::session::Session;
use crate::util::guard::{self, Route};

pub const ORG_NAME: &str = "Aaruvela Niyogi Brahmana Seva Parishat";
pub const UNDER_CONSTRUCTION: &str = "This page is under construction.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavItem {
    pub name: &'static str,
    pub route: Route,
}

pub const NAV_ITEMS: [NavItem; 3] = [
    NavItem { name: "Home", route: Route::Home },
    NavItem { name: "About Us", route: Route::About },
    NavItem { name: "Administration", route: Route::Administration },
];

/// Right-hand navbar actions for the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    /// Link to the user's landing page.
    Dashboard(Route),
    Logout,
    Login,
}

#[must_use]
pub fn nav_actions(session: &Session) -> Vec<NavAction> {
    match &session.identity {
        Some(user) => vec![NavAction::Dashboard(guard::home_for(user)), NavAction::Logout],
        None => vec![NavAction::Login],
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub title: &'static str,
    pub sections: Vec<&'static str>,
}

/// Content of a public informational page; `None` for app pages.
#[must_use]
pub fn page_for(route: Route) -> Option<Page> {
    let page = match route {
        Route::Home => Page {
            title: "Home",
            sections: vec![
                "Introduction to Aaruvela Niyogi Brahmana Seva Parishat",
                "Gallery of Parishat events and gatherings",
            ],
        },
        Route::About => Page {
            title: "About Us",
            sections: vec!["Introduction to Aaruvela Niyogi Brahmana Seva Parishat"],
        },
        Route::Administration => Page {
            title: "Administration",
            sections: vec!["Registration Certificate"],
        },
        Route::Contact => Page { title: "Contact Us", sections: vec![UNDER_CONSTRUCTION] },
        Route::Auth | Route::Membership | Route::Dashboard | Route::Admin => return None,
    };
    Some(page)
}

#[must_use]
pub fn footer(year: i32) -> String {
    format!("© {year} {ORG_NAME}. All rights reserved.")
}
