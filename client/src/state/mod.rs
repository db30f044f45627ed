//! Client state: the session, the token slot, and per-screen models.

pub mod admin;
pub mod card;
pub mod session;
pub mod token;
pub mod wizard;
