//! Client library for the Parishat membership service.
//!
//! SYSTEM CONTEXT
//! ==============
//! Consumes the membership REST API and the hosted storage/auth service.
//! Front ends (the `parishat` CLI today) build one [`state::session::SessionStore`]
//! and drive every screen model through it.
//!
//! DESIGN
//! ======
//! `net` owns all I/O, `state` owns the observable models, `util` holds the
//! pure decision and validation helpers.

pub mod config;
pub mod error;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

#[cfg(test)]
pub mod test_helpers;
