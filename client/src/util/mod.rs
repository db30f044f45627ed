//! Utility helpers shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pure helpers with no I/O: route guarding, input validation, and the
//! notice type front ends display after actions.

pub mod guard;
pub mod notice;
pub mod validate;
