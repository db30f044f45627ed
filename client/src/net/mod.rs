//! Networking modules for the membership API and hosted services.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles REST calls to the membership API, `exchange` trades
//! credentials for tokens, `storage` uploads files, and `types` defines the
//! shared wire schema.

pub mod api;
pub mod exchange;
pub mod storage;
pub mod types;
