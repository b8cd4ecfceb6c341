//! # Domain Models
//!
//! This crate contains pure domain types with a single dependency (`serde`).
//! Keep it lean: no I/O, networking, crypto or heavy logic, just data and simple helpers.

pub mod account;
pub mod config;
pub mod credential;

pub use account::{AccountId, AuthResult};
pub use credential::Credential;
