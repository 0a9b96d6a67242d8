//! Core library for ClientManager Pro
//!
//! This crate contains the business logic, including:
//! - Subscription expiration and urgency classification
//! - Tenant client quotas
//! - Tenant-scoped client records and their lifecycle
//! - Account provisioning and dashboard statistics

pub mod account;
pub mod client;
pub mod dashboard;
pub mod error;
mod persist;
pub mod quota;
pub mod subscription;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
