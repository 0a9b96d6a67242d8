//! Client module
//!
//! This module contains client records, their storage and lifecycle.

mod file_store;
mod model;
mod repository;
mod service;

pub use file_store::FileClientStore;
pub use model::*;
pub use repository::ClientRepository;
pub use service::{ClientService, DEFAULT_EXPIRING_THRESHOLD_DAYS};
