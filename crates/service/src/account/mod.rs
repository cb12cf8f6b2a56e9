//! Account module: three-layer architecture (domain, repository, service).
//!
//! Signup creates the user, its profile and hashed credentials together;
//! login verifies the password. Session tokens are issued elsewhere.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AccountService;
