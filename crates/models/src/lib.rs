//! SeaORM entities for the marketplace user ledger, plus entity-level
//! validation and connection setup.

pub mod errors;
pub mod db;
pub mod status;
pub mod user;
pub mod user_credentials;
pub mod user_role;
pub mod services;
pub mod payment_method;
pub mod user_profile;
pub mod user_profile_services;
pub mod user_rating;
pub mod user_order;
pub mod order_status_history;
pub mod order_payment;

pub use status::{OrderStatus, PaymentStatus};

#[cfg(test)]
mod tests;
