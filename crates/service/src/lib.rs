//! Service layer for the marketplace user ledger.
//! - Rating writes recompute the profile aggregate in the same transaction.
//! - Order status changes append to the status history atomically.
//! - Errors are classified into `ServiceError` with stable codes.

pub mod errors;
pub mod pagination;
pub mod catalog;
pub mod user_service;
pub mod profile;
pub mod rating;
pub mod order;
pub mod payment;
pub mod account;
pub mod consistency;
#[cfg(test)]
pub mod test_support;
