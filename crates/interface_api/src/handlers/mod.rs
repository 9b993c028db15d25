//! Request handlers

pub mod claims;
pub mod health;
pub mod reconcile;
pub mod review;
pub mod rules;
