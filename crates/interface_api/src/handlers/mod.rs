//! Request handlers

pub mod orders;
pub mod billing;
pub mod health;
