//! Request and response bodies

pub mod orders;
pub mod billing;
