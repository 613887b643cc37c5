//! Hospital staff users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::UserId;
use crate::error::PatientError;

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Doctor,
    Nurse,
    Administrative,
    HumanResources,
    Support,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Doctor,
        Role::Nurse,
        Role::Administrative,
        Role::HumanResources,
        Role::Support,
    ];

    /// Roles allowed to issue clinical orders
    pub fn is_clinician(&self) -> bool {
        matches!(self, Role::Doctor)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::Administrative => "administrative",
            Role::HumanResources => "human_resources",
            Role::Support => "support",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| PatientError::invalid(format!("unknown role '{}'", s)))
    }
}

/// A staff member who can act on the system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates an active user
    pub fn new(username: impl Into<String>, full_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new_v7(),
            username: username.into(),
            full_name: full_name.into(),
            role,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// True when the user is active and holds the clinician role
    pub fn can_issue_orders(&self) -> bool {
        self.active && self.role.is_clinician()
    }
}
