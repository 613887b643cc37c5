//! Role-based access control
//!
//! The permission matrix is data, not control flow: each role maps to the
//! set of `(resource, action)` pairs it may perform, and every check is a
//! lookup in [`CAPABILITIES`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::staff::Role;

/// Something a staff member can act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Patients,
    Orders,
    Billing,
    Invoices,
    MedicalRecords,
    Inventory,
    Users,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Patients => "patients",
            Resource::Orders => "orders",
            Resource::Billing => "billing",
            Resource::Invoices => "invoices",
            Resource::MedicalRecords => "medical_records",
            Resource::Inventory => "inventory",
            Resource::Users => "users",
        }
    }
}

/// What is being done to a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
        }
    }
}

/// A `(resource, action)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub resource: Resource,
    pub action: Action,
}

impl Permission {
    pub const fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    pub const PATIENTS_READ: Permission = Permission::new(Resource::Patients, Action::Read);
    pub const PATIENTS_CREATE: Permission = Permission::new(Resource::Patients, Action::Create);
    pub const PATIENTS_UPDATE: Permission = Permission::new(Resource::Patients, Action::Update);
    pub const ORDERS_READ: Permission = Permission::new(Resource::Orders, Action::Read);
    pub const ORDERS_CREATE: Permission = Permission::new(Resource::Orders, Action::Create);
    pub const BILLING_READ: Permission = Permission::new(Resource::Billing, Action::Read);
    pub const BILLING_CREATE: Permission = Permission::new(Resource::Billing, Action::Create);
    pub const INVOICES_READ: Permission = Permission::new(Resource::Invoices, Action::Read);
    pub const RECORDS_READ: Permission = Permission::new(Resource::MedicalRecords, Action::Read);
    pub const RECORDS_UPDATE: Permission = Permission::new(Resource::MedicalRecords, Action::Update);
    pub const INVENTORY_READ: Permission = Permission::new(Resource::Inventory, Action::Read);
    pub const INVENTORY_UPDATE: Permission = Permission::new(Resource::Inventory, Action::Update);
    pub const USERS_READ: Permission = Permission::new(Resource::Users, Action::Read);
    pub const USERS_CREATE: Permission = Permission::new(Resource::Users, Action::Create);
    pub const USERS_UPDATE: Permission = Permission::new(Resource::Users, Action::Update);
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource.as_str(), self.action.as_str())
    }
}

/// Raised when an actor's role does not grant a permission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Role {role} lacks permission {permission}")]
    Denied {
        role: Role,
        permission: Permission,
    },

    #[error("Operation requires the clinician role, actor has {0}")]
    ClinicianRequired(Role),

    #[error("User {0} is inactive")]
    InactiveUser(String),
}

/// Static capability table
pub const CAPABILITIES: &[(Role, &[Permission])] = &[
    (Role::Doctor, &[
        Permission::PATIENTS_READ,
        Permission::ORDERS_READ,
        Permission::ORDERS_CREATE,
        Permission::RECORDS_READ,
        Permission::RECORDS_UPDATE,
        Permission::INVENTORY_READ,
    ]),
    (Role::Nurse, &[
        Permission::PATIENTS_READ,
        Permission::ORDERS_READ,
        Permission::RECORDS_READ,
        Permission::RECORDS_UPDATE,
        Permission::INVENTORY_READ,
    ]),
    (Role::Administrative, &[
        Permission::PATIENTS_READ,
        Permission::PATIENTS_CREATE,
        Permission::PATIENTS_UPDATE,
        Permission::ORDERS_READ,
        Permission::BILLING_READ,
        Permission::BILLING_CREATE,
        Permission::INVOICES_READ,
    ]),
    (Role::HumanResources, &[
        Permission::USERS_READ,
        Permission::USERS_CREATE,
        Permission::USERS_UPDATE,
    ]),
    (Role::Support, &[
        Permission::INVENTORY_READ,
        Permission::INVENTORY_UPDATE,
        Permission::USERS_READ,
    ]),
];

/// Lookup front-end over [`CAPABILITIES`]
pub struct AccessControl;

impl AccessControl {
    /// Permissions granted to a role
    pub fn permissions_of(role: Role) -> &'static [Permission] {
        CAPABILITIES
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, perms)| *perms)
            .unwrap_or(&[])
    }

    pub fn permits(role: Role, permission: Permission) -> bool {
        Self::permissions_of(role).contains(&permission)
    }

    /// Fails with [`AccessError::Denied`] when the role lacks the permission
    pub fn ensure(role: Role, permission: Permission) -> Result<(), AccessError> {
        if Self::permits(role, permission) {
            Ok(())
        } else {
            tracing::warn!(role = %role, permission = %permission, "access denied");
            Err(AccessError::Denied { role, permission })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_has_an_entry() {
        for role in Role::ALL {
            assert!(!AccessControl::permissions_of(role).is_empty(), "{role} has no permissions");
        }
    }

    #[test]
    fn test_only_doctors_create_orders() {
        for role in Role::ALL {
            assert_eq!(
                AccessControl::permits(role, Permission::ORDERS_CREATE),
                role == Role::Doctor
            );
        }
    }

    #[test]
    fn test_only_administrative_bills() {
        assert!(AccessControl::ensure(Role::Administrative, Permission::BILLING_CREATE).is_ok());
        assert_eq!(
            AccessControl::ensure(Role::Doctor, Permission::BILLING_CREATE),
            Err(AccessError::Denied {
                role: Role::Doctor,
                permission: Permission::BILLING_CREATE,
            })
        );
    }

    #[test]
    fn test_permission_display() {
        assert_eq!(Permission::ORDERS_CREATE.to_string(), "orders:create");
        assert_eq!(Permission::RECORDS_UPDATE.to_string(), "medical_records:update");
    }
}
