//! Inventory catalog entries
//!
//! The catalog is owned by the inventory subsystem; orders only read the
//! current unit cost of each item at creation time.

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{InventoryItemId, Money};

/// Which catalog an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Medication,
    Procedure,
    Diagnostic,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Medication => "medication",
            CatalogKind::Procedure => "procedure",
            CatalogKind::Diagnostic => "diagnostic",
        }
    }

    /// Entity name used in not-found errors
    pub fn entity_name(&self) -> &'static str {
        match self {
            CatalogKind::Medication => "Medication",
            CatalogKind::Procedure => "Procedure",
            CatalogKind::Diagnostic => "DiagnosticAid",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A priced inventory item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: InventoryItemId,
    pub kind: CatalogKind,
    pub name: String,
    pub unit_cost: Money,
    /// Items can be retired without deleting historic orders
    pub active: bool,
}

impl CatalogItem {
    pub fn new(kind: CatalogKind, name: impl Into<String>, unit_cost: Money) -> Self {
        Self {
            id: InventoryItemId::new_v7(),
            kind,
            name: name.into(),
            unit_cost,
            active: true,
        }
    }

    pub fn medication(name: impl Into<String>, unit_cost: Money) -> Self {
        Self::new(CatalogKind::Medication, name, unit_cost)
    }

    pub fn procedure(name: impl Into<String>, unit_cost: Money) -> Self {
        Self::new(CatalogKind::Procedure, name, unit_cost)
    }

    pub fn diagnostic(name: impl Into<String>, unit_cost: Money) -> Self {
        Self::new(CatalogKind::Diagnostic, name, unit_cost)
    }
}
