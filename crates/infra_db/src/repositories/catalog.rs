//! Inventory catalog repository (read side used by order pricing)

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::InventoryItemId;
use domain_orders::{CatalogItem, CatalogKind};

use super::money;
use crate::error::DatabaseError;

/// Row of `inventory_items`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogRow {
    pub item_id: Uuid,
    pub kind: String,
    pub name: String,
    pub unit_cost: Decimal,
    pub currency: String,
    pub active: bool,
}

fn kind_from_str(value: &str) -> Result<CatalogKind, DatabaseError> {
    match value {
        "medication" => Ok(CatalogKind::Medication),
        "procedure" => Ok(CatalogKind::Procedure),
        "diagnostic" => Ok(CatalogKind::Diagnostic),
        other => Err(DatabaseError::corrupt(format!("unknown catalog kind '{}'", other))),
    }
}

impl TryFrom<CatalogRow> for CatalogItem {
    type Error = DatabaseError;

    fn try_from(row: CatalogRow) -> Result<Self, Self::Error> {
        Ok(CatalogItem {
            id: InventoryItemId::from_uuid(row.item_id),
            kind: kind_from_str(&row.kind)?,
            name: row.name,
            unit_cost: money(row.unit_cost, &row.currency)?,
            active: row.active,
        })
    }
}

/// Repository for catalog items
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// An active item of the given kind
    pub async fn find_active(&self, kind: CatalogKind, id: InventoryItemId) -> Result<CatalogItem, DatabaseError> {
        sqlx::query_as::<_, CatalogRow>(
            r#"
            SELECT item_id, kind, name, unit_cost, currency, active
            FROM inventory_items
            WHERE item_id = $1 AND kind = $2 AND active
            "#,
        )
        .bind(id.as_uuid())
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found(kind.entity_name(), id))?
        .try_into()
    }

    pub async fn upsert(&self, item: &CatalogItem) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO inventory_items (item_id, kind, name, unit_cost, currency, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (item_id) DO UPDATE SET
                kind = EXCLUDED.kind,
                name = EXCLUDED.name,
                unit_cost = EXCLUDED.unit_cost,
                currency = EXCLUDED.currency,
                active = EXCLUDED.active
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.kind.as_str())
        .bind(&item.name)
        .bind(item.unit_cost.amount())
        .bind(item.unit_cost.currency().code())
        .bind(item.active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
