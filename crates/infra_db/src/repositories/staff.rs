//! Staff user repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::UserId;
use domain_patient::{Role, User};

use crate::error::DatabaseError;

/// Row of `staff_users`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StaffRow {
    pub user_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<StaffRow> for User {
    type Error = DatabaseError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::from_uuid(row.user_id),
            username: row.username,
            full_name: row.full_name,
            role: row.role.parse::<Role>().map_err(DatabaseError::corrupt)?,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

/// Repository for staff users
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: UserId) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, StaffRow>(
            "SELECT user_id, username, full_name, role, active, created_at FROM staff_users WHERE user_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("User", id))?
        .try_into()
    }

    pub async fn upsert(&self, user: &User) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO staff_users (user_id, username, full_name, role, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                username = EXCLUDED.username,
                full_name = EXCLUDED.full_name,
                role = EXCLUDED.role,
                active = EXCLUDED.active
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
