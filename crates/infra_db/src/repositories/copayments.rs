//! Annual copayment accumulators
//!
//! One row per `(patient_id, year)`. Capped charges run in a transaction
//! that locks the row with `SELECT ... FOR UPDATE`, so concurrent charges
//! for the same patient and year are serialized by PostgreSQL while other
//! patients proceed independently. Releasing a charge takes the same lock.

use rust_decimal::Decimal;
use sqlx::PgPool;

use core_kernel::{CalendarYear, Currency, Money, PatientId};
use domain_billing::{CappedCharge, LedgerCharge};

use super::money;
use crate::error::DatabaseError;

/// Repository for the copayment ledger
#[derive(Debug, Clone)]
pub struct CopaymentRepository {
    pool: PgPool,
    /// Currency of accumulators that do not exist yet
    currency: Currency,
}

impl CopaymentRepository {
    pub fn new(pool: PgPool, currency: Currency) -> Self {
        Self { pool, currency }
    }

    pub async fn get_accumulated(&self, patient_id: PatientId, year: CalendarYear) -> Result<Money, DatabaseError> {
        let row = sqlx::query_as::<_, (Decimal, String)>(
            "SELECT accumulated, currency FROM annual_copayments WHERE patient_id = $1 AND year = $2",
        )
        .bind(patient_id.as_uuid())
        .bind(year.value())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((amount, currency)) => money(amount, &currency),
            None => Ok(Money::zero(self.currency)),
        }
    }

    /// Adds an uncapped charge in a single upsert and returns the new total
    pub async fn add_charge(
        &self,
        patient_id: PatientId,
        year: CalendarYear,
        amount: Money,
    ) -> Result<Money, DatabaseError> {
        if amount.is_negative() {
            return Err(DatabaseError::ConstraintViolation(
                "copayment charge cannot be negative".to_string(),
            ));
        }

        let (total, currency) = sqlx::query_as::<_, (Decimal, String)>(
            r#"
            INSERT INTO annual_copayments (patient_id, year, accumulated, currency, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (patient_id, year) DO UPDATE
                SET accumulated = annual_copayments.accumulated + EXCLUDED.accumulated,
                    updated_at = NOW()
            RETURNING accumulated, currency
            "#,
        )
        .bind(patient_id.as_uuid())
        .bind(year.value())
        .bind(amount.amount())
        .bind(amount.currency().code())
        .fetch_one(&self.pool)
        .await?;

        money(total, &currency)
    }

    /// Reads, caps and adds under a row lock
    pub async fn charge_capped(&self, charge: &CappedCharge) -> Result<LedgerCharge, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO annual_copayments (patient_id, year, accumulated, currency)
            VALUES ($1, $2, 0, $3)
            ON CONFLICT (patient_id, year) DO NOTHING
            "#,
        )
        .bind(charge.patient_id.as_uuid())
        .bind(charge.year.value())
        .bind(charge.ceiling.currency().code())
        .execute(&mut *tx)
        .await?;

        let (amount, currency) = sqlx::query_as::<_, (Decimal, String)>(
            r#"
            SELECT accumulated, currency FROM annual_copayments
            WHERE patient_id = $1 AND year = $2
            FOR UPDATE
            "#,
        )
        .bind(charge.patient_id.as_uuid())
        .bind(charge.year.value())
        .fetch_one(&mut *tx)
        .await?;

        let outcome = charge
            .settle(money(amount, &currency)?)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;

        if let Some(reference) = &charge.reference {
            sqlx::query(
                r#"
                INSERT INTO copayment_charges (reference, patient_id, year, amount)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(reference)
            .bind(charge.patient_id.as_uuid())
            .bind(charge.year.value())
            .bind(outcome.charged.amount())
            .execute(&mut *tx)
            .await?;
        }

        if outcome.charged.is_positive() {
            sqlx::query(
                r#"
                UPDATE annual_copayments
                SET accumulated = $3, updated_at = NOW()
                WHERE patient_id = $1 AND year = $2
                "#,
            )
            .bind(charge.patient_id.as_uuid())
            .bind(charge.year.value())
            .bind(outcome.accumulated_after.amount())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(outcome)
    }

    /// Deletes the charge recorded under `reference` and subtracts it, under
    /// the same row lock as [`charge_capped`](Self::charge_capped)
    pub async fn release_charge(
        &self,
        patient_id: PatientId,
        year: CalendarYear,
        reference: &str,
    ) -> Result<Money, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i32>(
            "SELECT year FROM annual_copayments WHERE patient_id = $1 AND year = $2 FOR UPDATE",
        )
        .bind(patient_id.as_uuid())
        .bind(year.value())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Copayment charge", reference))?;

        let amount = sqlx::query_scalar::<_, Decimal>(
            r#"
            DELETE FROM copayment_charges
            WHERE reference = $1 AND patient_id = $2 AND year = $3
            RETURNING amount
            "#,
        )
        .bind(reference)
        .bind(patient_id.as_uuid())
        .bind(year.value())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Copayment charge", reference))?;

        let (total, currency) = sqlx::query_as::<_, (Decimal, String)>(
            r#"
            UPDATE annual_copayments
            SET accumulated = GREATEST(accumulated - $3, 0), updated_at = NOW()
            WHERE patient_id = $1 AND year = $2
            RETURNING accumulated, currency
            "#,
        )
        .bind(patient_id.as_uuid())
        .bind(year.value())
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        money(total, &currency)
    }
}
