//! API configuration
//!
//! Values are layered: compiled-in defaults first, then environment
//! variables prefixed `HOSPITAL_`. Nested keys use `__`, e.g.
//! `HOSPITAL_BILLING__STANDARD_COPAYMENT=45000`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, Currency, Money, Timezone};
use domain_billing::{BillingError, BillingPolicy};
use domain_orders::OrderNumber;

/// Copayment rules, as configured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingSettings {
    pub max_annual_copayment: Decimal,
    pub standard_copayment: Decimal,
    pub currency: Currency,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            max_annual_copayment: Decimal::from(BillingPolicy::DEFAULT_MAX_ANNUAL_COPAYMENT),
            standard_copayment: Decimal::from(BillingPolicy::DEFAULT_STANDARD_COPAYMENT),
            currency: Currency::COP,
        }
    }
}

impl BillingSettings {
    /// Validates the settings into a billing policy
    pub fn policy(&self) -> Result<BillingPolicy, BillingError> {
        BillingPolicy::new(
            Money::new(self.max_annual_copayment, self.currency),
            Money::new(self.standard_copayment, self.currency),
        )
    }
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Log level, used when `RUST_LOG` is unset
    pub log_level: String,
    /// Hospital timezone; decides order dates and billing years
    pub timezone: Timezone,
    /// Size of the order-number space
    pub order_number_capacity: u32,
    pub billing: BillingSettings,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/hospital".to_string(),
            log_level: "info".to_string(),
            timezone: Timezone::default(),
            order_number_capacity: OrderNumber::MAX,
            billing: BillingSettings::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(Self::environment())
    }

    /// Loads configuration from an explicit environment source
    pub fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&ApiConfig::default())?)
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// The `HOSPITAL_`-prefixed environment source
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix("HOSPITAL")
            .prefix_separator("_")
            .separator("__")
    }

    /// Rejects settings the services cannot start with
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(CoreError::configuration("jwt_secret must not be empty"));
        }
        if !(OrderNumber::MIN..=OrderNumber::MAX).contains(&self.order_number_capacity) {
            return Err(CoreError::configuration(format!(
                "order_number_capacity must be between {} and {}",
                OrderNumber::MIN,
                OrderNumber::MAX
            )));
        }
        self.billing
            .policy()
            .map_err(|e| CoreError::configuration(format!("billing: {}", e)))?;
        Ok(())
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
