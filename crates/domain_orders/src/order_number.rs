//! Six-digit order numbers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OrderError;

/// Number of digits in the canonical textual form
pub const ORDER_NUMBER_WIDTH: usize = 6;

/// A hospital-wide unique order number
///
/// Rendered zero-padded to six digits (`000042`). Valid values are
/// `1..=999_999`; zero is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(u32);

impl OrderNumber {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 999_999;

    pub fn new(value: u32) -> Result<Self, OrderError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(OrderError::validation(format!(
                "order number {} outside {}..={}",
                value,
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = ORDER_NUMBER_WIDTH)
    }
}

impl FromStr for OrderNumber {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ORDER_NUMBER_WIDTH || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderError::validation(format!(
                "order number must be exactly {} digits, got '{}'",
                ORDER_NUMBER_WIDTH, s
            )));
        }
        let value: u32 = s
            .parse()
            .map_err(|_| OrderError::validation(format!("invalid order number '{}'", s)))?;
        Self::new(value)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.to_string()
    }
}

/// The set of numbers the allocator may hand out: `1..=capacity`
///
/// Production uses the full six-digit range; a smaller capacity lets tests
/// exercise exhaustion without creating a million orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderNumberSpace {
    capacity: u32,
}

impl OrderNumberSpace {
    pub fn new(capacity: u32) -> Result<Self, OrderError> {
        if capacity == 0 || capacity > OrderNumber::MAX {
            return Err(OrderError::validation(format!(
                "order number capacity must be within 1..={}",
                OrderNumber::MAX
            )));
        }
        Ok(Self { capacity })
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// The `offset`-th candidate after `start`, wrapping within the space
    pub(crate) fn nth_from(&self, start: u32, offset: u32) -> OrderNumber {
        let zero_based = (start - 1 + offset) % self.capacity;
        OrderNumber(zero_based + 1)
    }

    /// The number following `number`, wrapping back to 1
    pub(crate) fn successor(&self, number: OrderNumber) -> u32 {
        number.0 % self.capacity + 1
    }
}

impl Default for OrderNumberSpace {
    fn default() -> Self {
        Self {
            capacity: OrderNumber::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_zero_padded() {
        assert_eq!(OrderNumber::new(1).unwrap().to_string(), "000001");
        assert_eq!(OrderNumber::new(999_999).unwrap().to_string(), "999999");
    }

    #[test]
    fn test_bounds() {
        assert!(OrderNumber::new(0).is_err());
        assert!(OrderNumber::new(1_000_000).is_err());
    }

    #[test]
    fn test_parse_requires_six_digits() {
        assert_eq!("000042".parse::<OrderNumber>().unwrap().value(), 42);
        assert!("42".parse::<OrderNumber>().is_err());
        assert!("00004a".parse::<OrderNumber>().is_err());
        assert!("000000".parse::<OrderNumber>().is_err());
        assert!("+00042".parse::<OrderNumber>().is_err());
    }

    #[test]
    fn test_serde_uses_padded_string() {
        let number = OrderNumber::new(7).unwrap();
        let json = serde_json::to_string(&number).unwrap();
        assert_eq!(json, "\"000007\"");
        assert_eq!(serde_json::from_str::<OrderNumber>(&json).unwrap(), number);
        assert!(serde_json::from_str::<OrderNumber>("\"7\"").is_err());
    }

    #[test]
    fn test_space_wraps() {
        let space = OrderNumberSpace::new(5).unwrap();
        assert_eq!(space.nth_from(4, 0).value(), 4);
        assert_eq!(space.nth_from(4, 1).value(), 5);
        assert_eq!(space.nth_from(4, 2).value(), 1);
        assert_eq!(space.successor(OrderNumber(5)), 1);
        assert_eq!(space.successor(OrderNumber(2)), 3);
    }

    #[test]
    fn test_space_capacity_bounds() {
        assert!(OrderNumberSpace::new(0).is_err());
        assert!(OrderNumberSpace::new(1_000_000).is_err());
        assert_eq!(OrderNumberSpace::default().capacity(), 999_999);
    }
}
