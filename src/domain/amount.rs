//! Amount types
//!
//! Domain primitives for monetary values in minor units (cents).
//! All amounts are validated at construction time, ensuring invalid values
//! cannot exist in the system. Integer minor units keep the arithmetic
//! exact; decimal-string formatting belongs to the presentation boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum representable value in minor units (one trillion major units).
/// Kept far below `i64::MAX` so a single credit can never overflow.
const MAX_MINOR_UNITS: i64 = 100_000_000_000_000;

/// Amount represents a validated transfer amount in minor units.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Value never exceeds [`MAX_MINOR_UNITS`]
///
/// # Example
/// ```
/// use quantumbank::domain::Amount;
///
/// let amount = Amount::new(2500).unwrap();
/// assert_eq!(amount.value(), 2500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

/// Errors that can occur when creating an Amount or Balance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0} minor units)")]
    NotPositive(i64),

    #[error("Amount exceeds maximum allowed value ({MAX_MINOR_UNITS} minor units)")]
    Overflow,
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::Overflow` if value exceeds the ceiling
    pub fn new(minor_units: i64) -> Result<Self, AmountError> {
        if minor_units <= 0 {
            return Err(AmountError::NotPositive(minor_units));
        }

        if minor_units > MAX_MINOR_UNITS {
            return Err(AmountError::Overflow);
        }

        Ok(Self(minor_units))
    }

    /// Get the value in minor units.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

// Note: no Add/Sub operators. Balances change only through explicit
// credit/debit with validation.

/// Balance represents an account balance in minor units.
/// Unlike Amount, Balance can be zero; it can never be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Balance(i64);

impl Balance {
    /// Create a new balance (zero or positive)
    pub fn new(minor_units: i64) -> Result<Self, AmountError> {
        if minor_units < 0 {
            return Err(AmountError::NotPositive(minor_units));
        }

        if minor_units > MAX_MINOR_UNITS {
            return Err(AmountError::Overflow);
        }

        Ok(Self(minor_units))
    }

    /// Create a zero balance
    pub fn zero() -> Self {
        Self(0)
    }

    /// Get the value in minor units
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Check if balance is sufficient for a debit
    pub fn is_sufficient_for(&self, amount: &Amount) -> bool {
        self.0 >= amount.value()
    }

    /// Add amount to balance
    pub fn credit(&self, amount: &Amount) -> Result<Balance, AmountError> {
        Balance::new(self.0 + amount.value())
    }

    /// Subtract amount from balance
    pub fn debit(&self, amount: &Amount) -> Result<Balance, AmountError> {
        Balance::new(self.0 - amount.value())
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}

impl TryFrom<i64> for Balance {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Balance::new(value)
    }
}

impl From<Balance> for i64 {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}
