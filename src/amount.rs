//! The fixed-point monetary amount used by transactions and budgets.

use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The maximum number of digits an amount may have in total.
const MAX_DIGITS: u32 = 12;

/// The number of fractional digits an amount may have.
const DECIMAL_PLACES: u32 = 2;

/// A monetary amount: a fixed-point decimal with at most two fractional
/// digits and at most twelve digits in total.
///
/// Amounts are stored in the database as integer cents so that SQL
/// aggregation is exact. On the wire an amount is a decimal string, e.g.
/// `"1000.00"`; deserialization also accepts plain JSON numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// An amount of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal value.
    ///
    /// # Errors
    /// This function will return an error if `value` has more than two
    /// fractional digits or more than ten digits before the decimal point.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value.scale() > DECIMAL_PLACES {
            return Err(Error::Validation {
                field: "amount",
                message: format!(
                    "ensure that there are no more than {DECIMAL_PLACES} decimal places"
                ),
            });
        }

        let integer_digit_limit = Decimal::from(10i64.pow(MAX_DIGITS - DECIMAL_PLACES));

        if value.abs() >= integer_digit_limit {
            return Err(Error::Validation {
                field: "amount",
                message: format!("ensure that there are no more than {MAX_DIGITS} digits in total"),
            });
        }

        Ok(Self(value))
    }

    /// Create an amount from a whole number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, DECIMAL_PLACES))
    }

    /// The amount as a whole number of cents.
    pub fn as_cents(&self) -> i64 {
        (self.0 * Decimal::ONE_HUNDRED)
            .to_i64()
            .expect("validated amounts always fit in integer cents")
    }

    /// The amount as a decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
