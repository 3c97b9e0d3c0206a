//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Composite products sum MANY option prices × quantities, so the        │
//! │  drift compounds into visible cent-level errors on price ranges.       │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal                                          │
//! │    0.1 + 0.2 = 0.3 exactly                                              │
//! │    (8 - 6) / 8 × 100 = 25 exactly (discount percent)                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use daffodil_core::money::Money;
//!
//! // Create from minor units (preferred)
//! let price = Money::from_minor_units(1099); // 10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;                              // 21.98
//! let total = price + Money::from_minor_units(500);     // 15.99
//! assert_eq!(doubled.to_string(), "21.98");
//! assert_eq!(total.to_string(), "15.99");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Decimal places used when rounding for display.
pub const CURRENCY_DECIMAL_PLACES: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value as an exact base-10 decimal.
///
/// ## Design Decisions
/// - **Decimal (signed)**: Allows negative values for discounts applied as deltas
/// - **Single field tuple struct**: Zero-cost abstraction over `Decimal`
/// - **Serialized as a string**: `"10.99"` survives JSON without float parsing
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──┬──► Prices.original_price ──► PriceRange.min/max     │
/// │                  │                                                      │
/// │  Discount.amount ┴──► Prices.discounted_price                          │
/// │                                                                         │
/// │  CompositeItemOption.price × quantity ──► summed into the above        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from minor units (cents for two-decimal currencies).
    ///
    /// ## Example
    /// ```rust
    /// use daffodil_core::money::Money;
    ///
    /// let price = Money::from_minor_units(1099);
    /// assert_eq!(price.to_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_minor_units(minor: i64) -> Self {
        Money(Decimal::new(minor, CURRENCY_DECIMAL_PLACES))
    }

    /// Returns the exact decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiplies money by a selected quantity.
    ///
    /// ## Example
    /// ```rust
    /// use daffodil_core::money::Money;
    ///
    /// let unit_price = Money::from_minor_units(299);
    /// assert_eq!(unit_price.multiply_quantity(3).to_string(), "8.97");
    /// ```
    ///
    /// ## Panics
    /// On overflow, like the `*` operator. Use
    /// [`checked_multiply_quantity`](Self::checked_multiply_quantity) for
    /// caller-supplied quantities.
    #[inline]
    pub fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Adds, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts, returning `None` on overflow.
    #[inline]
    pub fn checked_sub(&self, other: Money) -> Option<Self> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Expresses `self` as a percentage of `whole`.
    ///
    /// A zero `whole` yields zero rather than dividing by zero. Returns
    /// `None` when the percentage is too large to represent.
    ///
    /// ## Example
    /// ```rust
    /// use daffodil_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let saved = Money::from_minor_units(200);
    /// let original = Money::from_minor_units(800);
    /// assert_eq!(saved.percent_of(original), Some(Decimal::from(25)));
    /// ```
    pub fn percent_of(&self, whole: Money) -> Option<Decimal> {
        if whole.is_zero() {
            return Some(Decimal::ZERO);
        }
        self.0
            .checked_div(whole.0)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    /// Rounds to currency precision (two places, half away from zero).
    pub fn round_to_currency(&self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(CURRENCY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount rounded to currency precision, without a symbol.
///
/// ## Note
/// Currency symbols and localization belong to the storefront.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rounded = self.round_to_currency().0;
        rounded.rescale(CURRENCY_DECIMAL_PLACES);
        write!(f, "{}", rounded)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
