//! Catalog entities supplied by the catalog feeds.
//!
//! Catalog entries are immutable once handed to the core.  The placement model
//! holds them behind `Arc` so a placed charm shares the catalog entry it was
//! created from rather than copying it.
//!
//! # Money
//!
//! Prices are stored as integer cents in [`Price`].  Binary floating point
//! cannot represent `19.99` exactly, so summing `f64` amounts drifts
//! (`19.99 + 4.99 + 5.99` is not `30.97` in `f64`).  Integer cents keep every
//! total exact; conversion to and from decimal units happens only at the
//! serialization boundary.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rendered edge length, in preview pixels, of a charm with no intrinsic size.
pub const DEFAULT_CHARM_SIZE: u32 = 50;

/// Errors raised when converting a decimal amount into a [`Price`].
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// The amount was NaN or infinite.
    #[error("price must be a finite number, got {0}")]
    NotFinite(f64),

    /// The amount was below zero.
    #[error("price must not be negative, got {0}")]
    Negative(f64),

    /// The amount does not fit in the cent counter.
    #[error("price {0} is too large")]
    OutOfRange(f64),
}

/// A non-negative money amount with cent precision.
///
/// Serialized as a decimal number of currency units (`4.99`), rounded to the
/// nearest cent on the way in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price {
    cents: u64,
}

impl Price {
    /// The zero amount.
    pub const ZERO: Price = Price { cents: 0 };

    /// Creates a price from an integer number of cents.
    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Creates a price from a decimal amount of currency units, rounding to
    /// the nearest cent.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if `amount` is not finite, is negative, or is too
    /// large to represent.
    pub fn from_units(amount: f64) -> Result<Self, PriceError> {
        if !amount.is_finite() {
            return Err(PriceError::NotFinite(amount));
        }
        if amount < 0.0 {
            return Err(PriceError::Negative(amount));
        }
        let cents = (amount * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(PriceError::OutOfRange(amount));
        }
        Ok(Self {
            cents: cents as u64,
        })
    }

    /// Returns the amount in cents.
    pub const fn cents(self) -> u64 {
        self.cents
    }

    /// Returns the amount in currency units.
    pub fn as_units(self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Returns the whole-unit part (e.g. `30` for `30.97`).
    pub const fn whole_units(self) -> u64 {
        self.cents / 100
    }

    /// Returns the fractional cent part (e.g. `97` for `30.97`).
    pub const fn fraction_cents(self) -> u64 {
        self.cents % 100
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.whole_units(), self.fraction_cents())
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price::from_cents(self.cents.saturating_add(rhs.cents))
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Price) {
        *self = *self + rhs;
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Price> for Price {
    fn sum<I: Iterator<Item = &'a Price>>(iter: I) -> Price {
        iter.copied().sum()
    }
}

impl TryFrom<f64> for Price {
    type Error = PriceError;

    fn try_from(amount: f64) -> Result<Self, Self::Error> {
        Price::from_units(amount)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> f64 {
        price.as_units()
    }
}

/// Catalog identifier of a charm (e.g. `"charm-1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharmId(pub String);

impl CharmId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharmId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A decorative item that can be placed on a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charm {
    /// Catalog identifier.
    pub id: CharmId,
    /// Display name (e.g. `"Star Charm"`).
    pub name: String,
    /// Image reference rendered in the palette and on the case.
    pub image_url: String,
    /// Unit price added to the order for every placement of this charm.
    pub price: Price,
    /// Intrinsic width in preview pixels, if the artwork specifies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Intrinsic height in preview pixels, if the artwork specifies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Charm {
    /// Returns the rendered `(width, height)`, substituting
    /// [`DEFAULT_CHARM_SIZE`] for each missing dimension.
    pub fn size(&self) -> (u32, u32) {
        (
            self.width.unwrap_or(DEFAULT_CHARM_SIZE),
            self.height.unwrap_or(DEFAULT_CHARM_SIZE),
        )
    }
}

/// A phone model whose case can be customized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneModel {
    pub id: String,
    pub name: String,
    /// Image of the blank case used as the preview surface.
    pub case_image_url: String,
}

/// A phone color option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneColor {
    pub id: String,
    /// Machine name (e.g. `"sierra-blue"`).
    pub name: String,
    /// CSS color code (e.g. `"#A7C1D9"`).
    pub color_code: String,
    /// Human-readable label (e.g. `"Sierra Blue"`).
    pub display_name: String,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_charm(width: Option<u32>, height: Option<u32>) -> Charm {
        Charm {
            id: CharmId::from("charm-1"),
            name: "Star Charm".to_string(),
            image_url: "star.png".to_string(),
            price: Price::from_cents(499),
            width,
            height,
        }
    }

    // ── Price conversion ──────────────────────────────────────────────────────

    #[test]
    fn test_price_from_units_rounds_to_nearest_cent() {
        assert_eq!(Price::from_units(4.99).unwrap().cents(), 499);
        assert_eq!(Price::from_units(0.005).unwrap().cents(), 1);
        assert_eq!(Price::from_units(19.994).unwrap().cents(), 1999);
    }

    #[test]
    fn test_price_from_units_rejects_negative() {
        assert_eq!(Price::from_units(-1.0), Err(PriceError::Negative(-1.0)));
    }

    #[test]
    fn test_price_from_units_rejects_nan_and_infinity() {
        assert!(matches!(Price::from_units(f64::NAN), Err(PriceError::NotFinite(_))));
        assert!(matches!(
            Price::from_units(f64::INFINITY),
            Err(PriceError::NotFinite(_))
        ));
    }

    #[test]
    fn test_price_sum_is_exact() {
        let total: Price = [1999u64, 499, 599].iter().map(|c| Price::from_cents(*c)).sum();
        assert_eq!(total, Price::from_units(30.97).unwrap());
        assert_eq!(total.to_string(), "30.97");
    }

    #[test]
    fn test_price_display_pads_cents() {
        assert_eq!(Price::from_cents(1905).to_string(), "19.05");
        assert_eq!(Price::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_price_add_saturates_instead_of_overflowing() {
        let max = Price::from_cents(u64::MAX);
        assert_eq!(max + Price::from_cents(1), max);
    }

    #[test]
    fn test_price_deserializes_from_decimal_number() {
        let price: Price = serde_json::from_str("5.99").unwrap();
        assert_eq!(price.cents(), 599);
        assert_eq!(serde_json::to_string(&price).unwrap(), "5.99");
    }

    #[test]
    fn test_price_deserialize_rejects_negative_number() {
        assert!(serde_json::from_str::<Price>("-0.5").is_err());
    }

    // ── Charm ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_charm_size_falls_back_to_default_when_absent() {
        assert_eq!(make_charm(None, None).size(), (DEFAULT_CHARM_SIZE, DEFAULT_CHARM_SIZE));
    }

    #[test]
    fn test_charm_size_uses_intrinsic_dimensions_when_present() {
        assert_eq!(make_charm(Some(64), Some(32)).size(), (64, 32));
        assert_eq!(make_charm(Some(64), None).size(), (64, DEFAULT_CHARM_SIZE));
    }

    #[test]
    fn test_charm_json_omits_absent_dimensions() {
        let json = serde_json::to_string(&make_charm(None, None)).unwrap();
        assert!(!json.contains("width"));
        assert!(json.contains("\"price\":4.99"));
    }
}
