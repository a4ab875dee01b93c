//! Net-weight calculation.
//!
//! Operators enter a gross reading from the scale and, for weight-based
//! items, the weight of the spool or container the goods sit on. The net
//! quantity is what actually goes into stock.
//!
//! Two flavours are provided:
//!
//! - [`compute_net`] is lenient. Anything that is not a usable number
//!   (NaN, infinity, a negative reading) degrades to zero, the same way a
//!   half-filled form row is treated.
//! - [`try_compute_net`] is strict and reports which field is malformed.
//!   Draft validation uses it to tell the operator what to fix.
//!
//! Readings are converted to [`Decimal`], which holds 28 fractional digits
//! and magnitudes up to about `7.9e28`. Positive readings below that
//! precision round to zero. Larger finite readings saturate at
//! [`Decimal::MAX`] in the lenient path and are rejected in the strict one.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::types::QuantityError;

/// Field name reported for a malformed gross reading.
pub const GROSS_FIELD: &str = "gross quantity";

/// Field name reported for a malformed packaging weight.
pub const PACKAGING_FIELD: &str = "packaging weight";

/// Coerce a raw numeric reading into a non-negative decimal.
///
/// NaN, infinite and negative inputs become zero. Finite readings beyond the
/// decimal range saturate at [`Decimal::MAX`].
#[must_use]
pub fn lenient_amount(raw: f64) -> Decimal {
    match from_reading(raw) {
        Some(value) => value.max(Decimal::ZERO),
        None if raw.is_finite() && raw > 0.0 => Decimal::MAX,
        None => Decimal::ZERO,
    }
}

/// Convert a finite reading, rounding values finer than the decimal scale.
fn from_reading(raw: f64) -> Option<Decimal> {
    if raw.is_finite() && raw.abs() < MIN_REPRESENTABLE {
        return Some(Decimal::ZERO);
    }
    Decimal::from_f64(raw)
}

/// Smallest magnitude with a non-zero decimal representation.
const MIN_REPRESENTABLE: f64 = 1e-28;

/// Convert a raw numeric reading into a non-negative decimal.
///
/// # Errors
///
/// Returns [`QuantityError::NotANumber`] for NaN, infinite or out-of-range
/// input and [`QuantityError::Negative`] for negative input.
pub fn strict_amount(raw: f64, field: &'static str) -> Result<Decimal, QuantityError> {
    let value = from_reading(raw).ok_or(QuantityError::NotANumber { field })?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(QuantityError::Negative {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Net quantity for decimal inputs.
///
/// When `has_packaging` is set and a packaging weight is present, the
/// weight is deducted and the result floored at zero. Otherwise the gross
/// quantity is already net.
#[must_use]
pub fn net_of(gross: Decimal, packaging_weight: Option<Decimal>, has_packaging: bool) -> Decimal {
    let gross = gross.max(Decimal::ZERO);
    match packaging_weight {
        Some(tare) if has_packaging => (gross - tare.max(Decimal::ZERO)).max(Decimal::ZERO),
        _ => gross,
    }
}

/// Net quantity for raw form input.
///
/// A packaging weight that is absent or NaN is ignored. An invalid gross
/// reading counts as zero.
///
/// ```
/// use packline_core::compute_net;
/// use rust_decimal::Decimal;
///
/// assert_eq!(compute_net(25.0, Some(2.5), true), Decimal::new(225, 1));
/// assert_eq!(compute_net(25.0, Some(2.5), false), Decimal::new(25, 0));
/// assert_eq!(compute_net(f64::NAN, Some(2.0), true), Decimal::ZERO);
/// ```
#[must_use]
pub fn compute_net(gross: f64, packaging_weight: Option<f64>, has_packaging: bool) -> Decimal {
    let tare = packaging_weight
        .filter(|weight| !weight.is_nan())
        .map(lenient_amount);
    net_of(lenient_amount(gross), tare, has_packaging)
}

/// Net quantity for raw form input, rejecting malformed numbers.
///
/// # Errors
///
/// Returns a [`QuantityError`] naming the field when the gross quantity is
/// not a non-negative number, or when packaging applies and its weight is
/// not a non-negative number.
pub fn try_compute_net(
    gross: f64,
    packaging_weight: Option<f64>,
    has_packaging: bool,
) -> Result<Decimal, QuantityError> {
    let gross = strict_amount(gross, GROSS_FIELD)?;
    let tare = match packaging_weight {
        Some(weight) if has_packaging => Some(strict_amount(weight, PACKAGING_FIELD)?),
        _ => None,
    };
    Ok(net_of(gross, tare, has_packaging))
}
