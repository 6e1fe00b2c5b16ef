//! Unit newtypes for PV plant quantities.
//!
//! Equipment records mix watts and kilowatts, amperes and milliamperes,
//! absolute and relative temperature coefficients. Wrapping the canonical
//! quantities keeps those from being combined by accident.
//!
//! All types are `#[repr(transparent)]` and serialize as bare numbers, so a
//! record holding [`Amperes`] or [`Watts`] still produces plain JSON fields.
//!
//! ```
//! use pvplant_core::units::{Megawatts, Watts};
//!
//! let peak = Watts(2_500_000.0);
//! assert_eq!(peak.to_megawatts(), Megawatts(2.5));
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{} {}", self.0, $unit_name)
            }
        }

        impl $type {
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// Round to `decimals` places, halves away from zero.
            #[inline]
            pub fn round_to(self, decimals: u32) -> Self {
                Self(round_to(self.0, decimals))
            }
        }
    };
}

/// Round `value` to `decimals` decimal places, halves away from zero.
///
/// Precisions beyond what an `f64` can scale return `value` unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let Ok(exponent) = i32::try_from(decimals) else {
        return value;
    };
    let factor = 10f64.powi(exponent);
    let scaled = value * factor;
    if !factor.is_finite() || !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

// =============================================================================
// Power
// =============================================================================

/// Power in watts (W). The unit of AC measurements and nameplate ratings.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Watts(pub f64);

impl_unit_ops!(Watts, "W");

/// Power in kilowatts (kW). Vendor exports state converter ratings this way.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilowatts(pub f64);

impl_unit_ops!(Kilowatts, "kW");

/// Power in megawatts (MW). Plant-level reporting unit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl_unit_ops!(Megawatts, "MW");

impl Watts {
    #[inline]
    pub fn to_kilowatts(self) -> Kilowatts {
        Kilowatts(self.0 / 1e3)
    }

    #[inline]
    pub fn to_megawatts(self) -> Megawatts {
        Megawatts(self.0 / 1e6)
    }
}

impl Kilowatts {
    #[inline]
    pub fn to_watts(self) -> Watts {
        Watts(self.0 * 1e3)
    }
}

// =============================================================================
// Electrical
// =============================================================================

/// Current in amperes (A)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Amperes(pub f64);

impl_unit_ops!(Amperes, "A");

/// Voltage in volts (V)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Volts(pub f64);

impl_unit_ops!(Volts, "V");

impl Mul<Volts> for Amperes {
    type Output = Watts;
    fn mul(self, rhs: Volts) -> Watts {
        Watts(self.0 * rhs.0)
    }
}

// =============================================================================
// Temperature
// =============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(pub f64);

impl_unit_ops!(Celsius, "°C");

/// Relative temperature coefficient in percent per degree Celsius (%/°C).
///
/// The canonical form for `alpha_sc`, `beta_oc` and `gamma_r`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PercentPerDegree(pub f64);

impl_unit_ops!(PercentPerDegree, "%/°C");

impl PercentPerDegree {
    /// Express an absolute coefficient (unit/°C) relative to its reference value.
    ///
    /// Returns `None` when the reference is zero or not finite.
    pub fn from_absolute(coefficient: f64, reference: f64) -> Option<Self> {
        if reference == 0.0 || !reference.is_finite() || !coefficient.is_finite() {
            return None;
        }
        Some(Self(coefficient * 100.0 / reference))
    }

    /// Inverse of [`PercentPerDegree::from_absolute`].
    pub fn to_absolute(self, reference: f64) -> f64 {
        self.0 * reference / 100.0
    }
}
