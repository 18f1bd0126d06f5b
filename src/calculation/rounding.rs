//! Half-hour rounding of billable hours.
//!
//! Rounding is governed by a process-wide [`RoundingConfig`] that is read
//! from a settings provider on every call, so a settings change applies to
//! the very next calculation.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::EngineError;

/// Half-hour units in one hour.
const HALF_HOURS_PER_HOUR: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// How hours are snapped to a half-hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMethod {
    /// Always round up to the next half-hour.
    Up,
    /// Always round down to the previous half-hour.
    Down,
    /// Round to the closest half-hour; quarter-hour ties go up.
    #[default]
    Nearest,
}

impl RoundingMethod {
    /// Resolves a stored setting, falling back to [`RoundingMethod::Nearest`].
    ///
    /// An unknown value is a configuration mistake, not a reason to fail a
    /// calculation, so it is logged and replaced.
    ///
    /// # Example
    ///
    /// ```
    /// use billable_hours_engine::calculation::RoundingMethod;
    ///
    /// assert_eq!(RoundingMethod::from_setting("UP"), RoundingMethod::Up);
    /// assert_eq!(RoundingMethod::from_setting("invalid"), RoundingMethod::Nearest);
    /// ```
    pub fn from_setting(value: &str) -> Self {
        match value.parse() {
            Ok(method) => method,
            Err(err) => {
                warn!(error = %err, "Unknown rounding method, using nearest");
                RoundingMethod::Nearest
            }
        }
    }

    /// The canonical setting string.
    pub fn as_str(self) -> &'static str {
        match self {
            RoundingMethod::Up => "up",
            RoundingMethod::Down => "down",
            RoundingMethod::Nearest => "nearest",
        }
    }
}

impl FromStr for RoundingMethod {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(RoundingMethod::Up),
            "down" => Ok(RoundingMethod::Down),
            "nearest" => Ok(RoundingMethod::Nearest),
            _ => Err(EngineError::InvalidRoundingMethod {
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for RoundingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rounding settings in effect for one calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundingConfig {
    /// Whether half-hour rounding is applied at all.
    pub enabled: bool,
    /// The rounding direction.
    pub method: RoundingMethod,
}

impl RoundingConfig {
    /// Rounding switched off.
    pub const DISABLED: RoundingConfig = RoundingConfig {
        enabled: false,
        method: RoundingMethod::Nearest,
    };

    /// Rounding switched on with the given method.
    pub fn enabled(method: RoundingMethod) -> Self {
        Self {
            enabled: true,
            method,
        }
    }
}

/// Rounds a value to 2 decimal places, midpoints away from zero.
pub fn round_to_two_decimals(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Snaps hours to a multiple of 0.5 using `method`.
///
/// Negative input is clamped to zero first.
///
/// # Examples
///
/// ```
/// use billable_hours_engine::calculation::{round_to_half_hour, RoundingMethod};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let hours = Decimal::from_str("5.25").unwrap();
/// assert_eq!(round_to_half_hour(hours, RoundingMethod::Nearest), Decimal::from_str("5.5").unwrap());
/// assert_eq!(round_to_half_hour(hours, RoundingMethod::Down), Decimal::from_str("5.0").unwrap());
/// assert_eq!(round_to_half_hour(hours, RoundingMethod::Up), Decimal::from_str("5.5").unwrap());
/// ```
pub fn round_to_half_hour(hours: Decimal, method: RoundingMethod) -> Decimal {
    let hours = hours.max(Decimal::ZERO);
    let half_hour_units = hours * HALF_HOURS_PER_HOUR;

    let rounded_units = match method {
        RoundingMethod::Up => half_hour_units.ceil(),
        RoundingMethod::Down => half_hour_units.floor(),
        RoundingMethod::Nearest => {
            half_hour_units.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        }
    };

    rounded_units / HALF_HOURS_PER_HOUR
}

/// Applies the rounding policy to an hours value.
///
/// When rounding is disabled the value passes through untouched, negative
/// or not; clamping belongs to the billable hours calculation.
///
/// # Example
///
/// ```
/// use billable_hours_engine::calculation::{apply_rounding, RoundingConfig, RoundingMethod};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let hours = Decimal::from_str("7.1").unwrap();
/// assert_eq!(apply_rounding(hours, &RoundingConfig::DISABLED), hours);
/// assert_eq!(
///     apply_rounding(hours, &RoundingConfig::enabled(RoundingMethod::Up)),
///     Decimal::from_str("7.5").unwrap()
/// );
/// ```
pub fn apply_rounding(hours: Decimal, config: &RoundingConfig) -> Decimal {
    if !config.enabled {
        return hours;
    }
    round_to_half_hour(hours, config.method)
}
