//! Other charges attached to a work record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of non-labor charge billed alongside a work record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeType {
    /// Plants, mulch, soil amendments and similar.
    Material,
    /// An extra service not covered by labor time.
    Service,
    /// Debris removal (bags, loads).
    Debris,
    /// Material delivery.
    Delivery,
}

/// A non-labor charge such as materials or debris removal.
///
/// # Example
///
/// ```
/// use billable_hours_engine::models::{ChargeType, OtherCharge};
/// use rust_decimal::Decimal;
///
/// let charge = OtherCharge::new(ChargeType::Debris, "Debris bag", Decimal::from(2), Decimal::from(25));
/// assert_eq!(charge.total_cost, Decimal::from(50));
/// assert!(charge.billable);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherCharge {
    /// The kind of charge.
    pub charge_type: ChargeType,
    /// Free-text description shown on the invoice.
    pub description: String,
    /// Number of units.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_rate: Decimal,
    /// Total cost of the charge.
    pub total_cost: Decimal,
    /// Whether the charge is passed on to the client.
    #[serde(default = "default_billable")]
    pub billable: bool,
}

fn default_billable() -> bool {
    true
}

impl OtherCharge {
    /// Creates a billable charge with `total_cost = quantity * unit_rate`.
    pub fn new(
        charge_type: ChargeType,
        description: impl Into<String>,
        quantity: Decimal,
        unit_rate: Decimal,
    ) -> Self {
        Self {
            charge_type,
            description: description.into(),
            quantity,
            unit_rate,
            total_cost: quantity * unit_rate,
            billable: true,
        }
    }
}
