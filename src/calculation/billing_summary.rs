//! Per-client billing totals for invoice preparation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::WorkRecord;

use super::billable_hours::{BillingInputs, calculate_billable_hours};
use super::rounding::round_to_two_decimals;

/// Billing totals for one client over a set of work records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientBillingSummary {
    /// The client.
    pub client_id: String,
    /// The client's display name, taken from the first record that has one.
    pub client_name: Option<String>,
    /// Number of records included.
    pub record_count: usize,
    /// Records with no hourly rate; their hours are billed at zero.
    pub unpriced_records: usize,
    /// Sum of billable hours.
    pub billable_hours: Decimal,
    /// Sum of billable hours times hourly rate.
    pub labor_amount: Decimal,
    /// Sum of billable other charges.
    pub charges_amount: Decimal,
    /// Labor plus charges.
    pub total_amount: Decimal,
}

/// Totals billable hours, labor and charges per client, ordered by client id.
///
/// Records without stored billable hours are priced from the calculator.
///
/// # Example
///
/// ```
/// use billable_hours_engine::calculation::summarize_billing;
/// use billable_hours_engine::models::{NewWorkRecord, WorkRecord};
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
///
/// let mut new = NewWorkRecord::new(NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(), "stoller", "maintenance", Decimal::from(4));
/// new.hourly_rate = Some(Decimal::from(55));
/// let records = vec![WorkRecord::from_new(new, Utc::now())];
///
/// let summary = summarize_billing(&records);
/// assert_eq!(summary[0].labor_amount, Decimal::from(220));
/// ```
pub fn summarize_billing(records: &[WorkRecord]) -> Vec<ClientBillingSummary> {
    let mut clients: BTreeMap<&str, ClientBillingSummary> = BTreeMap::new();

    for record in records {
        let summary = clients
            .entry(record.client_id.as_str())
            .or_insert_with(|| ClientBillingSummary {
                client_id: record.client_id.clone(),
                client_name: None,
                record_count: 0,
                unpriced_records: 0,
                billable_hours: Decimal::ZERO,
                labor_amount: Decimal::ZERO,
                charges_amount: Decimal::ZERO,
                total_amount: Decimal::ZERO,
            });

        if summary.client_name.is_none() {
            summary.client_name = record.client_name.clone();
        }

        let billable_hours = record
            .billable_hours
            .unwrap_or_else(|| calculate_billable_hours(&BillingInputs::from(record)));

        summary.record_count += 1;
        summary.billable_hours += billable_hours;
        match record.hourly_rate {
            Some(rate) => summary.labor_amount += billable_hours * rate,
            None => summary.unpriced_records += 1,
        }
        summary.charges_amount += record
            .charges
            .iter()
            .filter(|charge| charge.billable)
            .map(|charge| charge.total_cost)
            .sum::<Decimal>();
    }

    clients
        .into_values()
        .map(|mut summary| {
            summary.labor_amount = round_to_two_decimals(summary.labor_amount);
            summary.charges_amount = round_to_two_decimals(summary.charges_amount);
            summary.total_amount = summary.labor_amount + summary.charges_amount;
            summary
        })
        .collect()
}
