//! Structural validation of invoices.
//!
//! Every check runs, so a single pass reports every problem at once. Only an
//! absent invoice stops the checks early.
//!
//! Besides the field checks, amounts are bounded by [`Money::limit`]: a line
//! whose `unit_price * qty` cannot be represented, or an invoice whose lines
//! and fragile fees add up past the limit, is rejected here instead of
//! overflowing later in the pricing stages.

use crate::calculator::FRAGILE_FEE_PER_UNIT;
use crate::invoice::{Category, Invoice, LineItem};
use crate::money::Money;

/// Collects the structural problems of an invoice, in discovery order.
///
/// An empty vector means the invoice is valid.
pub fn validate(invoice: Option<&Invoice>) -> Vec<String> {
    let invoice = match invoice {
        Some(invoice) => invoice,
        None => return vec!["Invoice is missing".to_string()],
    };

    let mut problems = Vec::new();

    if invoice.invoice_id.is_empty() {
        problems.push("Missing invoice_id".to_string());
    }
    if invoice.customer_id.is_empty() {
        problems.push("Missing customer_id".to_string());
    }
    if invoice.items.is_empty() {
        problems.push("Invoice must contain items".to_string());
    }

    for item in &invoice.items {
        validate_item(item, &mut problems);
    }

    if problems.is_empty() && !amounts_within_limit(&invoice.items) {
        problems.push("Invoice amount is too large".to_string());
    }

    problems
}

/// Checked running sum of line totals and fragile fees against the limit.
fn amounts_within_limit(items: &[LineItem]) -> bool {
    let limit = Money::limit();
    let mut running = Money::ZERO;
    for item in items {
        let fragile = if item.fragile {
            Money::from_units(FRAGILE_FEE_PER_UNIT).checked_mul(item.qty)
        } else {
            Some(Money::ZERO)
        };
        let next = item
            .unit_price
            .checked_mul(item.qty)
            .zip(fragile)
            .and_then(|(line, fee)| line.checked_add(fee))
            .and_then(|amount| running.checked_add(amount));
        match next {
            Some(sum) if sum <= limit => running = sum,
            _ => return false,
        }
    }
    true
}

fn validate_item(item: &LineItem, problems: &mut Vec<String>) {
    if item.sku.is_empty() {
        problems.push("Item sku is missing".to_string());
    }
    if item.qty <= 0 {
        problems.push(format!("Invalid qty for {}", item.sku));
    }
    if item.unit_price < Money::ZERO {
        problems.push(format!("Invalid price for {}", item.sku));
    }
    if item.category.parse::<Category>().is_err() {
        problems.push(format!("Unknown category for {}", item.sku));
    }
    if item.qty > 0 && item.unit_price >= Money::ZERO {
        let line_ok = item
            .unit_price
            .checked_mul(item.qty)
            .is_some_and(|total| total <= Money::limit());
        if !line_ok {
            problems.push(format!("Amount too large for {}", item.sku));
        }
    }
}
