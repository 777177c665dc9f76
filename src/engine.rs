//! Core pricing engine.
//!
//! Validates an invoice, runs the pricing stages in order and aggregates
//! their outputs into a clamped total plus advisory warnings. The engine holds
//! only immutable rate tables, so a single instance can price any number of
//! invoices, from any number of threads.

use crate::calculator::{self, Warning};
use crate::error::{Result, ValidationError};
use crate::invoice::{Invoice, MembershipTier};
use crate::money::Money;
use crate::rates::RateTables;
use crate::validation;
use log::debug;
use serde::Serialize;

/// Every derived amount of one computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub shipping: Money,
    pub fragile_fee: Money,
    pub discount: Money,
    pub tax: Money,
    /// `subtotal + shipping + fragile_fee + tax - discount`, floored at zero.
    pub total: Money,
}

/// Output of [`PricingEngine::compute_total`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputationResult {
    pub total: Money,
    /// Discount-stage warnings first, then the membership upgrade hint.
    pub warnings: Vec<Warning>,
    pub breakdown: PriceBreakdown,
}

impl ComputationResult {
    /// Warning texts in discovery order.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(Warning::to_string).collect()
    }
}

/// The invoice pricing engine.
///
/// # Examples
///
/// ```
/// use invoice_pricing::{Invoice, LineItem, Money, PricingEngine};
///
/// let invoice = Invoice::new("INV001", "CUST01", "TH")
///     .with_item(LineItem::new("ITEM01", "book", Money::from_units(100), 2));
///
/// let result = PricingEngine::new().compute_total(&invoice).unwrap();
/// assert_eq!(result.total.to_string(), "274.0000");
/// assert!(result.warnings.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct PricingEngine {
    rates: RateTables,
}

impl PricingEngine {
    /// Creates an engine using the built-in rate tables.
    pub fn new() -> Self {
        PricingEngine {
            rates: RateTables::default(),
        }
    }

    /// Creates an engine pricing against the given tables.
    ///
    /// Tables are checked first; together with the validator's amount limit
    /// this keeps every stage of a valid invoice free of overflow.
    pub fn with_rates(rates: RateTables) -> Result<Self> {
        rates.validate()?;
        Ok(PricingEngine { rates })
    }

    pub fn rates(&self) -> &RateTables {
        &self.rates
    }

    /// Prices a present invoice.
    pub fn compute_total(
        &self,
        invoice: &Invoice,
    ) -> std::result::Result<ComputationResult, ValidationError> {
        self.compute(Some(invoice))
    }

    /// Prices an invoice that may be absent.
    ///
    /// Fails with every structural problem found; nothing is computed for an
    /// invalid invoice.
    pub fn compute(
        &self,
        invoice: Option<&Invoice>,
    ) -> std::result::Result<ComputationResult, ValidationError> {
        let problems = validation::validate(invoice);
        let invoice = match invoice {
            Some(invoice) if problems.is_empty() => invoice,
            _ => return Err(ValidationError::new(problems)),
        };

        let (subtotal, fragile_fee) = calculator::subtotal_and_fragile_fee(&invoice.items);
        let shipping = calculator::shipping_fee(&self.rates, subtotal, &invoice.country);
        let discount = calculator::discount(&self.rates, invoice, subtotal);
        let tax = calculator::tax(&self.rates, subtotal, discount.amount, &invoice.country);

        debug!(
            "Invoice {}: subtotal {}, shipping {}, fragile {}, discount {}, tax {}",
            invoice.invoice_id, subtotal, shipping, fragile_fee, discount.amount, tax
        );

        let total = (subtotal + shipping + fragile_fee + tax - discount.amount).max(Money::ZERO);

        let mut warnings = discount.warnings;
        warnings.extend(upgrade_hint(invoice.tier(), subtotal));

        Ok(ComputationResult {
            total,
            warnings,
            breakdown: PriceBreakdown {
                subtotal,
                shipping,
                fragile_fee,
                discount: discount.amount,
                tax,
                total,
            },
        })
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Suggests an upgrade for large orders placed without a discounting tier.
fn upgrade_hint(tier: MembershipTier, subtotal: Money) -> Option<Warning> {
    let discounted = matches!(tier, MembershipTier::Gold | MembershipTier::Platinum);
    (subtotal > Money::from_units(10_000) && !discounted).then_some(Warning::MembershipUpgrade)
}
