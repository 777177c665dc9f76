//! # Invoice Pricing
//!
//! A deterministic pricing engine that turns an invoice into a payable total
//! plus advisory warnings.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: Uses 4 decimal places via `rust_decimal`
//! - **Validate first**: Every structural problem is reported in one error
//! - **Rules as data**: Coupon, tax and shipping rules live in immutable tables
//! - **Warnings, not failures**: Pricing anomalies never abort a computation
//!
//! ## Example
//!
//! ```
//! use invoice_pricing::{Invoice, LineItem, Money, PricingEngine};
//!
//! let invoice = Invoice::new("INV001", "CUST01", "TH")
//!     .with_coupon("WELCOME10")
//!     .with_item(LineItem::new("ITEM01", "book", Money::from_units(100), 2));
//!
//! let result = PricingEngine::new().compute_total(&invoice).unwrap();
//! assert_eq!(result.breakdown.discount, Money::from_units(20));
//! assert!(result.warnings.is_empty());
//! ```

pub mod batch;
pub mod calculator;
pub mod engine;
pub mod error;
pub mod invoice;
pub mod money;
pub mod rates;
pub mod validation;

pub use batch::{InvoiceBatch, PricedInvoice};
pub use calculator::Warning;
pub use engine::{ComputationResult, PriceBreakdown, PricingEngine};
pub use error::{EngineError, Result, ValidationError};
pub use invoice::{Category, Invoice, InvoiceRecord, LineItem, MembershipTier};
pub use money::Money;
pub use rates::{RateTables, ShippingRule, ShippingTable, ShippingTier, TaxTable};
