//! Invoice models for CSV parsing and internal representation.

use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product category of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Book,
    Food,
    Electronics,
    Other,
}

impl FromStr for Category {
    type Err = ();

    /// Matches the lowercase category name exactly.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "book" => Ok(Category::Book),
            "food" => Ok(Category::Food),
            "electronics" => Ok(Category::Electronics),
            "other" => Ok(Category::Other),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Book => "book",
            Category::Food => "food",
            Category::Electronics => "electronics",
            Category::Other => "other",
        };
        f.write_str(name)
    }
}

/// Discount tier derived from the raw membership string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipTier {
    Gold,
    Platinum,
    /// Any other membership value, including `"none"`.
    Standard,
}

impl MembershipTier {
    /// Classifies a membership string. Only exact `"gold"` and `"platinum"`
    /// unlock a proportional discount.
    pub fn classify(membership: &str) -> Self {
        match membership {
            "gold" => MembershipTier::Gold,
            "platinum" => MembershipTier::Platinum,
            _ => MembershipTier::Standard,
        }
    }
}

/// One purchasable entry on an invoice.
///
/// Fields are kept close to their raw form so that structural problems
/// (empty sku, non-positive qty, negative price, unknown category) reach the
/// validator instead of failing at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub sku: String,
    pub category: String,
    pub unit_price: Money,
    pub qty: i64,
    #[serde(default)]
    pub fragile: bool,
}

impl LineItem {
    /// Creates a non-fragile line item.
    pub fn new(sku: &str, category: &str, unit_price: Money, qty: i64) -> Self {
        LineItem {
            sku: sku.to_string(),
            category: category.to_string(),
            unit_price,
            qty,
            fragile: false,
        }
    }

    /// Marks this item as fragile.
    pub fn fragile(mut self) -> Self {
        self.fragile = true;
        self
    }

    /// `unit_price * qty`.
    pub fn line_total(&self) -> Money {
        self.unit_price * self.qty
    }
}

/// The unit of computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: String,
    pub customer_id: String,
    pub country: String,
    pub membership: String,
    #[serde(default)]
    pub coupon: Option<String>,
    pub items: Vec<LineItem>,
}

impl Invoice {
    /// Creates an invoice with `"none"` membership, no coupon and no items.
    pub fn new(invoice_id: &str, customer_id: &str, country: &str) -> Self {
        Invoice {
            invoice_id: invoice_id.to_string(),
            customer_id: customer_id.to_string(),
            country: country.to_string(),
            membership: "none".to_string(),
            coupon: None,
            items: Vec::new(),
        }
    }

    pub fn with_membership(mut self, membership: &str) -> Self {
        self.membership = membership.to_string();
        self
    }

    pub fn with_coupon(mut self, coupon: &str) -> Self {
        self.coupon = Some(coupon.to_string());
        self
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn tier(&self) -> MembershipTier {
        MembershipTier::classify(&self.membership)
    }
}

/// Raw invoice row as read from CSV: invoice header columns repeated on every
/// row, plus one optional line item.
#[derive(Debug, Deserialize)]
pub struct InvoiceRecord {
    pub invoice_id: String,
    pub customer_id: String,
    pub country: String,
    pub membership: String,
    pub coupon: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<String>,
    pub qty: Option<String>,
    pub fragile: Option<String>,
}

impl InvoiceRecord {
    /// Builds the invoice header (no items) described by this row.
    pub fn header(&self) -> Invoice {
        Invoice {
            invoice_id: self.invoice_id.clone(),
            customer_id: self.customer_id.clone(),
            country: self.country.clone(),
            membership: self.membership.clone(),
            coupon: self.coupon.clone(),
            items: Vec::new(),
        }
    }

    /// Parses the line item carried by this row.
    ///
    /// Returns `Ok(None)` when every item column is empty, and an error
    /// message when a numeric or boolean column cannot be parsed.
    pub fn line_item(&self) -> std::result::Result<Option<LineItem>, String> {
        let columns = [
            &self.sku,
            &self.category,
            &self.unit_price,
            &self.qty,
            &self.fragile,
        ];
        if columns.iter().all(|c| c.is_none()) {
            return Ok(None);
        }

        let sku = self.sku.clone().unwrap_or_default();
        let unit_price = match self.unit_price.as_deref() {
            Some(raw) => {
                Money::from_str(raw).map_err(|e| format!("invalid unit_price {:?}: {}", raw, e))?
            }
            None => return Err("missing unit_price".to_string()),
        };
        let qty = match self.qty.as_deref() {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|e| format!("invalid qty {:?}: {}", raw, e))?,
            None => return Err("missing qty".to_string()),
        };

        Ok(Some(LineItem {
            sku,
            category: self.category.clone().unwrap_or_default(),
            unit_price,
            qty,
            fragile: parse_flag(self.fragile.as_deref())?,
        }))
    }
}

/// Parses the fragile column; empty means `false`.
fn parse_flag(raw: Option<&str>) -> std::result::Result<bool, String> {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some(other) => Err(format!("invalid fragile flag {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sku: Option<&str>, price: Option<&str>, qty: Option<&str>) -> InvoiceRecord {
        InvoiceRecord {
            invoice_id: "INV001".to_string(),
            customer_id: "CUST01".to_string(),
            country: "TH".to_string(),
            membership: "none".to_string(),
            coupon: None,
            sku: sku.map(str::to_string),
            category: sku.map(|_| "book".to_string()),
            unit_price: price.map(str::to_string),
            qty: qty.map(str::to_string),
            fragile: None,
        }
    }

    #[test]
    fn test_category_parse_is_exact() {
        assert_eq!("book".parse::<Category>(), Ok(Category::Book));
        assert_eq!("electronics".parse::<Category>(), Ok(Category::Electronics));
        assert!("Book".parse::<Category>().is_err());
        assert!("toys".parse::<Category>().is_err());
        assert_eq!(Category::Food.to_string(), "food");
    }

    #[test]
    fn test_membership_classification() {
        assert_eq!(MembershipTier::classify("gold"), MembershipTier::Gold);
        assert_eq!(MembershipTier::classify("platinum"), MembershipTier::Platinum);
        assert_eq!(MembershipTier::classify("none"), MembershipTier::Standard);
        assert_eq!(MembershipTier::classify("silver"), MembershipTier::Standard);
        assert_eq!(MembershipTier::classify("Gold"), MembershipTier::Standard);
    }

    #[test]
    fn test_line_total() {
        let item = LineItem::new("ITEM01", "book", Money::from_units(100), 2);
        assert_eq!(item.line_total(), Money::from_units(200));
        assert!(!item.fragile);
        assert!(item.fragile().fragile);
    }

    #[test]
    fn test_parse_line_item() {
        let rec = record(Some("ITEM01"), Some(" 100.5 "), Some("2"));
        let item = rec.line_item().unwrap().unwrap();
        assert_eq!(item.sku, "ITEM01");
        assert_eq!(item.unit_price.to_string(), "100.5000");
        assert_eq!(item.qty, 2);
        assert!(!item.fragile);
    }

    #[test]
    fn test_parse_keeps_invalid_values_for_validation() {
        let rec = record(Some("ITEM01"), Some("-1"), Some("0"));
        let item = rec.line_item().unwrap().unwrap();
        assert!(item.unit_price.is_negative());
        assert_eq!(item.qty, 0);
    }

    #[test]
    fn test_empty_item_columns_mean_no_item() {
        let rec = record(None, None, None);
        assert_eq!(rec.line_item(), Ok(None));
        assert!(rec.header().items.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_numbers() {
        assert!(record(Some("A"), Some("abc"), Some("1")).line_item().is_err());
        assert!(record(Some("A"), Some("1"), Some("1.5")).line_item().is_err());
        assert!(record(Some("A"), None, Some("1")).line_item().is_err());
    }

    #[test]
    fn test_parse_fragile_flag() {
        assert_eq!(parse_flag(Some("TRUE")), Ok(true));
        assert_eq!(parse_flag(Some(" 1 ")), Ok(true));
        assert_eq!(parse_flag(None), Ok(false));
        assert_eq!(parse_flag(Some("false")), Ok(false));
        assert!(parse_flag(Some("maybe")).is_err());
    }
}
