//! The individual pricing stages.
//!
//! Each stage is a pure function of its inputs. Shipping, discount and tax
//! depend only on the subtotal (and the invoice), never on each other.

use crate::invoice::{Invoice, LineItem, MembershipTier};
use crate::money::Money;
use crate::rates::RateTables;
use rust_decimal::Decimal;
use std::fmt;

/// Surcharge added per unit of a fragile item.
pub const FRAGILE_FEE_PER_UNIT: i64 = 5;

/// Advisory, non-fatal message attached to a computed total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Warning {
    /// A coupon was supplied but is not in the coupon table.
    UnknownCoupon,
    /// Large subtotal without a gold or platinum membership.
    MembershipUpgrade,
}

impl Warning {
    pub fn as_str(&self) -> &'static str {
        match self {
            Warning::UnknownCoupon => "Unknown coupon",
            Warning::MembershipUpgrade => "Consider membership upgrade",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns `(subtotal, fragile_fee)` for the given items.
pub fn subtotal_and_fragile_fee(items: &[LineItem]) -> (Money, Money) {
    let subtotal = items.iter().map(LineItem::line_total).sum();
    let fragile_fee = items
        .iter()
        .filter(|item| item.fragile)
        .map(|item| Money::from_units(FRAGILE_FEE_PER_UNIT) * item.qty)
        .sum();
    (subtotal, fragile_fee)
}

pub fn shipping_fee(rates: &RateTables, subtotal: Money, country: &str) -> Money {
    rates.shipping.rule_for(country).fee_for(subtotal)
}

/// One entry of the membership priority chain.
pub struct TierRule {
    pub name: &'static str,
    pub applies: fn(MembershipTier, Money) -> bool,
    pub amount: fn(Money) -> Money,
}

/// Membership discounts, evaluated in order. The first matching rule is the
/// only one applied.
pub const MEMBERSHIP_RULES: [TierRule; 3] = [
    TierRule {
        name: "gold",
        applies: is_gold,
        amount: gold_discount,
    },
    TierRule {
        name: "platinum",
        applies: is_platinum,
        amount: platinum_discount,
    },
    TierRule {
        name: "large order",
        applies: is_large_order,
        amount: large_order_discount,
    },
];

fn is_gold(tier: MembershipTier, _: Money) -> bool {
    tier == MembershipTier::Gold
}

fn gold_discount(subtotal: Money) -> Money {
    subtotal.apply_rate(Decimal::new(3, 2))
}

fn is_platinum(tier: MembershipTier, _: Money) -> bool {
    tier == MembershipTier::Platinum
}

fn platinum_discount(subtotal: Money) -> Money {
    subtotal.apply_rate(Decimal::new(5, 2))
}

fn is_large_order(_: MembershipTier, subtotal: Money) -> bool {
    subtotal > Money::from_units(3000)
}

fn large_order_discount(_: Money) -> Money {
    Money::from_units(20)
}

/// Applies the first matching membership rule, if any.
pub fn membership_discount(tier: MembershipTier, subtotal: Money) -> Option<(&'static str, Money)> {
    MEMBERSHIP_RULES
        .iter()
        .find(|rule| (rule.applies)(tier, subtotal))
        .map(|rule| (rule.name, (rule.amount)(subtotal)))
}

/// Discount stage output: the amount and the warnings raised while computing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discount {
    pub amount: Money,
    pub warnings: Vec<Warning>,
}

/// Membership discount plus coupon discount.
///
/// The coupon is evaluated regardless of which membership rule matched. An
/// absent or empty coupon is ignored; anything else is trimmed and looked up,
/// and an unrecognized code raises [`Warning::UnknownCoupon`].
pub fn discount(rates: &RateTables, invoice: &Invoice, subtotal: Money) -> Discount {
    let mut amount = membership_discount(invoice.tier(), subtotal)
        .map(|(_, amount)| amount)
        .unwrap_or(Money::ZERO);
    let mut warnings = Vec::new();

    if let Some(coupon) = invoice.coupon.as_deref().filter(|c| !c.is_empty()) {
        match rates.coupon_rate(coupon.trim()) {
            Some(rate) => amount += subtotal.apply_rate(rate),
            None => warnings.push(Warning::UnknownCoupon),
        }
    }

    Discount { amount, warnings }
}

/// Tax on `subtotal - discount`.
///
/// The taxable base is not floored at zero: a discount larger than the
/// subtotal produces a negative tax.
pub fn tax(rates: &RateTables, subtotal: Money, discount: Money, country: &str) -> Money {
    (subtotal - discount).apply_rate(rates.tax.rate_for(country))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(n: i64) -> Money {
        Money::from_units(n)
    }

    fn invoice(membership: &str, coupon: Option<&str>) -> Invoice {
        let mut invoice = Invoice::new("INV001", "CUST01", "TH").with_membership(membership);
        invoice.coupon = coupon.map(str::to_string);
        invoice
    }

    #[test]
    fn test_subtotal_and_fragile_fee() {
        let items = vec![
            LineItem::new("A", "book", units(100), 2),
            LineItem::new("B", "electronics", "19.99".parse().unwrap(), 3).fragile(),
        ];
        let (subtotal, fragile) = subtotal_and_fragile_fee(&items);
        assert_eq!(subtotal.to_string(), "259.9700");
        assert_eq!(fragile, units(15));
    }

    #[test]
    fn test_shipping_by_country() {
        let rates = RateTables::default();
        assert_eq!(shipping_fee(&rates, units(100), "TH"), units(60));
        assert_eq!(shipping_fee(&rates, units(500), "TH"), Money::ZERO);
        assert_eq!(shipping_fee(&rates, units(3999), "JP"), units(600));
        assert_eq!(shipping_fee(&rates, units(4000), "JP"), Money::ZERO);
        assert_eq!(shipping_fee(&rates, units(50), "US"), units(15));
        assert_eq!(shipping_fee(&rates, units(150), "US"), units(8));
        assert_eq!(shipping_fee(&rates, units(350), "US"), Money::ZERO);
        assert_eq!(shipping_fee(&rates, units(100), "XX"), units(25));
        assert_eq!(shipping_fee(&rates, units(250), "XX"), Money::ZERO);
    }

    #[test]
    fn test_membership_chain_first_match_wins() {
        assert_eq!(
            membership_discount(MembershipTier::Gold, units(5000)),
            Some(("gold", units(150)))
        );
        assert_eq!(
            membership_discount(MembershipTier::Platinum, units(5000)),
            Some(("platinum", units(250)))
        );
        assert_eq!(
            membership_discount(MembershipTier::Standard, units(5000)),
            Some(("large order", units(20)))
        );
        assert_eq!(membership_discount(MembershipTier::Standard, units(3000)), None);
    }

    #[test]
    fn test_coupon_stacks_on_membership() {
        let rates = RateTables::default();
        let result = discount(&rates, &invoice("gold", Some(" WELCOME10 ")), units(200));
        assert_eq!(result.amount, units(26));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unknown_coupon_warns() {
        let rates = RateTables::default();
        let result = discount(&rates, &invoice("none", Some("BOGUS")), units(200));
        assert_eq!(result.amount, Money::ZERO);
        assert_eq!(result.warnings, vec![Warning::UnknownCoupon]);
    }

    #[test]
    fn test_empty_coupon_is_ignored_but_blank_is_unknown() {
        let rates = RateTables::default();
        let empty = discount(&rates, &invoice("none", Some("")), units(200));
        assert!(empty.warnings.is_empty());

        let blank = discount(&rates, &invoice("none", Some("   ")), units(200));
        assert_eq!(blank.warnings, vec![Warning::UnknownCoupon]);
    }

    #[test]
    fn test_tax_allows_negative_base() {
        let rates = RateTables::default();
        assert_eq!(tax(&rates, units(200), Money::ZERO, "TH"), units(14));
        assert_eq!(tax(&rates, units(100), units(200), "XX"), units(-5));
    }

    #[test]
    fn test_warning_text() {
        assert_eq!(Warning::UnknownCoupon.to_string(), "Unknown coupon");
        assert_eq!(
            Warning::MembershipUpgrade.to_string(),
            "Consider membership upgrade"
        );
    }
}
