//! Static rate tables: coupon rates, tax rates and shipping rules.
//!
//! Country rules are data, not code: each table maps a country code to a
//! small rule descriptor and carries a designated default entry for
//! unrecognized countries. Tables are loaded once when the engine is built
//! and never mutated afterwards.

use crate::error::{EngineError, Result};
use crate::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;

/// One step of a shipping rule: `fee` applies while the subtotal is strictly
/// below `below`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingTier {
    pub below: Money,
    pub fee: Money,
}

/// A piecewise shipping fee over the subtotal.
///
/// Tiers are ordered by ascending threshold; the first tier whose threshold
/// exceeds the subtotal wins. At or above the last threshold shipping is free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRule {
    pub tiers: Vec<ShippingTier>,
}

impl ShippingRule {
    /// Builds a rule from `(below, fee)` pairs in whole currency units.
    pub fn from_units(tiers: &[(i64, i64)]) -> Self {
        ShippingRule {
            tiers: tiers
                .iter()
                .map(|&(below, fee)| ShippingTier {
                    below: Money::from_units(below),
                    fee: Money::from_units(fee),
                })
                .collect(),
        }
    }

    pub fn fee_for(&self, subtotal: Money) -> Money {
        self.tiers
            .iter()
            .find(|tier| subtotal < tier.below)
            .map(|tier| tier.fee)
            .unwrap_or(Money::ZERO)
    }

    fn check(&self, name: &str) -> Result<()> {
        let mut previous: Option<Money> = None;
        for tier in &self.tiers {
            if tier.fee.is_negative() || tier.fee > Money::limit() {
                return Err(EngineError::InvalidRates(format!(
                    "shipping rule {} has out-of-range fee {}",
                    name, tier.fee
                )));
            }
            if previous.is_some_and(|p| tier.below <= p) {
                return Err(EngineError::InvalidRates(format!(
                    "shipping rule {} thresholds must be strictly ascending",
                    name
                )));
            }
            previous = Some(tier.below);
        }
        Ok(())
    }
}

/// Per-country shipping rules with a default for unknown countries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingTable {
    pub default: ShippingRule,
    #[serde(default)]
    pub countries: HashMap<String, ShippingRule>,
}

impl ShippingTable {
    pub fn rule_for(&self, country: &str) -> &ShippingRule {
        self.countries.get(country).unwrap_or(&self.default)
    }
}

/// Per-country tax rates with a default for unknown countries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTable {
    pub default: Decimal,
    #[serde(default)]
    pub countries: HashMap<String, Decimal>,
}

impl TaxTable {
    pub fn rate_for(&self, country: &str) -> Decimal {
        self.countries
            .get(country)
            .copied()
            .unwrap_or(self.default)
    }
}

/// All configuration the engine prices against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTables {
    pub coupons: HashMap<String, Decimal>,
    pub tax: TaxTable,
    pub shipping: ShippingTable,
}

impl RateTables {
    /// Looks up a coupon rate by its exact (already trimmed) code.
    pub fn coupon_rate(&self, code: &str) -> Option<Decimal> {
        self.coupons.get(code).copied()
    }

    /// Reads rate tables from a JSON document and checks them.
    ///
    /// Rates and money amounts are written as JSON strings (`"0.07"`).
    pub fn from_json<R: Read>(reader: R) -> Result<Self> {
        let tables: RateTables = serde_json::from_reader(reader)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Checks that every rate is in `[0, 1]`, every fee is between zero and
    /// [`Money::limit`] and shipping thresholds ascend.
    pub fn validate(&self) -> Result<()> {
        for (code, rate) in &self.coupons {
            check_rate(&format!("coupon {}", code), *rate)?;
        }
        check_rate("default tax", self.tax.default)?;
        for (country, rate) in &self.tax.countries {
            check_rate(&format!("tax for {}", country), *rate)?;
        }
        self.shipping.default.check("default")?;
        for (country, rule) in &self.shipping.countries {
            rule.check(country)?;
        }
        Ok(())
    }
}

fn check_rate(name: &str, rate: Decimal) -> Result<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(EngineError::InvalidRates(format!(
            "{} rate {} is outside [0, 1]",
            name, rate
        )));
    }
    Ok(())
}

impl Default for RateTables {
    fn default() -> Self {
        let coupons = HashMap::from([
            ("WELCOME10".to_string(), Decimal::new(10, 2)),
            ("VIP20".to_string(), Decimal::new(20, 2)),
            ("STUDENT5".to_string(), Decimal::new(5, 2)),
        ]);

        let tax = TaxTable {
            default: Decimal::new(5, 2),
            countries: HashMap::from([
                ("TH".to_string(), Decimal::new(7, 2)),
                ("JP".to_string(), Decimal::new(10, 2)),
                ("US".to_string(), Decimal::new(8, 2)),
            ]),
        };

        let shipping = ShippingTable {
            default: ShippingRule::from_units(&[(200, 25)]),
            countries: HashMap::from([
                ("TH".to_string(), ShippingRule::from_units(&[(500, 60)])),
                ("JP".to_string(), ShippingRule::from_units(&[(4000, 600)])),
                (
                    "US".to_string(),
                    ShippingRule::from_units(&[(100, 15), (300, 8)]),
                ),
            ]),
        };

        RateTables {
            coupons,
            tax,
            shipping,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    #[test]
    fn test_default_coupons() {
        let rates = RateTables::default();
        assert_eq!(rates.coupon_rate("WELCOME10"), Some(dec!(0.10)));
        assert_eq!(rates.coupon_rate("VIP20"), Some(dec!(0.20)));
        assert_eq!(rates.coupon_rate("STUDENT5"), Some(dec!(0.05)));
        assert_eq!(rates.coupon_rate("welcome10"), None);
    }

    #[test]
    fn test_tax_falls_back_to_default() {
        let rates = RateTables::default();
        assert_eq!(rates.tax.rate_for("TH"), dec!(0.07));
        assert_eq!(rates.tax.rate_for("JP"), dec!(0.10));
        assert_eq!(rates.tax.rate_for("US"), dec!(0.08));
        assert_eq!(rates.tax.rate_for("XX"), dec!(0.05));
        assert_eq!(rates.tax.rate_for(""), dec!(0.05));
    }

    #[test]
    fn test_shipping_rule_thresholds_are_exclusive() {
        let rule = ShippingRule::from_units(&[(100, 15), (300, 8)]);
        assert_eq!(rule.fee_for(Money::from_units(99)), Money::from_units(15));
        assert_eq!(rule.fee_for(Money::from_units(100)), Money::from_units(8));
        assert_eq!(rule.fee_for(Money::from_units(299)), Money::from_units(8));
        assert_eq!(rule.fee_for(Money::from_units(300)), Money::ZERO);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(RateTables::default().validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "coupons": {"SPRING": "0.15"},
            "tax": {"default": "0.06", "countries": {"DE": "0.19"}},
            "shipping": {
                "default": {"tiers": [{"below": "50", "fee": "9.5"}]},
                "countries": {"DE": {"tiers": []}}
            }
        }"#;

        let rates = RateTables::from_json(Cursor::new(json)).unwrap();
        assert_eq!(rates.coupon_rate("SPRING"), Some(dec!(0.15)));
        assert_eq!(rates.tax.rate_for("DE"), dec!(0.19));
        assert_eq!(rates.tax.rate_for("TH"), dec!(0.06));
        assert_eq!(
            rates.shipping.rule_for("FR").fee_for(Money::from_units(10)),
            "9.5".parse::<Money>().unwrap()
        );
        assert_eq!(
            rates.shipping.rule_for("DE").fee_for(Money::from_units(10)),
            Money::ZERO
        );
    }

    #[test]
    fn test_rejects_out_of_range_rate() {
        let mut rates = RateTables::default();
        rates.coupons.insert("BROKEN".to_string(), dec!(1.5));
        assert!(matches!(
            rates.validate(),
            Err(EngineError::InvalidRates(_))
        ));
    }

    #[test]
    fn test_rejects_descending_thresholds() {
        let mut rates = RateTables::default();
        rates.shipping.countries.insert(
            "ZZ".to_string(),
            ShippingRule::from_units(&[(300, 8), (100, 15)]),
        );
        assert!(matches!(
            rates.validate(),
            Err(EngineError::InvalidRates(_))
        ));
    }

    #[test]
    fn test_rejects_fee_above_limit() {
        let mut rates = RateTables::default();
        rates.shipping.default = ShippingRule::from_units(&[(200, Money::LIMIT_UNITS + 1)]);
        assert!(matches!(
            rates.validate(),
            Err(EngineError::InvalidRates(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = RateTables::from_json(Cursor::new("{\"coupons\": "));
        assert!(matches!(result, Err(EngineError::Json(_))));
    }
}
