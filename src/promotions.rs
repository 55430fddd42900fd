//! Promotions
//!
//! Promo codes are checked by a [`PromoValidator`]. The static catalog here
//! stands in for a backend promotion service; the server recomputes any
//! discount when the order is placed.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::info;

use crate::money::Rupiah;

/// Errors applying a promo code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromoError {
    /// The code is not known to the validator.
    #[error("promo code {0} not found")]
    NotFound(String),

    /// The code was empty or whitespace.
    #[error("promo code is empty")]
    Blank,
}

/// How a promo reduces the item subtotal.
#[derive(Clone, Copy, PartialEq)]
pub enum PromoDiscount {
    /// A fraction of the item subtotal (e.g. `0.1` for 10% off).
    Percentage(Percentage),

    /// A fixed amount off the item subtotal.
    Fixed(Rupiah),
}

impl fmt::Debug for PromoDiscount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromoDiscount::Percentage(p) => f
                .debug_tuple("Percentage")
                .field(&(*p * Decimal::ONE))
                .finish(),
            PromoDiscount::Fixed(amount) => f.debug_tuple("Fixed").field(amount).finish(),
        }
    }
}

/// A validated promo code.
#[derive(Debug, Clone, PartialEq)]
pub struct PromoCode {
    code: String,
    discount: PromoDiscount,
}

impl PromoCode {
    /// Create a promo code with the given discount.
    pub fn new(code: impl Into<String>, discount: PromoDiscount) -> Self {
        Self {
            code: code.into(),
            discount,
        }
    }

    /// A percentage-off promo, `percent` being a fraction (`0.1` is 10%).
    pub fn percentage(code: impl Into<String>, percent: Percentage) -> Self {
        Self::new(code, PromoDiscount::Percentage(percent))
    }

    /// A fixed-amount-off promo.
    pub fn fixed(code: impl Into<String>, amount: Rupiah) -> Self {
        Self::new(code, PromoDiscount::Fixed(amount))
    }

    /// The code the buyer enters.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the discount
    pub fn discount(&self) -> PromoDiscount {
        self.discount
    }

    /// Discount on an item subtotal, clamped to `[0, subtotal]`.
    ///
    /// Percentages round half-up to a whole Rupiah.
    pub fn discount_on(&self, subtotal: Rupiah) -> Rupiah {
        let amount = match self.discount {
            PromoDiscount::Percentage(percent) => subtotal.percent(percent),
            PromoDiscount::Fixed(amount) => amount,
        };

        amount.min(subtotal)
    }
}

/// Checks promo codes entered by the buyer.
pub trait PromoValidator: Send + Sync {
    /// Look up `code`.
    ///
    /// # Errors
    ///
    /// Returns a [`PromoError`] if the code is blank or unknown.
    fn validate(&self, code: &str) -> Result<PromoCode, PromoError>;
}

/// Look up `code` in `catalog`.
///
/// # Errors
///
/// Returns a [`PromoError`] if the code is blank or unknown.
pub fn validate_promo(code: &str, catalog: &dyn PromoValidator) -> Result<PromoCode, PromoError> {
    catalog.validate(code)
}

/// Promo codes held in memory, matched case-sensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticPromoCatalog {
    codes: FxHashMap<String, PromoCode>,
}

impl StaticPromoCatalog {
    /// Create a catalog from promo codes. Later codes replace earlier ones with the same code.
    pub fn new(codes: impl IntoIterator<Item = PromoCode>) -> Self {
        Self {
            codes: codes
                .into_iter()
                .map(|promo| (promo.code.clone(), promo))
                .collect(),
        }
    }

    /// The storefront's launch promotions.
    pub fn standard() -> Self {
        Self::new([
            PromoCode::percentage("DISKON10", Percentage::from(0.1)),
            PromoCode::fixed("HEMAT50K", Rupiah::new(50_000)),
            PromoCode::fixed("GRATIS20", Rupiah::new(20_000)),
        ])
    }

    /// Add or replace a promo code.
    pub fn insert(&mut self, promo: PromoCode) {
        self.codes.insert(promo.code.clone(), promo);
    }

    /// Number of codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Check if the catalog has no codes.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl PromoValidator for StaticPromoCatalog {
    fn validate(&self, code: &str) -> Result<PromoCode, PromoError> {
        let code = code.trim();

        if code.is_empty() {
            return Err(PromoError::Blank);
        }

        self.codes
            .get(code)
            .cloned()
            .ok_or_else(|| PromoError::NotFound(code.to_string()))
    }
}

/// The promo applied to the current checkout, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedPromo {
    current: Option<PromoCode>,
}

impl AppliedPromo {
    /// No promo applied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and apply `code`, replacing any promo already applied.
    ///
    /// # Errors
    ///
    /// Returns a [`PromoError`] if validation fails; the applied promo is left
    /// unchanged.
    pub fn apply(
        &mut self,
        code: &str,
        validator: &dyn PromoValidator,
    ) -> Result<&PromoCode, PromoError> {
        let promo = validator.validate(code).inspect_err(|err| {
            info!(code, error = %err, "promo code rejected");
        })?;

        info!(code = promo.code(), "promo code applied");

        Ok(self.current.insert(promo))
    }

    /// Remove the applied promo, returning it.
    pub fn clear(&mut self) -> Option<PromoCode> {
        self.current.take()
    }

    /// The applied promo.
    pub fn current(&self) -> Option<&PromoCode> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn validate_is_case_sensitive_exact_match() -> TestResult {
        let catalog = StaticPromoCatalog::standard();

        assert_eq!(validate_promo("DISKON10", &catalog)?.code(), "DISKON10");
        assert_eq!(
            validate_promo("diskon10", &catalog),
            Err(PromoError::NotFound("diskon10".to_string()))
        );

        Ok(())
    }

    #[test]
    fn validate_rejects_blank_codes() {
        let catalog = StaticPromoCatalog::standard();

        assert_eq!(catalog.validate("   "), Err(PromoError::Blank));
    }

    #[test]
    fn percentage_discount_rounds_half_up() {
        let promo = PromoCode::percentage("X", Percentage::from(0.1));

        assert_eq!(promo.discount_on(Rupiah::new(130_000)), Rupiah::new(13_000));
        // 10% of 15 = 1.5
        assert_eq!(promo.discount_on(Rupiah::new(15)), Rupiah::new(2));
    }

    #[test]
    fn percentage_discount_of_seventy_percent() {
        let promo = PromoCode::percentage("X", Percentage::from(0.7));

        assert_eq!(promo.discount_on(Rupiah::new(50_000)), Rupiah::new(35_000));
    }

    #[test]
    fn fixed_discount_clamps_to_subtotal() {
        let promo = PromoCode::fixed("X", Rupiah::new(1_000_000));

        assert_eq!(promo.discount_on(Rupiah::new(50_000)), Rupiah::new(50_000));
        assert_eq!(promo.discount_on(Rupiah::ZERO), Rupiah::ZERO);
    }

    #[test]
    fn applying_replaces_previous_promo() -> TestResult {
        let catalog = StaticPromoCatalog::standard();
        let mut applied = AppliedPromo::new();

        applied.apply("DISKON10", &catalog)?;
        applied.apply("HEMAT50K", &catalog)?;

        assert_eq!(applied.current().map(PromoCode::code), Some("HEMAT50K"));

        Ok(())
    }

    #[test]
    fn rejected_code_leaves_applied_promo_unchanged() -> TestResult {
        let catalog = StaticPromoCatalog::standard();
        let mut applied = AppliedPromo::new();

        applied.apply("GRATIS20", &catalog)?;

        let result = applied.apply("BOGUS", &catalog);

        assert!(matches!(result, Err(PromoError::NotFound(code)) if code == "BOGUS"));
        assert_eq!(applied.current().map(PromoCode::code), Some("GRATIS20"));

        Ok(())
    }

    #[test]
    fn clear_removes_promo() -> TestResult {
        let catalog = StaticPromoCatalog::standard();
        let mut applied = AppliedPromo::new();

        applied.apply("DISKON10", &catalog)?;

        assert!(applied.clear().is_some());
        assert!(applied.current().is_none());

        Ok(())
    }

    #[test]
    fn insert_adds_codes() {
        let mut catalog = StaticPromoCatalog::default();

        catalog.insert(PromoCode::fixed("BARU", Rupiah::new(1_000)));

        assert_eq!(catalog.len(), 1);
        assert!(!catalog.is_empty());
    }
}
