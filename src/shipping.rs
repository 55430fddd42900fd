//! Shipping
//!
//! Each seller group ships separately, so a shipping option is chosen per
//! seller. Sellers without an explicit choice use the catalog's first option.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::warn;

use crate::{ids::ShippingOptionId, money::Rupiah};

/// Errors building a shipping catalog.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A catalog needs at least one option to default to.
    #[error("shipping catalog has no options")]
    Empty,

    /// Two options share an id.
    #[error("duplicate shipping option: {0}")]
    DuplicateOption(ShippingOptionId),
}

/// A shipping service a buyer can choose for a seller group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOption {
    /// Option id
    pub id: ShippingOptionId,

    /// Display name
    pub name: String,

    /// Flat price per seller group
    pub price: Rupiah,

    /// Delivery estimate shown to the buyer (e.g. "2-4 hari")
    pub eta_label: String,
}

impl ShippingOption {
    /// Create a new shipping option.
    pub fn new(
        id: impl Into<ShippingOptionId>,
        name: impl Into<String>,
        price: Rupiah,
        eta_label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            eta_label: eta_label.into(),
        }
    }
}

/// A non-empty, ordered list of shipping options.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingCatalog {
    default: ShippingOption,
    rest: SmallVec<[ShippingOption; 2]>,
}

impl ShippingCatalog {
    /// Create a catalog. The first option is the default.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Empty`]: no options were given.
    /// - [`CatalogError::DuplicateOption`]: two options share an id.
    pub fn new(options: impl IntoIterator<Item = ShippingOption>) -> Result<Self, CatalogError> {
        let mut options = options.into_iter();
        let default = options.next().ok_or(CatalogError::Empty)?;
        let rest: SmallVec<[ShippingOption; 2]> = options.collect();

        let mut seen = FxHashSet::default();
        seen.insert(&default.id);

        for option in &rest {
            if !seen.insert(&option.id) {
                return Err(CatalogError::DuplicateOption(option.id.clone()));
            }
        }

        Ok(Self { default, rest })
    }

    /// The marketplace's standard couriers.
    pub fn standard() -> Self {
        Self {
            default: ShippingOption::new("reguler", "Reguler", Rupiah::new(21_400), "2-4 hari"),
            rest: SmallVec::from_buf([
                ShippingOption::new("instant", "Instant", Rupiah::new(35_000), "3 jam"),
                ShippingOption::new("kargo", "Kargo", Rupiah::new(15_000), "4-7 hari"),
            ]),
        }
    }

    /// The option used when a seller has no selection.
    pub fn default_option(&self) -> &ShippingOption {
        &self.default
    }

    /// Look up an option by id.
    pub fn get(&self, id: &ShippingOptionId) -> Option<&ShippingOption> {
        self.iter().find(|option| &option.id == id)
    }

    /// The option for a seller's selection.
    ///
    /// No selection, or a selection naming an option not in the catalog, resolves
    /// to the default option.
    pub fn resolve(&self, selection: Option<&ShippingOptionId>) -> &ShippingOption {
        let Some(id) = selection else {
            return self.default_option();
        };

        self.get(id).unwrap_or_else(|| {
            let fallback = self.default_option();

            warn!(
                selected = %id,
                fallback = %fallback.id,
                "unknown shipping option, using default"
            );

            fallback
        })
    }

    /// Iterate over the options in display order.
    pub fn iter(&self) -> impl Iterator<Item = &ShippingOption> {
        std::iter::once(&self.default).chain(self.rest.iter())
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.rest.len() + 1
    }

    /// Always false; catalogs hold at least one option.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ShippingCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn standard_catalog_defaults_to_reguler() {
        let catalog = ShippingCatalog::standard();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.default_option().id.as_str(), "reguler");
        assert_eq!(catalog.default_option().price, Rupiah::new(21_400));
    }

    #[test]
    fn new_rejects_empty_catalog() {
        assert_eq!(
            ShippingCatalog::new(Vec::new()).err(),
            Some(CatalogError::Empty)
        );
    }

    #[test]
    fn new_rejects_duplicate_ids() {
        let result = ShippingCatalog::new([
            ShippingOption::new("a", "A", Rupiah::new(1), "1 hari"),
            ShippingOption::new("a", "A lagi", Rupiah::new(2), "2 hari"),
        ]);

        assert_eq!(
            result.err(),
            Some(CatalogError::DuplicateOption(ShippingOptionId::new("a")))
        );
    }

    #[test]
    fn resolve_uses_selection_when_known() {
        let catalog = ShippingCatalog::standard();
        let instant = ShippingOptionId::new("instant");

        assert_eq!(catalog.resolve(Some(&instant)).price, Rupiah::new(35_000));
    }

    #[test]
    fn resolve_falls_back_to_default() -> TestResult {
        let catalog = ShippingCatalog::new([
            ShippingOption::new("kilat", "Kilat", Rupiah::new(9_000), "1 hari"),
            ShippingOption::new("santai", "Santai", Rupiah::new(4_000), "7 hari"),
        ])?;

        let unknown = ShippingOptionId::new("teleport");

        assert_eq!(catalog.resolve(None).id.as_str(), "kilat");
        assert_eq!(catalog.resolve(Some(&unknown)).id.as_str(), "kilat");

        Ok(())
    }

    #[test]
    fn single_option_catalog_is_its_own_default() -> TestResult {
        let catalog = ShippingCatalog::new([ShippingOption::new(
            "ambil",
            "Ambil di toko",
            Rupiah::ZERO,
            "hari ini",
        )])?;

        assert_eq!(catalog.len(), 1);
        assert!(!catalog.is_empty());
        assert_eq!(catalog.default_option().id.as_str(), "ambil");
        assert_eq!(
            catalog.iter().map(|option| option.id.as_str()).collect::<Vec<_>>(),
            ["ambil"]
        );

        Ok(())
    }

    #[test]
    fn new_rejects_option_duplicating_default() {
        let result = ShippingCatalog::new([
            ShippingOption::new("a", "A", Rupiah::new(1), "1 hari"),
            ShippingOption::new("b", "B", Rupiah::new(2), "2 hari"),
            ShippingOption::new("a", "A lagi", Rupiah::new(3), "3 hari"),
        ]);

        assert_eq!(
            result.err(),
            Some(CatalogError::DuplicateOption(ShippingOptionId::new("a")))
        );
    }
}
