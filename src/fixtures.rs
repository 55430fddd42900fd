//! Fixtures
//!
//! Checkout scenarios stored as YAML under `<base>/checkouts/<name>.yml`.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::Cart,
    ids::{ProductId, SellerId, ShippingOptionId},
    items::LineItem,
    money::Rupiah,
    pricing::OrderSelections,
    sellers::Seller,
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// The fixture lists no items
    #[error("Fixture {0} has no items")]
    NoItems(String),
}

/// A cart line in a checkout fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemFixture {
    /// Product id
    pub product_id: ProductId,

    /// Product name
    pub name: String,

    /// Unit price in whole Rupiah
    pub price: Rupiah,

    /// Units in the cart
    pub quantity: u32,

    /// Seller of the product
    pub seller: Seller,

    /// Whether the line is selected for checkout
    #[serde(default = "selected_by_default")]
    pub selected: bool,

    /// Units in stock
    #[serde(default)]
    pub stock: Option<u32>,

    /// Product variant
    #[serde(default)]
    pub variant: Option<String>,
}

fn selected_by_default() -> bool {
    true
}

impl From<ItemFixture> for LineItem {
    fn from(fixture: ItemFixture) -> Self {
        LineItem::new(
            fixture.product_id,
            fixture.name,
            fixture.price,
            fixture.quantity,
            fixture.seller,
        )
        .with_selected(fixture.selected)
        .with_stock(fixture.stock)
        .with_variant(fixture.variant)
    }
}

/// A checkout scenario: cart contents, per-seller choices and a promo code.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutFixture {
    /// Cart lines
    pub items: Vec<ItemFixture>,

    /// Shipping option per seller
    #[serde(default)]
    pub shipping: FxHashMap<SellerId, ShippingOptionId>,

    /// Insurance opt-in per seller
    #[serde(default)]
    pub insurance: FxHashMap<SellerId, bool>,

    /// Promo code to apply
    #[serde(default)]
    pub promo: Option<String>,
}

impl CheckoutFixture {
    /// Build the cart described by the fixture.
    pub fn cart(&self) -> Cart {
        Cart::with_items(self.items.iter().cloned().map(LineItem::from))
    }

    /// Build the shipping and insurance selections described by the fixture.
    pub fn selections(&self) -> OrderSelections {
        let mut selections = OrderSelections::new();

        for (seller, option) in &self.shipping {
            selections.select_shipping(seller.clone(), option.clone());
        }

        for (seller, insured) in &self.insurance {
            selections.set_insurance(seller.clone(), *insured);
        }

        selections
    }

    /// Promo code to apply, if any.
    pub fn promo_code(&self) -> Option<&str> {
        self.promo.as_deref()
    }
}

/// Fixture loader
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Fixture {
    /// Create a loader with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a checkout scenario from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or lists no items.
    pub fn load_checkout(&self, name: &str) -> Result<CheckoutFixture, FixtureError> {
        let file_path = self.base_path.join("checkouts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CheckoutFixture = serde_norway::from_str(&contents)?;

        if fixture.items.is_empty() {
            return Err(FixtureError::NoItems(name.to_string()));
        }

        Ok(fixture)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
