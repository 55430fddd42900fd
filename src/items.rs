//! Items

use crate::{
    ids::{ProductId, SellerId},
    money::Rupiah,
    products::Product,
    sellers::Seller,
};

/// A product line in the cart.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    product_id: ProductId,
    name: String,
    unit_price: Rupiah,
    quantity: u32,
    seller: Seller,
    selected: bool,
    stock: Option<u32>,
    variant: Option<String>,
}

impl LineItem {
    /// Creates a new, selected line item with no stock limit and no variant.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Rupiah,
        quantity: u32,
        seller: Seller,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            unit_price,
            quantity,
            seller,
            selected: true,
            stock: None,
            variant: None,
        }
    }

    /// Creates a line item for a quantity of a listed product.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self::new(
            product.id.clone(),
            product.name.clone(),
            product.price,
            quantity,
            product.seller.clone(),
        )
        .with_stock(product.stock)
    }

    /// Sets whether the item is selected for checkout.
    #[must_use]
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Sets the stock limit.
    #[must_use]
    pub fn with_stock(mut self, stock: Option<u32>) -> Self {
        self.stock = stock;
        self
    }

    /// Sets the product variant.
    #[must_use]
    pub fn with_variant(mut self, variant: Option<String>) -> Self {
        self.variant = variant;
        self
    }

    /// Returns the product id
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Returns the product name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price
    pub fn unit_price(&self) -> Rupiah {
        self.unit_price
    }

    /// Returns the quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the seller
    pub fn seller(&self) -> &Seller {
        &self.seller
    }

    /// Returns the seller id
    pub fn seller_id(&self) -> &SellerId {
        &self.seller.id
    }

    /// Returns the seller's store name
    pub fn seller_name(&self) -> &str {
        &self.seller.name
    }

    /// Whether the item is selected for checkout.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Units in stock, if tracked
    pub fn stock(&self) -> Option<u32> {
        self.stock
    }

    /// Returns the product variant
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Unit price multiplied by quantity.
    pub fn line_total(&self) -> Rupiah {
        self.unit_price.times(self.quantity)
    }

    /// Whether `quantity` is at least one and within stock.
    pub fn accepts_quantity(&self, quantity: u32) -> bool {
        quantity >= 1 && self.stock.is_none_or(|stock| quantity <= stock)
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kemeja() -> LineItem {
        LineItem::new(
            ProductId::new("p-1"),
            "Kemeja",
            Rupiah::new(50_000),
            2,
            Seller::new("toko-a", "Toko A"),
        )
    }

    #[test]
    fn new_items_are_selected_by_default() {
        assert!(kemeja().is_selected());
        assert!(!kemeja().with_selected(false).is_selected());
    }

    #[test]
    fn line_total_is_price_times_quantity() {
        assert_eq!(kemeja().line_total(), Rupiah::new(100_000));
    }

    #[test]
    fn accepts_quantity_respects_minimum_and_stock() {
        let unlimited = kemeja();
        let limited = kemeja().with_stock(Some(3));

        assert!(!unlimited.accepts_quantity(0));
        assert!(unlimited.accepts_quantity(1_000));
        assert!(limited.accepts_quantity(3));
        assert!(!limited.accepts_quantity(4));
    }

    #[test]
    fn from_product_copies_listing_details() {
        let product = Product {
            id: ProductId::new("p-9"),
            name: "Sepatu".to_string(),
            price: Rupiah::new(300_000),
            seller: Seller::new("toko-b", "Toko B"),
            stock: Some(5),
        };

        let item = LineItem::from_product(&product, 1);

        assert_eq!(item.product_id(), &product.id);
        assert_eq!(item.unit_price(), Rupiah::new(300_000));
        assert_eq!(item.seller_id().as_str(), "toko-b");
        assert_eq!(item.seller_name(), "Toko B");
        assert_eq!(item.stock(), Some(5));
    }

    #[test]
    fn variant_is_optional() {
        let red = kemeja().with_variant(Some("merah".to_string()));

        assert_eq!(kemeja().variant(), None);
        assert_eq!(red.variant(), Some("merah"));
    }
}
