//! Cart

use thiserror::Error;
use tracing::debug;

use crate::{
    ids::{ProductId, SellerId},
    items::LineItem,
    money::Rupiah,
    sellers::{SellerGroup, group_by_seller},
};

/// Errors related to cart changes.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// No line in the cart holds the product.
    #[error("Item {0} not found")]
    ItemNotFound(ProductId),

    /// An item was added with a quantity of zero.
    #[error("Cannot add zero units of {0}")]
    ZeroQuantity(ProductId),

    /// An item was added for a product with no stock left.
    #[error("Product {0} is out of stock")]
    OutOfStock(ProductId),
}

/// Outcome of a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The quantity was updated.
    Applied {
        /// Quantity before the change
        from: u32,

        /// Quantity after the change
        to: u32,
    },

    /// The requested quantity was below one or above stock, so nothing changed.
    Ignored,
}

/// Shopping cart holding at most one line per product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart from existing lines, merging lines for the same product.
    ///
    /// Lines with a quantity of zero are dropped.
    pub fn with_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut cart = Self::new();

        for item in items {
            if item.quantity() == 0 {
                debug!(product = %item.product_id(), "dropping zero-quantity line");
                continue;
            }

            cart.merge(item);
        }

        cart
    }

    /// Add an item to the cart.
    ///
    /// Adding a product already in the cart increases that line's quantity,
    /// capped at the available stock.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`]: the item has a quantity of zero.
    /// - [`CartError::OutOfStock`]: the product has no stock left.
    pub fn add_item(&mut self, item: LineItem) -> Result<&LineItem, CartError> {
        Self::check_addable(&item)?;

        let product = item.product_id().clone();
        let idx = self.merge(item);

        self.items.get(idx).ok_or(CartError::ItemNotFound(product))
    }

    /// Check that `item` could be added to a cart.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`]: the item has a quantity of zero.
    /// - [`CartError::OutOfStock`]: the product has no stock left.
    pub fn check_addable(item: &LineItem) -> Result<(), CartError> {
        if item.quantity() == 0 {
            return Err(CartError::ZeroQuantity(item.product_id().clone()));
        }

        if item.stock() == Some(0) {
            return Err(CartError::OutOfStock(item.product_id().clone()));
        }

        Ok(())
    }

    /// Remove the line holding `product`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the product is not in the cart.
    pub fn remove_item(&mut self, product: &ProductId) -> Result<LineItem, CartError> {
        let idx = self.position(product)?;

        Ok(self.items.remove(idx))
    }

    /// Remove every selected line, returning the removed lines.
    pub fn remove_selected(&mut self) -> Vec<LineItem> {
        let (selected, kept): (Vec<_>, Vec<_>) =
            self.items.drain(..).partition(LineItem::is_selected);

        self.items = kept;

        selected
    }

    /// Change the quantity of the line holding `product`.
    ///
    /// Quantities below one or above the line's stock are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the product is not in the cart.
    pub fn set_quantity(
        &mut self,
        product: &ProductId,
        quantity: u32,
    ) -> Result<QuantityChange, CartError> {
        let item = self.get_item_mut(product)?;

        if !item.accepts_quantity(quantity) {
            debug!(
                product = %product,
                quantity,
                stock = ?item.stock(),
                "ignoring out-of-range quantity change"
            );

            return Ok(QuantityChange::Ignored);
        }

        let from = item.quantity();
        item.set_quantity(quantity);

        Ok(QuantityChange::Applied { from, to: quantity })
    }

    /// Flip the selection of the line holding `product`, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the product is not in the cart.
    pub fn toggle_selected(&mut self, product: &ProductId) -> Result<bool, CartError> {
        let item = self.get_item_mut(product)?;
        let selected = !item.is_selected();

        item.set_selected(selected);

        Ok(selected)
    }

    /// Select or deselect every line.
    pub fn set_all_selected(&mut self, selected: bool) {
        for item in &mut self.items {
            item.set_selected(selected);
        }
    }

    /// Select or deselect every line sold by `seller`, returning how many lines changed.
    pub fn set_seller_selected(&mut self, seller: &SellerId, selected: bool) -> usize {
        let mut changed = 0;

        for item in &mut self.items {
            if item.seller_id() == seller && item.is_selected() != selected {
                item.set_selected(selected);
                changed += 1;
            }
        }

        changed
    }

    /// Get the line holding `product`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the product is not in the cart.
    pub fn get_item(&self, product: &ProductId) -> Result<&LineItem, CartError> {
        self.items
            .iter()
            .find(|item| item.product_id() == product)
            .ok_or_else(|| CartError::ItemNotFound(product.clone()))
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// All lines, in the order they were added.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over the selected lines.
    pub fn selected_items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|item| item.is_selected())
    }

    /// Selected lines grouped by seller.
    pub fn seller_groups(&self) -> Vec<SellerGroup<'_>> {
        group_by_seller(&self.items)
    }

    /// Sum of the selected line totals.
    pub fn selected_subtotal(&self) -> Rupiah {
        self.selected_items().map(LineItem::line_total).sum()
    }

    /// Whether any line is selected.
    pub fn has_selection(&self) -> bool {
        self.items.iter().any(LineItem::is_selected)
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, product: &ProductId) -> Result<usize, CartError> {
        self.items
            .iter()
            .position(|item| item.product_id() == product)
            .ok_or_else(|| CartError::ItemNotFound(product.clone()))
    }

    fn get_item_mut(&mut self, product: &ProductId) -> Result<&mut LineItem, CartError> {
        self.items
            .iter_mut()
            .find(|item| item.product_id() == product)
            .ok_or_else(|| CartError::ItemNotFound(product.clone()))
    }

    /// Merge `item` into the cart and return the index of its line.
    fn merge(&mut self, item: LineItem) -> usize {
        let Some(idx) = self
            .items
            .iter()
            .position(|existing| existing.product_id() == item.product_id())
        else {
            self.items.push(item);
            return self.items.len() - 1;
        };

        if let Some(existing) = self.items.get_mut(idx) {
            let wanted = existing.quantity().saturating_add(item.quantity());
            let capped = existing.stock().map_or(wanted, |stock| wanted.min(stock));

            existing.set_quantity(capped);
        }

        idx
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
