//! Sellers
//!
//! Seller groups are derived, never stored: they are recomputed from the
//! selected line items whenever totals are calculated.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{ids::SellerId, items::LineItem, money::Rupiah};

/// A seller (store) on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    /// Seller id
    pub id: SellerId,

    /// Store display name
    pub name: String,
}

impl Seller {
    /// Create a new seller.
    pub fn new(id: impl Into<SellerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Selected line items sharing a seller.
#[derive(Debug)]
pub struct SellerGroup<'a> {
    seller: &'a Seller,
    items: SmallVec<[&'a LineItem; 10]>,
}

impl<'a> SellerGroup<'a> {
    /// The seller all items in the group belong to.
    pub fn seller(&self) -> &'a Seller {
        self.seller
    }

    /// Iterate over the items in the group.
    pub fn iter(&self) -> impl Iterator<Item = &'a LineItem> + '_ {
        self.items.iter().copied()
    }

    /// Sum of the group's line totals.
    pub fn subtotal(&self) -> Rupiah {
        self.items.iter().map(|item| item.line_total()).sum()
    }

    /// Number of line items in the group.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the group has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Partition the selected items by seller.
///
/// Unselected items are skipped. Groups come out in the order their seller
/// first appears in `items`.
pub fn group_by_seller<'a, I>(items: I) -> Vec<SellerGroup<'a>>
where
    I: IntoIterator<Item = &'a LineItem>,
{
    let mut groups: Vec<SellerGroup<'a>> = Vec::new();
    let mut index: FxHashMap<&'a SellerId, usize> = FxHashMap::default();

    for item in items.into_iter().filter(|item| item.is_selected()) {
        let seller = item.seller();

        if let Some(group) = index.get(&seller.id).and_then(|&idx| groups.get_mut(idx)) {
            group.items.push(item);
            continue;
        }

        index.insert(&seller.id, groups.len());
        groups.push(SellerGroup {
            seller,
            items: SmallVec::from_elem(item, 1),
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use crate::ids::ProductId;

    use super::*;

    fn item(product: &str, seller: &Seller, price: u64, quantity: u32) -> LineItem {
        LineItem::new(
            ProductId::new(product),
            product,
            Rupiah::new(price),
            quantity,
            seller.clone(),
        )
    }

    #[test]
    fn groups_by_seller_in_first_appearance_order() {
        let a = Seller::new("a", "Toko A");
        let b = Seller::new("b", "Toko B");

        let items = [
            item("p-1", &b, 100, 1),
            item("p-2", &a, 200, 1),
            item("p-3", &b, 300, 2),
        ];

        let groups = group_by_seller(&items);

        assert_eq!(groups.len(), 2);

        let ids: Vec<&str> = groups.iter().map(|g| g.seller().id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);

        let subtotals: Vec<Rupiah> = groups.iter().map(SellerGroup::subtotal).collect();
        assert_eq!(subtotals, [Rupiah::new(700), Rupiah::new(200)]);
    }

    #[test]
    fn unselected_items_form_no_group() {
        let a = Seller::new("a", "Toko A");
        let b = Seller::new("b", "Toko B");

        let items = [
            item("p-1", &a, 100, 1),
            item("p-2", &b, 200, 1).with_selected(false),
        ];

        let groups = group_by_seller(&items);

        assert_eq!(groups.len(), 1);
        assert!(groups.iter().all(|g| g.seller().id.as_str() == "a"));
    }

    #[test]
    fn every_selected_item_lands_in_exactly_one_group() {
        let a = Seller::new("a", "Toko A");
        let b = Seller::new("b", "Toko B");

        let items = [
            item("p-1", &a, 100, 1),
            item("p-2", &b, 200, 1),
            item("p-3", &a, 300, 1),
            item("p-4", &b, 400, 1),
        ];

        let groups = group_by_seller(&items);
        let grouped: usize = groups.iter().map(SellerGroup::len).sum();

        assert_eq!(grouped, items.len());
        assert!(groups.iter().all(|g| !g.is_empty()));
    }

    #[test]
    fn no_items_no_groups() {
        let items: [LineItem; 0] = [];

        assert!(group_by_seller(&items).is_empty());
    }
}
