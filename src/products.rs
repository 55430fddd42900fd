//! Products

use serde::{Deserialize, Serialize};

use crate::{ids::ProductId, money::Rupiah, sellers::Seller};

/// A product listed by a seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product price
    pub price: Rupiah,

    /// Seller listing the product
    pub seller: Seller,

    /// Units in stock, if tracked
    #[serde(default)]
    pub stock: Option<u32>,
}

/// Products whose name contains `query`, ignoring case.
///
/// A blank query matches every product.
pub fn search_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();

    products
        .iter()
        .filter(|product| needle.is_empty() || product.name.to_lowercase().contains(&needle))
        .collect()
}
