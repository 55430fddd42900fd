//! Marketplace API
//!
//! The remote cart, order and history endpoints, as seen by the storefront.
//! Requests are fire-and-await: there is no retry or backoff here, callers
//! decide what to do with a retryable [`ApiError`].

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    checkout::CheckoutRequest,
    ids::{ProductId, SellerId},
    items::LineItem,
    money::Rupiah,
    orders::{OrderRecord, OrderStatus},
    sellers::Seller,
    session::Session,
};

/// Errors talking to the marketplace API.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// The request never got an answer (connection, timeout, DNS).
    #[error("marketplace unreachable: {0}")]
    Transport(String),

    /// The server answered with an error status.
    #[error("request rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code
        status: u16,

        /// Server-provided message
        message: String,
    },

    /// A cart record carried a price that is not a valid amount.
    #[error("invalid price {price} for product {product}")]
    InvalidPrice {
        /// Offending product
        product: ProductId,

        /// Price as received
        price: f64,
    },

    /// A cart record carried a quantity of zero.
    #[error("zero quantity for product {0}")]
    ZeroQuantity(ProductId),
}

impl ApiError {
    /// Whether the same request may succeed if sent again.
    ///
    /// Transport failures and server-side (5xx) errors are retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Rejected { status, .. } => *status >= 500,
            ApiError::InvalidPrice { .. } | ApiError::ZeroQuantity(_) => false,
        }
    }
}

/// A cart line as returned by the cart endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemRecord {
    /// Product id
    pub product_id: ProductId,

    /// Product name
    pub name: String,

    /// Unit price; may be fractional on the wire
    pub price: f64,

    /// Units in the cart
    pub quantity: u32,

    /// Seller id; older payloads only carry the store name
    #[serde(default)]
    pub seller_id: Option<SellerId>,

    /// Store display name
    #[serde(alias = "seller_name")]
    pub store_name: String,

    /// Units in stock, if tracked
    #[serde(default)]
    pub stock: Option<u32>,

    /// Product variant
    #[serde(default)]
    pub variant: Option<String>,
}

impl TryFrom<CartItemRecord> for LineItem {
    type Error = ApiError;

    fn try_from(record: CartItemRecord) -> Result<Self, Self::Error> {
        let Some(unit_price) = Rupiah::from_f64(record.price) else {
            return Err(ApiError::InvalidPrice {
                product: record.product_id,
                price: record.price,
            });
        };

        if record.quantity == 0 {
            return Err(ApiError::ZeroQuantity(record.product_id));
        }

        let seller_id = record
            .seller_id
            .unwrap_or_else(|| SellerId::new(record.store_name.as_str()));

        Ok(LineItem::new(
            record.product_id,
            record.name,
            unit_price,
            record.quantity,
            Seller::new(seller_id, record.store_name),
        )
        .with_stock(record.stock)
        .with_variant(record.variant))
    }
}

/// Server acknowledgement of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Order number assigned by the server
    pub order_number: String,

    /// Initial status
    pub status: OrderStatus,

    /// Amount to pay, as computed by the server
    pub total: Rupiah,
}

/// Remote marketplace endpoints used by the storefront.
#[automock]
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Fetch the buyer's cart.
    async fn fetch_cart(&self, session: &Session) -> Result<Vec<CartItemRecord>, ApiError>;

    /// Add units of a product to the cart.
    async fn add_item(
        &self,
        session: &Session,
        product: &ProductId,
        quantity: u32,
    ) -> Result<(), ApiError>;

    /// Set the quantity of a cart line.
    async fn update_quantity(
        &self,
        session: &Session,
        product: &ProductId,
        quantity: u32,
    ) -> Result<(), ApiError>;

    /// Remove a cart line.
    async fn remove_item(&self, session: &Session, product: &ProductId) -> Result<(), ApiError>;

    /// Place an order. The server prices it.
    async fn create_order(
        &self,
        session: &Session,
        request: &CheckoutRequest,
    ) -> Result<OrderConfirmation, ApiError>;

    /// Fetch the buyer's past orders.
    async fn fetch_orders(&self, session: &Session) -> Result<Vec<OrderRecord>, ApiError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn record(price: f64) -> CartItemRecord {
        CartItemRecord {
            product_id: ProductId::new("p-1"),
            name: "Kemeja".to_string(),
            price,
            quantity: 2,
            seller_id: None,
            store_name: "Toko Batik".to_string(),
            stock: Some(5),
            variant: None,
        }
    }

    #[test]
    fn record_converts_to_line_item() -> TestResult {
        let item = LineItem::try_from(record(50_000.0))?;

        assert_eq!(item.unit_price(), Rupiah::new(50_000));
        assert_eq!(item.line_total(), Rupiah::new(100_000));
        assert_eq!(item.stock(), Some(5));
        assert!(item.is_selected());

        Ok(())
    }

    #[test]
    fn missing_seller_id_falls_back_to_store_name() -> TestResult {
        let item = LineItem::try_from(record(1.0))?;

        assert_eq!(item.seller_id(), &SellerId::new("Toko Batik"));
        assert_eq!(item.seller_name(), "Toko Batik");

        Ok(())
    }

    #[test]
    fn fractional_prices_round_half_up() -> TestResult {
        let item = LineItem::try_from(record(1_499.5))?;

        assert_eq!(item.unit_price(), Rupiah::new(1_500));

        Ok(())
    }

    #[test]
    fn invalid_prices_are_rejected() {
        for price in [-1.0, -0.4, f64::NAN, f64::INFINITY] {
            let result = LineItem::try_from(record(price));

            assert!(matches!(result, Err(ApiError::InvalidPrice { .. })), "{price}");
        }
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let record = CartItemRecord {
            quantity: 0,
            ..record(10_000.0)
        };

        let result = LineItem::try_from(record);

        assert_eq!(
            result.err(),
            Some(ApiError::ZeroQuantity(ProductId::new("p-1")))
        );
        assert!(!ApiError::ZeroQuantity(ProductId::new("p-1")).is_retryable());
    }

    #[test]
    fn record_accepts_seller_name_alias() -> TestResult {
        let record: CartItemRecord = serde_json::from_str(
            r#"{
                "product_id": "p-9",
                "name": "Topi",
                "price": 20000,
                "quantity": 1,
                "seller_id": "s-1",
                "seller_name": "Toko Topi"
            }"#,
        )?;

        assert_eq!(record.store_name, "Toko Topi");
        assert_eq!(record.seller_id, Some(SellerId::new("s-1")));
        assert_eq!(record.stock, None);

        Ok(())
    }

    #[test]
    fn retryable_errors() {
        assert!(ApiError::Transport("timeout".to_string()).is_retryable());
        assert!(
            ApiError::Rejected {
                status: 503,
                message: "maintenance".to_string()
            }
            .is_retryable()
        );
        assert!(
            !ApiError::Rejected {
                status: 422,
                message: "stock changed".to_string()
            }
            .is_retryable()
        );
    }
}
