//! Lapak prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    api::{ApiError, CartItemRecord, MarketplaceApi, OrderConfirmation},
    cart::{Cart, CartError, QuantityChange},
    checkout::{CheckoutError, CheckoutRequest, OrderLine, PaymentMethod, ShippingAddress},
    fixtures::{CheckoutFixture, Fixture, FixtureError},
    ids::{ProductId, SellerId, ShippingOptionId},
    items::LineItem,
    money::Rupiah,
    orders::{DateRange, OrderFilter, OrderRecord, OrderStatus, filter_orders},
    pricing::{OrderSelections, OrderSummary, OrderTotals, compute_summary, compute_totals},
    products::{Product, search_products},
    promotions::{
        AppliedPromo, PromoCode, PromoDiscount, PromoError, PromoValidator, StaticPromoCatalog,
        validate_promo,
    },
    receipt::{Receipt, ReceiptError},
    sellers::{Seller, SellerGroup, group_by_seller},
    session::{Session, SessionState, SessionToken, UserProfile},
    shipping::{CatalogError, ShippingCatalog, ShippingOption},
    storefront::{Storefront, StorefrontError},
};
