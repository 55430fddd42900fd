//! Lapak
//!
//! Lapak is the buyer-side core of a multi-seller marketplace: cart, per-seller
//! shipping and insurance, promo codes, order totals, checkout payloads and
//! order history.
//!
//! Totals computed here are for display. The marketplace API prices every
//! order itself, so nothing in a [`checkout::CheckoutRequest`] is a price.

pub mod api;
pub mod cart;
pub mod checkout;
pub mod fixtures;
pub mod ids;
pub mod items;
pub mod money;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod promotions;
pub mod receipt;
pub mod sellers;
pub mod session;
pub mod shipping;
pub mod storefront;
