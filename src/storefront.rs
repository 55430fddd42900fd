//! Storefront
//!
//! The buyer-facing state machine: session, cart, checkout selections and
//! applied promo, kept in one place and changed only through the operations
//! below. Totals are recomputed from that state on demand.

use std::{fmt, sync::Arc};

use jiff::Timestamp;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    api::{ApiError, MarketplaceApi, OrderConfirmation},
    cart::{Cart, CartError, QuantityChange},
    checkout::{CheckoutError, CheckoutRequest, PaymentMethod, ShippingAddress},
    ids::{ProductId, SellerId, ShippingOptionId},
    items::LineItem,
    orders::{OrderFilter, OrderRecord, filter_orders},
    pricing::{OrderSelections, OrderSummary, OrderTotals},
    products::Product,
    promotions::{AppliedPromo, PromoCode, PromoError, PromoValidator},
    session::{Session, SessionState, UserProfile},
    shipping::{ShippingCatalog, ShippingOption},
};

/// Errors from storefront operations.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The operation needs a logged-in buyer.
    #[error("not logged in")]
    NotAuthenticated,

    /// The marketplace API failed.
    #[error("marketplace request failed")]
    Api(#[from] ApiError),

    /// The cart change was invalid.
    #[error("cart error")]
    Cart(#[from] CartError),

    /// The checkout request could not be built.
    #[error("checkout error")]
    Checkout(#[from] CheckoutError),

    /// The promo code was rejected.
    #[error("promo error")]
    Promo(#[from] PromoError),
}

impl StorefrontError {
    /// Whether retrying the operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorefrontError::Api(err) if err.is_retryable())
    }
}

/// A buyer's view of the marketplace.
pub struct Storefront {
    api: Arc<dyn MarketplaceApi>,
    promos: Box<dyn PromoValidator>,
    catalog: ShippingCatalog,
    session: SessionState,
    cart: Cart,
    selections: OrderSelections,
    promo: AppliedPromo,
}

impl fmt::Debug for Storefront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storefront")
            .field("catalog", &self.catalog)
            .field("session", &self.session)
            .field("cart", &self.cart)
            .field("selections", &self.selections)
            .field("promo", &self.promo)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Create an anonymous storefront with an empty cart.
    pub fn new(
        api: Arc<dyn MarketplaceApi>,
        promos: Box<dyn PromoValidator>,
        catalog: ShippingCatalog,
    ) -> Self {
        Self {
            api,
            promos,
            catalog,
            session: SessionState::default(),
            cart: Cart::new(),
            selections: OrderSelections::new(),
            promo: AppliedPromo::new(),
        }
    }

    /// Start a session, discarding any state left from a previous buyer.
    pub fn login(&mut self, session: Session) -> &UserProfile {
        self.reset();

        info!(user = %session.user.id, "logged in");

        &self.session.login(session).user
    }

    /// End the session and clear the cart, selections and promo.
    pub fn logout(&mut self) -> Option<Session> {
        self.reset();

        let session = self.session.logout();

        if let Some(session) = &session {
            info!(user = %session.user.id, "logged out");
        }

        session
    }

    /// Session state.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Current cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Shipping options on offer.
    pub fn catalog(&self) -> &ShippingCatalog {
        &self.catalog
    }

    /// Shipping and insurance selections.
    pub fn selections(&self) -> &OrderSelections {
        &self.selections
    }

    /// Promo applied to the checkout.
    pub fn applied_promo(&self) -> Option<&PromoCode> {
        self.promo.current()
    }

    /// Replace the cart with the server's copy.
    ///
    /// Lines the buyer had deselected stay deselected.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotAuthenticated`]: nobody is logged in.
    /// - [`StorefrontError::Api`]: the request failed or returned an invalid line.
    ///   The current cart is kept.
    pub async fn load_cart(&mut self) -> Result<&Cart, StorefrontError> {
        let records = self
            .api
            .fetch_cart(self.require_session()?)
            .await
            .inspect_err(|err| {
                warn!(error = %err, retryable = err.is_retryable(), "failed to load cart");
            })?;

        let items = records
            .into_iter()
            .map(LineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let cart = Cart::with_items(items.into_iter().map(|item| {
            let deselected = self
                .cart
                .get_item(item.product_id())
                .is_ok_and(|existing| !existing.is_selected());

            item.with_selected(!deselected)
        }));

        debug!(lines = cart.len(), "loaded cart");

        self.cart = cart;

        Ok(&self.cart)
    }

    /// Add units of a listed product on the server, then locally.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotAuthenticated`]: nobody is logged in.
    /// - [`StorefrontError::Cart`]: a zero quantity or a product out of stock.
    ///   The server is not contacted.
    /// - [`StorefrontError::Api`]: the server rejected the addition; the cart is unchanged.
    pub async fn add_to_cart(
        &mut self,
        product: &Product,
        quantity: u32,
    ) -> Result<&LineItem, StorefrontError> {
        let session = self.require_session()?;
        let item = LineItem::from_product(product, quantity);

        Cart::check_addable(&item)?;

        self.api
            .add_item(session, &product.id, quantity)
            .await
            .inspect_err(|err| {
                warn!(product = %product.id, error = %err, "failed to add item");
            })?;

        Ok(self.cart.add_item(item)?)
    }

    /// Change a line's quantity on the server, then locally.
    ///
    /// A quantity below one or above stock is ignored without contacting the server.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotAuthenticated`]: nobody is logged in.
    /// - [`StorefrontError::Cart`]: the product is not in the cart.
    /// - [`StorefrontError::Api`]: the server rejected the change; the cart is unchanged.
    pub async fn change_quantity(
        &mut self,
        product: &ProductId,
        quantity: u32,
    ) -> Result<QuantityChange, StorefrontError> {
        let session = self.require_session()?;

        if !self.cart.get_item(product)?.accepts_quantity(quantity) {
            debug!(product = %product, quantity, "quantity out of range, not sent");

            return Ok(QuantityChange::Ignored);
        }

        self.api
            .update_quantity(session, product, quantity)
            .await
            .inspect_err(|err| {
                warn!(product = %product, error = %err, "failed to update quantity");
            })?;

        Ok(self.cart.set_quantity(product, quantity)?)
    }

    /// Remove a line on the server, then locally.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotAuthenticated`]: nobody is logged in.
    /// - [`StorefrontError::Cart`]: the product is not in the cart.
    /// - [`StorefrontError::Api`]: the server rejected the removal; the cart is unchanged.
    pub async fn remove_item(&mut self, product: &ProductId) -> Result<LineItem, StorefrontError> {
        let session = self.require_session()?;

        self.cart.get_item(product)?;

        self.api
            .remove_item(session, product)
            .await
            .inspect_err(|err| {
                warn!(product = %product, error = %err, "failed to remove item");
            })?;

        Ok(self.cart.remove_item(product)?)
    }

    /// Flip whether a line is selected for checkout.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Cart`] if the product is not in the cart.
    pub fn toggle_selected(&mut self, product: &ProductId) -> Result<bool, StorefrontError> {
        Ok(self.cart.toggle_selected(product)?)
    }

    /// Select or deselect every line.
    pub fn select_all(&mut self, selected: bool) {
        self.cart.set_all_selected(selected);
    }

    /// Select or deselect every line from one seller.
    pub fn select_seller(&mut self, seller: &SellerId, selected: bool) -> usize {
        self.cart.set_seller_selected(seller, selected)
    }

    /// Choose a seller's shipping option, returning the option that will be charged.
    pub fn select_shipping(&mut self, seller: SellerId, option: ShippingOptionId) -> &ShippingOption {
        self.selections.select_shipping(seller, option.clone());

        self.catalog.resolve(Some(&option))
    }

    /// Opt a seller group in or out of insurance.
    pub fn set_insurance(&mut self, seller: SellerId, insured: bool) {
        self.selections.set_insurance(seller, insured);
    }

    /// Apply a promo code, replacing the current one.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Promo`] if the code is rejected; the applied
    /// promo is unchanged.
    pub fn apply_promo(&mut self, code: &str) -> Result<&PromoCode, StorefrontError> {
        Ok(self.promo.apply(code, self.promos.as_ref())?)
    }

    /// Remove the applied promo.
    pub fn clear_promo(&mut self) -> Option<PromoCode> {
        self.promo.clear()
    }

    /// Per-seller breakdown and totals for the current selection.
    pub fn summary(&self) -> OrderSummary<'_> {
        self.selections
            .summarize(&self.cart, self.promo.current(), &self.catalog)
    }

    /// Totals for the current selection.
    pub fn totals(&self) -> OrderTotals {
        self.summary().totals
    }

    /// Place an order for the selected lines.
    ///
    /// On success the purchased lines and the promo are cleared. On failure
    /// nothing changes.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotAuthenticated`]: nobody is logged in.
    /// - [`StorefrontError::Checkout`]: nothing is selected or the address is incomplete.
    /// - [`StorefrontError::Api`]: the server rejected the order.
    pub async fn checkout(
        &mut self,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        notes: Option<String>,
    ) -> Result<OrderConfirmation, StorefrontError> {
        let session = self.require_session()?;
        let request =
            CheckoutRequest::from_cart(&self.cart, shipping_address, payment_method, notes)?;
        let displayed = self.totals().grand_total;

        let confirmation = self
            .api
            .create_order(session, &request)
            .await
            .inspect_err(|err| {
                warn!(error = %err, retryable = err.is_retryable(), "order was not placed");
            })?;

        info!(
            order_number = %confirmation.order_number,
            total = confirmation.total.get(),
            lines = request.items.len(),
            "order placed"
        );

        if confirmation.total != displayed {
            info!(
                displayed = displayed.get(),
                charged = confirmation.total.get(),
                "server total differs from displayed total"
            );
        }

        self.cart.remove_selected();
        self.promo.clear();

        Ok(confirmation)
    }

    /// Past orders matching `filter`.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotAuthenticated`]: nobody is logged in.
    /// - [`StorefrontError::Api`]: the request failed.
    pub async fn order_history(
        &self,
        filter: &OrderFilter,
        now: Timestamp,
    ) -> Result<Vec<OrderRecord>, StorefrontError> {
        let orders = self.api.fetch_orders(self.require_session()?).await?;

        Ok(filter_orders(&orders, filter, now)
            .into_iter()
            .cloned()
            .collect())
    }

    fn require_session(&self) -> Result<&Session, StorefrontError> {
        self.session
            .session()
            .ok_or(StorefrontError::NotAuthenticated)
    }

    fn reset(&mut self) {
        self.cart = Cart::new();
        self.selections.clear();
        self.promo.clear();
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        api::MockMarketplaceApi, money::Rupiah, promotions::StaticPromoCatalog, sellers::Seller,
        session::SessionToken,
    };

    use super::*;

    fn storefront() -> Storefront {
        with_api(MockMarketplaceApi::new())
    }

    fn with_api(api: MockMarketplaceApi) -> Storefront {
        let mut store = Storefront::new(
            Arc::new(api),
            Box::new(StaticPromoCatalog::standard()),
            ShippingCatalog::standard(),
        );

        store.login(Session::new(
            SessionToken::new("t"),
            UserProfile {
                id: "u-1".to_string(),
                name: "Sari".to_string(),
                email: "sari@example.com".to_string(),
            },
        ));

        store
    }

    fn accepting_adds() -> Storefront {
        let mut api = MockMarketplaceApi::new();

        api.expect_add_item().returning(|_, _, _| Ok(()));

        with_api(api)
    }

    fn product(id: &str, seller: &str, price: u64) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            price: Rupiah::new(price),
            seller: Seller::new(seller, seller),
            stock: None,
        }
    }

    #[tokio::test]
    async fn summary_reflects_local_changes() -> TestResult {
        let mut store = accepting_adds();

        store.add_to_cart(&product("p-1", "a", 100_000), 1).await?;
        store.set_insurance(SellerId::new("a"), true);
        store.apply_promo("HEMAT50K")?;

        let totals = store.totals();

        assert_eq!(totals.items_subtotal, Rupiah::new(100_000));
        assert_eq!(totals.shipping_total, Rupiah::new(21_400));
        assert_eq!(totals.insurance_total, Rupiah::new(500));
        assert_eq!(totals.discount_amount, Rupiah::new(50_000));
        assert_eq!(totals.grand_total, Rupiah::new(71_900));

        Ok(())
    }

    #[test]
    fn rejected_promo_keeps_current_one() -> TestResult {
        let mut store = storefront();

        store.apply_promo("DISKON10")?;

        let err = store.apply_promo("NOPE").err();

        assert!(matches!(err, Some(StorefrontError::Promo(PromoError::NotFound(_)))));
        assert_eq!(store.applied_promo().map(PromoCode::code), Some("DISKON10"));

        Ok(())
    }

    #[test]
    fn select_shipping_returns_charged_option() {
        let mut store = storefront();

        let option = store.select_shipping(SellerId::new("a"), ShippingOptionId::new("kargo"));

        assert_eq!(option.price, Rupiah::new(15_000));
    }

    #[tokio::test]
    async fn deselected_cart_prices_to_zero() -> TestResult {
        let mut store = accepting_adds();

        store.add_to_cart(&product("p-1", "a", 100_000), 2).await?;
        store.select_all(false);

        assert_eq!(store.totals(), OrderTotals::default());

        Ok(())
    }

    #[tokio::test]
    async fn invalid_addition_never_reaches_server() {
        let mut api = MockMarketplaceApi::new();

        api.expect_add_item().never();

        let mut store = with_api(api);

        let zero = store.add_to_cart(&product("p-1", "a", 10_000), 0).await.err();

        assert!(matches!(
            zero,
            Some(StorefrontError::Cart(CartError::ZeroQuantity(_)))
        ));

        let sold_out = Product {
            stock: Some(0),
            ..product("p-2", "a", 10_000)
        };
        let out_of_stock = store.add_to_cart(&sold_out, 1).await.err();

        assert!(matches!(
            out_of_stock,
            Some(StorefrontError::Cart(CartError::OutOfStock(_)))
        ));
        assert!(store.cart().is_empty());
    }
}
