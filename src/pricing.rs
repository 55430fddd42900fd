//! Pricing
//!
//! Order totals are recomputed from scratch from the current selections on
//! every change. The calculation is pure and cannot fail: an empty or fully
//! deselected cart prices to all zeros.
//!
//! Totals are for display only. The order API recomputes prices server-side
//! and its figures are the ones charged.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::trace;

use crate::{
    ids::{SellerId, ShippingOptionId},
    items::LineItem,
    money::Rupiah,
    promotions::PromoCode,
    sellers::{SellerGroup, group_by_seller},
    shipping::{ShippingCatalog, ShippingOption},
};

/// Insurance premium as a fraction of a seller group's subtotal (0.5%).
pub const INSURANCE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Chosen shipping option per seller.
pub type ShippingSelections = FxHashMap<SellerId, ShippingOptionId>;

/// Insurance opt-in per seller.
pub type InsuranceSelections = FxHashMap<SellerId, bool>;

/// Totals for the selected items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    /// Sum of unit price times quantity over selected items
    pub items_subtotal: Rupiah,

    /// Sum of each seller group's shipping price
    pub shipping_total: Rupiah,

    /// Sum of each insured seller group's premium
    pub insurance_total: Rupiah,

    /// Promo discount, never more than the item subtotal
    pub discount_amount: Rupiah,

    /// Amount payable
    pub grand_total: Rupiah,
}

impl OrderTotals {
    /// Build totals from their components.
    ///
    /// The grand total is `items + shipping + insurance - discount`, floored at zero.
    pub fn from_components(
        items_subtotal: Rupiah,
        shipping_total: Rupiah,
        insurance_total: Rupiah,
        discount_amount: Rupiah,
    ) -> Self {
        let grand_total =
            (items_subtotal + shipping_total + insurance_total).saturating_sub(discount_amount);

        Self {
            items_subtotal,
            shipping_total,
            insurance_total,
            discount_amount,
            grand_total,
        }
    }

    /// Whether there is nothing to pay for.
    pub fn is_empty(&self) -> bool {
        self.items_subtotal.is_zero() && self.shipping_total.is_zero()
    }
}

/// Shipping and insurance for one seller group.
#[derive(Debug)]
pub struct SellerBreakdown<'a> {
    /// The seller's selected items
    pub group: SellerGroup<'a>,

    /// Sum of the group's line totals
    pub subtotal: Rupiah,

    /// Shipping option used for the group
    pub shipping: &'a ShippingOption,

    /// Whether the buyer insured the group
    pub insured: bool,

    /// Insurance premium, zero when uninsured
    pub insurance: Rupiah,
}

/// Per-seller breakdown plus order totals.
#[derive(Debug)]
pub struct OrderSummary<'a> {
    /// One entry per seller with selected items, in cart order
    pub sellers: Vec<SellerBreakdown<'a>>,

    /// Order totals
    pub totals: OrderTotals,
}

/// Insurance premium for a seller group subtotal, rounded half-up to a whole Rupiah.
pub fn insurance_premium(subtotal: Rupiah) -> Rupiah {
    subtotal.apply_rate(INSURANCE_RATE)
}

/// Compute the per-seller breakdown and totals for the selected items.
///
/// Sellers without a shipping selection use the catalog default; sellers without
/// an insurance selection are uninsured. Insurance is rounded per seller group,
/// not on the sum.
pub fn compute_summary<'a, I>(
    items: I,
    shipping: &ShippingSelections,
    insurance: &InsuranceSelections,
    promo: Option<&PromoCode>,
    catalog: &'a ShippingCatalog,
) -> OrderSummary<'a>
where
    I: IntoIterator<Item = &'a LineItem>,
{
    let sellers: Vec<SellerBreakdown<'a>> = group_by_seller(items)
        .into_iter()
        .map(|group| {
            let seller = &group.seller().id;
            let subtotal = group.subtotal();
            let option = catalog.resolve(shipping.get(seller));
            let insured = insurance.get(seller).copied().unwrap_or(false);

            SellerBreakdown {
                subtotal,
                shipping: option,
                insured,
                insurance: if insured {
                    insurance_premium(subtotal)
                } else {
                    Rupiah::ZERO
                },
                group,
            }
        })
        .collect();

    let items_subtotal: Rupiah = sellers.iter().map(|seller| seller.subtotal).sum();
    let shipping_total: Rupiah = sellers.iter().map(|seller| seller.shipping.price).sum();
    let insurance_total: Rupiah = sellers.iter().map(|seller| seller.insurance).sum();
    let discount_amount = promo.map_or(Rupiah::ZERO, |promo| promo.discount_on(items_subtotal));

    let totals = OrderTotals::from_components(
        items_subtotal,
        shipping_total,
        insurance_total,
        discount_amount,
    );

    trace!(
        sellers = sellers.len(),
        items_subtotal = items_subtotal.get(),
        grand_total = totals.grand_total.get(),
        "computed order totals"
    );

    OrderSummary { sellers, totals }
}

/// Compute order totals for the selected items.
///
/// See [`compute_summary`] for the per-seller breakdown.
pub fn compute_totals<'a, I>(
    items: I,
    shipping: &ShippingSelections,
    insurance: &InsuranceSelections,
    promo: Option<&PromoCode>,
    catalog: &'a ShippingCatalog,
) -> OrderTotals
where
    I: IntoIterator<Item = &'a LineItem>,
{
    compute_summary(items, shipping, insurance, promo, catalog).totals
}

/// Shipping and insurance choices made at checkout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderSelections {
    shipping: ShippingSelections,
    insurance: InsuranceSelections,
}

impl OrderSelections {
    /// No selections; every seller gets default shipping and no insurance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose a shipping option for a seller.
    pub fn select_shipping(&mut self, seller: SellerId, option: ShippingOptionId) {
        self.shipping.insert(seller, option);
    }

    /// Opt a seller group in or out of insurance.
    pub fn set_insurance(&mut self, seller: SellerId, insured: bool) {
        self.insurance.insert(seller, insured);
    }

    /// Shipping selections
    pub fn shipping(&self) -> &ShippingSelections {
        &self.shipping
    }

    /// Insurance selections
    pub fn insurance(&self) -> &InsuranceSelections {
        &self.insurance
    }

    /// Forget every selection.
    pub fn clear(&mut self) {
        self.shipping.clear();
        self.insurance.clear();
    }

    /// Compute the breakdown and totals for `items` with these selections.
    pub fn summarize<'a, I>(
        &self,
        items: I,
        promo: Option<&PromoCode>,
        catalog: &'a ShippingCatalog,
    ) -> OrderSummary<'a>
    where
        I: IntoIterator<Item = &'a LineItem>,
    {
        compute_summary(items, &self.shipping, &self.insurance, promo, catalog)
    }
}
