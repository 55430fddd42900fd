//! Checkout
//!
//! The order payload names products and quantities only. Prices, shipping and
//! discounts are never sent: the order API prices the order itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cart::Cart, ids::ProductId, items::LineItem};

/// Errors building a checkout request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// No cart line is selected.
    #[error("no items selected for checkout")]
    EmptySelection,

    /// A required shipping address field is blank.
    #[error("shipping address is missing {0}")]
    IncompleteAddress(&'static str),
}

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer to a virtual account
    BankTransfer,

    /// E-wallet payment
    EWallet,

    /// Credit or debit card
    Card,

    /// Cash on delivery
    CashOnDelivery,
}

/// Delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Recipient name
    pub recipient: String,

    /// Recipient phone number
    pub phone: String,

    /// Street address
    pub street: String,

    /// City
    pub city: String,

    /// Postal code
    pub postal_code: String,
}

impl ShippingAddress {
    /// Check every field is filled in.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::IncompleteAddress`] naming the first blank field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let fields = [
            ("recipient", &self.recipient),
            ("phone", &self.phone),
            ("street", &self.street),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
        ];

        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(CheckoutError::IncompleteAddress(*name)),
            None => Ok(()),
        }
    }
}

/// A product line in an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product id
    pub product_id: ProductId,

    /// Units ordered
    pub quantity: u32,

    /// Product variant, if any
    pub variant: Option<String>,
}

impl From<&LineItem> for OrderLine {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id().clone(),
            quantity: item.quantity(),
            variant: item.variant().map(ToString::to_string),
        }
    }
}

/// Body of the order creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Ordered lines
    pub items: Vec<OrderLine>,

    /// Where to deliver
    pub shipping_address: ShippingAddress,

    /// How the buyer pays
    pub payment_method: PaymentMethod,

    /// Note for the sellers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CheckoutRequest {
    /// Build an order request from the cart's selected lines.
    ///
    /// Blank notes are dropped.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptySelection`]: no line is selected.
    /// - [`CheckoutError::IncompleteAddress`]: an address field is blank.
    pub fn from_cart(
        cart: &Cart,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        notes: Option<String>,
    ) -> Result<Self, CheckoutError> {
        let items: Vec<OrderLine> = cart.selected_items().map(OrderLine::from).collect();

        if items.is_empty() {
            return Err(CheckoutError::EmptySelection);
        }

        shipping_address.validate()?;

        Ok(Self {
            items,
            shipping_address,
            payment_method,
            notes: notes.filter(|notes| !notes.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::{money::Rupiah, sellers::Seller};

    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            recipient: "Sari".to_string(),
            phone: "0812000000".to_string(),
            street: "Jl. Merdeka 1".to_string(),
            city: "Bandung".to_string(),
            postal_code: "40111".to_string(),
        }
    }

    fn cart() -> Cart {
        let seller = Seller::new("a", "Toko A");

        Cart::with_items([
            LineItem::new(
                ProductId::new("p-1"),
                "Kemeja",
                Rupiah::new(50_000),
                2,
                seller.clone(),
            )
            .with_variant(Some("L".to_string())),
            LineItem::new(ProductId::new("p-2"), "Topi", Rupiah::new(20_000), 1, seller)
                .with_selected(false),
        ])
    }

    #[test]
    fn from_cart_includes_only_selected_lines() -> TestResult {
        let request =
            CheckoutRequest::from_cart(&cart(), address(), PaymentMethod::EWallet, None)?;

        assert_eq!(
            request.items,
            vec![OrderLine {
                product_id: ProductId::new("p-1"),
                quantity: 2,
                variant: Some("L".to_string()),
            }]
        );

        Ok(())
    }

    #[test]
    fn payload_carries_no_prices() -> TestResult {
        let request = CheckoutRequest::from_cart(
            &cart(),
            address(),
            PaymentMethod::BankTransfer,
            Some("Tolong dibungkus rapi".to_string()),
        )?;

        let payload = serde_json::to_value(&request)?;

        assert_eq!(
            payload,
            json!({
                "items": [{ "product_id": "p-1", "quantity": 2, "variant": "L" }],
                "shipping_address": {
                    "recipient": "Sari",
                    "phone": "0812000000",
                    "street": "Jl. Merdeka 1",
                    "city": "Bandung",
                    "postal_code": "40111"
                },
                "payment_method": "bank_transfer",
                "notes": "Tolong dibungkus rapi"
            })
        );

        Ok(())
    }

    #[test]
    fn from_cart_rejects_empty_selection() {
        let mut cart = cart();
        cart.set_all_selected(false);

        let result = CheckoutRequest::from_cart(&cart, address(), PaymentMethod::Card, None);

        assert_eq!(result, Err(CheckoutError::EmptySelection));
    }

    #[test]
    fn from_cart_rejects_incomplete_address() {
        let mut address = address();
        address.city = "  ".to_string();

        let result = CheckoutRequest::from_cart(&cart(), address, PaymentMethod::Card, None);

        assert_eq!(result, Err(CheckoutError::IncompleteAddress("city")));
    }

    #[test]
    fn blank_notes_are_dropped() -> TestResult {
        let request = CheckoutRequest::from_cart(
            &cart(),
            address(),
            PaymentMethod::CashOnDelivery,
            Some(" ".to_string()),
        )?;

        assert_eq!(request.notes, None);

        Ok(())
    }
}
