//! Shipping address arguments

use clap::Args;

use lapak::checkout::ShippingAddress;

/// Delivery address for `payload`.
#[derive(Debug, Args)]
pub struct AddressArgs {
    /// Recipient name
    #[arg(long)]
    pub recipient: String,

    /// Recipient phone number
    #[arg(long)]
    pub phone: String,

    /// Street address
    #[arg(long)]
    pub street: String,

    /// City
    #[arg(long)]
    pub city: String,

    /// Postal code
    #[arg(long)]
    pub postal_code: String,
}

impl From<AddressArgs> for ShippingAddress {
    fn from(args: AddressArgs) -> Self {
        Self {
            recipient: args.recipient,
            phone: args.phone,
            street: args.street,
            city: args.city,
            postal_code: args.postal_code,
        }
    }
}
