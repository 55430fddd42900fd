//! CLI configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lapak::checkout::PaymentMethod;

use crate::config::{address::AddressArgs, observability::LoggingConfig};

pub(crate) mod address;
pub(crate) mod observability;

/// Lapak command line
#[derive(Debug, Parser)]
#[command(name = "lapak", about = "Marketplace cart pricing and checkout", long_about = None)]
pub struct CliConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Directory holding `checkouts/<name>.yml` fixtures.
    #[arg(long, env = "LAPAK_FIXTURES_DIR", default_value = "./fixtures", global = true)]
    pub fixtures_dir: PathBuf,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the receipt for a checkout fixture.
    Totals {
        /// Fixture name
        fixture: String,

        /// Promo code, replacing the fixture's
        #[arg(long)]
        promo: Option<String>,
    },

    /// Print the order request body for a checkout fixture.
    Payload {
        /// Fixture name
        fixture: String,

        /// Delivery address.
        #[command(flatten)]
        address: AddressArgs,

        /// Payment method
        #[arg(long, value_enum)]
        payment: PaymentMethod,

        /// Note for the sellers
        #[arg(long)]
        notes: Option<String>,
    },
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
