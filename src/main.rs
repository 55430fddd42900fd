//! Lapak CLI

use std::{
    io::{self, Write},
    process,
};

use thiserror::Error;
use tracing::{error, info, warn};

use lapak::{
    checkout::{CheckoutError, CheckoutRequest},
    fixtures::{Fixture, FixtureError},
    promotions::{AppliedPromo, PromoCode, StaticPromoCatalog},
    receipt::{Receipt, ReceiptError},
    shipping::ShippingCatalog,
};

use crate::config::{CliConfig, Command};

mod config;
mod logging;

/// Errors running a command.
#[derive(Debug, Error)]
enum CliError {
    #[error("fixture error")]
    Fixture(#[from] FixtureError),

    #[error("receipt error")]
    Receipt(#[from] ReceiptError),

    #[error("checkout error")]
    Checkout(#[from] CheckoutError),

    #[error("failed to encode payload")]
    Json(#[from] serde_json::Error),

    #[error("failed to write output")]
    Io(#[from] io::Error),
}

/// Lapak CLI entry point
fn main() {
    let config = CliConfig::load().unwrap_or_else(|e| e.exit());

    if let Err(err) = logging::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for subscriber errors"
        )]
        {
            eprintln!("Logging error: {err}");
        }

        process::exit(1);
    }

    if let Err(err) = run(config) {
        error!(error = ?err, "{err}");

        process::exit(1);
    }
}

fn run(config: CliConfig) -> Result<(), CliError> {
    let fixtures = Fixture::with_base_path(&config.fixtures_dir);
    let catalog = ShippingCatalog::standard();

    match config.command {
        Command::Totals { fixture, promo } => {
            let checkout = fixtures.load_checkout(&fixture)?;
            let cart = checkout.cart();
            let selections = checkout.selections();

            let validator = StaticPromoCatalog::standard();
            let mut applied = AppliedPromo::new();

            if let Some(code) = promo.as_deref().or(checkout.promo_code()) {
                if let Err(err) = applied.apply(code, &validator) {
                    warn!(code, error = %err, "pricing without promo");
                }
            }

            let summary = selections.summarize(&cart, applied.current(), &catalog);

            info!(
                fixture = %fixture,
                sellers = summary.sellers.len(),
                grand_total = summary.totals.grand_total.get(),
                "priced checkout"
            );

            Receipt::new(&summary, applied.current().map(PromoCode::code))
                .write_to(io::stdout().lock())?;
        }

        Command::Payload {
            fixture,
            address,
            payment,
            notes,
        } => {
            let checkout = fixtures.load_checkout(&fixture)?;
            let request =
                CheckoutRequest::from_cart(&checkout.cart(), address.into(), payment, notes)?;

            let mut out = io::stdout().lock();

            serde_json::to_writer_pretty(&mut out, &request)?;
            writeln!(out)?;
        }
    }

    Ok(())
}
