//! Bespoke Baby CLI - drive the storefront cart from a terminal.
//!
//! Cart state lives in `BESPOKE_DATA_DIR` between runs, so a sequence of
//! invocations behaves like one browsing session.
//!
//! # Usage
//!
//! ```bash
//! # Add items
//! bb-cli add "Organic Cotton Onesie" 25000
//! bb-cli add "Bamboo Bib" 8000
//!
//! # Open the cart view (optionally as the rendered HTML fragments)
//! bb-cli show
//! bb-cli show --html
//!
//! # Remove a line item by the ID printed by `show`
//! bb-cli remove 01929b2e-...
//!
//! # Check out and wait for the purchase to complete
//! bb-cli checkout
//!
//! # Engagement triggers
//! bb-cli subscribe parent@example.com
//! bb-cli feature organic_cotton
//! bb-cli category newborn
//! bb-cli hover "Bamboo Bib"
//! bb-cli contact --subject "Sizing question" --phone "+256 700 000000"
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use bespoke_baby_core::CartItemId;
use bespoke_baby_storefront::notifications::NotificationCenter;
use bespoke_baby_storefront::{Storefront, StorefrontConfig};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod terminal;

use commands::CommandError;
use terminal::TerminalSurface;

#[derive(Parser)]
#[command(name = "bb-cli")]
#[command(author, version, about = "Bespoke Baby storefront cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an item to the cart
    Add {
        /// Product name
        name: String,

        /// Unit price in the configured currency
        price: Decimal,
    },
    /// Remove a line item from the cart
    Remove {
        /// Line item ID, as printed by `show`
        id: CartItemId,
    },
    /// Open the cart view
    Show {
        /// Print the rendered HTML fragments instead of a table
        #[arg(long)]
        html: bool,
    },
    /// Check out and wait for the purchase to complete
    Checkout,
    /// Sign up for the newsletter
    Subscribe {
        /// Email address
        email: String,
    },
    /// Click a feature card
    Feature {
        /// Feature key, e.g. `organic_cotton`
        name: String,
    },
    /// Click a category tile
    Category {
        /// Category name
        name: String,
    },
    /// Hover over a product card
    Hover {
        /// Product name
        product: String,
    },
    /// Submit the contact form
    Contact {
        /// Message subject
        #[arg(long)]
        subject: String,

        /// Optional phone number
        #[arg(long)]
        phone: Option<String>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bespoke_baby_storefront=info,bb_cli=info".into());

    // Configuration errors are reported once the subscriber is installed
    let config = StorefrontConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(CommandError::from(e)),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CommandError> {
    let surface = Arc::new(TerminalSurface::new(config.currency));
    let notices = Arc::new(NotificationCenter::from_config(&config));
    let storefront = Storefront::open(config, surface.clone(), notices.clone())?;

    match cli.command {
        Commands::Add { name, price } => commands::cart::add(&storefront, &name, price).await?,
        Commands::Remove { id } => commands::cart::remove(&storefront, id).await,
        Commands::Show { html } => commands::cart::show(&storefront, &surface, html).await?,
        Commands::Checkout => commands::cart::checkout(&storefront).await,
        Commands::Subscribe { email } => commands::engage::subscribe(&storefront, &email)?,
        Commands::Feature { name } => commands::engage::feature(&storefront, &name),
        Commands::Category { name } => commands::engage::category(&storefront, &name),
        Commands::Hover { product } => commands::engage::hover(&storefront, &product),
        Commands::Contact { subject, phone } => {
            commands::engage::contact(&storefront, &subject, phone.as_deref());
        }
    }

    terminal::print_notifications(&notices);
    Ok(())
}
