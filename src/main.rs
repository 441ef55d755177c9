//! # Miti Tibeb CLI (`mtb`)
//!
//! Drives the storefront data layer against a live backend.
//!
//! ## Usage
//!
//! ```bash
//! mtb --config ./config/mtb.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mtb summary` | Fetch products and print the ranked summary |
//! | `mtb product <id>` | Print one product |
//! | `mtb share <id>` | Generate a referral code and print share links |
//! | `mtb dashboard` | Print admin stats and recent activity |
//!
//! Set `RUST_LOG=debug` to see gateway requests on stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use miti_tibeb::catalog::{ReferralSession, ShareLinks};
use miti_tibeb::config::{self, Config};
use miti_tibeb::controller::{SummaryController, SummaryOptions};
use miti_tibeb::dashboard::DashboardLoader;
use miti_tibeb::gateway::Gateway;
use miti_tibeb::models::LoadState;

/// Miti Tibeb storefront data layer.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file is fine; defaults and `MITI_API_URL` are used.
#[derive(Parser)]
#[command(
    name = "mtb",
    about = "Miti Tibeb storefront data layer",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/mtb.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the product collection and print the ranked summary.
    ///
    /// On failure the static fallback list is printed, as the storefront
    /// would render it.
    Summary {
        /// Field to rank: `material`, `category`, or `vendor`.
        #[arg(long)]
        field: Option<String>,

        /// Number of entries to keep.
        #[arg(long)]
        top: Option<usize>,
    },

    /// Print a product by id.
    Product {
        /// Product id.
        id: String,
    },

    /// Generate a referral code and print share links for a product.
    Share {
        /// Product id.
        id: String,

        /// Product name used in the share text.
        #[arg(long)]
        name: String,

        /// Public product page URL.
        #[arg(long)]
        url: String,
    },

    /// Print admin dashboard stats and recent activity.
    Dashboard,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    let gateway = Gateway::from_config(&cfg.api)?;

    match cli.command {
        Commands::Summary { field, top } => run_summary(&cfg, gateway, field, top).await?,
        Commands::Product { id } => run_product(&gateway, &id).await?,
        Commands::Share { id, name, url } => run_share(gateway, &id, &name, &url).await?,
        Commands::Dashboard => run_dashboard(gateway).await,
    }

    Ok(())
}

async fn run_summary(
    cfg: &Config,
    gateway: Gateway,
    field: Option<String>,
    top: Option<usize>,
) -> Result<()> {
    let mut options = SummaryOptions::from_config(&cfg.summary)?;
    if let Some(field) = field {
        options.field = field.parse()?;
    }
    if let Some(top) = top {
        if top == 0 {
            anyhow::bail!("--top must be >= 1");
        }
        options.top_n = top;
    }

    let field = options.field;
    let controller = SummaryController::new(Arc::new(gateway), options);
    controller.activate().await;

    let state = controller.state();
    match &state {
        LoadState::Failed(reason) => println!("Status: failed ({})", reason),
        other => println!("Status: {}", other.label()),
    }
    println!();

    let summaries = controller.visible_summaries();
    if summaries.is_empty() {
        println!("No {} data.", field);
        return Ok(());
    }

    println!("{:<4} {:<20} {:>6}   DESCRIPTION", "#", field.as_str().to_uppercase(), "COUNT");
    println!("{}", "-".repeat(76));
    for (i, s) in summaries.iter().enumerate() {
        println!("{:<4} {:<20} {:>6}   {}", i + 1, s.name, s.count, s.description);
    }
    Ok(())
}

async fn run_product(gateway: &Gateway, id: &str) -> Result<()> {
    let Some(product) = gateway.fetch_product(id).await? else {
        println!("Product not found: {}", id);
        return Ok(());
    };

    println!("{}", product.name);
    println!("  id:        {}", product.id);
    println!("  price:     ${}", product.price);
    println!("  material:  {}", product.material.as_deref().unwrap_or("-"));
    println!("  category:  {}", product.category);
    println!("  vendor:    {}", product.vendor_name().unwrap_or("-"));
    if !product.image_url.is_empty() {
        println!("  image:     {}", product.image_url);
    }
    Ok(())
}

async fn run_share(gateway: Gateway, id: &str, name: &str, url: &str) -> Result<()> {
    let links = ShareLinks::for_product(name, url)?;
    println!("Facebook:   {}", links.facebook);
    println!("Twitter:    {}", links.twitter);
    println!("Instagram:  {}", links.instagram);

    let session = ReferralSession::new(gateway, id, url);
    match session.referral_link().await? {
        Some(link) => println!("Referral:   {}", link),
        None => println!("Referral:   unavailable"),
    }
    Ok(())
}

async fn run_dashboard(gateway: Gateway) {
    let loader = DashboardLoader::new(gateway);
    loader.load().await;

    if let Some(reason) = loader.state().failure() {
        println!("Dashboard data unavailable: {}", reason);
        println!();
    }

    let dashboard = loader.visible();
    for card in dashboard.stat_cards() {
        println!("  {:<20} {}", card.title, card.value);
    }

    println!();
    println!("Recent activity:");
    if dashboard.activities.is_empty() {
        println!("  (none)");
    }
    for activity in &dashboard.activities {
        println!(
            "  {}  {:<40} {}",
            activity.display_date(),
            activity.description,
            activity.user
        );
    }
}
