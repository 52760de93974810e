mod orders;

use clap::{Parser, Subcommand, ValueEnum};
use mealclub_scraper::{Credentials, DeliveryStatus, OrderScraper, PortalClient};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mealclub-cli")]
#[command(about = "Look up MealClub orders and deliveries")]
struct Cli {
    /// Print records as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the most recent order (default).
    Latest,
    /// List order ids from the listing page.
    Ids,
    /// Show one order by id.
    Order { id: String },
    /// Show every listed order.
    Orders,
    /// List deliveries, optionally filtered by status.
    Deliveries {
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,
    },
    /// Print a Google Maps link for an address.
    Map {
        #[arg(required = true, num_args = 1..)]
        address: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StatusFilter {
    Unconfirmed,
    Confirmed,
    PickedUp,
    Delivered,
}

impl From<StatusFilter> for DeliveryStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Unconfirmed => DeliveryStatus::Unconfirmed,
            StatusFilter::Confirmed => DeliveryStatus::Confirmed,
            StatusFilter::PickedUp => DeliveryStatus::PickedUp,
            StatusFilter::Delivered => DeliveryStatus::Delivered,
        }
    }
}

fn build_scraper(config: &mealclub_core::AppConfig) -> anyhow::Result<OrderScraper> {
    let credentials = Credentials::new(&config.portal_username, &config.portal_password);
    let client = PortalClient::with_base_url(
        credentials,
        config.request_timeout_secs,
        &config.portal_url,
    )
    .map_err(|e| anyhow::anyhow!("failed to build portal client: {e}"))?
    .user_agent(&config.user_agent);
    Ok(OrderScraper::new(client))
}

/// Loads configuration, starts logging and builds the one scraper the
/// command handlers share.
fn connect() -> anyhow::Result<OrderScraper> {
    let config = mealclub_core::load_app_config()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "loaded configuration");

    build_scraper(&config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let json = cli.json;

    match cli.command.unwrap_or(Commands::Latest) {
        Commands::Map { address } => println!("{}", mealclub_scraper::map_url(&address.join(" "))),
        Commands::Latest => orders::run_latest(&connect()?, json).await?,
        Commands::Ids => orders::run_ids(&connect()?, json).await?,
        Commands::Order { id } => orders::run_order(&connect()?, &id, json).await?,
        Commands::Orders => orders::run_orders(&connect()?, json).await?,
        Commands::Deliveries { status } => {
            orders::run_deliveries(&connect()?, status.map(DeliveryStatus::from), json).await?;
        }
    }

    Ok(())
}
