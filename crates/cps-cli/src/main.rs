mod update;

use clap::{Parser, Subcommand};
use cps_catalog::{BrowseOptions, CatalogEngine, SortOrder};
use cps_core::{AppConfig, Marketplace};
use cps_supabase::SupabaseClient;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cps-cli")]
#[command(about = "Search and compare products across the Oksid, Penta and Denge catalogs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Case-insensitive product name search
    Search {
        term: String,
        /// Restrict to one marketplace (oksid, penta/bayinet, denge)
        #[arg(long)]
        store: Option<Marketplace>,
    },
    /// Name search across every marketplace, grouped by store then price
    Compare { term: String },
    /// List a marketplace's categories
    Categories { store: Marketplace },
    /// Products in a category
    Category {
        name: String,
        #[arg(long)]
        store: Option<Marketplace>,
    },
    /// Page through one marketplace's products
    Browse {
        store: Marketplace,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = cps_catalog::browse::DEFAULT_PAGE_SIZE)]
        page_size: usize,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// default, price-low or price-high
        #[arg(long, default_value_t = SortOrder::Default)]
        sort: SortOrder,
        /// Only products currently in stock
        #[arg(long)]
        in_stock: bool,
    },
    /// Trigger a catalog refresh and follow its progress
    Update {
        store: Marketplace,
        /// Print the created job and exit without polling
        #[arg(long)]
        no_wait: bool,
    },
    /// Show an update job's record
    Job { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let config = cps_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    run(cli.command, &config).await
}

async fn run(command: Commands, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Search { term, store } => {
            let products = engine(config)?
                .search_by_name(&term, store.map(Marketplace::key))
                .await;
            print_json(&products)
        }
        Commands::Compare { term } => {
            print_json(&engine(config)?.compare_across_stores(&term).await)
        }
        Commands::Categories { store } => {
            print_json(&engine(config)?.categories_for(store).await)
        }
        Commands::Category { name, store } => {
            let products = engine(config)?
                .get_by_category(&name, store.map(Marketplace::key))
                .await;
            print_json(&products)
        }
        Commands::Browse {
            store,
            page,
            page_size,
            search,
            category,
            sort,
            in_stock,
        } => {
            let options = BrowseOptions {
                page,
                page_size,
                search,
                category,
                sort,
                only_in_stock: in_stock,
            };
            print_json(&engine(config)?.browse(store, &options).await)
        }
        Commands::Update { store, no_wait } => update::run_update(config, store, no_wait).await,
        Commands::Job { id } => update::run_job(config, &id).await,
    }
}

fn engine(config: &AppConfig) -> anyhow::Result<CatalogEngine<SupabaseClient>> {
    let client = SupabaseClient::from_config(config)?;
    Ok(CatalogEngine::new(client).with_category_page_size(config.category_page_size))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
