use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;

use propfeed::{
    Config, DatasetCatalog, DatasetFetcher, ListingCategory, MemoizingProvider, SearchRequest,
    SearchService, SourceRegistry,
};

#[derive(Parser)]
#[command(name = "propfeed")]
#[command(about = "Property listing aggregation and search")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search query against the aggregated datasets
    Search {
        /// Free-text location, e.g. "Miami Beach, FL"
        #[arg(long)]
        location: String,
        /// Listing category: sale, lease or auction
        #[arg(long)]
        category: Option<String>,
        /// Property type substring, e.g. "office"
        #[arg(long = "type")]
        property_type: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        min_sqft: Option<f64>,
        #[arg(long)]
        max_sqft: Option<f64>,
        /// 1-based result page
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Print the full response as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// List the dataset sources the catalog can route to
    Sources,
}

fn parse_category(text: &str) -> Option<ListingCategory> {
    match text.to_lowercase().as_str() {
        "sale" => Some(ListingCategory::Sale),
        "lease" | "rent" => Some(ListingCategory::Lease),
        "auction" => Some(ListingCategory::Auction),
        _ => {
            eprintln!("⚠️  Unknown category '{text}', ignoring");
            None
        }
    }
}

fn build_registry(config: &Config) -> SourceRegistry {
    match &config.registry_dir {
        Some(dir) => match SourceRegistry::load_from_directory(dir) {
            Ok(registry) => registry,
            Err(e) => {
                error!("failed to load registry from {dir}: {e}, falling back to builtin");
                SourceRegistry::builtin()
            }
        },
        None => SourceRegistry::builtin(),
    }
}

/// Bound the price/size range when only one side was given.
fn range(min: Option<f64>, max: Option<f64>) -> Option<(f64, f64)> {
    match (min, max) {
        (None, None) => None,
        (min, max) => Some((min.unwrap_or(0.0), max.unwrap_or(f64::MAX))),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    propfeed::logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load_or_default();

    match cli.command {
        Commands::Search {
            location,
            category,
            property_type,
            min_price,
            max_price,
            min_sqft,
            max_sqft,
            page,
            json,
        } => {
            let registry = build_registry(&config);
            let provider = Arc::new(MemoizingProvider::new(DatasetFetcher::new()));
            let service = SearchService::new(
                DatasetCatalog::builtin(),
                registry,
                provider,
                config,
            );

            let request = SearchRequest {
                location_query: location,
                listing_category: category.as_deref().and_then(parse_category),
                property_type,
                price_range: range(min_price, max_price),
                size_range: range(min_sqft, max_sqft),
                page,
            };

            let response = service.search(request).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!(
                    "🔎 {} matches (page {} of {})",
                    response.total_count,
                    response.page,
                    response.total_count.div_ceil(response.page_size).max(1)
                );
                for property in &response.page_items {
                    let price = property
                        .price
                        .display
                        .clone()
                        .or_else(|| property.price.amount.map(|a| format!("${a:.0}")))
                        .unwrap_or_else(|| "Contact for price".to_string());
                    let city = property.address.city.as_deref().unwrap_or("-");
                    let kind = property.property_type.as_deref().unwrap_or("-");
                    println!(
                        "   {:<28} {:<18} {:<14} {}",
                        property.id, city, kind, price
                    );
                }
            }
        }
        Commands::Sources => {
            let registry = build_registry(&config);
            println!("📚 Registered dataset sources:");
            for source_id in registry.enabled_sources() {
                println!("   {source_id}");
            }
        }
    }

    Ok(())
}
