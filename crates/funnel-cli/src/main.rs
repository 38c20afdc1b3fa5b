//! Funnel CLI - search the Sales Funnel lists from a terminal

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use funnel_core::config::Config;
use funnel_core::item::{SalesFunnelItem, format_currency};
use funnel_core::lists::{SalesFunnelList, SearchField};
use funnel_core::search::SearchService;
use funnel_core::sharepoint::SharePointClient;
use tracing::debug;

#[derive(Parser)]
#[command(name = "funnel")]
#[command(author, version, about = "Federated search across the Sales Funnel lists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// SharePoint site hosting the lists (overrides web_part.site_url)
    #[arg(long, global = true, env = "FUNNEL_SITE_URL")]
    site: Option<String>,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every list (or one list) for matching items
    Search {
        /// Text to look for
        query: String,
        /// Field to match against (all, Title, Project, Owner, ...)
        #[arg(short, long, default_value = "all")]
        field: String,
        /// Restrict the search to a single list
        #[arg(short, long)]
        list: Option<String>,
    },

    /// Show the lists that are searched
    Lists,

    /// Show the searchable fields
    Fields,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("funnel=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search { query, field, list } => {
            cmd_search(
                &query,
                &field,
                list.as_deref(),
                cli.site.as_deref(),
                cli.format,
                cli.quiet,
            )
            .await
        }

        Commands::Lists => cmd_lists(cli.format),

        Commands::Fields => cmd_fields(cli.format),

        Commands::Config { action } => cmd_config(action, cli.quiet),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_search(
    query: &str,
    field: &str,
    list: Option<&str>,
    site: Option<&str>,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let field: SearchField = field.parse()?;
    let list: Option<SalesFunnelList> = list.map(str::parse::<SalesFunnelList>).transpose()?;

    let mut config = Config::load().context("Failed to load configuration")?;
    apply_site_override(&mut config, site)?;
    let client = SharePointClient::from_config(&config, None)?;
    let service = SearchService::new(Arc::new(client))
        .with_page_size(config.search.page_size)
        .with_min_query_len(config.search.min_query_len);

    debug!(?service, "Running search");

    let results = match list {
        Some(list) => service.search_list(list, query, field).await,
        None => service.search_all(query, field).await,
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        if !quiet {
            println!("No results for \"{}\"", query.trim());
            println!("\nTry a different keyword or change the search field with --field.");
        }
        return Ok(());
    }

    if quiet {
        for item in &results {
            println!("{}\t{}\t{}", item.source_list, item.id, item.item_url);
        }
        return Ok(());
    }

    let scope = match list {
        Some(list) => format!("in {}", list),
        None => "across all lists".to_string(),
    };
    println!(
        "Showing {} result{} {}\n",
        results.len(),
        if results.len() == 1 { "" } else { "s" },
        scope
    );
    for item in &results {
        print_card(item);
    }

    Ok(())
}

/// `--site` wins over the configured `web_part.site_url`
fn apply_site_override(config: &mut Config, site: Option<&str>) -> anyhow::Result<()> {
    if let Some(site) = site.filter(|s| !s.trim().is_empty()) {
        config
            .set("web_part.site_url", site)
            .context("Invalid --site value")?;
    }
    Ok(())
}

fn print_card(item: &SalesFunnelItem) {
    match item.status.as_str() {
        "" => println!("{}", item.headline()),
        status => println!("{}  [{}]", item.headline(), status),
    }

    let mut sub = format!("  {}", item.source_list);
    if !item.bid2win_id.is_empty() {
        sub.push_str(&format!("  ID: {}", item.bid2win_id));
    }
    println!("{}", sub);

    let location = item.location();
    let value = format_currency(item.estimated_value);
    let fields = [
        ("Owner", item.owner.as_str()),
        ("Estimator", item.estimator.as_str()),
        ("Business Area", item.business_area.as_str()),
        ("Segment", item.segment.as_str()),
        ("Location", location.as_str()),
        ("Bid Date", item.bid_date.as_str()),
        ("Award Date", item.award_date.as_str()),
        ("Prime/Sub", item.prime_or_sub.as_str()),
        ("Plant", item.plant.as_str()),
        ("Low Bidder", item.low_bidder_name.as_str()),
        ("PIS Status", item.pis_status.as_str()),
        ("Estimated Value", value.as_str()),
    ];
    for (label, value) in fields.into_iter().filter(|(_, v)| !v.is_empty()) {
        println!("    {:<16} {}", label, value);
    }
    println!("    {}\n", item.item_url);
}

fn cmd_lists(format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let names: Vec<_> = SalesFunnelList::ALL.iter().map(|l| l.as_str()).collect();
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    for list in SalesFunnelList::ALL {
        println!("{}", list);
    }
    Ok(())
}

fn cmd_fields(format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let fields: Vec<_> = SearchField::ALL
            .iter()
            .map(|f| serde_json::json!({ "key": f.key(), "label": f.label() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&fields)?);
        return Ok(());
    }

    for field in SearchField::ALL {
        println!("{:<14} {}", field.key(), field.label());
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, config.get(&key)?);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{:<24} {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}
