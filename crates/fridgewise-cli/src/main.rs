use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use dotenvy::dotenv;
use fridgewise_cache::{CacheConfig, CachePolicyTable, CacheStore, ContentType, build_store};
use fridgewise_cli::{
    KeyRequest, compute_key, flush, inspect, parse_content_type, parse_pair, pattern_for, pretty,
    render_policies,
};

#[derive(Parser)]
#[command(name = "fridgewise-cli")]
#[command(about = "FridgeWise CLI - inspect and flush cached API responses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a cached value
    Get { key: String },
    /// Print the remaining time-to-live of a key
    Ttl { key: String },
    /// Check whether a key is present
    Exists { key: String },
    /// Delete a single key
    Del { key: String },
    /// Delete every key matching a glob pattern (e.g. "ingredients:*")
    Flush {
        pattern: String,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Delete every entry of one content type
    FlushType {
        #[arg(value_parser = parse_content_type)]
        content_type: ContentType,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// List the TTL and key prefix of every content type
    Policies,
    /// Compute the cache key for a request without contacting the store
    Key {
        /// Content type (e.g. ingredients, aiResults)
        #[arg(short = 't', long = "type", value_parser = parse_content_type)]
        content_type: ContentType,

        /// Route template as mounted (e.g. /api/ingredients/{id})
        #[arg(short = 'r', long)]
        route: String,

        /// Authenticated user id
        #[arg(short = 'u', long)]
        user: Option<String>,

        /// Query parameter, repeatable
        #[arg(short = 'q', long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,

        /// Path parameter, repeatable
        #[arg(short = 'p', long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,

        /// Raw request body
        #[arg(short = 'b', long)]
        body: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();
    let config = CacheConfig::from_env();
    let policies = CachePolicyTable::from_config(&config);

    if let Err(e) = run(cli.command, &config, &policies).await {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    config: &CacheConfig,
    policies: &CachePolicyTable,
) -> anyhow::Result<()> {
    match command {
        Commands::Policies => print!("{}", render_policies(policies)),
        Commands::Key {
            content_type,
            route,
            user,
            query,
            params,
            body,
        } => {
            let request = KeyRequest {
                content_type,
                route,
                user,
                query,
                params,
                body,
            };
            println!("{}", compute_key(policies, &config.route_base, &request)?);
        }
        command => {
            let store = build_store(config)?;
            run_against_store(command, store.as_ref(), policies).await?;
        }
    }

    Ok(())
}

async fn run_against_store(
    command: Commands,
    store: &dyn CacheStore,
    policies: &CachePolicyTable,
) -> anyhow::Result<()> {
    match command {
        Commands::Get { key } => match inspect(store, &key).await? {
            Some((value, _)) => println!("{}", pretty(&value)),
            None => println!("(absent) {}", key),
        },
        Commands::Ttl { key } => match store.ttl_of(&key).await {
            Some(secs) => println!("{}s", secs),
            None => println!("(absent or no expiry) {}", key),
        },
        Commands::Exists { key } => println!("{}", store.exists(&key).await),
        Commands::Del { key } => {
            if store.delete(&key).await {
                println!("✅ Deleted {}", key);
            } else {
                println!("Nothing deleted for {}", key);
            }
        }
        Commands::Flush { pattern, yes } => flush_confirmed(store, &pattern, yes).await?,
        Commands::FlushType { content_type, yes } => {
            flush_confirmed(store, &pattern_for(policies, content_type), yes).await?
        }
        Commands::Policies | Commands::Key { .. } => {}
    }

    Ok(())
}

async fn flush_confirmed(
    store: &dyn CacheStore,
    pattern: &str,
    yes: bool,
) -> anyhow::Result<()> {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete every key matching '{}'?", pattern))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted");
            return Ok(());
        }
    }

    let deleted = flush(store, pattern).await?;
    println!("✅ Deleted {} keys matching {}", deleted, pattern);
    Ok(())
}
