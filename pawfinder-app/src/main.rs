use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use pawfinder_common::observability::{LogConfig, LogFormat, init_logging};
use pawfinder_common::{Category, Coordinates, PawError};
use pawfinder_config::{LogFormatSetting, PawfinderConfig, PawfinderConfigLoader, RatingBackend};
use pawfinder_places::{KeyValueStore, PlaceCard, RatingBook, open_store, rating_key_for};
use pawfinder_search::{SearchRequest, ensure_search_ready, search_dog_friendly_places};
use session::SearchSession;
use std::path::PathBuf;
use std::sync::Arc;

mod command;
mod location;
mod render;
mod session;
mod shell;

#[derive(Parser, Debug)]
#[command(name = "pawfinder", version, about = "Find verified dog-friendly places")]
struct Cli {
    /// YAML configuration file; missing is fine.
    #[arg(long, global = true, default_value = "pawfinder.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one search and print the results.
    Search(SearchArgs),
    /// Store a 1-5 star rating for a place.
    Rate {
        /// A `rating_...` key, a place id (with --place-id) or a place title.
        target: String,
        stars: u8,
        #[arg(long)]
        place_id: bool,
    },
    /// Show the stored rating for a place.
    Rating {
        target: String,
        #[arg(long)]
        place_id: bool,
    },
    /// List the category filters.
    Categories,
    /// Interactive session.
    Shell,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// City, suburb or free text.
    query: Option<String>,
    #[arg(long)]
    category: Option<Category>,
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,
    /// Use the configured location provider.
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    near_me: bool,
    /// Print the raw result as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let cfg: PawfinderConfig = PawfinderConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // 2) Logging from the `logging` section
    let log_path = init_logging(log_config(&cfg))?;
    tracing::debug!(log = %log_path.display(), config = %cli.config.display(), "app.start");

    match cli.command {
        Commands::Categories => {
            println!("{}", render::render_categories(None));
            Ok(())
        }
        Commands::Rate {
            target,
            stars,
            place_id,
        } => {
            let book = rating_book(&cfg).await?;
            let key = resolve_key(&target, place_id);
            book.rate(&key, stars).await.map_err(user_facing)?;
            println!("{key}: {}  {}", render::stars(stars), pawfinder_places::RATED_THANKS);
            Ok(())
        }
        Commands::Rating { target, place_id } => {
            let book = rating_book(&cfg).await?;
            let key = resolve_key(&target, place_id);
            let stars = book.load(&key).await.map_err(user_facing)?;
            if stars == 0 {
                println!("{key}: not rated");
            } else {
                println!("{key}: {} ({stars}/5)", render::stars(stars));
            }
            Ok(())
        }
        Commands::Search(args) => search_once(&cfg, args).await,
        Commands::Shell => {
            let search = ensure_search_ready(&cfg.gemini).map_err(user_facing)?;
            let provider = location::provider_from_settings(&cfg.location).map_err(user_facing)?;
            let session = SearchSession::new(search, provider);
            let book = rating_book(&cfg).await?;
            shell::run(session, book).await
        }
    }
}

fn log_config(cfg: &PawfinderConfig) -> LogConfig {
    LogConfig {
        log_dir: cfg.logging.resolved_dir(),
        emit_stderr: cfg.logging.emit_stderr,
        format: match cfg.logging.format {
            LogFormatSetting::Text => LogFormat::Text,
            LogFormatSetting::Json => LogFormat::Json,
        },
        default_filter: cfg.logging.filter.clone(),
        ..LogConfig::default()
    }
}

/// Log the technical detail, surface the user message.
fn user_facing(e: PawError) -> anyhow::Error {
    tracing::error!(error = %e, "app.command.failed");
    anyhow!(e.user_message())
}

async fn rating_book(cfg: &PawfinderConfig) -> Result<RatingBook<Arc<dyn KeyValueStore>>> {
    let path = match cfg.ratings.backend {
        RatingBackend::Memory => None,
        RatingBackend::Sqlite => Some(cfg.ratings.resolved_path()),
    };
    let store = open_store(path.as_deref()).await.map_err(user_facing)?;
    Ok(RatingBook::new(store))
}

/// `rating_...` is taken as a key, `--place-id` marks a place id, anything
/// else is a title.
fn resolve_key(target: &str, place_id: bool) -> String {
    if target.starts_with("rating_") {
        target.to_string()
    } else if place_id {
        rating_key_for(Some(target), "")
    } else {
        rating_key_for(None, target)
    }
}

async fn search_once(cfg: &PawfinderConfig, args: SearchArgs) -> Result<()> {
    let coordinates = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
        _ if args.near_me => {
            let provider = location::provider_from_settings(&cfg.location).map_err(user_facing)?;
            let c = provider
                .current_position()
                .await
                .map_err(|e| user_facing(e.into()))?;
            Some(c)
        }
        _ => None,
    };

    let request = SearchRequest::new(args.query.unwrap_or_default())
        .with_category(args.category)
        .with_coordinates(coordinates);
    // Reject before building a client so a missing key never masks this.
    request.prepare().map_err(user_facing)?;

    let client = ensure_search_ready(&cfg.gemini).map_err(user_facing)?;
    let result = search_dog_friendly_places(client.as_ref(), &request)
        .await
        .map_err(user_facing)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if let Some(c) = coordinates {
        println!("{}", render::coordinates_line(c));
    }
    let book = rating_book(cfg).await?;
    let mut cards = Vec::with_capacity(result.places.len());
    for place in &result.places {
        cards.push(PlaceCard::build(place, &book).await);
    }
    print!("{}", render::render_result(&result, &cards, render::DEFAULT_WIDTH));
    Ok(())
}
