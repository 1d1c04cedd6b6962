//! MovieDash - movie ratings analytics
//!
//! A CLI tool that loads a movie ratings table, runs the four dashboard
//! views (genre distribution, average rating by genre, rating trend by
//! year, top-rated movies) and writes the chart-ready tables as a report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (missing data file, missing column, invalid parameter, ...)

use anyhow::{Context, Result};
use moviedash::analysis::{self, DashboardRequest};
use moviedash::cli::{Args, OutputFormat};
use moviedash::config::{Config, CONFIG_FILE};
use moviedash::data::{LoadOptions, TableCache};
use moviedash::report;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // The config can turn on verbose logging, so it is read first
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(config.general.log_level(args.quiet))?;

    info!("MovieDash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    log_config_origin(origin);

    if let Err(e) = run_dashboard(&args, &config) {
        error!("Dashboard failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .moviedash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to change the data path and view parameters.");
    Ok(())
}

/// Build the log filter: `RUST_LOG` directives on top of the verbosity level.
fn log_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Initialize logging based on verbosity settings.
fn init_logging(level: Level) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(level, rust_log.as_deref()))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load the data, compute the views and write the report.
fn run_dashboard(args: &Args, config: &Config) -> Result<()> {
    config.views.validate()?;

    let mut cache = TableCache::new(config.data.cache_ttl());
    let options = LoadOptions {
        explode_genres: config.data.explode_genres,
        show_progress: !args.quiet,
    };

    if !args.quiet {
        println!("📥 Loading ratings: {}", config.data.path.display());
    }
    let table = cache.get_or_load(&config.data.path, &options)?;

    let request = DashboardRequest {
        source: config.data.path.display().to_string(),
        views: args.effective_views(),
        params: config.views.clone(),
        preview_rows: config.general.preview_rows,
    };
    let report = analysis::build_report(&table, &request)?;

    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = output_path(args, config);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;
    info!("Report written to {}", output_path.display());

    if !args.quiet {
        println!("\n📊 Dashboard Summary:");
        println!(
            "   Ratings: {} | Movies: {}",
            report.metadata.total_ratings, report.metadata.distinct_movies
        );
        if let Some(ref shares) = report.genre_distribution {
            println!("   Genre slices: {}", shares.len());
        }
        if let Some(ref genres) = report.genre_rating {
            println!("   Rated genres: {}", genres.len());
        }
        if let Some(ref trend) = report.year_trend {
            println!("   Trend years: {}", trend.points.len());
        }
        if let Some(ref movies) = report.top_movies {
            match movies.first() {
                Some(best) => println!("   Top movie: {} ({:.2})", best.title, best.avg_rating),
                None => println!("   Top movie: none qualifies"),
            }
        }
        println!("\n✅ Report saved to: {}", output_path.display());
    }

    Ok(())
}

/// Report path: explicit flag, else config, with the extension following the format.
fn output_path(args: &Args, config: &Config) -> PathBuf {
    if let Some(ref output) = args.output {
        return output.clone();
    }

    let path = PathBuf::from(&config.general.output);
    match config.general.format {
        OutputFormat::Json if path.extension().map_or(true, |ext| ext == "md") => {
            path.with_extension("json")
        }
        _ => path,
    }
}

/// Where the configuration came from.
enum ConfigOrigin {
    File(PathBuf),
    Defaults,
    Unreadable(anyhow::Error),
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::File(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::File(PathBuf::from(CONFIG_FILE)))),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Defaults)),
        Err(e) => Ok((Config::default(), ConfigOrigin::Unreadable(e))),
    }
}

fn log_config_origin(origin: ConfigOrigin) {
    match origin {
        ConfigOrigin::File(path) => info!("Loaded config from {}", path.display()),
        ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
        ConfigOrigin::Unreadable(e) => warn!("Failed to load config: {:#}", e),
    }
}
