//! # Comment Dashboard CLI (`cdash`)
//!
//! The `cdash` binary prints each dashboard view for the configured comment
//! dataset, exports filtered records, and starts the JSON API.
//!
//! ## Usage
//!
//! ```bash
//! cdash --config ./config/cdash.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cdash summary` | Comment count, average likes/replies, sentiment index |
//! | `cdash trend` | Comments per day |
//! | `cdash sentiment` | Comments per sentiment category |
//! | `cdash correlation` | Correlation matrix of numeric columns |
//! | `cdash data` | Searchable comment table |
//! | `cdash export` | Write filtered comments as CSV or JSON |
//! | `cdash sources` | Check the configured data source |
//! | `cdash serve` | Start the JSON HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! # Only positive and neutral comments in January
//! cdash summary --sentiment positive,neutral --since 2024-01-01 --until 2024-01-31
//!
//! # Daily counts with empty days filled in
//! cdash trend --zero-fill --json
//!
//! # Search the comment table
//! cdash data --search "ongkir" --limit 20
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::warn;

use comment_dashboard::config::{self, Config};
use comment_dashboard::export::{self, ExportFormat};
use comment_dashboard::loader::DatasetCache;
use comment_dashboard::models::{parse_filter_date, parse_sentiments, FilterCriteria, Sentiment};
use comment_dashboard::views::{ViewKind, ViewRequest};
use comment_dashboard::{logging, report, server, sources};

const DEFAULT_CONFIG: &str = "./config/cdash.toml";

/// Comment Dashboard: filter and aggregate public comment datasets.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Without it, `./config/cdash.toml` is used when present and a
/// seeded sample dataset otherwise.
#[derive(Parser)]
#[command(
    name = "cdash",
    about = "Comment Dashboard: sentiment and engagement views over public comment datasets",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Filter flags shared by every data command.
#[derive(Args, Clone, Default)]
struct FilterArgs {
    /// Sentiment categories to include (repeatable or comma separated).
    /// Defaults to all categories.
    #[arg(long = "sentiment", value_name = "CATEGORY")]
    sentiments: Vec<String>,

    /// Only include comments on or after this date (YYYY-MM-DD).
    #[arg(long)]
    since: Option<String>,

    /// Only include comments on or before this date (YYYY-MM-DD).
    #[arg(long)]
    until: Option<String>,
}

impl FilterArgs {
    fn criteria(&self) -> Result<FilterCriteria> {
        let sentiments = if self.sentiments.is_empty() {
            Sentiment::ALL.to_vec()
        } else {
            parse_sentiments(&self.sentiments)?
        };
        let since = self.since.as_deref().map(parse_filter_date).transpose()?;
        let until = self.until.as_deref().map(parse_filter_date).transpose()?;
        Ok(FilterCriteria::new(sentiments, since, until)?)
    }
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Print the summary KPIs.
    ///
    /// Comment count, average likes and replies, and the average sentiment
    /// score with its label (Dominantly Positive / Negative, Neutral/Mixed).
    Summary {
        #[command(flatten)]
        filter: FilterArgs,

        /// Override `analysis.sentiment_threshold`.
        #[arg(long)]
        threshold: Option<f64>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Print comments per day.
    Trend {
        #[command(flatten)]
        filter: FilterArgs,

        /// Insert zero-count days between the first and last date.
        #[arg(long)]
        zero_fill: bool,

        #[arg(long)]
        json: bool,
    },

    /// Print comments per sentiment category.
    Sentiment {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long)]
        json: bool,
    },

    /// Print the correlation matrix of media flags, likes, replies, and score.
    Correlation {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long)]
        json: bool,
    },

    /// Print the comment table.
    Data {
        #[command(flatten)]
        filter: FilterArgs,

        /// Case-insensitive keyword matched against every column.
        #[arg(long)]
        search: Option<String>,

        /// Maximum number of rows to print.
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Export filtered comments.
    ///
    /// Writes CSV (with the canonical source headers) or JSON to a file,
    /// or to stdout when `--output` is omitted.
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long)]
        search: Option<String>,

        /// `csv` or `json`.
        #[arg(long, default_value = "csv")]
        format: String,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show the configured data source and whether it is reachable.
    Sources,

    /// Start the JSON HTTP API.
    ///
    /// Loads the dataset once and binds to `[server].bind`.
    Serve {
        /// Override `[server].bind`.
        #[arg(long)]
        bind: Option<String>,
    },
}

fn resolve_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => config::load_config(p),
        None => {
            let default = Path::new(DEFAULT_CONFIG);
            if default.exists() {
                config::load_config(default)
            } else {
                warn!(
                    "{} not found, using the built-in sample dataset",
                    DEFAULT_CONFIG
                );
                Ok(Config::minimal())
            }
        }
    }
}

fn request(cfg: &Config, filter: &FilterArgs) -> Result<ViewRequest> {
    let mut req = ViewRequest::from_config(cfg);
    req.criteria = filter.criteria()?;
    Ok(req)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    let mut cfg = resolve_config(cli.config.as_deref())?;
    let cache = DatasetCache::new();

    match cli.command {
        Commands::Summary {
            filter,
            threshold,
            json,
        } => {
            let mut req = request(&cfg, &filter)?;
            if let Some(t) = threshold {
                if !t.is_finite() || !(0.0..1.0).contains(&t) {
                    bail!("--threshold must be in [0.0, 1.0)");
                }
                req.threshold = t;
            }
            report::run_view(&cache, &cfg, ViewKind::Summary, &req, json).await?;
        }
        Commands::Trend {
            filter,
            zero_fill,
            json,
        } => {
            let mut req = request(&cfg, &filter)?;
            req.zero_fill |= zero_fill;
            report::run_view(&cache, &cfg, ViewKind::Trend, &req, json).await?;
        }
        Commands::Sentiment { filter, json } => {
            let req = request(&cfg, &filter)?;
            report::run_view(&cache, &cfg, ViewKind::Sentiment, &req, json).await?;
        }
        Commands::Correlation { filter, json } => {
            let req = request(&cfg, &filter)?;
            report::run_view(&cache, &cfg, ViewKind::Correlation, &req, json).await?;
        }
        Commands::Data {
            filter,
            search,
            limit,
            json,
        } => {
            let mut req = request(&cfg, &filter)?;
            req.keyword = search;
            req.limit = limit;
            report::run_view(&cache, &cfg, ViewKind::Data, &req, json).await?;
        }
        Commands::Export {
            filter,
            search,
            format,
            output,
        } => {
            let format: ExportFormat = format.parse()?;
            export::run_export(
                &cache,
                &cfg,
                &filter.criteria()?,
                search.as_deref(),
                format,
                output.as_deref(),
            )
            .await?;
        }
        Commands::Sources => {
            sources::list_sources(&cfg).await?;
        }
        Commands::Serve { bind } => {
            if let Some(b) = bind {
                cfg.server.bind = b;
            }
            server::run_server(&cache, &cfg)
                .await
                .context("dashboard server failed")?;
        }
    }

    Ok(())
}
