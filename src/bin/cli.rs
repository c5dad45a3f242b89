//! LottoGen CLI
//!
//! Local execution entry point.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use lottogen::{
    error::Result,
    models::{Config, Flavor, FrequencyTable, GameType, NumberStat, PickMode},
    pipeline::{FallbackAggregator, RetryPolicy, Session, Snapshot},
    services::{LineGenerator, build_fetchers},
    storage::{GenerationJournal, HistoryCache, LocalCache, export_lines},
    utils::http,
};

/// LottoGen - Lotto 6/49 and Lotto Max line generator
#[derive(Parser, Debug)]
#[command(
    name = "lottogen",
    version,
    about = "Lotto 6/49 and Lotto Max generator with history-weighted smart picks"
)]
struct Cli {
    /// Path to storage directory holding the cache, journal and config
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Configuration file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch past results and print hot, cold and overdue numbers
    Update {
        /// Only update this game (649 or max)
        #[arg(short, long)]
        game: Option<GameType>,

        /// Analyze only the most recent N draws (0 = all; default from config)
        #[arg(long)]
        lookback: Option<usize>,
    },

    /// Generate lines
    Generate {
        #[arg(short, long, default_value = "649")]
        game: GameType,

        /// quick (uniform random) or smart (history weighted)
        #[arg(short, long, default_value = "quick")]
        mode: PickMode,

        /// Weighting preset: balanced, hot or overdue
        #[arg(short, long)]
        flavor: Option<Flavor>,

        /// Number of lines (default from config)
        #[arg(short = 'n', long)]
        lines: Option<usize>,

        /// Use cached history only, never fetch
        #[arg(long)]
        offline: bool,

        /// Write the generated set to a CSV file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Analyze only the most recent N draws (0 = all; default from config)
        #[arg(long)]
        lookback: Option<usize>,
    },

    /// Print a frequency chart
    Chart {
        #[arg(short, long, default_value = "649")]
        game: GameType,

        /// Use cached history only, never fetch
        #[arg(long)]
        offline: bool,

        /// Analyze only the most recent N draws (0 = all; default from config)
        #[arg(long)]
        lookback: Option<usize>,
    },

    /// Show recently generated lines from the journal
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Validate configuration
    Validate,

    /// Show cache status
    Info,

    /// Show odds for both games
    Odds,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Build a session over the configured providers, or over the cache alone.
fn build_session(
    config: &Config,
    cache: Option<Arc<LocalCache>>,
    offline: bool,
    flavor: Option<Flavor>,
    lookback: Option<usize>,
) -> Result<Arc<Session>> {
    let fetchers = if offline {
        Vec::new()
    } else {
        let client = http::create_async_client(&config.fetch)?;
        build_fetchers(config, &client)?
    };

    let mut aggregator = FallbackAggregator::new(fetchers, RetryPolicy::from_config(&config.fetch));
    if let Some(cache) = cache {
        aggregator = aggregator.with_cache(cache);
    }

    let generator = LineGenerator::new(config.weights(flavor));
    let lookback = config.analysis.lookback_or(lookback);
    Ok(Arc::new(
        Session::new(aggregator, generator).with_lookback(lookback),
    ))
}

/// Refresh `game`, logging instead of failing when no data is available.
async fn refresh_or_warn(session: &Arc<Session>, game: GameType) -> Option<Arc<Snapshot>> {
    match session.spawn_refresh(game).await {
        Ok(Ok(snapshot)) => Some(snapshot),
        Ok(Err(e)) => {
            log::warn!("{}", e);
            session.snapshot(game)
        }
        Err(e) => {
            log::warn!("{} refresh did not complete: {}", game, e);
            session.snapshot(game)
        }
    }
}

fn format_ranked(ranked: &[(u8, NumberStat)]) -> String {
    ranked
        .iter()
        .map(|(n, s)| match s.gap {
            Some(gap) => format!("{n:02}(x{}, gap {gap})", s.count),
            None => format!("{n:02}(never)"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_summary(snapshot: &Snapshot, top_k: usize) {
    let table = &snapshot.table;
    println!("--- {} ---", snapshot.game);
    println!(
        "Source: {} | {} draws, {} analyzed{}",
        snapshot.source_label(),
        snapshot.draws,
        table.sample_size(),
        if snapshot.stale { " | STALE" } else { "" }
    );
    if let Some(latest) = table.latest_draw() {
        println!("Latest draw: {}", latest.format("%A %B %-d, %Y"));
    }
    println!("Hot:     {}", format_ranked(&table.hot(top_k)));
    println!("Cold:    {}", format_ranked(&table.cold(top_k)));
    println!("Overdue: {}", format_ranked(&table.overdue(top_k)));
}

fn print_chart(table: &FrequencyTable) {
    const WIDTH: u32 = 40;
    let max = table.max_count().max(1);
    for (n, stat) in table.iter() {
        let bar = (stat.count * WIDTH).div_ceil(max) as usize;
        println!("{n:02} | {:<width$} {}", "#".repeat(bar), stat.count, width = WIDTH as usize);
    }
}

fn cache_for(config: &Config, storage_dir: &Path) -> Option<Arc<LocalCache>> {
    config
        .cache
        .enabled
        .then(|| Arc::new(LocalCache::new(storage_dir)))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.storage_dir.join("config.toml"));
    let config = Config::load_or_default(&config_path);
    log::debug!("Configuration from {}", config_path.display());

    let cache = cache_for(&config, &cli.storage_dir);
    let journal = GenerationJournal::in_dir(&cli.storage_dir);

    match cli.command {
        Command::Update { game, lookback } => {
            let session = build_session(&config, cache, false, None, lookback)?;
            let games = game.map(|g| vec![g]).unwrap_or_else(|| GameType::ALL.to_vec());
            for game in games {
                match refresh_or_warn(&session, game).await {
                    Some(snapshot) => print_summary(&snapshot, config.analysis.top_k),
                    None => println!("No draws available for {game}."),
                }
            }
            session.shutdown();
        }

        Command::Generate {
            game,
            mode,
            flavor,
            lines,
            offline,
            export,
            lookback,
        } => {
            let session = build_session(&config, cache, offline, flavor, lookback)?;
            let lines = lines.unwrap_or(config.generation.lines);

            match refresh_or_warn(&session, game).await {
                Some(snapshot) if snapshot.stale => {
                    log::warn!("Using stale {} data from {}", game, snapshot.source_label());
                }
                Some(_) => {}
                None if mode == PickMode::Smart => {
                    log::warn!("No {} history; smart picks fall back to uniform", game)
                }
                None => {}
            }

            let set = session.generate_set(game, mode, lines)?;
            println!("{} - {}", game, mode.strategy().label());
            for (i, line) in set.iter().enumerate() {
                let row = if i < lines {
                    format!("Line {}", i + 1)
                } else {
                    line.label().to_string()
                };
                println!("{row:>18}: {line}");
            }

            if config.generation.save_history {
                let method = mode.journal_method(config.weighting_label(flavor));
                journal.append(game, &method, &set)?;
            }
            if let Some(path) = export {
                let rows = export_lines(&path, &set)?;
                log::info!("Exported {} rows to {}", rows, path.display());
            }
            session.shutdown();
        }

        Command::Chart {
            game,
            offline,
            lookback,
        } => {
            let session = build_session(&config, cache, offline, None, lookback)?;
            match refresh_or_warn(&session, game).await {
                Some(snapshot) => {
                    println!(
                        "{} frequency over {} draws ({})",
                        game,
                        snapshot.table.sample_size(),
                        snapshot.source_label()
                    );
                    print_chart(&snapshot.table);
                }
                None => println!("No draws available for {game}."),
            }
            session.shutdown();
        }

        Command::History { limit } => {
            let entries = journal.recent(limit)?;
            if entries.is_empty() {
                println!("No history yet.");
            }
            for entry in entries {
                println!(
                    "{}  {:<10}  {:<16}  {}",
                    entry.timestamp,
                    entry.game.display_name(),
                    entry.method,
                    entry.line
                );
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "Config OK: {} sources, flavor {}",
                config.sources.len(),
                config.weighting.flavor
            );
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            let Some(cache) = cache else {
                log::info!("History cache disabled.");
                return Ok(());
            };
            for game in GameType::ALL {
                match cache.load(game).await {
                    Ok(Some(cached)) => log::info!(
                        "{}: {} draws from {}, saved {}",
                        game,
                        cached.records.len(),
                        cached.provider,
                        cached.saved_at.format("%Y-%m-%d %H:%M UTC")
                    ),
                    Ok(None) => log::info!("{}: no cached history", game),
                    Err(e) => log::warn!(
                        "{}: unreadable cache at {}: {}",
                        game,
                        cache.history_path(game).display(),
                        e
                    ),
                }
            }
            if journal.path().exists() {
                log::info!("Journal: {}", journal.path().display());
            }
        }

        Command::Odds => {
            for game in GameType::ALL {
                println!("{}: {}", game, game.odds_summary());
            }
            println!();
            println!("Smart picks weight numbers by historical frequency and overdue gaps.");
            println!("This does NOT change the true odds. Play responsibly.");
        }
    }

    Ok(())
}
