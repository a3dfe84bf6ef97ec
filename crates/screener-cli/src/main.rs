//! stock-screener: score a set of instrument snapshots and print the ranked
//! recommendations as JSON.
//!
//! Usage:
//!   stock-screener --snapshots data/snapshots.json
//!   stock-screener --snapshots data/snapshots.json --market HK --top 5
//!   stock-screener --snapshots data/snapshots.json --refresh-cache

mod args;
mod input;
mod report;
mod universe;

use anyhow::{bail, Context};
use market_profile::ScreenerConfig;
use std::sync::Arc;
use strategy_engine::StrategyEngine;
use universe_cache::{FileCache, UniverseCache};

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }
}

fn open_cache(cli: &args::CliArgs, config: &ScreenerConfig) -> anyhow::Result<FileCache> {
    let cache = match &cli.cache_dir {
        Some(dir) => FileCache::new(dir)?,
        None => FileCache::in_default_dir()?,
    };
    let hours = i64::try_from(config.cache_expiry_hours).context("cache expiry out of range")?;
    Ok(cache.with_expiry(chrono::Duration::hours(hours)))
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let Some(cli) = args::parse(&argv)? else {
        println!("{}", args::USAGE);
        return Ok(());
    };

    let mut config = ScreenerConfig::from_env().context("invalid screener configuration")?;
    if let Some(min_score) = cli.min_score {
        config.min_recommendation_score = min_score;
    }
    if let Some(top) = cli.top {
        config.max_recommendations = top;
    }
    let registry = Arc::new(config.build_registry().context("invalid market profiles")?);

    let contents = input::read_input(&cli.snapshots)?;
    let snapshots = input::parse_snapshots(&contents)
        .with_context(|| format!("failed to load {}", cli.snapshots.display()))?;
    let mut snapshots = input::select_market(snapshots, cli.market);

    if !cli.no_cache {
        let cache = open_cache(&cli, &config)?;
        if cli.refresh_cache {
            cache.clear()?;
        }
        let key = universe::input_cache_key(cli.market.code(), &contents);
        snapshots = universe::resolve(&cache, &key, snapshots);
    }

    if snapshots.is_empty() {
        bail!("no instruments to analyze for market {}", cli.market.code());
    }

    let history = usize::try_from(config.history_days).context("history window out of range")?;
    input::trim_history(&mut snapshots, history);

    tracing::info!(
        market = cli.market.code(),
        instruments = snapshots.len(),
        min_score = config.min_recommendation_score,
        top = config.max_recommendations,
        "Screening"
    );

    let engine = StrategyEngine::new(registry, &config);
    let outcome = engine.screen(&snapshots);
    let report = report::ScreenReport::new(cli.market.code(), &outcome);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
