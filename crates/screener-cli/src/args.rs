use analysis_core::Market;
use anyhow::{bail, Context};
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: stock-screener --snapshots FILE [options]

Options:
  --snapshots FILE    JSON array of instrument snapshots (required)
  --market MARKET     US, HK, CN or ALL (default: ALL)
  --min-score N       minimum total score to recommend (default: SCREENER_MIN_SCORE or 60)
  --top N             maximum number of recommendations (default: SCREENER_MAX_RESULTS or 10)
  --refresh-cache     clear the universe cache before running
  --no-cache          do not read or write the universe cache
  --cache-dir DIR     universe cache directory (default: platform cache dir)
  -h, --help          print this help";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSelection {
    All,
    Only(Market),
}

impl MarketSelection {
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(MarketSelection::All),
            "US" => Ok(MarketSelection::Only(Market::US)),
            "HK" => Ok(MarketSelection::Only(Market::HK)),
            "CN" => Ok(MarketSelection::Only(Market::CN)),
            other => bail!("unknown market {:?}, expected US, HK, CN or ALL", other),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            MarketSelection::All => "ALL",
            MarketSelection::Only(market) => market.code(),
        }
    }

    pub fn includes(&self, market: Market) -> bool {
        match self {
            MarketSelection::All => true,
            MarketSelection::Only(selected) => *selected == market,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub snapshots: PathBuf,
    pub market: MarketSelection,
    pub min_score: Option<f64>,
    pub top: Option<usize>,
    pub refresh_cache: bool,
    pub no_cache: bool,
    pub cache_dir: Option<PathBuf>,
}

/// `None` when help was requested
pub fn parse(args: &[String]) -> anyhow::Result<Option<CliArgs>> {
    if args.iter().any(|a| a == "-h" || a == "--help") {
        return Ok(None);
    }

    let snapshots = value_of(args, "--snapshots")?
        .map(PathBuf::from)
        .context("--snapshots FILE is required")?;

    let market = match value_of(args, "--market")? {
        Some(value) => MarketSelection::parse(value)?,
        None => MarketSelection::All,
    };

    let min_score = value_of(args, "--min-score")?
        .map(|v| v.parse::<f64>().with_context(|| format!("invalid --min-score {:?}", v)))
        .transpose()?;

    let top = value_of(args, "--top")?
        .map(|v| v.parse::<usize>().with_context(|| format!("invalid --top {:?}", v)))
        .transpose()?;

    Ok(Some(CliArgs {
        snapshots,
        market,
        min_score,
        top,
        refresh_cache: args.iter().any(|a| a == "--refresh-cache"),
        no_cache: args.iter().any(|a| a == "--no-cache"),
        cache_dir: value_of(args, "--cache-dir")?.map(PathBuf::from),
    }))
}

fn value_of<'a>(args: &'a [String], flag: &str) -> anyhow::Result<Option<&'a String>> {
    match args.iter().position(|a| a == flag) {
        Some(i) => args
            .get(i + 1)
            .filter(|v| !v.starts_with("--"))
            .map(Some)
            .with_context(|| format!("{} needs a value", flag)),
        None => Ok(None),
    }
}
