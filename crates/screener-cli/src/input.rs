use crate::args::MarketSelection;
use analysis_core::InstrumentSnapshot;
use anyhow::Context;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub fn read_input(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Parse a JSON array of snapshots. A snapshot without an explicit
/// `market` gets one inferred from its symbol suffix.
pub fn parse_snapshots(text: &str) -> anyhow::Result<Vec<InstrumentSnapshot>> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(text).context("input is not a JSON array of snapshots")?;

    raw.into_iter()
        .enumerate()
        .map(|(i, mut value)| {
            if let Some(obj) = value.as_object_mut() {
                if !obj.contains_key("market") {
                    let symbol = obj.get("symbol").and_then(|s| s.as_str()).unwrap_or_default();
                    let market = analysis_core::Market::from_symbol(symbol);
                    obj.insert("market".to_string(), market.code().into());
                }
            }
            serde_json::from_value(value).with_context(|| format!("snapshot #{} is malformed", i))
        })
        .collect()
}

pub fn select_market(snapshots: Vec<InstrumentSnapshot>, selection: MarketSelection) -> Vec<InstrumentSnapshot> {
    snapshots
        .into_iter()
        .filter(|s| selection.includes(s.market))
        .collect()
}

/// Symbols in input order, first occurrence kept
pub fn universe_of(snapshots: &[InstrumentSnapshot]) -> Vec<String> {
    let mut seen = HashSet::new();
    snapshots
        .iter()
        .filter(|s| seen.insert(s.symbol.clone()))
        .map(|s| s.symbol.clone())
        .collect()
}

pub fn restrict_to_universe(snapshots: Vec<InstrumentSnapshot>, universe: &[String]) -> Vec<InstrumentSnapshot> {
    let members: HashSet<&str> = universe.iter().map(String::as_str).collect();
    snapshots
        .into_iter()
        .filter(|s| members.contains(s.symbol.as_str()))
        .collect()
}

/// Keep only the most recent `days` bars of each series
pub fn trim_history(snapshots: &mut [InstrumentSnapshot], days: usize) {
    for snapshot in snapshots.iter_mut() {
        let excess = snapshot.bars.len().saturating_sub(days);
        if excess > 0 {
            snapshot.bars.drain(..excess);
        }
    }
}
