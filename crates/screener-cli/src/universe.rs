use crate::input;
use analysis_core::InstrumentSnapshot;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use universe_cache::{load_or_fetch, universe_key, UniverseCache};

/// Cache key for the universe of one input document: market plus a
/// content digest, so a different input never reuses another's universe.
pub fn input_cache_key(market: &str, contents: &str) -> String {
    let digest = hex::encode(Sha256::digest(contents.as_bytes()));
    format!("{}_{}", universe_key(market), &digest[..16])
}

/// Resolve the universe for `key` and keep the snapshots inside it.
pub fn resolve(cache: &dyn UniverseCache, key: &str, snapshots: Vec<InstrumentSnapshot>) -> Vec<InstrumentSnapshot> {
    let universe = load_or_fetch(cache, key, || input::universe_of(&snapshots));
    debug!(key, symbols = universe.len(), "Universe resolved");

    let before = snapshots.len();
    let kept = input::restrict_to_universe(snapshots, &universe);
    if kept.len() < before {
        warn!(
            key,
            dropped = before - kept.len(),
            "Skipping input instruments outside the cached universe"
        );
    }
    kept
}
