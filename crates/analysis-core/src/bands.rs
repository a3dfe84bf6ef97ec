//! Declarative scoring ladders.
//!
//! A ladder is an ordered list of bands. The first band whose predicate
//! matches decides the score and the signal text. Threshold-dependent
//! bands read their cut-offs from a context value (market thresholds,
//! a sector benchmark, ...), so the ladders themselves can live in
//! `const` items and be boundary-tested one entry at a time.

/// One rung of a scoring ladder
pub struct Band<C> {
    pub matches: fn(f64, &C) -> bool,
    pub score: f64,
    pub describe: fn(f64, &C) -> String,
}

/// Walk `bands` in order and return the score and signal of the first match
pub fn score_ladder<C>(bands: &[Band<C>], value: f64, ctx: &C) -> Option<(f64, String)> {
    bands
        .iter()
        .find(|band| (band.matches)(value, ctx))
        .map(|band| (band.score, (band.describe)(value, ctx)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LADDER: [Band<f64>; 3] = [
        Band {
            matches: |v, _| v < 0.0,
            score: 10.0,
            describe: |v, _| format!("negative {:.1}", v),
        },
        Band {
            matches: |v, cut| v < *cut,
            score: 50.0,
            describe: |_, cut| format!("below {}", cut),
        },
        Band {
            matches: |_, _| true,
            score: 90.0,
            describe: |_, _| "high".to_string(),
        },
    ];

    #[test]
    fn test_first_match_wins() {
        assert_eq!(score_ladder(&LADDER, -1.0, &5.0).unwrap().0, 10.0);
        assert_eq!(score_ladder(&LADDER, 2.0, &5.0).unwrap(), (50.0, "below 5".to_string()));
    }

    #[test]
    fn test_boundary_falls_through() {
        assert_eq!(score_ladder(&LADDER, 0.0, &5.0).unwrap().0, 50.0);
        assert_eq!(score_ladder(&LADDER, 5.0, &5.0).unwrap().0, 90.0);
    }

    #[test]
    fn test_empty_ladder() {
        let empty: [Band<()>; 0] = [];
        assert!(score_ladder(&empty, 1.0, &()).is_none());
    }
}
