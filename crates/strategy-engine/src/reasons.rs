use analysis_core::{FundamentalResult, GrowthLabel, TechnicalResult};

/// Technical signals worth repeating as a reason
pub const TECHNICAL_KEYWORDS: [&str; 7] = [
    "golden cross",
    "death cross",
    "oversold",
    "overbought",
    "volume surge",
    "rebound",
    "pullback",
];

/// Fundamental signals worth repeating as a reason
pub const FUNDAMENTAL_KEYWORDS: [&str; 12] = [
    "undervalued",
    "rapid growth",
    "excellent",
    "outstanding",
    "loss",
    "significant",
    "attractive",
    "super growth",
    "earnings-led growth",
    "revenue-led growth",
    "double decline",
    "peg",
];

const MAX_SIGNALS_PER_SIDE: usize = 2;

/// First `limit` signals matching any keyword (case-insensitive), in input order
pub fn key_signals<'a>(signals: &'a [String], keywords: &[&str], limit: usize) -> Vec<&'a String> {
    signals
        .iter()
        .filter(|signal| {
            let lower = signal.to_lowercase();
            keywords.iter().any(|kw| lower.contains(kw))
        })
        .take(limit)
        .collect()
}

fn technical_phrase(score: f64) -> String {
    let tier = if score >= 65.0 {
        "strong"
    } else if score >= 45.0 {
        "neutral"
    } else {
        "weak"
    };
    format!("Technical score {:.0} ({})", score, tier)
}

fn fundamental_phrase(score: f64) -> String {
    let tier = if score >= 65.0 {
        "good"
    } else if score >= 45.0 {
        "fair"
    } else {
        "poor"
    };
    format!("Fundamental score {:.0} ({})", score, tier)
}

/// Ranked reason list: score tiers, growth label, then key technical and fundamental signals
pub fn build_reasons(technical: &TechnicalResult, fundamental: &FundamentalResult) -> Vec<String> {
    let mut reasons = vec![
        technical_phrase(technical.score),
        fundamental_phrase(fundamental.score),
    ];

    let growth = &fundamental.growth;
    if growth.label.is_informative() {
        reasons.push(growth_reason(growth.label, growth.bonus));
    }

    reasons.extend(
        key_signals(&technical.signals, &TECHNICAL_KEYWORDS, MAX_SIGNALS_PER_SIDE)
            .into_iter()
            .cloned(),
    );
    reasons.extend(
        key_signals(&fundamental.signals, &FUNDAMENTAL_KEYWORDS, MAX_SIGNALS_PER_SIDE)
            .into_iter()
            .cloned(),
    );
    reasons
}

fn growth_reason(label: GrowthLabel, bonus: f64) -> String {
    format!("Growth profile: {} (bonus {:+.1})", label, bonus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::GrowthProfile;

    fn signals(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn technical(score: f64, sigs: &[&str]) -> TechnicalResult {
        TechnicalResult {
            score,
            signals: signals(sigs),
            error: None,
            ..TechnicalResult::skipped("T", "")
        }
    }

    fn fundamental(score: f64, label: GrowthLabel, bonus: f64, sigs: &[&str]) -> FundamentalResult {
        FundamentalResult {
            score,
            signals: signals(sigs),
            growth: GrowthProfile {
                label,
                bonus,
                ..Default::default()
            },
            error: None,
            ..FundamentalResult::neutral("T", "")
        }
    }

    #[test]
    fn test_tier_phrases() {
        assert_eq!(technical_phrase(65.0), "Technical score 65 (strong)");
        assert_eq!(technical_phrase(64.9), "Technical score 65 (neutral)");
        assert_eq!(technical_phrase(44.0), "Technical score 44 (weak)");
        assert_eq!(fundamental_phrase(80.0), "Fundamental score 80 (good)");
        assert_eq!(fundamental_phrase(45.0), "Fundamental score 45 (fair)");
        assert_eq!(fundamental_phrase(10.0), "Fundamental score 10 (poor)");
    }

    #[test]
    fn test_growth_reason_only_when_informative() {
        let t = technical(50.0, &[]);
        let with = build_reasons(&t, &fundamental(70.0, GrowthLabel::SuperGrowth, 15.0, &[]));
        assert_eq!(with[2], "Growth profile: super growth (bonus +15.0)");

        let low = build_reasons(&t, &fundamental(70.0, GrowthLabel::LowGrowth, 0.0, &[]));
        assert_eq!(low.len(), 2);
        let unknown = build_reasons(&t, &fundamental(70.0, GrowthLabel::Unknown, 0.0, &[]));
        assert_eq!(unknown.len(), 2);

        let decline = build_reasons(&t, &fundamental(30.0, GrowthLabel::DoubleDecline, -5.0, &[]));
        assert_eq!(decline[2], "Growth profile: double decline (bonus -5.0)");
    }

    #[test]
    fn test_key_signals_keep_order_and_limit() {
        let t = technical(
            70.0,
            &[
                "Price above MA20, medium-term trend positive",
                "MA5 crossed above MA20, golden cross",
                "RSI=25.0 oversold, possible rebound",
                "Volume surge on a rising price, buyers stepping in",
            ],
        );
        let f = fundamental(
            60.0,
            GrowthLabel::Unknown,
            0.0,
            &[
                "PE=12.0 far below the sector benchmark 30, possibly undervalued",
                "PB data missing",
                "ROE=30.0% outstanding, very strong profitability",
                "PEG=0.40, very cheap for its growth",
            ],
        );
        let reasons = build_reasons(&t, &f);
        assert_eq!(
            reasons[2..],
            [
                "MA5 crossed above MA20, golden cross".to_string(),
                "RSI=25.0 oversold, possible rebound".to_string(),
                "PE=12.0 far below the sector benchmark 30, possibly undervalued".to_string(),
                "ROE=30.0% outstanding, very strong profitability".to_string(),
            ]
        );
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let sigs = signals(&["PEG=0.90, reasonably to cheaply valued", "Debt/equity 10%, very strong balance sheet"]);
        let found = key_signals(&sigs, &FUNDAMENTAL_KEYWORDS, 2);
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("PEG"));
    }

    #[test]
    fn test_neutral_signals_not_selected() {
        let sigs = signals(&[
            "MACD: DIF above DEA, bullish alignment",
            "Price near the Bollinger middle band, neutral",
            "Short-term volume picking up",
        ]);
        assert!(key_signals(&sigs, &TECHNICAL_KEYWORDS, 2).is_empty());
    }
}
