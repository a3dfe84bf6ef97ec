use analysis_core::{round2, FundamentalAttributes, GrowthLabel, GrowthProfile};
use market_profile::MarketThresholds;

/// Classify growth and compute the bounded growth bonus.
///
/// The raw bonus is the label's base plus PEG and free-cash-flow
/// adjustments, clamped to `[-cap, cap]`.
pub fn classify_growth(attrs: &FundamentalAttributes, thresholds: &MarketThresholds, cap: f64) -> GrowthProfile {
    let rev = FundamentalAttributes::numeric(attrs.revenue_growth);
    let earn = FundamentalAttributes::numeric(attrs.earnings_growth);
    let peg = FundamentalAttributes::numeric(attrs.peg_ratio);
    let fcf = FundamentalAttributes::numeric(attrs.free_cashflow);
    let shares = FundamentalAttributes::numeric(attrs.shares_outstanding);

    let mut profile = GrowthProfile {
        revenue_growth: rev.map(|g| round2(g * 100.0)),
        earnings_growth: earn.map(|g| round2(g * 100.0)),
        peg_ratio: peg,
        free_cashflow_per_share: match (fcf, shares) {
            (Some(fcf), Some(shares)) if shares > 0.0 => Some(round2(fcf / shares)),
            _ => None,
        },
        ..Default::default()
    };

    let mut bonus = 0.0;

    match (profile.revenue_growth, profile.earnings_growth) {
        (Some(rev), Some(earn)) => {
            let (label, base, signal) = dual_metric_label(rev, earn, thresholds);
            profile.label = label;
            bonus += base;
            profile.signals.push(signal);
        }
        (Some(rev), None) => {
            let (label, base, signal) = revenue_only_label(rev, thresholds);
            profile.label = label;
            bonus += base;
            profile.signals.extend(signal);
        }
        _ => {}
    }

    if let Some(peg) = peg {
        if peg > 0.0 && peg < 0.8 {
            bonus += 4.0;
            profile.signals.push(format!("PEG={:.2}, growth priced very attractively", peg));
        } else if (0.8..=1.2).contains(&peg) {
            bonus += 2.0;
            profile.signals.push(format!("PEG={:.2}, valuation in line with growth", peg));
        } else if peg > 2.0 {
            bonus -= 2.0;
            profile.signals.push(format!("PEG={:.2}, growth looks expensive", peg));
        }
    }

    if let Some(fcf) = fcf {
        if fcf > 0.0 {
            bonus += 1.5;
            profile.signals.push("Positive free cash flow backs growth quality".to_string());
        } else {
            bonus -= 1.0;
        }
    }

    profile.bonus = round2(bonus.clamp(-cap, cap));
    profile
}

fn dual_metric_label(rev: f64, earn: f64, t: &MarketThresholds) -> (GrowthLabel, f64, String) {
    if rev >= t.high_growth_revenue && earn >= t.high_growth_earnings {
        (
            GrowthLabel::SuperGrowth,
            12.0,
            format!("[super growth] revenue {:.1}% and earnings {:.1}% both growing fast", rev, earn),
        )
    } else if rev >= t.min_growth_revenue && earn >= t.high_growth_earnings {
        (
            GrowthLabel::EarningsLedGrowth,
            9.0,
            format!("[earnings-led growth] earnings {:.1}% standing out, revenue {:.1}% solid", earn, rev),
        )
    } else if rev >= t.high_growth_revenue && earn >= 0.0 {
        (
            GrowthLabel::RevenueLedGrowth,
            7.0,
            format!("[revenue-led growth] revenue growing {:.1}%", rev),
        )
    } else if rev >= t.min_growth_revenue && earn >= 0.0 {
        (
            GrowthLabel::SteadyGrowth,
            4.0,
            format!("[steady growth] revenue {:.1}%, earnings {:.1}%", rev, earn),
        )
    } else if rev < 0.0 && earn < 0.0 {
        (
            GrowthLabel::DoubleDecline,
            -5.0,
            format!("[double decline] revenue {:.1}% and earnings {:.1}% both falling", rev, earn),
        )
    } else {
        (
            GrowthLabel::LowGrowth,
            0.0,
            format!("[low growth] revenue {:.1}%, earnings {:.1}%", rev, earn),
        )
    }
}

fn revenue_only_label(rev: f64, t: &MarketThresholds) -> (GrowthLabel, f64, Option<String>) {
    if rev >= t.high_growth_revenue {
        (
            GrowthLabel::RevenueLedGrowth,
            6.0,
            Some(format!("[revenue-led growth] revenue growing {:.1}%", rev)),
        )
    } else if rev >= t.min_growth_revenue {
        (GrowthLabel::SteadyGrowth, 3.0, None)
    } else if rev < -5.0 {
        (
            GrowthLabel::RevenueDecline,
            -3.0,
            Some(format!("Revenue growth {:.1}%, under pressure", rev)),
        )
    } else {
        (GrowthLabel::LowGrowth, 0.0, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::Market;

    fn us() -> MarketThresholds {
        MarketThresholds::for_market(Market::US)
    }

    fn growth(rev: Option<f64>, earn: Option<f64>) -> FundamentalAttributes {
        FundamentalAttributes {
            revenue_growth: rev,
            earnings_growth: earn,
            ..Default::default()
        }
    }

    #[test]
    fn test_dual_metric_ladder() {
        let t = us();
        let label = |rev: f64, earn: f64| classify_growth(&growth(Some(rev), Some(earn)), &t, 15.0);

        let p = label(0.30, 0.28);
        assert_eq!(p.label, GrowthLabel::SuperGrowth);
        assert_eq!(p.bonus, 12.0);

        let p = label(0.10, 0.25);
        assert_eq!(p.label, GrowthLabel::EarningsLedGrowth);
        assert_eq!(p.bonus, 9.0);

        let p = label(0.25, 0.05);
        assert_eq!(p.label, GrowthLabel::RevenueLedGrowth);
        assert_eq!(p.bonus, 7.0);

        let p = label(0.10, 0.05);
        assert_eq!(p.label, GrowthLabel::SteadyGrowth);
        assert_eq!(p.bonus, 4.0);

        let p = label(-0.02, -0.10);
        assert_eq!(p.label, GrowthLabel::DoubleDecline);
        assert_eq!(p.bonus, -5.0);

        let p = label(0.03, 0.05);
        assert_eq!(p.label, GrowthLabel::LowGrowth);
        assert_eq!(p.bonus, 0.0);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let p = classify_growth(&growth(Some(0.20), Some(0.20)), &us(), 15.0);
        assert_eq!(p.label, GrowthLabel::SuperGrowth);
        let p = classify_growth(&growth(Some(0.08), Some(0.0)), &us(), 15.0);
        assert_eq!(p.label, GrowthLabel::SteadyGrowth);
    }

    #[test]
    fn test_revenue_only_fallback() {
        let t = us();
        let p = classify_growth(&growth(Some(0.25), None), &t, 15.0);
        assert_eq!((p.label, p.bonus), (GrowthLabel::RevenueLedGrowth, 6.0));
        let p = classify_growth(&growth(Some(0.10), None), &t, 15.0);
        assert_eq!((p.label, p.bonus), (GrowthLabel::SteadyGrowth, 3.0));
        let p = classify_growth(&growth(Some(-0.08), None), &t, 15.0);
        assert_eq!((p.label, p.bonus), (GrowthLabel::RevenueDecline, -3.0));
        let p = classify_growth(&growth(Some(0.01), None), &t, 15.0);
        assert_eq!((p.label, p.bonus), (GrowthLabel::LowGrowth, 0.0));
    }

    #[test]
    fn test_earnings_only_stays_unknown() {
        let p = classify_growth(&growth(None, Some(0.5)), &us(), 15.0);
        assert_eq!(p.label, GrowthLabel::Unknown);
        assert_eq!(p.bonus, 0.0);
    }

    #[test]
    fn test_peg_and_fcf_adjustments() {
        let base = |peg: f64, fcf: Option<f64>| {
            classify_growth(
                &FundamentalAttributes {
                    peg_ratio: Some(peg),
                    free_cashflow: fcf,
                    ..Default::default()
                },
                &us(),
                15.0,
            )
            .bonus
        };
        assert_eq!(base(0.5, None), 4.0);
        assert_eq!(base(0.8, None), 2.0);
        assert_eq!(base(1.2, None), 2.0);
        assert_eq!(base(1.5, None), 0.0);
        assert_eq!(base(2.0, None), 0.0);
        assert_eq!(base(2.5, None), -2.0);
        assert_eq!(base(-1.0, None), 0.0);
        assert_eq!(base(1.5, Some(10.0)), 1.5);
        assert_eq!(base(1.5, Some(-10.0)), -1.0);
    }

    #[test]
    fn test_bonus_clamped_to_cap() {
        let attrs = FundamentalAttributes {
            revenue_growth: Some(0.30),
            earnings_growth: Some(0.28),
            peg_ratio: Some(0.6),
            free_cashflow: Some(1.0e9),
            ..Default::default()
        };
        assert_eq!(classify_growth(&attrs, &us(), 15.0).bonus, 15.0);
        assert_eq!(classify_growth(&attrs, &us(), 12.0).bonus, 12.0);

        let bad = FundamentalAttributes {
            revenue_growth: Some(-0.3),
            earnings_growth: Some(-0.4),
            peg_ratio: Some(3.0),
            free_cashflow: Some(-5.0),
            ..Default::default()
        };
        // -5 - 2 - 1
        assert_eq!(classify_growth(&bad, &us(), 15.0).bonus, -8.0);
        assert_eq!(classify_growth(&bad, &us(), 6.0).bonus, -6.0);
    }

    #[test]
    fn test_percentages_and_per_share() {
        let attrs = FundamentalAttributes {
            revenue_growth: Some(0.1234),
            free_cashflow: Some(1_000.0),
            shares_outstanding: Some(300.0),
            ..Default::default()
        };
        let p = classify_growth(&attrs, &us(), 15.0);
        assert_eq!(p.revenue_growth, Some(12.34));
        assert_eq!(p.free_cashflow_per_share, Some(3.33));

        let no_shares = FundamentalAttributes {
            shares_outstanding: Some(0.0),
            ..attrs
        };
        assert_eq!(classify_growth(&no_shares, &us(), 15.0).free_cashflow_per_share, None);
    }
}
