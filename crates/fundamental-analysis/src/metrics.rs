//! Banded sub-scores for the ten fundamental metrics.
//!
//! Every metric scores neutral (50) with a "data missing" signal when its
//! attribute is absent. Percentages are whole percent after scaling the
//! provider's fractions by 100.

use analysis_core::{score_ladder, AnalysisError, Band, FundamentalAttributes, Market, NEUTRAL_SCORE};
use market_profile::MarketThresholds;

use crate::sector::pe_benchmark;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricScore {
    pub score: f64,
    pub signals: Vec<String>,
}

impl MetricScore {
    fn missing(what: &str) -> Self {
        Self::neutral_for(AnalysisError::MissingAttribute(what.to_string()))
    }

    /// Neutral score carrying the error as its signal
    fn neutral_for(err: AnalysisError) -> Self {
        Self {
            score: NEUTRAL_SCORE,
            signals: vec![err.to_string()],
        }
    }

    fn from_ladder<C>(bands: &[Band<C>], value: f64, ctx: &C, what: &str) -> Self {
        match score_ladder(bands, value, ctx) {
            Some((score, signal)) => Self {
                score,
                signals: vec![signal],
            },
            None => Self::missing(what),
        }
    }

    fn prepend(mut self, signal: String) -> Self {
        self.signals.insert(0, signal);
        self
    }
}

pub struct PeContext {
    pub max_pe: f64,
    pub benchmark: f64,
}

const PE_BANDS: [Band<PeContext>; 6] = [
    Band {
        matches: |pe, c| pe > c.max_pe,
        score: 15.0,
        describe: |pe, c| format!("PE={:.1} significantly above the {} ceiling, expensive", pe, c.max_pe),
    },
    Band {
        matches: |pe, c| pe > c.benchmark * 1.5,
        score: 25.0,
        describe: |pe, c| format!("PE={:.1} above 1.5x the sector benchmark {:.0}, rich valuation", pe, c.benchmark),
    },
    Band {
        matches: |pe, c| pe > c.benchmark,
        score: 45.0,
        describe: |pe, c| format!("PE={:.1} slightly above the sector benchmark {:.0}", pe, c.benchmark),
    },
    Band {
        matches: |pe, c| pe > c.benchmark * 0.7,
        score: 65.0,
        describe: |pe, c| format!("PE={:.1} close to the sector benchmark {:.0}, fairly valued", pe, c.benchmark),
    },
    Band {
        matches: |pe, c| pe > c.benchmark * 0.5,
        score: 80.0,
        describe: |pe, c| format!("PE={:.1} below the sector benchmark {:.0}, attractive valuation", pe, c.benchmark),
    },
    Band {
        matches: |_, _| true,
        score: 85.0,
        describe: |pe, c| format!("PE={:.1} far below the sector benchmark {:.0}, possibly undervalued", pe, c.benchmark),
    },
];

const PB_BANDS: [Band<f64>; 6] = [
    Band {
        matches: |pb, _| pb < 0.0,
        score: 20.0,
        describe: |_, _| "PB negative, book value below zero, high risk".to_string(),
    },
    Band {
        matches: |pb, max| pb > *max,
        score: 20.0,
        describe: |pb, max| format!("PB={:.2} above the {} ceiling, expensive", pb, max),
    },
    Band {
        matches: |pb, _| pb > 5.0,
        score: 35.0,
        describe: |pb, _| format!("PB={:.2} high", pb),
    },
    Band {
        matches: |pb, _| pb > 3.0,
        score: 50.0,
        describe: |pb, _| format!("PB={:.2} moderate", pb),
    },
    Band {
        matches: |pb, _| pb > 1.0,
        score: 70.0,
        describe: |pb, _| format!("PB={:.2} reasonable", pb),
    },
    Band {
        matches: |_, _| true,
        score: 80.0,
        describe: |pb, _| format!("PB={:.2} near or below book value, possibly undervalued", pb),
    },
];

const ROE_BANDS: [Band<f64>; 6] = [
    Band {
        matches: |roe, _| roe < 0.0,
        score: 10.0,
        describe: |roe, _| format!("ROE={:.1}% negative, weak profitability", roe),
    },
    Band {
        matches: |roe, min| roe < *min,
        score: 30.0,
        describe: |roe, min| format!("ROE={:.1}% below the {}% floor", roe, min),
    },
    Band {
        matches: |roe, _| roe < 10.0,
        score: 50.0,
        describe: |roe, _| format!("ROE={:.1}% mediocre", roe),
    },
    Band {
        matches: |roe, _| roe < 15.0,
        score: 65.0,
        describe: |roe, _| format!("ROE={:.1}% good", roe),
    },
    Band {
        matches: |roe, _| roe < 25.0,
        score: 80.0,
        describe: |roe, _| format!("ROE={:.1}% excellent", roe),
    },
    Band {
        matches: |_, _| true,
        score: 90.0,
        describe: |roe, _| format!("ROE={:.1}% outstanding, very strong profitability", roe),
    },
];

const REVENUE_GROWTH_BANDS: [Band<f64>; 6] = [
    Band {
        matches: |g, _| g < -10.0,
        score: 15.0,
        describe: |g, _| format!("Revenue growth {:.1}%, declining significantly", g),
    },
    Band {
        matches: |g, _| g < 0.0,
        score: 30.0,
        describe: |g, _| format!("Revenue growth {:.1}%, slight decline", g),
    },
    Band {
        matches: |g, _| g < 5.0,
        score: 45.0,
        describe: |g, _| format!("Revenue growth {:.1}%, slow", g),
    },
    Band {
        matches: |g, _| g < 15.0,
        score: 60.0,
        describe: |g, _| format!("Revenue growth {:.1}%, steady", g),
    },
    Band {
        matches: |g, high| g < *high,
        score: 75.0,
        describe: |g, _| format!("Revenue growth {:.1}%, fast", g),
    },
    Band {
        matches: |_, _| true,
        score: 90.0,
        describe: |g, _| format!("Revenue growth {:.1}%, rapid growth", g),
    },
];

const EARNINGS_GROWTH_BANDS: [Band<f64>; 6] = [
    Band {
        matches: |g, _| g < -20.0,
        score: 10.0,
        describe: |g, _| format!("Earnings growth {:.1}%, sharp decline", g),
    },
    Band {
        matches: |g, _| g < -5.0,
        score: 25.0,
        describe: |g, _| format!("Earnings growth {:.1}%, clear decline", g),
    },
    Band {
        matches: |g, _| g < 0.0,
        score: 35.0,
        describe: |g, _| format!("Earnings growth {:.1}%, slight decline", g),
    },
    Band {
        matches: |g, _| g < 10.0,
        score: 50.0,
        describe: |g, _| format!("Earnings growth {:.1}%, flat", g),
    },
    Band {
        matches: |g, high| g < *high,
        score: 70.0,
        describe: |g, _| format!("Earnings growth {:.1}%, steady", g),
    },
    Band {
        matches: |_, _| true,
        score: 90.0,
        describe: |g, _| format!("Earnings growth {:.1}%, rapid growth", g),
    },
];

const PROFIT_MARGIN_BANDS: [Band<()>; 5] = [
    Band {
        matches: |m, _| m < 0.0,
        score: 10.0,
        describe: |m, _| format!("Profit margin {:.1}%, loss-making", m),
    },
    Band {
        matches: |m, _| m < 5.0,
        score: 35.0,
        describe: |m, _| format!("Profit margin {:.1}%, thin", m),
    },
    Band {
        matches: |m, _| m < 10.0,
        score: 50.0,
        describe: |m, _| format!("Profit margin {:.1}%, average", m),
    },
    Band {
        matches: |m, _| m < 20.0,
        score: 70.0,
        describe: |m, _| format!("Profit margin {:.1}%, healthy", m),
    },
    Band {
        matches: |_, _| true,
        score: 85.0,
        describe: |m, _| format!("Profit margin {:.1}%, excellent profitability", m),
    },
];

const DEBT_BANDS: [Band<()>; 5] = [
    Band {
        matches: |d, _| d > 200.0,
        score: 15.0,
        describe: |d, _| format!("Debt/equity {:.0}%, very high leverage", d),
    },
    Band {
        matches: |d, _| d > 100.0,
        score: 35.0,
        describe: |d, _| format!("Debt/equity {:.0}%, high leverage", d),
    },
    Band {
        matches: |d, _| d > 50.0,
        score: 55.0,
        describe: |d, _| format!("Debt/equity {:.0}%, average balance sheet", d),
    },
    Band {
        matches: |d, _| d > 20.0,
        score: 75.0,
        describe: |d, _| format!("Debt/equity {:.0}%, healthy balance sheet", d),
    },
    Band {
        matches: |_, _| true,
        score: 90.0,
        describe: |d, _| format!("Debt/equity {:.0}%, very strong balance sheet", d),
    },
];

const FCF_YIELD_BANDS: [Band<()>; 5] = [
    Band {
        matches: |y, _| y < -2.0,
        score: 15.0,
        describe: |y, _| format!("FCF yield {:.1}%, cash flow negative", y),
    },
    Band {
        matches: |y, _| y < 0.0,
        score: 30.0,
        describe: |y, _| format!("FCF yield {:.1}%, slightly negative", y),
    },
    Band {
        matches: |y, _| y < 3.0,
        score: 55.0,
        describe: |y, _| format!("FCF yield {:.1}%, average", y),
    },
    Band {
        matches: |y, _| y < 6.0,
        score: 70.0,
        describe: |y, _| format!("FCF yield {:.1}%, good", y),
    },
    Band {
        matches: |_, _| true,
        score: 85.0,
        describe: |y, _| format!("FCF yield {:.1}%, excellent", y),
    },
];

const PEG_BANDS: [Band<()>; 6] = [
    Band {
        matches: |p, _| p < 0.0,
        score: 25.0,
        describe: |p, _| format!("PEG={:.2} negative, shrinking or negative earnings", p),
    },
    Band {
        matches: |p, _| p < 0.5,
        score: 90.0,
        describe: |p, _| format!("PEG={:.2}, very cheap for its growth", p),
    },
    Band {
        matches: |p, _| p < 1.0,
        score: 80.0,
        describe: |p, _| format!("PEG={:.2}, reasonably to cheaply valued", p),
    },
    Band {
        matches: |p, _| p < 1.5,
        score: 65.0,
        describe: |p, _| format!("PEG={:.2}, fairly valued", p),
    },
    Band {
        matches: |p, _| p < 2.5,
        score: 45.0,
        describe: |p, _| format!("PEG={:.2}, somewhat expensive", p),
    },
    Band {
        matches: |_, _| true,
        score: 25.0,
        describe: |p, _| format!("PEG={:.2}, expensive", p),
    },
];

const DIVIDEND_BANDS: [Band<()>; 5] = [
    Band {
        matches: |d, _| d <= 0.0,
        score: 40.0,
        describe: |_, _| "No dividend".to_string(),
    },
    Band {
        matches: |d, _| d < 1.0,
        score: 50.0,
        describe: |d, _| format!("Dividend yield {:.2}%, low", d),
    },
    Band {
        matches: |d, _| d < 3.0,
        score: 65.0,
        describe: |d, _| format!("Dividend yield {:.2}%, moderate", d),
    },
    Band {
        matches: |d, _| d < 5.0,
        score: 80.0,
        describe: |d, _| format!("Dividend yield {:.2}%, high", d),
    },
    Band {
        matches: |_, _| true,
        score: 90.0,
        describe: |d, _| format!("Dividend yield {:.2}%, high-dividend stock", d),
    },
];

fn numeric(value: Option<f64>) -> Option<f64> {
    FundamentalAttributes::numeric(value)
}

/// PE against the sector benchmark; a positive forward PE stands in for a missing trailing PE
pub fn score_pe(attrs: &FundamentalAttributes, thresholds: &MarketThresholds) -> MetricScore {
    let ctx = PeContext {
        max_pe: thresholds.max_pe_ratio,
        benchmark: pe_benchmark(attrs.sector.as_deref()),
    };

    match numeric(attrs.trailing_pe).filter(|pe| *pe > 0.0) {
        Some(pe) => MetricScore::from_ladder(&PE_BANDS, pe, &ctx, "PE"),
        None => match numeric(attrs.forward_pe).filter(|pe| *pe > 0.0) {
            Some(pe) => MetricScore::from_ladder(&PE_BANDS, pe, &ctx, "PE")
                .prepend(format!("Using forward PE={:.1}", pe)),
            None => MetricScore::missing("PE"),
        },
    }
}

pub fn score_pb(attrs: &FundamentalAttributes, thresholds: &MarketThresholds) -> MetricScore {
    match numeric(attrs.price_to_book) {
        Some(pb) => MetricScore::from_ladder(&PB_BANDS, pb, &thresholds.max_pb_ratio, "PB"),
        None => MetricScore::missing("PB"),
    }
}

pub fn score_roe(attrs: &FundamentalAttributes, thresholds: &MarketThresholds) -> MetricScore {
    match numeric(attrs.return_on_equity) {
        Some(roe) => MetricScore::from_ladder(&ROE_BANDS, roe * 100.0, &thresholds.min_roe, "ROE"),
        None => MetricScore::missing("ROE"),
    }
}

pub fn score_revenue_growth(attrs: &FundamentalAttributes, thresholds: &MarketThresholds) -> MetricScore {
    match numeric(attrs.revenue_growth) {
        Some(g) => MetricScore::from_ladder(
            &REVENUE_GROWTH_BANDS,
            g * 100.0,
            &thresholds.high_growth_revenue,
            "Revenue growth",
        ),
        None => MetricScore::missing("Revenue growth"),
    }
}

pub fn score_earnings_growth(attrs: &FundamentalAttributes, thresholds: &MarketThresholds) -> MetricScore {
    match numeric(attrs.earnings_growth) {
        Some(g) => MetricScore::from_ladder(
            &EARNINGS_GROWTH_BANDS,
            g * 100.0,
            &thresholds.high_growth_earnings,
            "Earnings growth",
        ),
        None => MetricScore::missing("Earnings growth"),
    }
}

pub fn score_profit_margin(attrs: &FundamentalAttributes) -> MetricScore {
    match numeric(attrs.profit_margins) {
        Some(m) => MetricScore::from_ladder(&PROFIT_MARGIN_BANDS, m * 100.0, &(), "Profit margin"),
        None => MetricScore::missing("Profit margin"),
    }
}

pub fn score_debt_ratio(attrs: &FundamentalAttributes) -> MetricScore {
    match numeric(attrs.debt_to_equity) {
        Some(d) => MetricScore::from_ladder(&DEBT_BANDS, d, &(), "Debt/equity"),
        None => MetricScore::missing("Debt/equity"),
    }
}

/// FCF yield when market cap is known, otherwise the sign of FCF alone
pub fn score_free_cashflow(attrs: &FundamentalAttributes) -> MetricScore {
    let Some(fcf) = numeric(attrs.free_cashflow) else {
        return MetricScore::missing("Free cash flow");
    };

    match numeric(attrs.market_cap).filter(|cap| *cap > 0.0) {
        Some(cap) => MetricScore::from_ladder(&FCF_YIELD_BANDS, fcf / cap * 100.0, &(), "Free cash flow"),
        None if fcf > 0.0 => MetricScore {
            score: 65.0,
            signals: vec!["Free cash flow positive".to_string()],
        },
        None => MetricScore {
            score: 30.0,
            signals: vec!["Free cash flow negative, watch cash burn".to_string()],
        },
    }
}

pub fn score_peg(attrs: &FundamentalAttributes) -> MetricScore {
    match numeric(attrs.peg_ratio) {
        Some(peg) => MetricScore::from_ladder(&PEG_BANDS, peg, &(), "PEG"),
        None => MetricScore::missing("PEG"),
    }
}

/// Dividend yield; HK rewards yields of 3% and above
pub fn score_dividend_yield(attrs: &FundamentalAttributes, market: Market) -> MetricScore {
    let Some(yield_frac) = numeric(attrs.dividend_yield) else {
        return MetricScore::missing("Dividend yield");
    };

    let pct = yield_frac * 100.0;
    let mut scored = MetricScore::from_ladder(&DIVIDEND_BANDS, pct, &(), "Dividend yield");
    if market == Market::HK && pct >= 3.0 {
        scored.score = (scored.score + 5.0).min(95.0);
        scored.signals.push("HK high-dividend bonus".to_string());
    }
    scored
}
