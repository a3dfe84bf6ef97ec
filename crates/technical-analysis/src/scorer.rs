use analysis_core::{
    clamp_score, round2, score_ladder, AnalysisError, Band, IndicatorValues, InstrumentSnapshot,
    TechnicalIndicator, TechnicalResult, TechnicalScorer, NEUTRAL_SCORE,
};
use market_profile::{ProfileRegistry, RsiBands};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::indicators::*;

/// Minimum history needed before any indicator is scored
pub const MIN_BARS: usize = 30;

const RSI_PERIOD: usize = 14;
const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_STD: f64 = 2.0;

/// Score for one indicator plus the signals it raised
#[derive(Debug, Clone, PartialEq)]
pub struct SubScore {
    pub score: f64,
    pub signals: Vec<String>,
}

impl SubScore {
    fn new(score: f64) -> Self {
        Self {
            score,
            signals: Vec::new(),
        }
    }

    fn neutral(signal: &str) -> Self {
        Self {
            score: NEUTRAL_SCORE,
            signals: vec![signal.to_string()],
        }
    }

    fn adjust(&mut self, delta: f64) {
        self.score += delta;
    }

    fn signal(&mut self, text: impl Into<String>) {
        self.signals.push(text.into());
    }

    fn clamped(mut self) -> Self {
        self.score = clamp_score(self.score);
        self
    }
}

const RSI_BANDS: [Band<RsiBands>; 5] = [
    Band {
        matches: |v, b| v < b.oversold,
        score: 80.0,
        describe: |v, _| format!("RSI={:.1} oversold, possible rebound", v),
    },
    Band {
        matches: |v, b| v > b.overbought,
        score: 20.0,
        describe: |v, _| format!("RSI={:.1} overbought, watch for a pullback", v),
    },
    Band {
        matches: |v, _| (40.0..=60.0).contains(&v),
        score: 55.0,
        describe: |v, _| format!("RSI={:.1} in the neutral zone", v),
    },
    Band {
        matches: |v, _| v < 40.0,
        score: 65.0,
        describe: |v, _| format!("RSI={:.1} on the low side, room to rise", v),
    },
    Band {
        matches: |_, _| true,
        score: 40.0,
        describe: |v, _| format!("RSI={:.1} elevated, momentum strong but stretched", v),
    },
];

const BOLLINGER_BANDS: [Band<()>; 5] = [
    Band {
        matches: |p, _| p < 0.1,
        score: 75.0,
        describe: |_, _| "Price near the lower Bollinger band, possible rebound".to_string(),
    },
    Band {
        matches: |p, _| p > 0.9,
        score: 25.0,
        describe: |_, _| "Price near the upper Bollinger band, watch for a pullback".to_string(),
    },
    Band {
        matches: |p, _| (0.4..=0.6).contains(&p),
        score: 55.0,
        describe: |_, _| "Price near the Bollinger middle band, neutral".to_string(),
    },
    Band {
        matches: |p, _| p < 0.4,
        score: 60.0,
        describe: |_, _| "Price in the lower half of the Bollinger band, some room to rebound".to_string(),
    },
    Band {
        matches: |_, _| true,
        score: 45.0,
        describe: |_, _| "Price in the upper half of the Bollinger band".to_string(),
    },
];

pub struct TechnicalScoringEngine {
    registry: Arc<ProfileRegistry>,
}

impl TechnicalScoringEngine {
    pub fn new(registry: Arc<ProfileRegistry>) -> Self {
        Self { registry }
    }

    pub fn analyze(&self, snapshot: &InstrumentSnapshot) -> TechnicalResult {
        if !snapshot.is_valid() {
            let error = match &snapshot.error {
                Some(err) => err.clone(),
                None => "no price history".to_string(),
            };
            debug!(symbol = %snapshot.symbol, error = %error, "Skipping technical scoring");
            return TechnicalResult::skipped(&snapshot.symbol, error);
        }

        let bars = snapshot.bars.len();
        if bars < MIN_BARS {
            debug!(symbol = %snapshot.symbol, bars, "Not enough history for technical scoring");
            let err = AnalysisError::InsufficientData {
                required: MIN_BARS,
                provided: bars,
            };
            return TechnicalResult::skipped(&snapshot.symbol, err.to_string());
        }

        match self.compute(snapshot) {
            Ok(result) => result,
            Err(e) => {
                warn!(symbol = %snapshot.symbol, error = %e, "Technical scoring failed");
                TechnicalResult {
                    score: NEUTRAL_SCORE,
                    ..TechnicalResult::skipped(&snapshot.symbol, format!("technical analysis failed: {}", e))
                }
            }
        }
    }

    fn compute(&self, snapshot: &InstrumentSnapshot) -> Result<TechnicalResult, AnalysisError> {
        let closes: Vec<f64> = snapshot.bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = snapshot.bars.iter().map(|b| b.volume).collect();
        let mut values = IndicatorValues {
            close: Some(latest(&closes, "close")?),
            ..Default::default()
        };

        let ma = score_ma_trend(&closes, &mut values)?;
        let rsi_score = score_rsi(latest_rsi(&closes), &self.registry.rsi_bands(), &mut values);
        let macd_score = score_macd(&closes, &mut values)?;
        let boll = score_bollinger(&closes, &mut values)?;
        let volume = score_volume_trend(&volumes, &closes, &mut values)?;

        let mut sub_scores = BTreeMap::new();
        let mut signals = Vec::new();
        for (indicator, sub) in [
            (TechnicalIndicator::MaTrend, ma),
            (TechnicalIndicator::Rsi, rsi_score),
            (TechnicalIndicator::Macd, macd_score),
            (TechnicalIndicator::Bollinger, boll),
            (TechnicalIndicator::VolumeTrend, volume),
        ] {
            sub_scores.insert(indicator, sub.score);
            signals.extend(sub.signals);
        }

        let weights = &self.registry.profile(snapshot.market).technical;
        let total: f64 = weights
            .iter()
            .map(|(indicator, weight)| sub_scores.get(indicator).copied().unwrap_or(NEUTRAL_SCORE) * weight)
            .sum();

        Ok(TechnicalResult {
            symbol: snapshot.symbol.clone(),
            score: round2(AnalysisError::check_finite(total, "technical score")?),
            sub_scores,
            signals,
            indicators: values,
            error: None,
        })
    }
}

impl TechnicalScorer for TechnicalScoringEngine {
    fn score(&self, snapshot: &InstrumentSnapshot) -> TechnicalResult {
        self.analyze(snapshot)
    }
}

fn latest(series: &[f64], what: &str) -> Result<f64, AnalysisError> {
    let value = series
        .last()
        .copied()
        .ok_or_else(|| AnalysisError::CalculationError(format!("{} unavailable", what)))?;
    AnalysisError::check_finite(value, what)
}

fn previous(series: &[f64], what: &str) -> Result<f64, AnalysisError> {
    match series.len() {
        n if n >= 2 => AnalysisError::check_finite(series[n - 2], what),
        _ => Err(AnalysisError::CalculationError(format!("{} has no prior value", what))),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn latest_rsi(closes: &[f64]) -> Option<f64> {
    rsi(closes, RSI_PERIOD)
        .last()
        .copied()
        .flatten()
        .filter(|v| v.is_finite())
}

/// Price position against the 5/20/60 moving averages plus the 5/20 cross
pub fn score_ma_trend(closes: &[f64], values: &mut IndicatorValues) -> Result<SubScore, AnalysisError> {
    let ma5 = sma(closes, 5);
    let ma20 = sma(closes, 20);
    // Short histories fall back to the 20-period average for the long leg
    let ma60 = if closes.len() >= 60 { sma(closes, 60) } else { ma20.clone() };

    let close = latest(closes, "close")?;
    let last_ma5 = latest(&ma5, "MA5")?;
    let last_ma20 = latest(&ma20, "MA20")?;
    let last_ma60 = latest(&ma60, "MA60")?;

    let mut sub = SubScore::new(NEUTRAL_SCORE);
    sub.adjust(if close > last_ma5 { 10.0 } else { -10.0 });

    if close > last_ma20 {
        sub.adjust(10.0);
        sub.signal("Price above MA20, medium-term trend positive");
    } else {
        sub.adjust(-10.0);
    }

    if close > last_ma60 {
        sub.adjust(10.0);
        sub.signal("Price above MA60, long-term trend positive");
    } else {
        sub.adjust(-10.0);
    }

    let prev_diff = previous(&ma5, "MA5")? - previous(&ma20, "MA20")?;
    let curr_diff = last_ma5 - last_ma20;
    if prev_diff < 0.0 && curr_diff > 0.0 {
        sub.adjust(15.0);
        sub.signal("MA5 crossed above MA20, golden cross");
    } else if prev_diff > 0.0 && curr_diff < 0.0 {
        sub.adjust(-15.0);
        sub.signal("MA5 crossed below MA20, death cross");
    }

    values.ma5 = Some(round_to(last_ma5, 2));
    values.ma20 = Some(round_to(last_ma20, 2));
    values.ma60 = Some(round_to(last_ma60, 2));
    Ok(sub.clamped())
}

/// RSI against the configured oversold/overbought bands
pub fn score_rsi(latest: Option<f64>, bands: &RsiBands, values: &mut IndicatorValues) -> SubScore {
    let Some(value) = latest else {
        return SubScore::neutral("RSI unavailable");
    };
    values.rsi_14 = Some(round_to(value, 2));

    match score_ladder(&RSI_BANDS, value, bands) {
        Some((score, signal)) => SubScore {
            score,
            signals: vec![signal],
        },
        None => SubScore::neutral("RSI unavailable"),
    }
}

/// MACD(12, 26, 9): line vs signal, histogram direction, zero-axis position
pub fn score_macd(closes: &[f64], values: &mut IndicatorValues) -> Result<SubScore, AnalysisError> {
    let result = macd(closes, 12, 26, 9);
    let dif = latest(&result.macd_line, "MACD DIF")?;
    let dea = latest(&result.signal_line, "MACD DEA")?;
    let hist = latest(&result.histogram, "MACD histogram")?;
    let prev_hist = previous(&result.histogram, "MACD histogram")?;

    let mut sub = SubScore::new(NEUTRAL_SCORE);
    if dif > dea {
        sub.adjust(15.0);
        sub.signal("MACD: DIF above DEA, bullish alignment");
    } else {
        sub.adjust(-15.0);
        sub.signal("MACD: DIF below DEA, bearish alignment");
    }

    if hist > 0.0 && prev_hist < 0.0 {
        sub.adjust(15.0);
        sub.signal("MACD histogram turned positive, buy signal");
    } else if hist < 0.0 && prev_hist > 0.0 {
        sub.adjust(-15.0);
        sub.signal("MACD histogram turned negative, sell signal");
    } else if hist > prev_hist {
        sub.adjust(5.0);
    } else {
        sub.adjust(-5.0);
    }

    if dif > 0.0 && dea > 0.0 {
        sub.adjust(10.0);
    }

    values.macd_dif = Some(round_to(dif, 4));
    values.macd_dea = Some(round_to(dea, 4));
    values.macd_hist = Some(round_to(hist, 4));
    Ok(sub.clamped())
}

/// Position of the close inside the 20-period, 2-sigma band
pub fn score_bollinger(closes: &[f64], values: &mut IndicatorValues) -> Result<SubScore, AnalysisError> {
    let bb = bollinger_bands(closes, BOLLINGER_PERIOD, BOLLINGER_STD);
    let close = latest(closes, "close")?;
    let upper = latest(&bb.upper, "Bollinger upper")?;
    let middle = latest(&bb.middle, "Bollinger middle")?;
    let lower = latest(&bb.lower, "Bollinger lower")?;

    let width = upper - lower;
    if width == 0.0 {
        return Ok(SubScore::neutral("Bollinger band width is zero"));
    }

    let position = AnalysisError::check_finite((close - lower) / width, "Bollinger position")?;
    values.boll_upper = Some(round_to(upper, 2));
    values.boll_mid = Some(round_to(middle, 2));
    values.boll_lower = Some(round_to(lower, 2));
    values.boll_position = Some(round_to(position, 4));

    Ok(match score_ladder(&BOLLINGER_BANDS, position, &()) {
        Some((score, signal)) => SubScore {
            score,
            signals: vec![signal],
        },
        None => SubScore::neutral("Bollinger position unavailable"),
    })
}

/// Latest volume against its 5- and 20-period averages, read with the price move
pub fn score_volume_trend(
    volumes: &[f64],
    closes: &[f64],
    values: &mut IndicatorValues,
) -> Result<SubScore, AnalysisError> {
    if volumes.iter().all(|v| *v == 0.0) {
        return Ok(SubScore::neutral("no volume data"));
    }

    let volume = latest(volumes, "volume")?;
    let vol_ma5 = latest(&sma(volumes, 5), "volume MA5")?;
    let vol_ma20 = latest(&sma(volumes, 20), "volume MA20")?;
    let price_change = latest(closes, "close")? - previous(closes, "close")?;

    let mut sub = SubScore::new(NEUTRAL_SCORE);
    let surge = volume > vol_ma20 * 1.5;
    if surge && price_change > 0.0 {
        sub.adjust(20.0);
        sub.signal("Volume surge on a rising price, buyers stepping in");
    } else if surge && price_change < 0.0 {
        sub.adjust(-15.0);
        sub.signal("Volume surge on a falling price, heavy selling pressure");
    } else if volume < vol_ma20 * 0.5 {
        sub.adjust(-5.0);
        sub.signal("Volume contracting sharply, interest fading");
    }

    if vol_ma5 > vol_ma20 {
        sub.adjust(5.0);
        sub.signal("Short-term volume picking up");
    }

    values.volume_latest = Some(volume);
    values.volume_ma5 = Some(vol_ma5);
    values.volume_ma20 = Some(vol_ma20);
    Ok(sub.clamped())
}
