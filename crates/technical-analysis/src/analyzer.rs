use analysis_core::{
    AnalysisError, IndicatorConfig, IndicatorSnapshot, MarketAnalysis, Outcome, PricePoint,
    TrendDirection, TrendThresholds,
};
use std::collections::BTreeMap;

use crate::indicators::*;
use crate::trend::TrendClassifier;

/// Computes an [`IndicatorSnapshot`] from a series of closes.
///
/// Stateless apart from its window configuration: the same closes always
/// produce the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn snapshot(&self, closes: &[f64]) -> Result<IndicatorSnapshot, AnalysisError> {
        validate_closes(closes)?;

        let sma_values: BTreeMap<usize, Option<f64>> = self
            .config
            .sma_windows
            .iter()
            .map(|&w| (w, sma(closes, w)))
            .collect();
        let ema_values: BTreeMap<usize, Option<f64>> = self
            .config
            .ema_windows
            .iter()
            .map(|&w| (w, ema(closes, w)))
            .collect();

        let rsi_value = rsi(closes, self.config.rsi_window);
        let macd_value = macd(
            closes,
            self.config.macd_fast,
            self.config.macd_slow,
            self.config.macd_signal,
        );

        let price_change_pct = price_change_pct(closes).ok_or_else(|| {
            AnalysisError::CalculationError("price change undefined".to_string())
        })?;

        // validate_closes guarantees at least two samples
        let last = closes[closes.len() - 1];
        let prev = closes[closes.len() - 2];
        let recent_trend = if last > prev { TrendDirection::Up } else { TrendDirection::Down };

        let snapshot = IndicatorSnapshot {
            rsi: rsi_value,
            sma: sma_values,
            ema: ema_values,
            macd: macd_value,
            price_change_pct,
            recent_trend,
        };
        ensure_finite(&snapshot)?;
        Ok(snapshot)
    }
}

fn ensure_finite(snapshot: &IndicatorSnapshot) -> Result<(), AnalysisError> {
    let mut values = vec![snapshot.price_change_pct];
    values.extend(snapshot.rsi);
    values.extend(snapshot.sma.values().flatten());
    values.extend(snapshot.ema.values().flatten());
    if let Some(m) = snapshot.macd {
        values.push(m.macd);
        values.push(m.signal);
    }
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(AnalysisError::CalculationError(
            "indicator produced a non-finite value".to_string(),
        ))
    }
}

/// Full market pass for one asset: order the series, compute indicators,
/// classify trend strength.
#[derive(Debug, Clone, Default)]
pub struct MarketAnalysisEngine {
    indicators: IndicatorEngine,
    classifier: TrendClassifier,
}

impl MarketAnalysisEngine {
    pub fn new(indicators: IndicatorConfig, trend: TrendThresholds) -> Self {
        Self {
            indicators: IndicatorEngine::new(indicators),
            classifier: TrendClassifier::new(trend),
        }
    }

    pub fn analyze(&self, series: &[PricePoint]) -> Result<MarketAnalysis, AnalysisError> {
        let mut ordered = series.to_vec();
        ordered.sort_by_key(|p| p.timestamp);
        if let Some(pair) = ordered.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(AnalysisError::InvalidData(format!(
                "duplicate price timestamp {}",
                pair[0].timestamp
            )));
        }

        let closes = validate(&ordered)?;
        let snapshot = self.indicators.snapshot(&closes)?;
        let trend_strength = self.classifier.classify(&snapshot);
        tracing::debug!(
            "Market analysis over {} samples: {:?}",
            closes.len(),
            trend_strength
        );

        Ok(MarketAnalysis {
            current_price: closes[closes.len() - 1],
            snapshot,
            trend_strength,
        })
    }

    /// Like [`analyze`](Self::analyze), with failures folded into an error payload.
    pub fn report(&self, series: &[PricePoint]) -> Outcome<MarketAnalysis> {
        self.analyze(series).into()
    }
}
