//! Threshold configuration for the analysis engines.
//!
//! Defaults reproduce the reference constants (RSI 30/70, sentiment +/-0.1,
//! confidence 70, ...). Loading overrides from the environment is the
//! orchestrator's job.

use serde::{Deserialize, Serialize};

use crate::math::{round_to, RSI_DISPLAY_DECIMALS};
use crate::{AnalysisError, SentimentCategory, SentimentSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_window: usize,
    pub sma_windows: Vec<usize>,
    pub ema_windows: Vec<usize>,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_window: 14,
            sma_windows: vec![3, 5],
            ema_windows: vec![5, 10],
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendThresholds {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub fast_ema_window: usize,
    pub slow_ema_window: usize,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            fast_ema_window: 5,
            slow_ema_window: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentThresholds {
    /// Polarity above this is bullish
    pub bullish_above: f64,
    /// Polarity below this is bearish
    pub bearish_below: f64,
    /// Minimum |polarity| for an article to be reported as a key event
    pub key_event_magnitude: f64,
    pub upvotes_per_weight_unit: f64,
    pub comments_per_weight_unit: f64,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            bullish_above: 0.1,
            bearish_below: -0.1,
            key_event_magnitude: 0.3,
            upvotes_per_weight_unit: 100.0,
            comments_per_weight_unit: 10.0,
        }
    }
}

impl SentimentThresholds {
    pub fn categorize(&self, score: f64) -> SentimentCategory {
        if score > self.bullish_above {
            SentimentCategory::Bullish
        } else if score < self.bearish_below {
            SentimentCategory::Bearish
        } else {
            SentimentCategory::Neutral
        }
    }

    /// Category plus confidence `|score| * 100`, rounded to 2 decimals.
    pub fn summarize(&self, score: f64) -> SentimentSummary {
        SentimentSummary {
            category: self.categorize(score),
            confidence: round_to(score.abs() * 100.0, RSI_DISPLAY_DECIMALS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightThresholds {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Absolute percent change treated as a significant move
    pub significant_move_pct: f64,
    pub high_confidence: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            significant_move_pct: 10.0,
            high_confidence: 70.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Fixed seed for reproducible allocations; entropy-seeded when absent
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub trend: TrendThresholds,
    #[serde(default)]
    pub sentiment: SentimentThresholds,
    #[serde(default)]
    pub insights: InsightThresholds,
    #[serde(default)]
    pub allocation: AllocationConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let ind = &self.indicators;
        if ind.rsi_window == 0
            || ind.macd_fast == 0
            || ind.macd_signal == 0
            || ind.sma_windows.contains(&0)
            || ind.ema_windows.contains(&0)
        {
            return Err(AnalysisError::Configuration(
                "indicator windows must be positive".to_string(),
            ));
        }
        if ind.macd_fast >= ind.macd_slow {
            return Err(AnalysisError::Configuration(format!(
                "MACD fast window ({}) must be shorter than slow window ({})",
                ind.macd_fast, ind.macd_slow
            )));
        }
        if self.trend.rsi_oversold >= self.trend.rsi_overbought
            || self.insights.rsi_oversold >= self.insights.rsi_overbought
        {
            return Err(AnalysisError::Configuration(
                "RSI oversold threshold must be below overbought threshold".to_string(),
            ));
        }
        if self.trend.fast_ema_window >= self.trend.slow_ema_window {
            return Err(AnalysisError::Configuration(
                "fast EMA window must be shorter than slow EMA window".to_string(),
            ));
        }
        if self.sentiment.bearish_below > self.sentiment.bullish_above {
            return Err(AnalysisError::Configuration(
                "bearish threshold must not exceed bullish threshold".to_string(),
            ));
        }
        if self.sentiment.upvotes_per_weight_unit <= 0.0
            || self.sentiment.comments_per_weight_unit <= 0.0
        {
            return Err(AnalysisError::Configuration(
                "engagement divisors must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
