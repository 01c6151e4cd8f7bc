use analysis_core::{InsightThresholds, MarketAnalysis, SentimentCategory, SentimentSummary, TrendLabel};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete, human-readable insight about one asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum InsightTag {
    OversoldMarket,
    OverboughtMarket,
    SignificantPriceDrop,
    SignificantPriceIncrease,
    BullishMacdMomentum,
    PositiveSentiment,
    NegativeSentiment,
    HighSentimentConfidence,
}

impl InsightTag {
    const ALL: [InsightTag; 8] = [
        InsightTag::OversoldMarket,
        InsightTag::OverboughtMarket,
        InsightTag::SignificantPriceDrop,
        InsightTag::SignificantPriceIncrease,
        InsightTag::BullishMacdMomentum,
        InsightTag::PositiveSentiment,
        InsightTag::NegativeSentiment,
        InsightTag::HighSentimentConfidence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightTag::OversoldMarket => "Oversold market conditions (RSI < 30)",
            InsightTag::OverboughtMarket => "Overbought market conditions (RSI > 70)",
            InsightTag::SignificantPriceDrop => "Significant price drop in recent period",
            InsightTag::SignificantPriceIncrease => "Significant price increase in recent period",
            InsightTag::BullishMacdMomentum => "Bullish momentum indicated by MACD crossover",
            InsightTag::PositiveSentiment => "Positive market sentiment detected",
            InsightTag::NegativeSentiment => "Negative market sentiment detected",
            InsightTag::HighSentimentConfidence => "High confidence in sentiment analysis",
        }
    }
}

impl fmt::Display for InsightTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<InsightTag> for String {
    fn from(tag: InsightTag) -> Self {
        tag.as_str().to_string()
    }
}

impl TryFrom<String> for InsightTag {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        InsightTag::ALL
            .iter()
            .find(|tag| tag.as_str() == value)
            .copied()
            .ok_or_else(|| format!("unknown insight: {}", value))
    }
}

/// Threshold rules turning one market record and one sentiment record into
/// an ordered list of insights. Every rule is independent; any subset,
/// including none, may fire.
#[derive(Debug, Clone, Default)]
pub struct InsightRuleEngine {
    thresholds: InsightThresholds,
}

impl InsightRuleEngine {
    pub fn new(thresholds: InsightThresholds) -> Self {
        Self { thresholds }
    }

    pub fn generate(&self, market: &MarketAnalysis, sentiment: &SentimentSummary) -> Vec<InsightTag> {
        let mut insights = self.market_insights(market);
        insights.extend(self.sentiment_insights(sentiment));
        insights
    }

    /// RSI, price-move and MACD rules
    pub fn market_insights(&self, market: &MarketAnalysis) -> Vec<InsightTag> {
        let mut insights = Vec::new();

        if let Some(rsi) = market.snapshot.rsi {
            if rsi < self.thresholds.rsi_oversold {
                insights.push(InsightTag::OversoldMarket);
            } else if rsi > self.thresholds.rsi_overbought {
                insights.push(InsightTag::OverboughtMarket);
            }
        }

        let change = market.snapshot.price_change_pct;
        if change < -self.thresholds.significant_move_pct {
            insights.push(InsightTag::SignificantPriceDrop);
        } else if change > self.thresholds.significant_move_pct {
            insights.push(InsightTag::SignificantPriceIncrease);
        }

        if market.has_label(TrendLabel::BullishMacdCrossover) {
            insights.push(InsightTag::BullishMacdMomentum);
        }

        insights
    }

    /// Direction and confidence rules
    pub fn sentiment_insights(&self, sentiment: &SentimentSummary) -> Vec<InsightTag> {
        let mut insights = Vec::new();

        match sentiment.category {
            SentimentCategory::Bullish => insights.push(InsightTag::PositiveSentiment),
            SentimentCategory::Bearish => insights.push(InsightTag::NegativeSentiment),
            SentimentCategory::Neutral => {}
        }

        if sentiment.confidence > self.thresholds.high_confidence {
            insights.push(InsightTag::HighSentimentConfidence);
        }

        insights
    }
}
