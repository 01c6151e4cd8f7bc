use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::math::{
    deserialize_null_as_empty, deserialize_window_map, serialize_opt_rounded_2,
    serialize_rounded_2, serialize_rounded_4, serialize_window_map,
};

/// One closing-price sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// News article as delivered by the external news fetcher.
///
/// News APIs send `null` for missing titles and sources; those read as an
/// empty title and an `"Unknown"` source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(default = "unknown_source", deserialize_with = "source_or_unknown")]
    pub source: String,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub url: String,
}

fn unknown_source() -> String {
    "Unknown".to_string()
}

fn source_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(unknown_source))
}

/// Social post (e.g. a Reddit submission) as delivered by the external fetcher.
///
/// Engagement counts are signed because some platforms report net scores
/// below zero; the social aggregator clamps them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub title: String,
    #[serde(default, alias = "content", deserialize_with = "deserialize_null_as_empty")]
    pub body: String,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Direction of the last two closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "up"),
            TrendDirection::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    #[serde(serialize_with = "serialize_rounded_4")]
    pub macd: f64,
    #[serde(serialize_with = "serialize_rounded_4")]
    pub signal: f64,
}

impl MacdReading {
    pub fn histogram(&self) -> f64 {
        self.macd - self.signal
    }
}

/// Latest indicator readings for one price series.
///
/// Values are held at full precision; serialization rounds RSI to 2 and
/// moving averages to 4 decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    #[serde(serialize_with = "serialize_opt_rounded_2")]
    pub rsi: Option<f64>,
    #[serde(
        serialize_with = "serialize_window_map",
        deserialize_with = "deserialize_window_map"
    )]
    pub sma: BTreeMap<usize, Option<f64>>,
    #[serde(
        serialize_with = "serialize_window_map",
        deserialize_with = "deserialize_window_map"
    )]
    pub ema: BTreeMap<usize, Option<f64>>,
    pub macd: Option<MacdReading>,
    #[serde(serialize_with = "serialize_rounded_2")]
    pub price_change_pct: f64,
    pub recent_trend: TrendDirection,
}

impl IndicatorSnapshot {
    pub fn sma(&self, window: usize) -> Option<f64> {
        self.sma.get(&window).copied().flatten()
    }

    pub fn ema(&self, window: usize) -> Option<f64> {
        self.ema.get(&window).copied().flatten()
    }

    /// Percent change formatted the way it is transported, e.g. `"-12.40%"`.
    pub fn price_change_display(&self) -> String {
        format!("{:.2}%", self.price_change_pct)
    }
}

/// Qualitative trend-strength label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TrendLabel {
    Overbought,
    Oversold,
    BullishMacdCrossover,
    BearishMacdCrossover,
    BullishEmaCrossover,
    BearishEmaCrossover,
    NoStrongTrend,
}

impl TrendLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::Overbought => "Overbought (RSI >70)",
            TrendLabel::Oversold => "Oversold (RSI <30)",
            TrendLabel::BullishMacdCrossover => "Bullish MACD crossover",
            TrendLabel::BearishMacdCrossover => "Bearish MACD crossover",
            TrendLabel::BullishEmaCrossover => "Bullish EMA crossover (5>10)",
            TrendLabel::BearishEmaCrossover => "Bearish EMA crossover (5<10)",
            TrendLabel::NoStrongTrend => "No strong trend indicators",
        }
    }

    const ALL: [TrendLabel; 7] = [
        TrendLabel::Overbought,
        TrendLabel::Oversold,
        TrendLabel::BullishMacdCrossover,
        TrendLabel::BearishMacdCrossover,
        TrendLabel::BullishEmaCrossover,
        TrendLabel::BearishEmaCrossover,
        TrendLabel::NoStrongTrend,
    ];
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrendLabel::ALL
            .iter()
            .find(|label| label.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown trend label: {}", s))
    }
}

impl From<TrendLabel> for String {
    fn from(label: TrendLabel) -> Self {
        label.as_str().to_string()
    }
}

impl TryFrom<String> for TrendLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Indicator snapshot plus the trend labels derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub current_price: f64,
    #[serde(flatten)]
    pub snapshot: IndicatorSnapshot,
    pub trend_strength: Vec<TrendLabel>,
}

impl MarketAnalysis {
    pub fn has_label(&self, label: TrendLabel) -> bool {
        self.trend_strength.contains(&label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentCategory {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentCategory::Bullish => write!(f, "bullish"),
            SentimentCategory::Bearish => write!(f, "bearish"),
            SentimentCategory::Neutral => write!(f, "neutral"),
        }
    }
}

/// Category plus confidence (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    #[serde(rename = "sentiment")]
    pub category: SentimentCategory,
    #[serde(serialize_with = "serialize_rounded_2")]
    pub confidence: f64,
}

/// Article whose polarity magnitude crossed the key-event threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub title: String,
    pub source: String,
    pub sentiment: SentimentCategory,
    #[serde(serialize_with = "serialize_rounded_2")]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSentiment {
    #[serde(flatten)]
    pub summary: SentimentSummary,
    pub article_count: usize,
    pub mean_score: f64,
}

/// Aggregated sentiment over a batch of news articles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSentiment {
    #[serde(flatten)]
    pub summary: SentimentSummary,
    pub mean_score: f64,
    pub article_count: usize,
    pub bullish_articles: usize,
    pub bearish_articles: usize,
    pub neutral_articles: usize,
    pub key_events: Vec<KeyEvent>,
    pub source_analysis: BTreeMap<String, SourceSentiment>,
}

/// Engagement-weighted sentiment over a batch of social posts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialSentiment {
    #[serde(flatten)]
    pub summary: SentimentSummary,
    pub weighted_score: f64,
    pub unweighted_score: f64,
    pub post_count: usize,
    pub average_upvotes: f64,
    pub average_comments: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trend_label_round_trips_through_display_text() {
        for label in TrendLabel::ALL {
            let text = serde_json::to_value(label).unwrap();
            assert_eq!(text, json!(label.as_str()));
            let back: TrendLabel = serde_json::from_value(text).unwrap();
            assert_eq!(back, label);
        }
        assert!("Sideways".parse::<TrendLabel>().is_err());
    }

    #[test]
    fn test_snapshot_serializes_rounded_values() {
        let mut sma = BTreeMap::new();
        sma.insert(3, Some(101.123_456));
        sma.insert(50, None);
        let snapshot = IndicatorSnapshot {
            rsi: Some(71.236_9),
            sma,
            ema: BTreeMap::new(),
            macd: Some(MacdReading { macd: 0.123_456, signal: -0.000_04 }),
            price_change_pct: 9.999_9,
            recent_trend: TrendDirection::Up,
        };

        let doc = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(doc["rsi"], json!(71.24));
        assert_eq!(doc["sma"]["3"], json!(101.1235));
        assert_eq!(doc["sma"]["50"], json!(null));
        assert_eq!(doc["macd"]["macd"], json!(0.1235));
        assert_eq!(doc["price_change_pct"], json!(10.0));
        assert_eq!(doc["recent_trend"], json!("up"));

        // in-memory values keep full precision
        assert_eq!(snapshot.rsi, Some(71.236_9));
        assert_eq!(snapshot.price_change_display(), "10.00%");
    }

    #[test]
    fn test_article_defaults() {
        let article: ArticleRecord = serde_json::from_value(json!({"title": "BTC rallies"})).unwrap();
        assert_eq!(article.source, "Unknown");
        assert!(article.description.is_none());
    }

    #[test]
    fn test_article_null_fields() {
        let article: ArticleRecord = serde_json::from_value(json!({
            "source": null,
            "title": null,
            "description": "Body text",
            "url": null
        }))
        .unwrap();
        assert_eq!(article.source, "Unknown");
        assert_eq!(article.title, "");
        assert_eq!(article.description.as_deref(), Some("Body text"));
    }

    #[test]
    fn test_market_analysis_reads_back_its_document() {
        let mut sma = BTreeMap::new();
        sma.insert(3, Some(101.5));
        sma.insert(5, None);
        let mut ema = BTreeMap::new();
        ema.insert(5, Some(102.25));
        ema.insert(10, Some(101.75));
        let analysis = MarketAnalysis {
            current_price: 103.0,
            snapshot: IndicatorSnapshot {
                rsi: Some(64.5),
                sma,
                ema,
                macd: Some(MacdReading { macd: 0.5, signal: 0.25 }),
                price_change_pct: 3.0,
                recent_trend: TrendDirection::Up,
            },
            trend_strength: vec![TrendLabel::BullishMacdCrossover, TrendLabel::BullishEmaCrossover],
        };

        let doc = serde_json::to_value(&analysis).unwrap();
        assert_eq!(doc["sma"]["3"], json!(101.5));
        assert_eq!(doc["current_price"], json!(103.0));

        let back: MarketAnalysis = serde_json::from_value(doc).unwrap();
        assert_eq!(back, analysis);
    }

    #[test]
    fn test_post_accepts_content_alias() {
        let post: PostRecord =
            serde_json::from_value(json!({"title": "t", "content": "body", "upvotes": -3}))
                .unwrap();
        assert_eq!(post.body, "body");
        assert_eq!(post.upvotes, -3);
        assert_eq!(post.comments, 0);
    }
}
