use analysis_core::{
    AnalysisError, EngineConfig, MarketAnalysis, NewsSentiment, Outcome, PricePoint,
    SocialSentiment,
};
use rayon::prelude::*;
use recommendation_engine::{
    parse_recommendations, pick_secondary, AllocationDistributor, InsightRuleEngine, InsightTag,
    RecommendationSet,
};
use sentiment_analysis::{NewsSentimentAggregator, SocialSentimentAggregator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use technical_analysis::MarketAnalysisEngine;

pub mod config;
pub use config::load_config;

fn default_secondary_count() -> usize {
    3
}

/// Raw inputs for one asset, as handed over by the data fetchers.
///
/// Collections are kept as raw JSON and validated per component, so a
/// malformed asset fails on its own instead of rejecting the whole batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetInputs {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub prices: Value,
    #[serde(default)]
    pub articles: Value,
    #[serde(default)]
    pub posts: Value,
}

/// Everything computed for one asset in one pass. Each component carries its
/// own error payload, so a failure in one does not hide the others.
#[derive(Debug, Clone, Serialize)]
pub struct AssetAnalysis {
    pub symbol: String,
    pub market: Outcome<MarketAnalysis>,
    pub news: Outcome<NewsSentiment>,
    pub social: Outcome<SocialSentiment>,
    pub insights: Vec<InsightTag>,
}

impl AssetAnalysis {
    pub fn is_complete(&self) -> bool {
        self.market.is_ready() && self.news.is_ready() && self.social.is_ready()
    }

    /// Plain-text digest of the asset, used as input to recommendation prompting
    pub fn summary(&self) -> String {
        let market = self.market.ready();
        let news = self.news.ready();
        let social = self.social.ready();

        let price_change = market
            .map(|m| m.snapshot.price_change_display())
            .unwrap_or_else(|| "N/A".to_string());
        let rsi = market
            .and_then(|m| m.snapshot.rsi)
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| "N/A".to_string());
        let macd_histogram = market
            .and_then(|m| m.snapshot.macd.as_ref())
            .map(|r| format!("{:.4}", r.histogram()))
            .unwrap_or_else(|| "N/A".to_string());
        let trend = market
            .map(|m| m.snapshot.recent_trend.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let sentiment = news
            .map(|n| format!("{} (Confidence: {:.2}%)", n.summary.category, n.summary.confidence))
            .unwrap_or_else(|| "N/A".to_string());
        let insights: Vec<&str> = self.insights.iter().map(|i| i.as_str()).collect();
        let social_score = social
            .map(|s| format!("{:.3}", s.weighted_score))
            .unwrap_or_else(|| "N/A".to_string());
        let post_count = social.map(|s| s.post_count).unwrap_or(0);

        format!(
            "Asset: {}\n\
             Price Change: {}\n\
             RSI: {}\n\
             MACD Histogram: {}\n\
             Trend: {}\n\
             Sentiment: {}\n\
             Insights: {}\n\
             Social Score: {}\n\
             Posts Analyzed: {}\n",
            self.symbol,
            price_change,
            rsi,
            macd_histogram,
            trend,
            sentiment,
            insights.join(", "),
            social_score,
            post_count
        )
    }
}

/// A batch document: the assets to analyze plus, optionally, upstream
/// recommendation text and a pool of secondary candidates to allocate across.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    pub assets: Vec<AssetInputs>,
    #[serde(default)]
    pub recommendations: Option<String>,
    #[serde(default)]
    pub secondary_pool: Vec<String>,
    #[serde(default = "default_secondary_count")]
    pub secondary_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub assets: Vec<AssetAnalysis>,
    pub summaries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<Outcome<RecommendationSet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
}

/// Runs the market, news and social passes for each asset and derives insights.
pub struct AnalysisOrchestrator {
    config: EngineConfig,
    market: MarketAnalysisEngine,
    news: NewsSentimentAggregator,
    social: SocialSentimentAggregator,
    insights: InsightRuleEngine,
}

impl AnalysisOrchestrator {
    pub fn new(config: EngineConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            market: MarketAnalysisEngine::new(config.indicators.clone(), config.trend.clone()),
            news: NewsSentimentAggregator::new(config.sentiment.clone()),
            social: SocialSentimentAggregator::new(config.sentiment.clone()),
            insights: InsightRuleEngine::new(config.insights.clone()),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyze_asset(&self, inputs: &AssetInputs) -> AssetAnalysis {
        let market = self.market_outcome(&inputs.prices);
        let news = self.news.analyze_document(&inputs.articles);
        let social = self.social.analyze_document(&inputs.posts);

        for (component, error) in [
            ("market", market.error()),
            ("news", news.error()),
            ("social", social.error()),
        ] {
            if let Some(payload) = error {
                tracing::warn!("{} analysis failed for {}: {}", component, inputs.symbol, payload.error);
            }
        }

        let insights = match (market.ready(), news.ready()) {
            (Some(m), Some(n)) => self.insights.generate(m, &n.summary),
            (Some(m), None) => self.insights.market_insights(m),
            (None, Some(n)) => self.insights.sentiment_insights(&n.summary),
            (None, None) => Vec::new(),
        };

        AssetAnalysis {
            symbol: inputs.symbol.clone(),
            market,
            news,
            social,
            insights,
        }
    }

    fn market_outcome(&self, prices: &Value) -> Outcome<MarketAnalysis> {
        match Vec::<PricePoint>::deserialize(prices) {
            Ok(series) => self.market.report(&series),
            Err(e) => {
                let error = AnalysisError::InvalidData(format!("Invalid price data: {}", e));
                Err::<MarketAnalysis, _>(error).into()
            }
        }
    }

    /// Analyze every asset in parallel. Output order matches input order.
    pub fn analyze_batch(&self, assets: &[AssetInputs]) -> Vec<AssetAnalysis> {
        tracing::info!("Starting analysis batch of {} assets", assets.len());

        let results: Vec<AssetAnalysis> = assets
            .par_iter()
            .map(|inputs| self.analyze_asset(inputs))
            .collect();

        let complete = results.iter().filter(|r| r.is_complete()).count();
        tracing::info!(
            "Finished analysis batch: {}/{} assets fully analyzed",
            complete,
            results.len()
        );
        results
    }

    /// Analyze the batch and, when recommendation text is supplied, build and
    /// render the weighted recommendation set.
    pub fn run(&self, request: &BatchRequest) -> BatchReport {
        let assets = self.analyze_batch(&request.assets);
        let summaries = assets.iter().map(AssetAnalysis::summary).collect();

        let allocation = request
            .recommendations
            .as_deref()
            .map(|text| Outcome::from(self.allocate(text, &request.secondary_pool, request.secondary_count)));
        let rendered = allocation
            .as_ref()
            .and_then(|outcome| outcome.ready())
            .map(RecommendationSet::render);

        BatchReport {
            assets,
            summaries,
            allocation,
            rendered,
        }
    }

    fn allocate(
        &self,
        text: &str,
        pool: &[String],
        secondary_count: usize,
    ) -> Result<RecommendationSet, AnalysisError> {
        let primary = parse_recommendations(text);
        if primary.is_empty() {
            return Err(AnalysisError::EmptyInput(
                "no recommendation lines found".to_string(),
            ));
        }

        let mut distributor = AllocationDistributor::from_config(&self.config.allocation);
        let count = secondary_count.min(pool.len());
        let secondary = pick_secondary(distributor.rng_mut(), pool, count)?;
        tracing::info!(
            "Allocating across {} primary and {} secondary candidates",
            primary.len(),
            secondary.len()
        );
        RecommendationSet::build(primary, secondary, &mut distributor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::ErrorKind;
    use chrono::{Duration, TimeZone, Utc};
    use recommendation_engine::{CandidateTier, TradeAction};
    use serde_json::json;

    fn prices(closes: &[f64]) -> Value {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let series: Vec<PricePoint> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                timestamp: start + Duration::days(i as i64),
                close,
            })
            .collect();
        serde_json::to_value(series).unwrap()
    }

    fn healthy_asset(symbol: &str) -> AssetInputs {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        AssetInputs {
            symbol: symbol.to_string(),
            prices: prices(&closes),
            articles: json!([{
                "source": "CoinDesk",
                "title": "Bitcoin surges to record high in breakout rally"
            }]),
            posts: json!([{
                "title": "Bullish breakout, this will surge",
                "upvotes": 120,
                "comments": 3
            }]),
        }
    }

    fn orchestrator() -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.indicators.macd_fast = 30;
        assert!(matches!(
            AnalysisOrchestrator::new(config),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn test_healthy_asset() {
        let result = orchestrator().analyze_asset(&healthy_asset("BTC"));
        assert!(result.is_complete());

        let market = result.market.ready().unwrap();
        assert_eq!(market.current_price, 139.0);
        // strictly rising closes: RSI 100, large positive move
        assert!(result.insights.contains(&InsightTag::OverboughtMarket));
        assert!(result.insights.contains(&InsightTag::SignificantPriceIncrease));
    }

    #[test]
    fn test_component_failures_are_isolated() {
        let inputs = AssetInputs {
            symbol: "ETH".to_string(),
            prices: prices(&[100.0]),
            articles: json!([]),
            posts: json!([{"title": "Quiet day", "upvotes": 1, "comments": 3}]),
        };
        let result = orchestrator().analyze_asset(&inputs);

        assert_eq!(result.market.error().map(|e| e.kind), Some(ErrorKind::InvalidData));
        assert_eq!(result.news.error().map(|e| e.kind), Some(ErrorKind::EmptyInput));
        assert!(result.social.is_ready());
        assert!(result.insights.is_empty());
        assert!(!result.is_complete());

        let doc = serde_json::to_value(&result).unwrap();
        assert_eq!(doc["symbol"], "ETH");
        assert_eq!(doc["news"]["kind"], "empty_input");
        assert!(doc["social"]["weighted_score"].is_number());
    }

    #[test]
    fn test_batch_keeps_order_and_continues_past_failures() {
        let broken = AssetInputs {
            symbol: "BAD".to_string(),
            ..Default::default()
        };
        let assets = vec![healthy_asset("BTC"), broken, healthy_asset("SOL")];
        let results = orchestrator().analyze_batch(&assets);

        let symbols: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC", "BAD", "SOL"]);
        assert!(results[0].is_complete());
        assert!(!results[1].market.is_ready());
        assert!(results[2].is_complete());
    }

    #[test]
    fn test_malformed_assets_do_not_reject_the_batch() {
        let healthy = serde_json::to_value(healthy_asset("BTC")).unwrap();
        let doc = json!({
            "assets": [
                healthy,
                {
                    "symbol": "DOGE",
                    "prices": "not a series",
                    "articles": [{"source": null, "title": null, "description": "Dogecoin rallies"}],
                    "posts": [{"title": null, "content": "to the moon", "upvotes": 10}]
                },
                {
                    "symbol": "XRP",
                    "articles": {"not": "a list"},
                    "posts": [{"title": 42}]
                }
            ]
        });
        let request: BatchRequest = serde_json::from_value(doc).unwrap();
        let report = orchestrator().run(&request);
        assert_eq!(report.assets.len(), 3);
        assert!(report.assets[0].is_complete());

        let doge = &report.assets[1];
        let market_error = doge.market.error().unwrap();
        assert_eq!(market_error.kind, ErrorKind::InvalidData);
        assert!(market_error.error.starts_with("Invalid data: Invalid price data"));
        assert_eq!(doge.news.ready().unwrap().article_count, 1);
        assert_eq!(doge.social.ready().unwrap().post_count, 1);

        let xrp = &report.assets[2];
        let news_error = xrp.news.error().unwrap();
        assert_eq!(news_error.kind, ErrorKind::EmptyInput);
        assert_eq!(news_error.error, "Empty input: Invalid news data");
        assert_eq!(
            xrp.social.error().map(|e| e.error.as_str()),
            Some("Empty input: No valid social posts to analyze")
        );

        let doc = serde_json::to_value(&report).unwrap();
        assert_eq!(doc["assets"][2]["news"]["kind"], "empty_input");
        assert_eq!(report.summaries.len(), 3);
    }

    #[test]
    fn test_summary_text() {
        let result = orchestrator().analyze_asset(&healthy_asset("BTC"));
        let histogram = result
            .market
            .ready()
            .and_then(|m| m.snapshot.macd)
            .map(|r| r.histogram())
            .unwrap();
        let summary = result.summary();
        assert!(summary.starts_with("Asset: BTC\n"));
        assert!(summary.contains("Price Change: 39.00%\n"));
        assert!(summary.contains("RSI: 100.00\n"));
        assert!(summary.contains(&format!("MACD Histogram: {:.4}\n", histogram)));
        assert!(summary.contains("Trend: up\n"));
        assert!(summary.ends_with("Posts Analyzed: 1\n"));
        assert_eq!(summary.lines().count(), 9);

        let failed = orchestrator().analyze_asset(&AssetInputs {
            symbol: "BAD".to_string(),
            ..Default::default()
        });
        let summary = failed.summary();
        assert!(summary.contains("RSI: N/A\n"));
        assert!(summary.contains("MACD Histogram: N/A\n"));
        assert!(summary.contains("Sentiment: N/A\n"));
        assert!(summary.contains("Posts Analyzed: 0\n"));
    }

    #[test]
    fn test_run_with_recommendations() {
        let mut config = EngineConfig::default();
        config.allocation.seed = Some(17);
        let orchestrator = AnalysisOrchestrator::new(config).unwrap();

        let request = BatchRequest {
            assets: vec![healthy_asset("BTC")],
            recommendations: Some(
                "BTC: Buy - Momentum\nETH: Hold - Range bound\nSOL: Sell - Overextended".to_string(),
            ),
            secondary_pool: ["Alpha", "Beta", "Gamma", "Delta"].iter().map(|s| s.to_string()).collect(),
            secondary_count: 3,
        };
        let report = orchestrator.run(&request);
        assert_eq!(report.summaries.len(), 1);

        let set = report.allocation.as_ref().and_then(|a| a.ready()).unwrap();
        assert_eq!(set.tier(CandidateTier::Primary).count(), 3);
        assert_eq!(set.tier(CandidateTier::Secondary).count(), 3);
        assert_eq!(set.entries[0].action, Some(TradeAction::Buy));
        assert!((set.total_allocation() - 100.0).abs() < 1e-6);
        assert!(report.rendered.as_deref().unwrap().contains("Note: Total allocated percentage: 100%"));

        // same seed, same allocation
        let again = orchestrator.run(&request);
        assert_eq!(
            again.allocation.as_ref().and_then(|a| a.ready()),
            Some(set)
        );
    }

    #[test]
    fn test_run_without_recommendation_lines() {
        let request = BatchRequest {
            assets: vec![],
            recommendations: Some("nothing useful here".to_string()),
            secondary_pool: vec![],
            secondary_count: 3,
        };
        let report = orchestrator().run(&request);
        let payload = report.allocation.as_ref().and_then(|a| a.error()).unwrap();
        assert_eq!(payload.kind, ErrorKind::EmptyInput);
        assert!(report.rendered.is_none());
    }

    #[test]
    fn test_batch_request_from_json() {
        let doc = json!({
            "assets": [{
                "symbol": "BTC",
                "prices": [
                    {"timestamp": "2024-03-02T00:00:00Z", "close": 101.0},
                    {"timestamp": "2024-03-01T00:00:00Z", "close": 100.0}
                ],
                "articles": [{"title": "Bitcoin steady", "publishedAt": "2024-03-01T00:00:00Z"}],
                "posts": [{"title": "gm", "content": "", "upvotes": 3, "comments": 0}]
            }]
        });
        let request: BatchRequest = serde_json::from_value(doc).unwrap();
        assert_eq!(request.secondary_count, 3);
        assert!(request.recommendations.is_none());

        let report = orchestrator().run(&request);
        assert!(report.allocation.is_none());
        let market = report.assets[0].market.ready().unwrap();
        assert_eq!(market.current_price, 101.0);
    }
}
