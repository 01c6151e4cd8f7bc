use analysis_core::{
    math, AnalysisError, ArticleRecord, KeyEvent, NewsSentiment, Outcome, PolarityScorer,
    SentimentCategory, SentimentThresholds, SourceSentiment,
};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::document::records_from_document;
use crate::scorer::LexiconScorer;

/// Scores each article's title and description and aggregates the results
/// into an overall summary, a per-source breakdown and a list of key events.
pub struct NewsSentimentAggregator<S = LexiconScorer> {
    scorer: S,
    thresholds: SentimentThresholds,
}

impl NewsSentimentAggregator<LexiconScorer> {
    pub fn new(thresholds: SentimentThresholds) -> Self {
        Self::with_scorer(LexiconScorer::new(), thresholds)
    }
}

impl Default for NewsSentimentAggregator<LexiconScorer> {
    fn default() -> Self {
        Self::new(SentimentThresholds::default())
    }
}

fn article_text(article: &ArticleRecord) -> Option<String> {
    let parts: Vec<&str> = [Some(article.title.as_str()), article.description.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(". "))
    }
}

impl<S: PolarityScorer> NewsSentimentAggregator<S> {
    pub fn with_scorer(scorer: S, thresholds: SentimentThresholds) -> Self {
        Self { scorer, thresholds }
    }

    pub fn analyze(&self, articles: &[ArticleRecord]) -> Result<NewsSentiment, AnalysisError> {
        if articles.is_empty() {
            return Err(AnalysisError::EmptyInput("Invalid news data".to_string()));
        }

        let mut scores: Vec<f64> = Vec::with_capacity(articles.len());
        let mut by_source: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut key_events = Vec::new();
        let (mut bullish, mut bearish, mut neutral) = (0, 0, 0);

        for article in articles {
            let Some(text) = article_text(article) else {
                tracing::debug!("Skipping article with blank text from {}", article.source);
                continue;
            };

            let score = self.scorer.polarity(&text);
            if !score.is_finite() {
                return Err(AnalysisError::CalculationError(format!(
                    "non-finite polarity for article '{}'",
                    article.title
                )));
            }
            scores.push(score);
            by_source.entry(article.source.clone()).or_default().push(score);

            let category = self.thresholds.categorize(score);
            match category {
                SentimentCategory::Bullish => bullish += 1,
                SentimentCategory::Bearish => bearish += 1,
                SentimentCategory::Neutral => neutral += 1,
            }

            if score.abs() >= self.thresholds.key_event_magnitude {
                key_events.push(KeyEvent {
                    title: article.title.clone(),
                    source: article.source.clone(),
                    sentiment: category,
                    confidence: score.abs() * 100.0,
                });
            }
        }

        if scores.is_empty() {
            return Err(AnalysisError::EmptyInput(
                "No valid news items to analyze".to_string(),
            ));
        }

        let mean_score = math::mean(&scores);
        let source_analysis = by_source
            .into_iter()
            .map(|(source, source_scores)| {
                let source_mean = math::mean(&source_scores);
                let summary = SourceSentiment {
                    summary: self.thresholds.summarize(source_mean),
                    article_count: source_scores.len(),
                    mean_score: source_mean,
                };
                (source, summary)
            })
            .collect();

        tracing::debug!(
            "News sentiment over {} articles: mean {:.3}, {} key events",
            scores.len(),
            mean_score,
            key_events.len()
        );

        Ok(NewsSentiment {
            summary: self.thresholds.summarize(mean_score),
            mean_score,
            article_count: scores.len(),
            bullish_articles: bullish,
            bearish_articles: bearish,
            neutral_articles: neutral,
            key_events,
            source_analysis,
        })
    }

    /// Like [`analyze`](Self::analyze), with failures folded into an error payload.
    pub fn report(&self, articles: &[ArticleRecord]) -> Outcome<NewsSentiment> {
        self.analyze(articles).into()
    }

    /// Entry point for loosely-typed documents from the news fetcher.
    ///
    /// Anything other than a JSON array is rejected; array elements that do
    /// not parse as articles are skipped.
    pub fn analyze_document(&self, document: &Value) -> Outcome<NewsSentiment> {
        match records_from_document::<ArticleRecord>(
            document,
            "Invalid news data",
            "No valid news items to analyze",
        ) {
            Ok(articles) => self.report(&articles),
            Err(e) => Err::<NewsSentiment, _>(e).into(),
        }
    }
}
