use analysis_core::{
    math, AnalysisError, Outcome, PolarityScorer, PostRecord, SentimentThresholds,
    SocialSentiment,
};

use serde_json::Value;

use crate::document::records_from_document;
use crate::scorer::LexiconScorer;

/// Engagement-weighted sentiment over social posts.
///
/// Each post's polarity is weighted by `1 + upvotes / 100 + comments / 10`
/// (divisors configurable). Negative engagement counts are clamped to zero.
pub struct SocialSentimentAggregator<S = LexiconScorer> {
    scorer: S,
    thresholds: SentimentThresholds,
}

impl SocialSentimentAggregator<LexiconScorer> {
    pub fn new(thresholds: SentimentThresholds) -> Self {
        Self::with_scorer(LexiconScorer::new(), thresholds)
    }
}

impl Default for SocialSentimentAggregator<LexiconScorer> {
    fn default() -> Self {
        Self::new(SentimentThresholds::default())
    }
}

/// Upvote and comment counts with negatives clamped to zero
fn engagement(post: &PostRecord) -> (f64, f64) {
    (clamped(post.upvotes, "upvote"), clamped(post.comments, "comment"))
}

fn clamped(count: i64, what: &str) -> f64 {
    if count < 0 {
        tracing::debug!("Clamping negative {} count {} to zero", what, count);
        0.0
    } else {
        count as f64
    }
}

impl<S: PolarityScorer> SocialSentimentAggregator<S> {
    pub fn with_scorer(scorer: S, thresholds: SentimentThresholds) -> Self {
        Self { scorer, thresholds }
    }

    pub fn engagement_weight(&self, post: &PostRecord) -> f64 {
        let (upvotes, comments) = engagement(post);
        self.weight_for(upvotes, comments)
    }

    fn weight_for(&self, upvotes: f64, comments: f64) -> f64 {
        1.0 + upvotes / self.thresholds.upvotes_per_weight_unit
            + comments / self.thresholds.comments_per_weight_unit
    }

    pub fn analyze(&self, posts: &[PostRecord]) -> Result<SocialSentiment, AnalysisError> {
        if posts.is_empty() {
            return Err(AnalysisError::EmptyInput("No social posts found".to_string()));
        }

        let mut scores = Vec::with_capacity(posts.len());
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        let mut upvotes = 0.0;
        let mut comments = 0.0;

        for post in posts {
            let text = format!("{} {}", post.title, post.body);
            let score = self.scorer.polarity(&text);
            let (post_upvotes, post_comments) = engagement(post);
            let weight = self.weight_for(post_upvotes, post_comments);

            scores.push(score);
            weighted_sum += score * weight;
            weight_total += weight;
            upvotes += post_upvotes;
            comments += post_comments;
        }

        // every weight is >= 1, so weight_total >= posts.len()
        let weighted_score = weighted_sum / weight_total;
        let unweighted_score = math::mean(&scores);
        if !weighted_score.is_finite() || !unweighted_score.is_finite() {
            return Err(AnalysisError::CalculationError(
                "social sentiment produced a non-finite score".to_string(),
            ));
        }

        let post_count = posts.len();
        tracing::debug!(
            "Social sentiment over {} posts: weighted {:.3}, unweighted {:.3}",
            post_count,
            weighted_score,
            unweighted_score
        );

        Ok(SocialSentiment {
            summary: self.thresholds.summarize(weighted_score),
            weighted_score,
            unweighted_score,
            post_count,
            average_upvotes: upvotes / post_count as f64,
            average_comments: comments / post_count as f64,
        })
    }

    /// Like [`analyze`](Self::analyze), with failures folded into an error payload.
    pub fn report(&self, posts: &[PostRecord]) -> Outcome<SocialSentiment> {
        self.analyze(posts).into()
    }

    /// Entry point for loosely-typed documents from the social fetcher.
    /// Non-arrays are rejected and unparsable posts skipped.
    pub fn analyze_document(&self, document: &Value) -> Outcome<SocialSentiment> {
        match records_from_document::<PostRecord>(
            document,
            "Invalid social data",
            "No valid social posts to analyze",
        ) {
            Ok(posts) => self.report(&posts),
            Err(e) => Err::<SocialSentiment, _>(e).into(),
        }
    }
}
