/// Scores the polarity of a piece of text in [-1, 1]
/// (negative = bearish, positive = bullish).
///
/// Aggregators are generic over this so a model-backed scorer can replace
/// the lexicon scorer without touching aggregation.
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

impl<T: PolarityScorer + ?Sized> PolarityScorer for &T {
    fn polarity(&self, text: &str) -> f64 {
        (**self).polarity(text)
    }
}
