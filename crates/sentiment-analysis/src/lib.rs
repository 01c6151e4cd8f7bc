mod document;
pub mod news;
pub mod scorer;
pub mod social;

pub use news::NewsSentimentAggregator;
pub use scorer::LexiconScorer;
pub use social::SocialSentimentAggregator;
