pub mod allocation;
pub mod candidates;
pub mod insights;
pub mod recommendation;

pub use allocation::{AllocationDistributor, AllocationEntry, Candidate, CandidateTier};
pub use candidates::{
    parse_recommendations, pick_secondary, PrimaryRecommendation, SecondaryRecommendation,
    TradeAction,
};
pub use insights::{InsightRuleEngine, InsightTag};
pub use recommendation::RecommendationSet;
