use analysis_core::AnalysisError;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::allocation::{AllocationDistributor, AllocationEntry, CandidateTier};
use crate::candidates::{PrimaryRecommendation, SecondaryRecommendation};

const ALLOCATION_NOTES: &str = "Note: Total allocated percentage: 100%\n\
1. Suggested allocations represent target portfolio weights\n\
2. Adjust based on your risk tolerance and existing positions\n\
3. Rebalance when price targets or market conditions change";

/// Final weighted recommendation set: primary entries first, then secondary.
/// Weights across all entries sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub entries: Vec<AllocationEntry>,
}

impl RecommendationSet {
    /// Allocate across primary then secondary candidates in a single draw.
    pub fn build<R: Rng>(
        primary: Vec<PrimaryRecommendation>,
        secondary: Vec<SecondaryRecommendation>,
        distributor: &mut AllocationDistributor<R>,
    ) -> Result<Self, AnalysisError> {
        let candidates = primary
            .iter()
            .map(PrimaryRecommendation::to_candidate)
            .chain(secondary.iter().map(SecondaryRecommendation::to_candidate))
            .collect();
        let entries = distributor.distribute(candidates)?;
        Ok(Self { entries })
    }

    pub fn tier(&self, tier: CandidateTier) -> impl Iterator<Item = &AllocationEntry> {
        self.entries.iter().filter(move |e| e.tier == tier)
    }

    pub fn total_allocation(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    pub fn render(&self) -> String {
        let primary: Vec<String> = self
            .tier(CandidateTier::Primary)
            .map(|e| match &e.action {
                Some(action) => format!(
                    "{}: {} ({:.1}%) - {}",
                    e.candidate_id, action, e.weight, e.rationale
                ),
                None => format!("{}: {:.1}% - {}", e.candidate_id, e.weight, e.rationale),
            })
            .collect();
        let secondary: Vec<String> = self
            .tier(CandidateTier::Secondary)
            .map(|e| format!("{}: {:.1}% - {}", e.candidate_id, e.weight, e.rationale))
            .collect();

        format!(
            "Primary Recommendations:\n{}\n\nSecondary Recommendations:\n{}\n\n{}",
            primary.join("\n"),
            secondary.join("\n"),
            ALLOCATION_NOTES
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::{parse_recommendations, pick_secondary, TradeAction};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn primary() -> Vec<PrimaryRecommendation> {
        parse_recommendations(
            "BTC: Buy - Oversold bounce likely\nETH: Hold - Mixed signals\nSOL: Sell - Overbought",
        )
    }

    fn secondary() -> Vec<SecondaryRecommendation> {
        let pool: Vec<String> = ["Alpha", "Beta", "Gamma", "Delta"].iter().map(|s| s.to_string()).collect();
        let mut rng = StdRng::seed_from_u64(8);
        pick_secondary(&mut rng, &pool, 3).unwrap()
    }

    fn entry(id: &str, tier: CandidateTier, action: Option<TradeAction>, weight: f64, rationale: &str) -> AllocationEntry {
        AllocationEntry {
            candidate_id: id.to_string(),
            rationale: rationale.to_string(),
            tier,
            action,
            weight,
        }
    }

    #[test]
    fn test_build_produces_allocation_entries() {
        let mut distributor = AllocationDistributor::seeded(21);
        let set = RecommendationSet::build(primary(), secondary(), &mut distributor).unwrap();
        assert_eq!(set.entries.len(), 6);
        assert_eq!(set.tier(CandidateTier::Primary).count(), 3);
        assert_eq!(set.tier(CandidateTier::Secondary).count(), 3);
        assert_abs_diff_eq!(set.total_allocation(), 100.0, epsilon = 1e-6);

        assert_eq!(set.entries[0].candidate_id, "BTC");
        assert_eq!(set.entries[0].action, Some(TradeAction::Buy));
        assert_eq!(set.entries[2].action, Some(TradeAction::Sell));
        assert!(set.entries[3..].iter().all(|e| e.tier == CandidateTier::Secondary && e.action.is_none()));
    }

    #[test]
    fn test_build_matches_single_draw() {
        let set = RecommendationSet::build(primary(), secondary(), &mut AllocationDistributor::seeded(4)).unwrap();
        let weights = AllocationDistributor::seeded(4).sample_weights(6).unwrap();
        let allocated: Vec<f64> = set.entries.iter().map(|e| e.weight).collect();
        assert_eq!(allocated, weights);
    }

    #[test]
    fn test_build_without_candidates_fails() {
        let mut distributor = AllocationDistributor::seeded(1);
        assert!(RecommendationSet::build(vec![], vec![], &mut distributor).is_err());
    }

    #[test]
    fn test_entries_serialize_with_action_only_when_present() {
        let set = RecommendationSet {
            entries: vec![
                entry("BTC", CandidateTier::Primary, Some(TradeAction::Buy), 55.5, "Oversold"),
                entry("Alpha", CandidateTier::Secondary, None, 44.5, "features innovative tokenomics models"),
            ],
        };
        let doc = serde_json::to_value(&set).unwrap();
        assert_eq!(doc["entries"][0]["action"], "Buy");
        assert_eq!(doc["entries"][0]["tier"], "primary");
        assert!(doc["entries"][1].get("action").is_none());

        let back: RecommendationSet = serde_json::from_value(doc).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_render_layout() {
        let set = RecommendationSet {
            entries: vec![
                entry("BTC", CandidateTier::Primary, Some(TradeAction::Buy), 60.0, "Oversold"),
                entry("Alpha", CandidateTier::Secondary, None, 40.0, "features innovative tokenomics models"),
            ],
        };
        let text = set.render();
        assert!(text.starts_with("Primary Recommendations:\nBTC: Buy (60.0%) - Oversold\n"));
        assert!(text.contains("\nSecondary Recommendations:\nAlpha: 40.0% - features innovative tokenomics models\n"));
        assert!(text.contains("Note: Total allocated percentage: 100%"));
        assert!(text.ends_with("3. Rebalance when price targets or market conditions change"));
    }
}
