use analysis_core::AnalysisError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::allocation::{Candidate, CandidateTier};

const SECONDARY_RATIONALES: &[&str] = &[
    "shows strong ecosystem alignment with recent protocol upgrades",
    "demonstrates high community engagement and DAO participation",
    "exhibits promising TVL growth and transaction volume trends",
    "has strategic partnerships within its ecosystem",
    "features innovative tokenomics models",
    "shows consistent developer activity and GitHub commits",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
    /// Anything else the upstream text proposed, kept verbatim
    Other(String),
}

impl TradeAction {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.to_lowercase().as_str() {
            "buy" => TradeAction::Buy,
            "sell" => TradeAction::Sell,
            "hold" => TradeAction::Hold,
            _ => TradeAction::Other(text.to_string()),
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => f.write_str("Buy"),
            TradeAction::Sell => f.write_str("Sell"),
            TradeAction::Hold => f.write_str("Hold"),
            TradeAction::Other(s) => f.write_str(s),
        }
    }
}

impl From<TradeAction> for String {
    fn from(action: TradeAction) -> Self {
        action.to_string()
    }
}

impl From<String> for TradeAction {
    fn from(value: String) -> Self {
        TradeAction::parse(&value)
    }
}

/// One `SYMBOL: ACTION - RATIONALE` line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryRecommendation {
    pub symbol: String,
    pub action: TradeAction,
    pub rationale: String,
}

impl PrimaryRecommendation {
    pub fn to_candidate(&self) -> Candidate {
        Candidate::new(self.symbol.clone(), self.rationale.clone(), CandidateTier::Primary)
            .with_action(self.action.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryRecommendation {
    pub name: String,
    pub rationale: String,
}

impl SecondaryRecommendation {
    pub fn to_candidate(&self) -> Candidate {
        Candidate::new(self.name.clone(), self.rationale.clone(), CandidateTier::Secondary)
    }
}

/// Parse free-form recommendation text.
///
/// Only lines containing both `": "` and `" - "` are kept; the symbol is
/// everything before the first `": "` and the rationale everything after the
/// first `" - "` that follows it.
pub fn parse_recommendations(text: &str) -> Vec<PrimaryRecommendation> {
    text.lines()
        .filter_map(|line| {
            let (symbol, rest) = line.split_once(": ")?;
            let (action, rationale) = rest.split_once(" - ")?;
            let symbol = symbol.trim();
            if symbol.is_empty() {
                return None;
            }
            Some(PrimaryRecommendation {
                symbol: symbol.to_string(),
                action: TradeAction::parse(action),
                rationale: rationale.trim().to_string(),
            })
        })
        .collect()
}

/// Choose `k` distinct names from `pool`, each with a rationale from a fixed list.
pub fn pick_secondary<R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[String],
    k: usize,
) -> Result<Vec<SecondaryRecommendation>, AnalysisError> {
    if pool.len() < k {
        return Err(AnalysisError::EmptyInput(format!(
            "need {} secondary candidates, pool has {}",
            k,
            pool.len()
        )));
    }

    let names: Vec<String> = pool.choose_multiple(&mut *rng, k).cloned().collect();
    let picks = names
        .into_iter()
        .map(|name| {
            let rationale = SECONDARY_RATIONALES
                .choose(&mut *rng)
                .copied()
                .unwrap_or(SECONDARY_RATIONALES[0]);
            SecondaryRecommendation {
                name,
                rationale: rationale.to_string(),
            }
        })
        .collect();
    Ok(picks)
}
