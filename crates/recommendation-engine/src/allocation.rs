use analysis_core::{AllocationConfig, AnalysisError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Exp1;
use serde::{Deserialize, Serialize};

use crate::candidates::TradeAction;

/// Weights are settled in integer tenths of a percent so the total is exact.
const TOTAL_TENTHS: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateTier {
    Primary,
    Secondary,
}

/// Something a share of the portfolio can be assigned to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub rationale: String,
    pub tier: CandidateTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<TradeAction>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, rationale: impl Into<String>, tier: CandidateTier) -> Self {
        Self {
            id: id.into(),
            rationale: rationale.into(),
            tier,
            action: None,
        }
    }

    pub fn with_action(mut self, action: TradeAction) -> Self {
        self.action = Some(action);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub candidate_id: String,
    pub rationale: String,
    pub tier: CandidateTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<TradeAction>,
    /// Percent of the portfolio, one decimal place, in [0, 100]
    pub weight: f64,
}

/// Draw a point uniformly from the probability simplex of dimension `n`
/// (Dirichlet with every concentration parameter equal to 1) by normalising
/// independent Exp(1) draws.
pub fn uniform_simplex<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<f64> {
    if n == 0 {
        return vec![];
    }
    let draws: Vec<f64> = (0..n).map(|_| rng.sample::<f64, _>(Exp1)).collect();
    let total: f64 = draws.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return vec![1.0 / n as f64; n];
    }
    draws.into_iter().map(|d| d / total).collect()
}

/// Fold the rounding residual into the last entry.
///
/// If the residual would drive the last entry below zero, the remainder is
/// taken from the preceding entries, last to first, none going below zero.
pub fn settle_residual(tenths: &mut [i64], total: i64) {
    let Some(last) = tenths.len().checked_sub(1) else {
        return;
    };
    let residual = total - tenths.iter().sum::<i64>();
    tenths[last] += residual;

    if tenths[last] < 0 {
        let mut deficit = -tenths[last];
        tenths[last] = 0;
        for value in tenths[..last].iter_mut().rev() {
            if deficit == 0 {
                break;
            }
            let take = deficit.min(*value);
            *value -= take;
            deficit -= take;
        }
    }
}

/// Splits 100% across candidates with a random, simplex-uniform draw.
///
/// The generator is injected so runs can be reproduced from a seed.
pub struct AllocationDistributor<R = StdRng> {
    rng: R,
}

impl AllocationDistributor<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn from_config(config: &AllocationConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> AllocationDistributor<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// The underlying generator, for drawing candidates from the same stream
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// `n` weights in percent, one decimal each, summing to exactly 100.0
    pub fn sample_weights(&mut self, n: usize) -> Result<Vec<f64>, AnalysisError> {
        if n == 0 {
            return Err(AnalysisError::EmptyInput(
                "no candidates to allocate".to_string(),
            ));
        }

        let shares = uniform_simplex(&mut self.rng, n);
        let mut tenths: Vec<i64> = shares
            .iter()
            .map(|s| (s * TOTAL_TENTHS as f64).round() as i64)
            .collect();
        settle_residual(&mut tenths, TOTAL_TENTHS);

        Ok(tenths.into_iter().map(|t| t as f64 / 10.0).collect())
    }

    pub fn distribute(&mut self, candidates: Vec<Candidate>) -> Result<Vec<AllocationEntry>, AnalysisError> {
        let weights = self.sample_weights(candidates.len())?;
        tracing::debug!("Allocated {} candidates: {:?}", candidates.len(), weights);

        Ok(candidates
            .into_iter()
            .zip(weights)
            .map(|(candidate, weight)| AllocationEntry {
                candidate_id: candidate.id,
                rationale: candidate.rationale,
                tier: candidate.tier,
                action: candidate.action,
                weight,
            })
            .collect())
    }
}
