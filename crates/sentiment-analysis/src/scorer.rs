use analysis_core::PolarityScorer;
use std::collections::{HashMap, HashSet};
use vader_sentiment::SentimentIntensityAnalyzer;

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't",
    "wasn't", "weren't", "won't", "wouldn't", "couldn't", "shouldn't", "hardly",
    "barely", "neither", "nor", "without",
];

const NEGATION_WINDOW: usize = 3;

/// Market terms VADER's general lexicon underrates, with their polarity weight.
const BULLISH_TERMS: &[(&str, f64)] = &[
    ("bullish", 0.5), ("surge", 0.4), ("surges", 0.4), ("surged", 0.4),
    ("rally", 0.4), ("rallies", 0.4), ("rallied", 0.4), ("soar", 0.5),
    ("soars", 0.5), ("soared", 0.5), ("skyrockets", 0.6), ("breakout", 0.3),
    ("rebound", 0.3), ("rebounds", 0.3), ("recovery", 0.2), ("upgrade", 0.3),
    ("upgraded", 0.3), ("outperform", 0.3), ("outperforms", 0.3), ("gains", 0.2),
    ("growth", 0.2), ("adoption", 0.2), ("partnership", 0.2), ("inflows", 0.2),
    ("accumulation", 0.2), ("buyback", 0.2), ("upside", 0.3), ("momentum", 0.2),
    ("optimistic", 0.3), ("moon", 0.4), ("mooning", 0.5), ("tailwind", 0.2),
];

const BEARISH_TERMS: &[(&str, f64)] = &[
    ("bearish", -0.5), ("crash", -0.5), ("crashes", -0.5), ("crashed", -0.5),
    ("plunge", -0.5), ("plunges", -0.5), ("plunged", -0.5), ("dump", -0.4),
    ("dumps", -0.4), ("collapse", -0.5), ("collapses", -0.5), ("selloff", -0.4),
    ("sell-off", -0.4), ("slump", -0.4), ("slumps", -0.4), ("decline", -0.3),
    ("declines", -0.3), ("downgrade", -0.3), ("downgraded", -0.3), ("lawsuit", -0.4),
    ("ban", -0.4), ("hack", -0.5), ("hacked", -0.5), ("exploit", -0.4),
    ("breach", -0.4), ("scam", -0.6), ("fraud", -0.5), ("bankruptcy", -0.6),
    ("liquidations", -0.3), ("outflows", -0.2), ("investigation", -0.3),
    ("probe", -0.3), ("panic", -0.4), ("headwind", -0.2), ("dilution", -0.3),
];

/// Multi-word phrases, matched on the lowercased text without negation handling.
const PHRASES: &[(&str, f64)] = &[
    ("record high", 0.4),
    ("all-time high", 0.5),
    ("bull run", 0.5),
    ("all-time low", -0.5),
    ("bear market", -0.4),
    ("rug pull", -0.6),
];

/// Share of the financial-term boost added to VADER's compound score
const BOOST_WEIGHT: f64 = 0.5;

/// Text polarity in [-1, 1]: VADER compound score plus a boost from
/// market-specific terms, with simple negation handling for those terms.
pub struct LexiconScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
    terms: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
}

impl LexiconScorer {
    pub fn new() -> Self {
        let terms = BULLISH_TERMS
            .iter()
            .chain(BEARISH_TERMS.iter())
            .copied()
            .collect();

        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
            terms,
            negations: NEGATION_WORDS.iter().copied().collect(),
        }
    }

    fn vader_compound(&self, text: &str) -> f64 {
        let scores = self.analyzer.polarity_scores(text);
        scores.get("compound").copied().unwrap_or(0.0)
    }

    /// Sum of financial-term weights; a term preceded by a negation word
    /// within `NEGATION_WINDOW` tokens counts with the opposite sign.
    fn financial_boost(&self, text: &str) -> f64 {
        let text_lower = text.to_lowercase();
        let words: Vec<&str> = text_lower
            .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
            .filter(|w| !w.is_empty())
            .collect();

        let negation_positions: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| self.negations.contains(**w))
            .map(|(i, _)| i)
            .collect();

        let mut boost = 0.0;
        for (i, word) in words.iter().enumerate() {
            let Some(&weight) = self.terms.get(*word) else {
                continue;
            };
            let negated = negation_positions
                .iter()
                .any(|&neg_pos| neg_pos < i && (i - neg_pos) <= NEGATION_WINDOW);
            boost += if negated { -weight } else { weight };
        }

        for (phrase, weight) in PHRASES {
            if text_lower.contains(phrase) {
                boost += weight;
            }
        }

        boost
    }

    pub fn score(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let combined = self.vader_compound(text) + self.financial_boost(text) * BOOST_WEIGHT;
        if combined.is_finite() {
            combined.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        self.score(text)
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}
