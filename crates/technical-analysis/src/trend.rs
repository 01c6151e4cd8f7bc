use analysis_core::{IndicatorSnapshot, TrendLabel, TrendThresholds};

/// Derives qualitative trend-strength labels from an indicator snapshot.
///
/// Rules are independent and evaluated in a fixed order: RSI, MACD, EMA
/// crossover. The result is never empty.
#[derive(Debug, Clone, Default)]
pub struct TrendClassifier {
    thresholds: TrendThresholds,
}

impl TrendClassifier {
    pub fn new(thresholds: TrendThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify(&self, snapshot: &IndicatorSnapshot) -> Vec<TrendLabel> {
        let mut labels = Vec::with_capacity(3);

        if let Some(rsi) = snapshot.rsi {
            if rsi > self.thresholds.rsi_overbought {
                labels.push(TrendLabel::Overbought);
            } else if rsi < self.thresholds.rsi_oversold {
                labels.push(TrendLabel::Oversold);
            }
        }

        if let Some(macd) = snapshot.macd {
            if macd.macd > macd.signal {
                labels.push(TrendLabel::BullishMacdCrossover);
            } else {
                labels.push(TrendLabel::BearishMacdCrossover);
            }
        }

        let fast = snapshot.ema(self.thresholds.fast_ema_window);
        let slow = snapshot.ema(self.thresholds.slow_ema_window);
        if let (Some(fast), Some(slow)) = (fast, slow) {
            if fast > slow {
                labels.push(TrendLabel::BullishEmaCrossover);
            } else {
                labels.push(TrendLabel::BearishEmaCrossover);
            }
        }

        if labels.is_empty() {
            labels.push(TrendLabel::NoStrongTrend);
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{MacdReading, TrendDirection};
    use std::collections::BTreeMap;

    fn snapshot(rsi: Option<f64>, macd: Option<(f64, f64)>, ema: &[(usize, f64)]) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi,
            sma: BTreeMap::new(),
            ema: ema.iter().map(|&(w, v)| (w, Some(v))).collect(),
            macd: macd.map(|(macd, signal)| MacdReading { macd, signal }),
            price_change_pct: 0.0,
            recent_trend: TrendDirection::Up,
        }
    }

    #[test]
    fn test_sentinel_when_nothing_fires() {
        let classifier = TrendClassifier::default();
        let labels = classifier.classify(&snapshot(None, None, &[]));
        assert_eq!(labels, vec![TrendLabel::NoStrongTrend]);

        let labels = classifier.classify(&snapshot(Some(50.0), None, &[(5, 1.0)]));
        assert_eq!(labels, vec![TrendLabel::NoStrongTrend]);
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let classifier = TrendClassifier::default();
        let labels = classifier.classify(&snapshot(
            Some(75.0),
            Some((1.2, 0.8)),
            &[(5, 105.0), (10, 101.0)],
        ));
        assert_eq!(
            labels,
            vec![
                TrendLabel::Overbought,
                TrendLabel::BullishMacdCrossover,
                TrendLabel::BullishEmaCrossover,
            ]
        );
    }

    #[test]
    fn test_bearish_labels() {
        let classifier = TrendClassifier::default();
        let labels = classifier.classify(&snapshot(
            Some(22.0),
            Some((-0.5, -0.1)),
            &[(5, 99.0), (10, 101.0)],
        ));
        assert_eq!(
            labels,
            vec![
                TrendLabel::Oversold,
                TrendLabel::BearishMacdCrossover,
                TrendLabel::BearishEmaCrossover,
            ]
        );
    }

    #[test]
    fn test_equal_macd_counts_as_bearish() {
        let classifier = TrendClassifier::default();
        let labels = classifier.classify(&snapshot(None, Some((0.3, 0.3)), &[]));
        assert_eq!(labels, vec![TrendLabel::BearishMacdCrossover]);
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = TrendClassifier::new(TrendThresholds {
            rsi_overbought: 60.0,
            ..TrendThresholds::default()
        });
        let labels = classifier.classify(&snapshot(Some(65.0), None, &[]));
        assert_eq!(labels, vec![TrendLabel::Overbought]);
    }
}
