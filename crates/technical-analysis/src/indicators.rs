use analysis_core::{AnalysisError, MacdReading, PricePoint};

/// Check a price series and extract its closes.
///
/// Needs at least two samples, every close finite and > 0.
pub fn validate(series: &[PricePoint]) -> Result<Vec<f64>, AnalysisError> {
    let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
    validate_closes(&closes)?;
    Ok(closes)
}

pub fn validate_closes(closes: &[f64]) -> Result<(), AnalysisError> {
    if closes.len() < 2 {
        return Err(AnalysisError::InvalidData(format!(
            "Insufficient data points: need at least 2, got {}",
            closes.len()
        )));
    }
    if let Some(bad) = closes.iter().find(|c| !c.is_finite() || **c <= 0.0) {
        return Err(AnalysisError::InvalidData(format!(
            "Invalid price {} (zero, negative or not finite)",
            bad
        )));
    }
    Ok(())
}

/// Simple Moving Average (rolling mean, one value per full window)
pub fn sma_series(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Exponential Moving Average, smoothing `2 / (period + 1)`, seeded by the
/// first value and not bias-adjusted. One value per input sample.
pub fn ema_series(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.is_empty() {
        return vec![];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len());
    result.push(data[0]);

    for i in 1..data.len() {
        let ema_val = (data[i] - result[i - 1]) * multiplier + result[i - 1];
        result.push(ema_val);
    }

    result
}

/// Relative Strength Index from rolling-mean gains and losses.
///
/// One value per full window of deltas, so `data.len() - period` values.
/// A window with no losses reads 100, a completely flat window reads 50.
pub fn rsi_series(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);

    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let mut rsi_values = Vec::with_capacity(gains.len() + 1 - period);

    for end in period..=gains.len() {
        let avg_gain = gains[end - period..end].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[end - period..end].iter().sum::<f64>() / period as f64;

        let rsi = if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                50.0
            } else {
                100.0
            }
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - (100.0 / (1.0 + rs))
        };
        rsi_values.push(rsi);
    }

    rsi_values
}

/// MACD line, signal line and histogram, all aligned to the input samples
pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd_series(
    data: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdResult {
    if fast_period == 0 || signal_period == 0 || slow_period <= fast_period || data.is_empty() {
        return MacdResult { macd_line: vec![], signal_line: vec![], histogram: vec![] };
    }

    let ema_fast = ema_series(data, fast_period);
    let ema_slow = ema_series(data, slow_period);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal_line = ema_series(&macd_line, signal_period);
    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Latest RSI, or `None` with fewer than `period + 1` closes
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    rsi_series(closes, period).last().copied()
}

/// Latest SMA, or `None` with fewer than `period` closes
pub fn sma(closes: &[f64], period: usize) -> Option<f64> {
    sma_series(closes, period).last().copied()
}

/// Latest EMA, defined for any non-empty series
pub fn ema(closes: &[f64], period: usize) -> Option<f64> {
    ema_series(closes, period).last().copied()
}

/// Latest MACD and signal values, or `None` with fewer than `slow_period` closes
pub fn macd(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Option<MacdReading> {
    if closes.len() < slow_period {
        return None;
    }
    let result = macd_series(closes, fast_period, slow_period, signal_period);
    match (result.macd_line.last(), result.signal_line.last()) {
        (Some(&macd), Some(&signal)) => Some(MacdReading { macd, signal }),
        _ => None,
    }
}

/// Percent change from the first to the last close
pub fn price_change_pct(closes: &[f64]) -> Option<f64> {
    match (closes.first(), closes.last()) {
        (Some(&first), Some(&last)) if first > 0.0 => Some((last - first) / first * 100.0),
        _ => None,
    }
}
