use analysis_core::EngineConfig;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Build the engine configuration from defaults, `.env` and the process
/// environment, then validate it.
pub fn load_config() -> Result<EngineConfig> {
    dotenvy::dotenv().ok();
    let config = apply_overrides(EngineConfig::default(), |key| env::var(key).ok())?;
    config.validate().context("Invalid engine configuration")?;
    Ok(config)
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(None),
    }
}

/// Apply environment overrides on top of `config`. RSI thresholds feed both
/// the trend classifier and the insight rules.
pub fn apply_overrides(
    mut config: EngineConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<EngineConfig> {
    if let Some(window) = parse_var::<usize>(&lookup, "RSI_WINDOW")? {
        config.indicators.rsi_window = window;
    }
    if let Some(level) = parse_var::<f64>(&lookup, "RSI_OVERBOUGHT")? {
        config.trend.rsi_overbought = level;
        config.insights.rsi_overbought = level;
    }
    if let Some(level) = parse_var::<f64>(&lookup, "RSI_OVERSOLD")? {
        config.trend.rsi_oversold = level;
        config.insights.rsi_oversold = level;
    }
    if let Some(threshold) = parse_var::<f64>(&lookup, "SENTIMENT_BULLISH_THRESHOLD")? {
        config.sentiment.bullish_above = threshold;
    }
    if let Some(threshold) = parse_var::<f64>(&lookup, "SENTIMENT_BEARISH_THRESHOLD")? {
        config.sentiment.bearish_below = threshold;
    }
    if let Some(threshold) = parse_var::<f64>(&lookup, "KEY_EVENT_THRESHOLD")? {
        config.sentiment.key_event_magnitude = threshold;
    }
    if let Some(pct) = parse_var::<f64>(&lookup, "SIGNIFICANT_MOVE_PCT")? {
        config.insights.significant_move_pct = pct;
    }
    if let Some(confidence) = parse_var::<f64>(&lookup, "HIGH_CONFIDENCE")? {
        config.insights.high_confidence = confidence;
    }
    if let Some(seed) = parse_var::<u64>(&lookup, "ALLOCATION_SEED")? {
        config.allocation.seed = Some(seed);
    }
    Ok(config)
}
