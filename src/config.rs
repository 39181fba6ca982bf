use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::controller::ReviewTimings;

#[derive(Debug, Clone)]
pub struct ReviewSettings {
    pub summary_latency: Duration,
    pub summary_deadline: Duration,
    pub tick_period: Duration,
    pub preferences_path: PathBuf,
    pub log_filter: String,
    pub rng_seed: Option<u64>,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            summary_latency: Duration::from_millis(2000),
            summary_deadline: Duration::from_secs(30),
            tick_period: Duration::from_secs(30),
            preferences_path: PathBuf::from(".fraud-review/preferences.json"),
            log_filter: "info".into(),
            rng_seed: None,
        }
    }
}

impl ReviewSettings {
    pub fn timings(&self) -> ReviewTimings {
        ReviewTimings {
            summary_latency: self.summary_latency,
            summary_deadline: self.summary_deadline,
        }
    }
}

pub fn load_settings() -> ReviewSettings {
    settings_from(|key| std::env::var(key).ok())
}

fn settings_from(lookup: impl Fn(&str) -> Option<String>) -> ReviewSettings {
    let mut settings = ReviewSettings::default();

    if let Some(ms) = parse_number(&lookup, "FRAUD_REVIEW_SUMMARY_LATENCY_MS") {
        settings.summary_latency = Duration::from_millis(ms);
    }
    if let Some(ms) = parse_number(&lookup, "FRAUD_REVIEW_SUMMARY_DEADLINE_MS") {
        settings.summary_deadline = Duration::from_millis(ms);
    }
    if let Some(secs) = parse_number(&lookup, "FRAUD_REVIEW_TICK_SECS") {
        if secs == 0 {
            warn!("FRAUD_REVIEW_TICK_SECS must be positive; keeping default");
        } else {
            settings.tick_period = Duration::from_secs(secs);
        }
    }
    if let Some(path) = lookup("FRAUD_REVIEW_PREFS") {
        settings.preferences_path = PathBuf::from(path);
    }
    if let Some(filter) = lookup("FRAUD_REVIEW_LOG") {
        settings.log_filter = filter;
    }
    settings.rng_seed = parse_number(&lookup, "FRAUD_REVIEW_SEED");

    settings
}

fn parse_number(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring non-numeric setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> ReviewSettings {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        settings_from(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        let settings = from_pairs(&[]);
        assert_eq!(settings.summary_latency, Duration::from_millis(2000));
        assert_eq!(settings.tick_period, Duration::from_secs(30));
        assert_eq!(settings.log_filter, "info");
        assert_eq!(settings.rng_seed, None);
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = from_pairs(&[
            ("FRAUD_REVIEW_SUMMARY_LATENCY_MS", "250"),
            ("FRAUD_REVIEW_TICK_SECS", "5"),
            ("FRAUD_REVIEW_PREFS", "/tmp/prefs.json"),
            ("FRAUD_REVIEW_SEED", "11"),
        ]);
        assert_eq!(settings.timings().summary_latency, Duration::from_millis(250));
        assert_eq!(settings.tick_period, Duration::from_secs(5));
        assert_eq!(settings.preferences_path, PathBuf::from("/tmp/prefs.json"));
        assert_eq!(settings.rng_seed, Some(11));
    }

    #[test]
    fn invalid_numbers_are_ignored() {
        let settings = from_pairs(&[
            ("FRAUD_REVIEW_SUMMARY_DEADLINE_MS", "soon"),
            ("FRAUD_REVIEW_TICK_SECS", "0"),
        ]);
        assert_eq!(settings.summary_deadline, Duration::from_secs(30));
        assert_eq!(settings.tick_period, Duration::from_secs(30));
    }
}
