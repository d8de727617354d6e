use std::time::Duration;

/// Bounds on external calls made by the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on one geocoding lookup.
    pub geocode_timeout: Duration,
    /// Upper bound on one external calendar read or write.
    pub calendar_timeout: Duration,
    /// Maximum entries fetched from the external calendar per schedule.
    pub calendar_max_results: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            geocode_timeout: Duration::from_millis(3000),
            calendar_timeout: Duration::from_millis(5000),
            calendar_max_results: 10,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default |
    /// |------------------------|---------|
    /// | `GEOCODE_TIMEOUT_MS`   | `3000`  |
    /// | `CALENDAR_TIMEOUT_MS`  | `5000`  |
    /// | `CALENDAR_MAX_RESULTS` | `10`    |
    ///
    /// Unparseable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            geocode_timeout: env_millis("GEOCODE_TIMEOUT_MS").unwrap_or(defaults.geocode_timeout),
            calendar_timeout: env_millis("CALENDAR_TIMEOUT_MS")
                .unwrap_or(defaults.calendar_timeout),
            calendar_max_results: env_parse("CALENDAR_MAX_RESULTS")
                .unwrap_or(defaults.calendar_max_results),
        }
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    env_parse(key).map(Duration::from_millis)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable configuration value");
            None
        }
    }
}
