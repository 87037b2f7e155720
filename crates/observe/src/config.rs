use tracing::Level;

#[derive(Debug, Clone)]
pub struct Config {
    /// Filters spans and events based on a set of filter directives
    /// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
    pub(crate) env_filter: String,
    /// Events at this level or more severe are written to stderr, all others
    /// to stdout.
    pub(crate) stderr_threshold: Option<Level>,
    /// Output log events as JSON
    pub(crate) use_json_format: bool,
}

impl Config {
    pub fn new(env_filter: &str, stderr_threshold: Option<Level>, use_json_format: bool) -> Self {
        Self {
            env_filter: env_filter.into(),
            stderr_threshold,
            use_json_format,
        }
    }

    pub fn with_env_filter(mut self, env_filter: &str) -> Self {
        self.env_filter = env_filter.to_string();
        self
    }

    /// The level from which events get routed to stderr. Without an explicit
    /// threshold only errors go there.
    pub fn stderr_threshold(&self) -> Level {
        self.stderr_threshold.unwrap_or(Level::ERROR)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_filter: "info".to_string(),
            stderr_threshold: None,
            use_json_format: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_route_only_errors_to_stderr() {
        let config = Config::default().with_env_filter("warn,deployer=debug");
        assert_eq!(config.env_filter, "warn,deployer=debug");
        assert_eq!(config.stderr_threshold(), Level::ERROR);
        assert!(!config.use_json_format);
    }

    #[test]
    fn explicit_threshold_wins() {
        let config = Config::new("info", Some(Level::TRACE), true);
        assert_eq!(config.stderr_threshold(), Level::TRACE);
        assert!(config.use_json_format);
    }
}
