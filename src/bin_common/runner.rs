//! Binary runner utilities
//!
//! Banners and run settings shared by the binaries.

use tracing::info;

/// Configuration for running a binary application
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Name of the binary (for logging)
    pub name: String,
    /// Interval between periodic stats lines
    pub stats_interval_secs: u64,
}

impl RunConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats_interval_secs: 30,
        }
    }

    pub fn with_stats_interval(mut self, secs: u64) -> Self {
        self.stats_interval_secs = secs;
        self
    }
}

/// Print startup banner
pub fn print_banner(config: &RunConfig) {
    info!("");
    info!("========================================");
    info!("Starting {}", config.name);
    info!("Stats interval: {}s", config.stats_interval_secs);
    info!("Press Ctrl+C to stop");
    info!("========================================");
    info!("");
}

/// Print shutdown banner
pub fn print_shutdown(config: &RunConfig, stats: Option<&str>) {
    info!("");
    info!("========================================");
    info!("{} stopped gracefully", config.name);
    if let Some(stats) = stats {
        info!("{}", stats);
    }
    info!("========================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_builder() {
        let config = RunConfig::new("test-binary").with_stats_interval(120);

        assert_eq!(config.name, "test-binary");
        assert_eq!(config.stats_interval_secs, 120);
    }

    #[test]
    fn test_default_config() {
        assert_eq!(RunConfig::new("default").stats_interval_secs, 30);
    }
}
