//! Structured logging via `tracing`.
//!
//! - Level-based filtering with per-module overrides
//! - `RUST_LOG` wins over the configured filter when set
//! - Idempotent initialization: the first call installs the subscriber

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Installs the tracing subscriber when added to an app
#[derive(Default)]
pub struct LoggingPlugin {
    pub config: TracingConfig,
}

impl Plugin for LoggingPlugin {
    fn build(&self, _app: &mut App) {
        init_tracing(&self.config);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Case-insensitive level name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Configuration for tracing initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    pub default_level: LogLevel,
    pub module_filters: Vec<(String, LogLevel)>,
    pub show_timestamps: bool,
    pub show_targets: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            module_filters: vec![
                ("dungeon_core::generation".to_string(), LogLevel::Info),
                ("dungeon_core::combat".to_string(), LogLevel::Info),
                ("dungeon_core::run".to_string(), LogLevel::Info),
                ("bevy_ecs".to_string(), LogLevel::Warn),
            ],
            show_timestamps: true,
            show_targets: true,
        }
    }
}

impl TracingConfig {
    /// Default config with every crate module raised to `level`
    pub fn verbose(level: LogLevel) -> Self {
        let mut config = Self::default();
        for (module, module_level) in &mut config.module_filters {
            if module.starts_with("dungeon_core") {
                *module_level = level;
            }
        }
        config
    }

    pub fn to_env_filter_string(&self) -> String {
        let mut parts = vec![self.default_level.as_str().to_string()];
        for (module, level) in &self.module_filters {
            parts.push(format!("{}={}", module, level.as_str()));
        }
        parts.join(",")
    }
}

static TRACING_INIT: Once = Once::new();

pub fn init_tracing_default() {
    init_tracing(&TracingConfig::default());
}

/// Initialize tracing. Idempotent: the first call wins.
pub fn init_tracing(config: &TracingConfig) {
    let filter_str = config.to_env_filter_string();
    let (timestamps, targets) = (config.show_timestamps, config.show_targets);
    TRACING_INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(targets)
            .compact();

        // a global subscriber may already be set by the host application
        let _ = if timestamps {
            builder.try_init()
        } else {
            builder.without_time().try_init()
        };
    });
}

/// Entered span around a named operation; closes on drop
pub struct TimingSpan {
    _span: tracing::span::EnteredSpan,
}

impl TimingSpan {
    pub fn new(name: &str) -> Self {
        let span = tracing::info_span!("operation", name = name);
        Self {
            _span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_names() {
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            assert_eq!(LogLevel::from_name(level.as_str()), Some(level));
        }
        assert_eq!(LogLevel::from_name(" WARNING "), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_name("loud"), None);
    }

    #[test]
    fn test_env_filter_string() {
        let filter = TracingConfig::default().to_env_filter_string();
        assert!(filter.starts_with("info"));
        assert!(filter.contains("dungeon_core::generation=info"));
        assert!(filter.contains("bevy_ecs=warn"));
    }

    #[test]
    fn test_verbose_only_raises_crate_modules() {
        let filter = TracingConfig::verbose(LogLevel::Debug).to_env_filter_string();
        assert!(filter.contains("dungeon_core::run=debug"));
        assert!(filter.contains("dungeon_core::combat=debug"));
        assert!(filter.contains("bevy_ecs=warn"));
    }

    #[test]
    fn test_init_tracing_idempotent() {
        init_tracing_default();
        init_tracing_default();
        init_tracing(&TracingConfig::verbose(LogLevel::Trace));
    }

    #[test]
    fn test_plugin_installs_subscriber() {
        let mut app = App::new();
        app.add_plugins(LoggingPlugin::default());
        let _span = TimingSpan::new("plugin_test");
        tracing::info!("logging from a plugin test");
    }
}
