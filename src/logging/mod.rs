//! Logging and output control
//!
//! This module provides the [`Logger`] facade used by every component for
//! user-visible output. Messages are emitted as `tracing` events so the
//! subscriber installed by [`init`] controls filtering and formatting.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `info` (or `debug` when verbose).
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. from tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(filter)
        .try_init();
}

/// Logger responsible for all user-visible output
#[derive(Debug, Clone, Default)]
pub struct Logger {
    pub verbose: bool,
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Main section heading
    pub fn section(&self, title: &str) {
        tracing::info!("=== {} ===", title);
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
    }

    /// Information message
    pub fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    /// Success message
    pub fn success(&self, message: &str) {
        tracing::info!("✅ {}", message);
    }

    /// Warning message
    pub fn warning(&self, message: &str) {
        tracing::warn!("🟡 {}", message);
    }

    /// Error message
    pub fn error(&self, message: &str) {
        tracing::error!("❌ {}", message);
    }

    /// Step information
    pub fn step(&self, message: &str) {
        tracing::info!("▶️  {}", message);
    }

    /// Detailed information (only shown in verbose mode)
    pub fn detail(&self, message: &str) {
        if self.verbose {
            tracing::info!("   {}", message);
        } else {
            tracing::debug!("   {}", message);
        }
    }

    /// Titled list of items
    pub fn summary(&self, title: &str, items: &[String]) {
        tracing::info!("📋 {}", title);
        if items.is_empty() {
            tracing::info!("  (No items to display)");
        }
        for item in items {
            tracing::info!("  • {}", item);
        }
    }
}
