//! Common utilities and helper functions

use crate::error::{CleanerError, Result};
use crate::logging::Logger;
use std::time::{Duration, Instant};

/// Timing utilities
pub struct Timer {
    start: Instant,
    description: String,
}

impl Timer {
    /// Start a new timer
    pub fn start(description: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            description: description.into(),
        }
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Log elapsed time using provided logger
    pub fn log_elapsed(&self, logger: &Logger) {
        logger.info(&format!(
            "{} completed in {}",
            self.description,
            FormatUtils::format_duration(self.elapsed())
        ));
    }
}

/// Formatting utilities
pub struct FormatUtils;

impl FormatUtils {
    /// Format duration as human readable
    pub fn format_duration(duration: Duration) -> String {
        let total_secs = duration.as_secs();
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;

        if hours > 0 {
            format!("{}h{}m{}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m{}s", minutes, seconds)
        } else if total_secs > 0 {
            format!("{}s", seconds)
        } else {
            format!("{}ms", duration.as_millis())
        }
    }

    /// Render a list of tag names for log output
    pub fn format_tag_list(tags: &[String]) -> String {
        if tags.is_empty() {
            "[]".to_string()
        } else {
            format!("[{}]", tags.join(", "))
        }
    }
}

/// Validation utilities
pub struct ValidationUtils;

impl ValidationUtils {
    /// Validate a single namespace or repository name segment
    pub fn validate_name_segment(kind: &str, value: &str) -> Result<()> {
        if value.is_empty() {
            return Err(CleanerError::Config(format!("{} cannot be empty", kind)));
        }

        if value.contains('/') {
            return Err(CleanerError::Config(format!(
                "{} '{}' must not contain '/'",
                kind, value
            )));
        }

        if value.chars().any(char::is_whitespace) {
            return Err(CleanerError::Config(format!(
                "{} '{}' cannot contain whitespace",
                kind, value
            )));
        }

        Ok(())
    }
}
