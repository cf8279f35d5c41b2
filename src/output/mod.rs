//! Run result reporting at the process boundary
//!
//! The only machine-readable output is a boolean `success` value. When the
//! tool runs as a CI action step it is appended to the file named by
//! `GITHUB_OUTPUT`; otherwise only the exit code carries it.

use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

pub const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";

#[derive(Debug, Clone, Default)]
pub struct ActionOutput {
    path: Option<PathBuf>,
}

impl ActionOutput {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Use the output file advertised by the CI runner, if any
    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os(OUTPUT_FILE_ENV)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        )
    }

    /// Record the overall outcome
    pub fn set_success(&self, success: bool) -> Result<()> {
        self.set("success", if success { "true" } else { "false" })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}={}", key, value)?;
        Ok(())
    }
}
