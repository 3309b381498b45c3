//! Configuration module
//!
//! Handles the rc file. Every setting in it can be overridden on the
//! command line; a missing rc file is the same as an empty one.
//!
//! ```toml
//! [config]
//! buildurl = "http://builds.example.com/kernel-5.10.0.tar.gz"
//! krelease = "5.10.0"
//! wait = true
//! poll_interval = 60
//!
//! [runner]
//! type = "beaker"
//! jobtemplate = "~/templates/kernel.xml"
//! jobowner = "kernel-ci"
//! ```

use anyhow::{Context, Result};
use labwatch_runner::RunnerConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Rc file used when none is given
pub const DEFAULT_RC: &str = "~/.labwatchrc";

/// Contents of the rc file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RcFile {
    pub config: RcConfig,
    pub runner: Option<RunnerConfig>,
}

/// The `[config]` table
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RcConfig {
    /// URL of the published build
    pub buildurl: Option<String>,
    /// Release string of the build
    pub krelease: Option<String>,
    /// Wait for the verdict
    pub wait: Option<bool>,
    /// Seconds between status polls
    pub poll_interval: Option<u64>,
    /// Consecutive failed status queries tolerated per recipe
    pub max_query_failures: Option<u32>,
    /// Path or name of the `bkr` executable
    pub bkr: Option<String>,
}

impl RcFile {
    /// Loads the rc file, treating a missing file as empty
    pub fn load(path: &Path) -> Result<Self> {
        let path = labwatch_runner::registry::expand_home(path);

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No rc file at {}", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read rc file {}", path.display()));
            }
        };

        Self::parse(&text).with_context(|| format!("Invalid rc file {}", path.display()))
    }

    /// Parses rc file contents
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_parse_full_rc() {
        let rc = RcFile::parse(
            r#"
            [config]
            buildurl = "http://x/build/123"
            krelease = "5.10.0"
            wait = true
            poll_interval = 30
            bkr = "/usr/local/bin/bkr"

            [runner]
            type = "beaker"
            jobtemplate = "/etc/labwatch/job.xml"
            jobowner = "kernel-ci"
            "#,
        )
        .unwrap();

        assert_eq!(rc.config.buildurl.as_deref(), Some("http://x/build/123"));
        assert_eq!(rc.config.krelease.as_deref(), Some("5.10.0"));
        assert_eq!(rc.config.wait, Some(true));
        assert_eq!(rc.config.poll_interval, Some(30));
        assert_eq!(rc.config.bkr.as_deref(), Some("/usr/local/bin/bkr"));

        let Some(RunnerConfig::Beaker(beaker)) = rc.runner else {
            panic!("expected a beaker runner");
        };
        assert_eq!(beaker.jobtemplate, PathBuf::from("/etc/labwatch/job.xml"));
        assert_eq!(beaker.jobowner.as_deref(), Some("kernel-ci"));
    }

    #[test]
    fn test_parse_empty_rc() {
        let rc = RcFile::parse("").unwrap();
        assert!(rc.runner.is_none());
        assert!(rc.config.buildurl.is_none());
    }

    #[test]
    fn test_unknown_runner_type_rejected() {
        assert!(RcFile::parse("[runner]\ntype = \"lava\"\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let rc = RcFile::load(Path::new("/nonexistent/labwatchrc")).unwrap();
        assert!(rc.runner.is_none());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[config]\nkrelease = \"6.1.0\"").unwrap();

        let rc = RcFile::load(file.path()).unwrap();
        assert_eq!(rc.config.krelease.as_deref(), Some("6.1.0"));
    }
}
