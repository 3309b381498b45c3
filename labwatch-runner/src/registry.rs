//! Runner registry
//!
//! Runners are selected by a type tag in configuration. The tag is resolved
//! into a concrete constructor when the configuration is loaded, so an
//! unknown runner type fails before anything is submitted.

use anyhow::{Context, Result};
use labwatch_client::{BeakerClient, Scheduler};
use labwatch_core::JobTemplate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RunnerSettings;
use crate::service::{BeakerRunner, RunOutcome, WaitMode};

/// Runner selection, tagged by `type`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RunnerConfig {
    Beaker(BeakerConfig),
}

/// Arguments of the beaker runner
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeakerConfig {
    /// Path to the job template; a leading `~` is expanded
    pub jobtemplate: PathBuf,
    /// User to submit jobs on behalf of
    #[serde(default)]
    pub jobowner: Option<String>,
}

impl RunnerConfig {
    /// Type tags of every known runner
    pub const TYPES: &'static [&'static str] = &[BeakerRunner::TYPE];

    /// Builds a configuration from a type tag and a JSON object of arguments
    ///
    /// # Example
    /// ```
    /// use labwatch_runner::RunnerConfig;
    ///
    /// let config = RunnerConfig::from_parts(
    ///     "beaker",
    ///     serde_json::json!({ "jobtemplate": "/etc/labwatch/job.xml" }),
    /// ).unwrap();
    /// assert_eq!(config.kind(), "beaker");
    /// ```
    pub fn from_parts(kind: &str, args: serde_json::Value) -> Result<Self> {
        if !Self::TYPES.contains(&kind) {
            anyhow::bail!("Unknown runner type: {}", kind);
        }

        let serde_json::Value::Object(mut fields) = args else {
            anyhow::bail!("Runner arguments must be an object, got: {}", args);
        };
        fields.insert(
            "type".to_string(),
            serde_json::Value::String(kind.to_string()),
        );

        serde_json::from_value(serde_json::Value::Object(fields))
            .with_context(|| format!("Invalid arguments for runner type {}", kind))
    }

    /// Type tag of this configuration
    pub fn kind(&self) -> &'static str {
        match self {
            RunnerConfig::Beaker(_) => BeakerRunner::TYPE,
        }
    }

    /// Builds the runner, talking to the lab through the `bkr` tool
    pub fn build(&self, settings: &RunnerSettings) -> Result<Runner> {
        let scheduler = Arc::new(BeakerClient::with_program(&settings.bkr_program));
        self.build_with(settings, scheduler)
    }

    /// Builds the runner on top of an existing scheduler
    pub fn build_with(
        &self,
        settings: &RunnerSettings,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Runner> {
        settings.validate()?;

        match self {
            RunnerConfig::Beaker(config) => {
                let path = expand_home(&config.jobtemplate);
                tracing::info!("beaker template: {}", path.display());

                let template = JobTemplate::from_file(&path)?;
                Ok(Runner::Beaker(BeakerRunner::new(
                    template,
                    config.jobowner.clone(),
                    scheduler,
                    settings.clone(),
                )))
            }
        }
    }
}

/// A constructed runner
pub enum Runner {
    Beaker(BeakerRunner),
}

impl Runner {
    /// Submits a job for a build and optionally waits for its verdict
    pub async fn run(&self, artifact_url: &str, release: &str, wait: WaitMode) -> Result<RunOutcome> {
        match self {
            Runner::Beaker(runner) => runner.run(artifact_url, release, wait).await,
        }
    }
}

/// Expands a leading `~` to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedScheduler;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_from_parts() {
        let config = RunnerConfig::from_parts(
            "beaker",
            json!({ "jobtemplate": "/tmp/job.xml", "jobowner": "kernel-ci" }),
        )
        .unwrap();

        assert_eq!(
            config,
            RunnerConfig::Beaker(BeakerConfig {
                jobtemplate: PathBuf::from("/tmp/job.xml"),
                jobowner: Some("kernel-ci".to_string()),
            })
        );
        assert_eq!(config.kind(), "beaker");
    }

    #[test]
    fn test_unknown_runner_type() {
        let err = RunnerConfig::from_parts("lava", json!({})).unwrap_err();
        assert!(err.to_string().contains("Unknown runner type: lava"));
    }

    #[test]
    fn test_invalid_runner_arguments() {
        assert!(RunnerConfig::from_parts("beaker", json!({})).is_err());
        assert!(RunnerConfig::from_parts("beaker", json!(["x"])).is_err());
        assert!(
            RunnerConfig::from_parts("beaker", json!({ "jobtemplate": "a", "bogus": 1 })).is_err()
        );
    }

    #[test]
    fn test_deserialize_tagged() {
        let config: RunnerConfig =
            serde_json::from_value(json!({ "type": "beaker", "jobtemplate": "t.xml" })).unwrap();
        assert_eq!(config.kind(), "beaker");

        let err = serde_json::from_value::<RunnerConfig>(json!({ "type": "lava" }));
        assert!(err.is_err());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/abs/job.xml")), PathBuf::from("/abs/job.xml"));
        assert_eq!(expand_home(Path::new("rel/job.xml")), PathBuf::from("rel/job.xml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/job.xml")), home.join("job.xml"));
        }
    }

    #[test]
    fn test_build_loads_template() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "<job>##KVER##</job>").unwrap();

        let config = RunnerConfig::Beaker(BeakerConfig {
            jobtemplate: file.path().to_path_buf(),
            jobowner: None,
        });
        let runner = config
            .build_with(&RunnerSettings::default(), Arc::new(ScriptedScheduler::new()))
            .unwrap();

        let Runner::Beaker(runner) = runner;
        assert_eq!(runner.render("http://x/1", "6.1").as_str(), "<job>6.1</job>\n");
        assert_eq!(runner.job_owner(), None);
    }

    #[test]
    fn test_build_fails_on_missing_template() {
        let config = RunnerConfig::Beaker(BeakerConfig {
            jobtemplate: PathBuf::from("/nonexistent/job.xml"),
            jobowner: None,
        });

        assert!(config.build(&RunnerSettings::default()).is_err());
    }
}
