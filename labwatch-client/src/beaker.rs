//! Beaker command-line client
//!
//! Drives the `bkr` tool as a child process: `bkr job-submit` reads a job
//! document on stdin, `bkr job-results` prints a results document.

use async_trait::async_trait;
use labwatch_core::domain::job::JobId;
use labwatch_core::domain::results::ResultsDocument;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::Scheduler;
use crate::error::{ClientError, Result};
use crate::results::parse_results;
use crate::submission::parse_acknowledgment;

/// Scheduler implementation backed by the `bkr` executable
#[derive(Debug, Clone)]
pub struct BeakerClient {
    /// Path or name of the `bkr` executable
    program: String,
}

impl BeakerClient {
    /// Create a client that runs `bkr` from `PATH`
    pub fn new() -> Self {
        Self::with_program("bkr")
    }

    /// Create a client that runs the given executable instead of `bkr`
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for a submission reading the job from stdin
    pub fn submit_args(owner: Option<&str>) -> Vec<String> {
        let mut args = vec!["job-submit".to_string()];
        if let Some(owner) = owner {
            args.push(format!("--job-owner={}", owner));
        }
        args.push("-".to_string());
        args
    }

    /// Arguments for a results query
    pub fn results_args(id: &str) -> Vec<String> {
        vec![
            "job-results".to_string(),
            "--no-logs".to_string(),
            id.to_string(),
        ]
    }

    fn describe(&self, args: &[String]) -> String {
        format!("{} {}", self.program, args.join(" "))
    }

    /// Runs the program, optionally feeding stdin, and returns stdout
    async fn execute(&self, args: Vec<String>, stdin: Option<&str>) -> Result<String> {
        let command = self.describe(&args);
        debug!("executing: {}", command);

        let failed = |source: std::io::Error| ClientError::CommandFailed {
            command: command.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(failed)?;

        // A child that exits before reading its input breaks the pipe; its
        // exit status and stderr are reported in preference to that error
        let mut write_error = None;
        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            write_error = pipe.write_all(input.as_bytes()).await.err();
            // Dropping the pipe closes it so the child sees EOF
            drop(pipe);
        }

        let output = child.wait_with_output().await.map_err(failed)?;

        if !output.status.success() {
            return Err(ClientError::NonZeroExit {
                command: command.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if let Some(source) = write_error {
            return Err(failed(source));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for BeakerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scheduler for BeakerClient {
    async fn submit(&self, document: &str, owner: Option<&str>) -> Result<JobId> {
        let acknowledgment = self
            .execute(Self::submit_args(owner), Some(document))
            .await?;

        let job_id = parse_acknowledgment(&acknowledgment)?;
        info!("submitted job id: {}", job_id);
        Ok(job_id)
    }

    async fn fetch_results(&self, id: &str) -> Result<ResultsDocument> {
        let xml = self.execute(Self::results_args(id), None).await?;
        parse_results(&xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_args() {
        assert_eq!(BeakerClient::submit_args(None), vec!["job-submit", "-"]);
        assert_eq!(
            BeakerClient::submit_args(Some("kernel-ci")),
            vec!["job-submit", "--job-owner=kernel-ci", "-"]
        );
    }

    #[test]
    fn test_results_args() {
        assert_eq!(
            BeakerClient::results_args("R:89"),
            vec!["job-results", "--no-logs", "R:89"]
        );
    }

    #[test]
    fn test_default_program() {
        assert_eq!(BeakerClient::default().program(), "bkr");
        assert_eq!(BeakerClient::with_program("/opt/bkr").program(), "/opt/bkr");
    }

    #[tokio::test]
    async fn test_missing_program_is_command_failure() {
        let client = BeakerClient::with_program("/nonexistent/labwatch-bkr");
        let err = client.fetch_results("J:1").await.unwrap_err();
        assert!(matches!(err, ClientError::CommandFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit() {
        let client = BeakerClient::with_program("false");
        let err = client.fetch_results("J:1").await.unwrap_err();
        assert!(matches!(err, ClientError::NonZeroExit { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_early_exit_keeps_stderr() {
        let client = BeakerClient::with_program("sh");
        let args = vec![
            "-c".to_string(),
            "echo 'authentication failed' >&2; exit 3".to_string(),
        ];
        // Larger than a pipe buffer, so the write cannot complete
        let document = "x".repeat(1 << 20);

        let err = client.execute(args, Some(&document)).await.unwrap_err();

        match err {
            ClientError::NonZeroExit { stderr, .. } => {
                assert_eq!(stderr, "authentication failed");
            }
            other => panic!("expected a non-zero exit, got {:?}", other),
        }
    }
}
