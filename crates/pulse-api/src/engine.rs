//! Analysis-engine subprocess client
//!
//! The engine is an external executable taking the project path as its
//! only argument and printing one JSON report on stdout. Invocations run
//! under a hard timeout so a hung engine cannot pin a worker forever.

use crate::config::AppConfig;
use pulse_core::EngineReport;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to launch analysis engine: {0}")]
    Launch(#[from] std::io::Error),

    #[error("Analysis engine exited with status {code}: {stderr}")]
    Failed { code: i32, stderr: String },

    #[error("Analysis engine timed out after {0} seconds")]
    Timeout(u64),

    #[error("Malformed engine output: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Handle on the engine executable
#[derive(Clone)]
pub struct EngineClient {
    path: String,
    timeout_secs: u64,
}

impl EngineClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            path: config.engine_path.clone(),
            timeout_secs: config.engine_timeout_secs,
        }
    }

    /// Run one analysis and parse the report from stdout. Non-zero exit,
    /// expiry of the timeout, and non-JSON output are all hard failures.
    pub async fn analyze(&self, project_path: &str) -> EngineResult<EngineReport> {
        debug!("Invoking analysis engine {} on {}", self.path, project_path);

        let result = timeout(
            Duration::from_secs(self.timeout_secs),
            Command::new(&self.path).arg(project_path).output(),
        )
        .await;

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => return Err(EngineError::Launch(err)),
            Err(_) => return Err(EngineError::Timeout(self.timeout_secs)),
        };

        if !output.status.success() {
            return Err(EngineError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn client(path: &str, timeout_secs: u64) -> EngineClient {
        EngineClient {
            path: path.to_string(),
            timeout_secs,
        }
    }

    #[tokio::test]
    async fn parses_report_from_stdout() {
        // `cat <file>` stands in for the engine: it echoes the report
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "project_path": "/workspace/demo",
                "issues": [],
                "summary": {{"total_files": 2, "issues_found": 0, "critical_issues": 0}}
            }}"#
        )
        .unwrap();

        let report = client("cat", 10)
            .analyze(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(report.summary.total_files, 2);
    }

    #[tokio::test]
    async fn nonzero_exit_is_a_failure() {
        let err = client("false", 10).analyze("/tmp").await.unwrap_err();
        assert!(matches!(err, EngineError::Failed { .. }));
    }

    #[tokio::test]
    async fn missing_executable_is_a_launch_error() {
        let err = client("/nonexistent/engine-binary", 10)
            .analyze("/tmp")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Launch(_)));
    }

    #[tokio::test]
    async fn garbage_output_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "definitely not json").unwrap();

        let err = client("cat", 10)
            .analyze(file.path().to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[tokio::test]
    async fn hung_engine_times_out() {
        let err = client("sleep", 1).analyze("30").await.unwrap_err();
        assert!(matches!(err, EngineError::Timeout(1)));
    }
}
