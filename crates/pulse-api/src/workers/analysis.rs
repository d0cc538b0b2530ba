//! Background analysis orchestration
//!
//! One spawned task per run: invoke the engine, score the findings,
//! persist the run, evaluate achievements, render the report artifact,
//! notify live clients. Engine and run-persistence failures end the run;
//! achievement, report, and notification failures never do. The task
//! body sits behind a panic barrier so nothing inside a run can take the
//! process (or another run) down.

use crate::engine::EngineError;
use crate::hub::AnalysisCompleteEvent;
use crate::store::records::NewAnalysisResult;
use crate::store::StoreError;
use crate::validate::{validate_project_path, InvalidPath};
use crate::AppState;
use chrono::Utc;
use futures::FutureExt;
use pulse_core::report::{self, ReportFormat};
use pulse_core::{
    achievements, overall_score, score_categories, AnalysisRecord, AnalysisRun, EngineReport,
    RunStatus, ScanType,
};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("invalid project path: {0}")]
    InvalidPath(#[from] InvalidPath),

    #[error("analysis engine failed: {0}")]
    Engine(#[from] EngineError),

    #[error("failed to persist analysis run: {0}")]
    Persistence(#[from] StoreError),
}

/// Parameters of one triggered run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub project_id: String,
    pub project_path: String,
    pub scan_type: ScanType,
    pub user_id: Option<String>,
}

/// Fire-and-forget entry point: the caller gets its acknowledgment
/// immediately, the run continues on its own task.
pub fn spawn_run(state: Arc<AppState>, request: RunRequest) {
    tokio::spawn(supervise(state, request));
}

async fn supervise(state: Arc<AppState>, request: RunRequest) {
    info!(
        "Starting analysis for project {} (type: {})",
        request.project_id, request.scan_type
    );
    let started = Instant::now();

    let outcome = AssertUnwindSafe(execute(state.clone(), request.clone()))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(run)) => {
            info!(
                "Analysis completed for project {}: {} issues found, overall score {:.1}",
                request.project_id, run.total_issues, run.overall_score
            );
        }
        Ok(Err(err)) => {
            error!("Analysis failed for project {}: {}", request.project_id, err);
            mark_failed(&state, &request, started.elapsed().as_millis() as u64).await;
        }
        Err(_) => {
            error!("Analysis run panicked for project {}", request.project_id);
            mark_failed(&state, &request, started.elapsed().as_millis() as u64).await;
        }
    }
}

async fn execute(state: Arc<AppState>, request: RunRequest) -> Result<AnalysisRun, RunError> {
    // The trigger route already validated the path, but a run can also be
    // started with a stale project record; re-check before touching disk.
    validate_project_path(&request.project_path, &state.config.allowed_project_paths)?;

    let started = Instant::now();
    let engine_report = state.engine.analyze(&request.project_path).await?;

    let run = build_run(&request, &engine_report, started.elapsed().as_millis() as u64);

    let stored = state
        .store
        .insert_scan(&run, request.user_id.as_deref())
        .await?;

    persist_category_history(&state, &stored).await;

    if let Some(user_id) = &request.user_id {
        award_achievements(&state, user_id, &request.project_id, &stored).await;
    }

    persist_engine_report(&state, &request, &engine_report).await;

    let event = AnalysisCompleteEvent::new(
        &request.project_id,
        &request.scan_type.to_string(),
        stored.total_issues,
    );
    state.hub.notify_analysis_complete(&event);

    Ok(stored)
}

fn build_run(request: &RunRequest, engine_report: &EngineReport, duration_ms: u64) -> AnalysisRun {
    let category_scores = score_categories(&engine_report.issues);
    let overall = overall_score(&category_scores);

    AnalysisRun {
        id: None,
        project_id: request.project_id.clone(),
        scan_type: request.scan_type,
        total_files: engine_report.summary.total_files,
        total_issues: engine_report.summary.issues_found,
        critical_issues: engine_report.summary.critical_issues,
        overall_score: overall,
        category_scores,
        scan_duration_ms: duration_ms,
        status: RunStatus::Completed,
        created_at: Utc::now(),
    }
}

/// One history row per category, best-effort per row
async fn persist_category_history(state: &AppState, run: &AnalysisRun) {
    let Some(scan_id) = &run.id else {
        warn!("Stored scan for project {} came back without an id", run.project_id);
        return;
    };

    for score in &run.category_scores {
        if let Err(err) = state
            .store
            .insert_category_score(scan_id, &run.project_id, score)
            .await
        {
            warn!(
                "Failed to record {} history for project {}: {}",
                score.category_name, run.project_id, err
            );
        }
    }
}

/// Existence check then insert per candidate; one bad achievement never
/// aborts the batch or the run.
async fn award_achievements(state: &AppState, user_id: &str, project_id: &str, run: &AnalysisRun) {
    let candidates = achievements::candidates(user_id, project_id, &run.category_scores);
    let mut awarded = 0usize;

    for candidate in candidates {
        match state
            .store
            .achievement_exists(user_id, &candidate.achievement_type, &candidate.category)
            .await
        {
            Ok(true) => {}
            Ok(false) => match state.store.insert_achievement(&candidate).await {
                Ok(()) => awarded += 1,
                Err(err) => warn!(
                    "Failed to save achievement {}/{}: {}",
                    candidate.achievement_type, candidate.category, err
                ),
            },
            Err(err) => warn!(
                "Achievement lookup failed for {}/{}: {}",
                candidate.achievement_type, candidate.category, err
            ),
        }
    }

    info!("Checked achievements: {} new achievements", awarded);
}

/// Store the full engine report and render the report artifact.
/// Neither failure fails the run.
async fn persist_engine_report(state: &AppState, request: &RunRequest, engine_report: &EngineReport) {
    let scan_type = request.scan_type.to_string();
    let payload = NewAnalysisResult {
        project_id: &request.project_id,
        scan_type: &scan_type,
        results: engine_report,
        issues_count: engine_report.summary.issues_found,
    };

    let row = match state.store.insert_analysis_result(&payload).await {
        Ok(row) => row,
        Err(err) => {
            warn!(
                "Failed to save engine report for project {}: {}",
                request.project_id, err
            );
            return;
        }
    };

    if let Err(err) = render_report(state, &row.record).await {
        warn!(
            "Failed to generate report for project {}: {}",
            request.project_id, err
        );
    }
}

async fn render_report(state: &AppState, record: &AnalysisRecord) -> std::io::Result<()> {
    let project_name = format!("Project-{}", record.project_id);
    let content = match report::generate(record, &project_name, ReportFormat::Markdown) {
        Ok(content) => content,
        Err(err) => return Err(std::io::Error::other(err.to_string())),
    };

    tokio::fs::create_dir_all(&state.config.reports_dir).await?;
    let filename = format!(
        "analysis_report_{}_{}.md",
        record.project_id,
        Utc::now().format("%Y%m%d_%H%M%S")
    );
    let path = format!("{}/{}", state.config.reports_dir, filename);
    tokio::fs::write(&path, content).await?;
    info!("Report generated: {}", path);

    if let Some(analysis_id) = &record.id {
        if let Err(err) = state.store.set_report_path(analysis_id, &path).await {
            warn!("Failed to update report path for analysis {}: {}", analysis_id, err);
        }
    }

    Ok(())
}

/// Persist a terminal failed record so the outcome is visible in
/// history. Best-effort: the store may be the thing that is down.
async fn mark_failed(state: &AppState, request: &RunRequest, duration_ms: u64) {
    let run = AnalysisRun {
        id: None,
        project_id: request.project_id.clone(),
        scan_type: request.scan_type,
        total_files: 0,
        total_issues: 0,
        critical_issues: 0,
        overall_score: 0.0,
        category_scores: Vec::new(),
        scan_duration_ms: duration_ms,
        status: RunStatus::Failed,
        created_at: Utc::now(),
    };

    if let Err(err) = state.store.insert_scan(&run, request.user_id.as_deref()).await {
        warn!(
            "Failed to record failed run for project {}: {}",
            request.project_id, err
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::findings::EngineSummary;
    use pulse_core::{Finding, Severity};

    fn request() -> RunRequest {
        RunRequest {
            project_id: "proj-1".to_string(),
            project_path: "/workspace/demo".to_string(),
            scan_type: ScanType::Full,
            user_id: Some("user-1".to_string()),
        }
    }

    fn engine_report() -> EngineReport {
        EngineReport {
            project_path: "/workspace/demo".to_string(),
            scan_type: None,
            analyzers_used: Vec::new(),
            files: Vec::new(),
            issues: vec![Finding {
                issue_type: "sql_injection_risk".to_string(),
                severity: Severity::Critical,
                description: "bad".to_string(),
                file: "src/db.ts".to_string(),
                line: None,
                suggestion: None,
            }],
            summary: EngineSummary {
                total_files: 4,
                issues_found: 1,
                critical_issues: 1,
                ..EngineSummary::default()
            },
            scanned_at: Utc::now(),
        }
    }

    #[test]
    fn build_run_maps_engine_totals() {
        let run = build_run(&request(), &engine_report(), 1234);

        assert_eq!(run.total_files, 4);
        assert_eq!(run.total_issues, 1);
        assert_eq!(run.critical_issues, 1);
        assert_eq!(run.scan_duration_ms, 1234);
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.category_scores.len(), 9);

        // one critical in security: 8 * 100 + 85 => 885 / 9
        assert_eq!(run.overall_score, 98.33);
    }

    #[test]
    fn run_errors_carry_their_cause() {
        let err = RunError::from(InvalidPath::Traversal);
        assert!(err.to_string().contains("invalid project path"));

        let err = RunError::from(EngineError::Timeout(300));
        assert!(err.to_string().contains("timed out"));
    }
}
