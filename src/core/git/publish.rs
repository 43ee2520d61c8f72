use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{Error, Result};

use super::{execute_git, is_workdir_clean};

/// Outcome of the publish stage. Failure is the `Err` arm of the result, so
/// callers gate on `?` and still distinguish "nothing to do" from "pushed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOutcome {
    NoChanges,
    Pushed,
}

/// Auto-generated commit message, e.g. `20250102-030405-autodeploy knihovna`.
pub fn commit_message(app_id: &str, now: &DateTime<Local>) -> String {
    format!("{}-autodeploy {}", now.format("%Y%m%d-%H%M%S"), app_id)
}

/// Stage, commit, and push all pending changes in `path`.
///
/// Clean working tree short-circuits to [`PublishOutcome::NoChanges`]. Any
/// failing step aborts with an error; partially staged or committed state
/// is left in place, no rollback is attempted.
pub fn publish_changes(path: &str, app_id: &str) -> Result<PublishOutcome> {
    if is_workdir_clean(path)? {
        log_status!("git", "Working tree clean, nothing to publish");
        return Ok(PublishOutcome::NoChanges);
    }

    log_status!("git", "Staging and committing pending changes");
    run_step(path, &["add", "-A"], "git add")?;

    let message = commit_message(app_id, &Local::now());
    run_step(path, &["commit", "-m", &message], "git commit")?;

    run_step(path, &["push"], "git push")?;
    log_status!("git", "Pushed '{}'", message);

    Ok(PublishOutcome::Pushed)
}

fn run_step(path: &str, args: &[&str], context: &str) -> Result<()> {
    let output = execute_git(path, args)
        .map_err(|e| Error::git(format!("failed to run {}: {}", context, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        return Err(Error::git(format!("{} failed: {}", context, detail)));
    }

    Ok(())
}
