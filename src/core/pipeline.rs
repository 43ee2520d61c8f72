//! Four-stage deployment pipeline.
//!
//! patch startup file → publish pending changes → wait for the registry
//! build (only when something was pushed) → deploy to the server. Each
//! stage's success gates the next; there is no rollback of earlier stages
//! when a later one fails (pushed commits stay pushed, the runbook covers
//! manual recovery of the deployment itself).

use serde::Serialize;

use crate::config::DeployConfig;
use crate::deploy::{self, DeployReport};
use crate::error::{Error, Result};
use crate::git::{self, PublishOutcome};
use crate::patch::{self, PatchOutcome};
use crate::ssh::SshClient;
use crate::wait::{PullProbe, SystemClock, WaitOutcome, Waiter};

/// Seams between the pipeline and its stage implementations, so the
/// end-to-end flow is testable without subprocesses or network traffic.
pub trait Stages {
    fn patch_startup_file(&mut self, config: &DeployConfig) -> Result<PatchOutcome>;
    fn publish_changes(&mut self, config: &DeployConfig) -> Result<PublishOutcome>;
    fn wait_for_build(&mut self, config: &DeployConfig) -> WaitOutcome;
    fn deploy(&mut self, config: &DeployConfig) -> DeployReport;
}

/// Production stages: real filesystem, git, SSH, and wall clock.
pub struct LiveStages;

impl Stages for LiveStages {
    fn patch_startup_file(&mut self, config: &DeployConfig) -> Result<PatchOutcome> {
        patch::patch_file(&config.startup_file)
    }

    fn publish_changes(&mut self, config: &DeployConfig) -> Result<PublishOutcome> {
        git::publish_changes(&config.repo_path, &config.app_id)
    }

    fn wait_for_build(&mut self, config: &DeployConfig) -> WaitOutcome {
        let client = SshClient::from_config(config);
        let mut probe = PullProbe::new(&client, config);
        Waiter::from_config(config).run(&mut SystemClock, &mut probe)
    }

    fn deploy(&mut self, config: &DeployConfig) -> DeployReport {
        let client = SshClient::from_config(config);
        deploy::run(&client, config)
    }
}

/// Machine-readable record of a completed run, dumped as JSON on the
/// diagnostic channel for post-mortem inspection of what each stage did.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub patch: PatchOutcome,
    pub publish: PublishOutcome,
    /// Waiter outcome; `None` when the stage was skipped on a clean tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<WaitOutcome>,
    pub deploy: DeployReport,
}

/// Run the full pipeline. `Ok` means the application was deployed.
pub fn run(config: &DeployConfig, stages: &mut dyn Stages) -> Result<PipelineSummary> {
    println!("🚀 Starting {} automated deployment...", config.app_id);
    let config_json = serde_json::to_string(config)?;
    log_status!("pipeline", "Deployment parameters: {}", config_json);

    let patch = stages.patch_startup_file(config)?;
    match patch {
        PatchOutcome::Unchanged => println!("✅ Health endpoint already configured"),
        PatchOutcome::Patched => println!("🔧 Health endpoint added to {}", config.startup_file),
    }

    let publish = stages.publish_changes(config)?;
    let wait = match publish {
        PublishOutcome::NoChanges => {
            println!("✅ No changes to commit, skipping build wait");
            None
        }
        PublishOutcome::Pushed => {
            println!("📝 Changes committed and pushed");
            println!("⏳ Waiting for the registry to build the new image...");
            println!("💡 This ensures the newest version reaches production");
            match stages.wait_for_build(config) {
                WaitOutcome::Ready => {
                    println!("✅ New image is ready!");
                    Some(WaitOutcome::Ready)
                }
                WaitOutcome::TimedOut => {
                    println!("❌ Build did not finish within the polling budget");
                    return Err(Error::timeout(format!(
                        "no pullable image for {} after {} seconds",
                        config.registry_ref(),
                        u64::from(config.poll_budget_ticks) * config.poll_interval_secs
                    )));
                }
            }
        }
    };

    println!("🚀 Deploying to {}...", config.server_host);
    let report = stages.deploy(config);
    if !report.success {
        println!("❌ Deployment failed!");
        println!();
        print!("{}", deploy::manual_runbook(config));
        return Err(Error::deploy(format!(
            "remote script exited with {}: {}",
            report.exit_code,
            report.stderr.trim()
        )));
    }

    println!("✅ Deployment completed successfully!");
    println!("📱 Application available at: {}", config.app_url);
    println!("🐳 Image: {}", config.registry_ref());

    let summary = PipelineSummary {
        patch,
        publish,
        wait,
        deploy: report,
    };
    let summary_json = serde_json::to_string(&summary)?;
    log_status!("pipeline", "Run summary: {}", summary_json);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStages {
        publish: PublishOutcome,
        wait: WaitOutcome,
        deploy_success: bool,
        wait_calls: u32,
        deploy_calls: u32,
    }

    impl MockStages {
        fn new(publish: PublishOutcome) -> Self {
            Self {
                publish,
                wait: WaitOutcome::Ready,
                deploy_success: true,
                wait_calls: 0,
                deploy_calls: 0,
            }
        }
    }

    impl Stages for MockStages {
        fn patch_startup_file(&mut self, _config: &DeployConfig) -> Result<PatchOutcome> {
            Ok(PatchOutcome::Unchanged)
        }

        fn publish_changes(&mut self, _config: &DeployConfig) -> Result<PublishOutcome> {
            Ok(self.publish)
        }

        fn wait_for_build(&mut self, _config: &DeployConfig) -> WaitOutcome {
            self.wait_calls += 1;
            self.wait
        }

        fn deploy(&mut self, _config: &DeployConfig) -> DeployReport {
            self.deploy_calls += 1;
            DeployReport {
                success: self.deploy_success,
                exit_code: if self.deploy_success { 0 } else { 1 },
                stdout: String::new(),
                stderr: if self.deploy_success {
                    String::new()
                } else {
                    "docker save: no such image".to_string()
                },
            }
        }
    }

    fn config() -> DeployConfig {
        DeployConfig::from_defaults()
    }

    #[test]
    fn clean_tree_skips_wait_and_deploys() {
        let mut stages = MockStages::new(PublishOutcome::NoChanges);

        let summary = run(&config(), &mut stages).unwrap();

        assert_eq!(stages.wait_calls, 0, "waiter must be skipped on a clean tree");
        assert_eq!(stages.deploy_calls, 1);
        assert!(summary.wait.is_none());
        assert_eq!(summary.publish, PublishOutcome::NoChanges);
    }

    #[test]
    fn pushed_changes_wait_before_deploying() {
        let mut stages = MockStages::new(PublishOutcome::Pushed);

        let summary = run(&config(), &mut stages).unwrap();

        assert_eq!(stages.wait_calls, 1);
        assert_eq!(stages.deploy_calls, 1);
        assert_eq!(summary.wait, Some(WaitOutcome::Ready));
    }

    #[test]
    fn summary_serializes_for_diagnostics() {
        let mut stages = MockStages::new(PublishOutcome::NoChanges);

        let summary = run(&config(), &mut stages).unwrap();
        let json = serde_json::to_string(&summary).unwrap();

        assert!(json.contains("\"patch\":\"unchanged\""));
        assert!(json.contains("\"publish\":\"no_changes\""));
        assert!(json.contains("\"success\":true"));
        // Skipped waiter stage is omitted, not serialized as null
        assert!(!json.contains("\"wait\""));
    }

    #[test]
    fn wait_timeout_stops_before_deploy() {
        let mut stages = MockStages::new(PublishOutcome::Pushed);
        stages.wait = WaitOutcome::TimedOut;

        let err = run(&config(), &mut stages).unwrap_err();

        assert_eq!(err.code(), "BUILD_TIMEOUT");
        assert_eq!(stages.deploy_calls, 0, "timeout must gate the deploy stage");
    }

    #[test]
    fn deploy_failure_surfaces_remote_stderr() {
        let mut stages = MockStages::new(PublishOutcome::NoChanges);
        stages.deploy_success = false;

        let err = run(&config(), &mut stages).unwrap_err();

        assert_eq!(err.code(), "DEPLOY_FAILED");
        assert!(err.to_string().contains("no such image"));
    }
}
