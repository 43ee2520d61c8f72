//! Remote deployment over a single SSH invocation.
//!
//! The whole deployment runs as one semicolon-joined script on the server:
//! pull the freshly built image, re-tag it under the local alias, archive it
//! where the universal deployment tool expects it, run that tool
//! auto-confirmed, and prune dangling images. Success is the exit status of
//! the one invocation; the captured stderr is the only window into a
//! failure deep in the chain, so on failure a numbered manual runbook with
//! the same steps is printed for the operator.

use serde::Serialize;

use crate::config::DeployConfig;
use crate::ssh::SshClient;
use crate::utils::shell;

#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Build the composite remote script, sub-commands in deployment order.
///
/// Pull and tag are non-fatal (`|| echo`): when the registry is
/// unreachable the deployment falls back to whatever image already exists
/// on the host. Everything after runs unconditionally; the script's exit
/// status is that of its last command.
pub fn build_remote_script(config: &DeployConfig) -> String {
    let registry_ref = config.registry_ref();
    let local_ref = config.local_ref();

    let steps = [
        "echo 'Pulling latest image from registry...'".to_string(),
        format!(
            "docker pull {} || echo 'Pull failed, using local build'",
            shell::quote_arg(&registry_ref)
        ),
        "echo 'Tagging image for local use...'".to_string(),
        format!(
            "docker tag {} {} || echo 'Tag failed, keeping local image'",
            shell::quote_arg(&registry_ref),
            shell::quote_arg(&local_ref)
        ),
        format!("mkdir -p {}", shell::quote_path(&config.server_path)),
        "echo 'Saving image archive...'".to_string(),
        format!(
            "docker save {} > {}",
            shell::quote_arg(&local_ref),
            shell::quote_path(&config.archive_path())
        ),
        format!("cd {}", shell::quote_path(&config.universal_deploy_path)),
        "echo 'Running universal deployment...'".to_string(),
        format!(
            "echo 'y' | python3 deploy_universal.py {}",
            shell::quote_arg(&config.app_id)
        ),
        "echo 'Cleaning up unused images...'".to_string(),
        "docker system prune -f".to_string(),
        "echo 'Deployment completed!'".to_string(),
    ];

    steps.join("; ")
}

/// Execute the composite script on the deployment host.
pub fn run(client: &SshClient, config: &DeployConfig) -> DeployReport {
    let script = build_remote_script(config);
    log_status!("deploy", "Executing remote script on {}", client.host);

    let output = client.execute(&script);
    if !output.success {
        log_status!(
            "deploy",
            "Remote script failed (exit {}): {}",
            output.exit_code,
            output.stderr.trim()
        );
    }

    DeployReport {
        success: output.success,
        exit_code: output.exit_code,
        stdout: output.stdout,
        stderr: output.stderr,
    }
}

/// Manual recovery steps mirroring the remote script, for the operator to
/// run by hand after a failed deployment.
pub fn manual_runbook(config: &DeployConfig) -> String {
    format!(
        "📝 Manual deployment steps:\n\
         \n\
         1. SSH to the server:\n   ssh {user}@{host}\n\
         2. Navigate to the deployment directory:\n   cd {path}\n\
         3. Pull the latest image from the registry:\n   docker pull {registry}\n\
         4. Tag the image for local use:\n   docker tag {registry} {local}\n\
         5. Save the image archive:\n   mkdir -p {path} && docker save {local} > {archive}\n\
         6. Run the universal deployment:\n   cd {universal} && echo 'y' | python3 deploy_universal.py {app}\n\
         7. Clean up unused images:\n   docker system prune -f\n\
         \n\
         💡 Note: the image is automatically built and pushed to the registry on every commit to master!\n",
        user = config.server_user,
        host = config.server_host,
        path = config.server_path,
        registry = config.registry_ref(),
        local = config.local_ref(),
        archive = config.archive_path(),
        universal = config.universal_deploy_path,
        app = config.app_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeployConfig {
        DeployConfig {
            registry_image: "registry/app".to_string(),
            tag: "v1".to_string(),
            app_id: "app".to_string(),
            app_url: "https://app.example.com".to_string(),
            server_user: "deploy".to_string(),
            server_host: "10.0.0.5".to_string(),
            server_port: 22,
            server_path: "/srv/apps/app/".to_string(),
            universal_deploy_path: "/srv/apps/".to_string(),
            startup_file: "App/Program.cs".to_string(),
            repo_path: ".".to_string(),
            poll_interval_secs: 5,
            poll_budget_ticks: 60,
            poll_warmup_ticks: 36,
        }
    }

    #[test]
    fn script_steps_appear_in_deployment_order() {
        let script = build_remote_script(&config());

        let pull = script.find("docker pull registry/app:v1").unwrap();
        let tag = script.find("docker tag registry/app:v1 app:v1").unwrap();
        let mkdir = script.find("mkdir -p '/srv/apps/app/'").unwrap();
        let save = script
            .find("docker save app:v1 > '/srv/apps/app/app.tar'")
            .unwrap();
        let universal = script
            .find("echo 'y' | python3 deploy_universal.py app")
            .unwrap();
        let prune = script.find("docker system prune -f").unwrap();

        assert!(pull < tag);
        assert!(tag < mkdir);
        assert!(mkdir < save);
        assert!(save < universal);
        assert!(universal < prune);
    }

    #[test]
    fn pull_and_tag_are_non_fatal() {
        let script = build_remote_script(&config());
        assert!(script.contains("docker pull registry/app:v1 || echo 'Pull failed"));
        assert!(script.contains("|| echo 'Tag failed"));
    }

    #[test]
    fn script_is_one_semicolon_joined_line() {
        let script = build_remote_script(&config());
        assert!(!script.contains('\n'));
        assert!(script.contains("; "));
    }

    #[test]
    fn runbook_numbers_every_recovery_step() {
        let runbook = manual_runbook(&config());

        for step in 1..=7 {
            assert!(runbook.contains(&format!("{}. ", step)), "missing step {}", step);
        }
        assert!(runbook.contains("ssh deploy@10.0.0.5"));
        assert!(runbook.contains("docker pull registry/app:v1"));
        assert!(runbook.contains("docker save app:v1 > /srv/apps/app/app.tar"));
        assert!(runbook.contains("deploy_universal.py app"));
    }

    #[test]
    fn runbook_ends_with_rebuild_note() {
        let runbook = manual_runbook(&config());
        let note = runbook
            .find("built and pushed to the registry on every commit to master")
            .expect("runbook must explain where fresh images come from");
        let last_step = runbook.find("docker system prune -f").unwrap();
        assert!(last_step < note, "note belongs after the recovery steps");
    }
}
