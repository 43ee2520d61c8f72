use serde::Serialize;

use crate::defaults;

/// Immutable deployment parameters, constructed once at startup and passed
/// by reference to every stage.
#[derive(Debug, Clone, Serialize)]
pub struct DeployConfig {
    /// Registry image reference without tag, e.g. `ghcr.io/acme/shop`.
    pub registry_image: String,
    pub tag: String,
    /// Application identifier; doubles as the local image alias and the
    /// argument to the universal deployment tool.
    pub app_id: String,
    pub app_url: String,
    pub server_user: String,
    pub server_host: String,
    pub server_port: u16,
    /// Remote directory holding the app's image archive. Trailing slash
    /// expected, matching the universal deployment layout.
    pub server_path: String,
    pub universal_deploy_path: String,
    pub startup_file: String,
    pub repo_path: String,
    pub poll_interval_secs: u64,
    pub poll_budget_ticks: u32,
    pub poll_warmup_ticks: u32,
}

impl DeployConfig {
    pub fn from_defaults() -> Self {
        Self {
            registry_image: defaults::REGISTRY_IMAGE.to_string(),
            tag: defaults::IMAGE_TAG.to_string(),
            app_id: defaults::APP_ID.to_string(),
            app_url: defaults::APP_URL.to_string(),
            server_user: defaults::SERVER_USER.to_string(),
            server_host: defaults::SERVER_HOST.to_string(),
            server_port: defaults::SERVER_PORT,
            server_path: defaults::SERVER_PATH.to_string(),
            universal_deploy_path: defaults::UNIVERSAL_DEPLOY_PATH.to_string(),
            startup_file: defaults::STARTUP_FILE.to_string(),
            repo_path: defaults::REPO_PATH.to_string(),
            poll_interval_secs: defaults::POLL_INTERVAL_SECS,
            poll_budget_ticks: defaults::POLL_BUDGET_TICKS,
            poll_warmup_ticks: defaults::POLL_WARMUP_TICKS,
        }
    }

    /// Fully qualified registry reference, e.g. `ghcr.io/acme/shop:v1`.
    pub fn registry_ref(&self) -> String {
        format!("{}:{}", self.registry_image, self.tag)
    }

    /// Local alias the image is re-tagged under on the server.
    pub fn local_ref(&self) -> String {
        format!("{}:{}", self.app_id, self.tag)
    }

    /// Path of the serialized image archive on the server.
    pub fn archive_path(&self) -> String {
        format!("{}{}.tar", self.server_path, self.app_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeployConfig {
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
    fn registry_ref_joins_image_and_tag() {
        assert_eq!(sample().registry_ref(), "registry/app:v1");
    }

    #[test]
    fn local_ref_uses_app_id() {
        assert_eq!(sample().local_ref(), "app:v1");
    }

    #[test]
    fn archive_path_appends_app_tarball() {
        assert_eq!(sample().archive_path(), "/srv/apps/app/app.tar");
    }

    #[test]
    fn defaults_produce_consistent_references() {
        let config = DeployConfig::from_defaults();
        assert!(config.registry_ref().ends_with(&format!(":{}", config.tag)));
        assert!(config.archive_path().starts_with(&config.server_path));
    }
}
