//! Deployment constants.
//!
//! There is deliberately no config file, environment lookup, or CLI flag
//! layer: this tool deploys exactly one application to exactly one host.
//! `DeployConfig::from_defaults()` snapshots these values at startup so the
//! stages themselves never read globals.

/// Image reference in the container registry (without tag).
pub const REGISTRY_IMAGE: &str = "ghcr.io/xxlewi/optimalyblueprint";

/// Tag built by CI for this application.
pub const IMAGE_TAG: &str = "knihovna";

/// Application identifier passed to the universal deployment tool.
pub const APP_ID: &str = "knihovna";

/// Public URL printed after a successful deployment.
pub const APP_URL: &str = "https://knihovna.optimaly.net";

pub const SERVER_USER: &str = "lewi";
pub const SERVER_HOST: &str = "147.93.120.231";
pub const SERVER_PORT: u16 = 22;

/// Directory on the server that holds this app's image archive.
pub const SERVER_PATH: &str = "/srv/docker/OptimalyDocker/apps/knihovna/";

/// Directory containing the second-stage universal deployment tool.
pub const UNIVERSAL_DEPLOY_PATH: &str = "/srv/docker/OptimalyDocker/";

/// Startup source file that must carry the health-check registration.
pub const STARTUP_FILE: &str = "OptimalyBlueprint/Program.cs";

/// Repository root for the publish stage.
pub const REPO_PATH: &str = ".";

/// Build-readiness polling: one tick every 5 seconds, 60 ticks total
/// (5 minutes), with the first 36 ticks (3 minutes) spent waiting for CI
/// to warm up before the first pull probe. Probes run on the SSH client's
/// non-retrying path, so the wall-clock budget stays at ticks * interval
/// plus per-probe connect time.
pub const POLL_INTERVAL_SECS: u64 = 5;
pub const POLL_BUDGET_TICKS: u32 = 60;
pub const POLL_WARMUP_TICKS: u32 = 36;
