//! Build-readiness polling.
//!
//! After a push, the registry image is rebuilt by remote CI. The waiter
//! blocks at a fixed 5-second tick until a pull probe on the deployment host
//! succeeds or the 60-tick budget runs out. The first 36 ticks are a
//! warm-up: CI needs a minimum amount of time to start and build, so
//! probing earlier is wasted work.
//!
//! The clock and the probe are injected so tests drive the full state
//! machine without real sleeps or network traffic.

use std::time::Duration;

use serde::Serialize;

use crate::config::DeployConfig;
use crate::ssh::SshClient;

pub trait Clock {
    fn sleep(&mut self, duration: Duration);
}

/// Real clock: blocks the whole process, matching the sequential design.
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Readiness signal. A successful check means the freshly built image is
/// pullable on the deployment host.
pub trait Probe {
    fn check(&mut self) -> bool;
}

/// Probes readiness by attempting `docker pull` on the remote host.
/// Failure is expected while the build is still running and is non-fatal.
pub struct PullProbe<'a> {
    client: &'a SshClient,
    pull_command: String,
}

impl<'a> PullProbe<'a> {
    pub fn new(client: &'a SshClient, config: &DeployConfig) -> Self {
        Self {
            client,
            pull_command: format!("docker pull {}", config.registry_ref()),
        }
    }
}

impl Probe for PullProbe<'_> {
    fn check(&mut self) -> bool {
        // No per-invocation retry: the tick loop is the retry cadence, and
        // the client's own connection retries would add up to minutes of
        // extra sleep on a down host.
        let output = self.client.execute_once(&self.pull_command);
        if !output.success {
            log_status!("wait", "Pull probe not ready: {}", output.stderr.trim());
        }
        output.success
    }
}

/// Non-terminal phase of a polling run. Warming-up becomes probing once the
/// warm-up ticks elapse; the terminal states are [`WaitOutcome`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterPhase {
    WarmingUp,
    Probing,
}

/// Terminal result of a polling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitOutcome {
    Ready,
    TimedOut,
}

pub struct Waiter {
    interval: Duration,
    budget_ticks: u32,
    warmup_ticks: u32,
}

impl Waiter {
    pub fn from_config(config: &DeployConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.poll_interval_secs),
            budget_ticks: config.poll_budget_ticks,
            warmup_ticks: config.poll_warmup_ticks,
        }
    }

    /// Drive the polling state machine to a terminal state.
    ///
    /// Each tick sleeps one interval; once past the warm-up the probe runs
    /// after the sleep, and its first success ends the run immediately.
    pub fn run(&self, clock: &mut dyn Clock, probe: &mut dyn Probe) -> WaitOutcome {
        let interval_secs = self.interval.as_secs();
        let budget_secs = u64::from(self.budget_ticks) * interval_secs;
        let mut phase = WaiterPhase::WarmingUp;

        for tick in 0..self.budget_ticks {
            if tick >= self.warmup_ticks {
                phase = WaiterPhase::Probing;
            }

            println!(
                "🔄 Waiting for build... ({}/{}s)",
                u64::from(tick) * interval_secs,
                budget_secs
            );
            clock.sleep(self.interval);

            if phase == WaiterPhase::Probing && probe.check() {
                return WaitOutcome::Ready;
            }
        }

        WaitOutcome::TimedOut
    }
}
