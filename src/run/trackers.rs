//! Collaborators that follow deployed resources
//!
//! Log streaming, port forwarding and status polling live outside the
//! deployer. Each only needs to learn which resources exist, so here they are
//! plain registries the surrounding tool reads from.

use super::name::RunResourceName;

/// Resources whose logs should be streamed
#[derive(Debug, Clone, Default)]
pub struct LogAggregator {
    run_id: String,
    resources: Vec<RunResourceName>,
}

impl LogAggregator {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            resources: Vec::new(),
        }
    }

    pub fn add_resource(&mut self, name: RunResourceName) {
        tracing::debug!(run_id = %self.run_id, "streaming logs for {}", name);
        self.resources.push(name);
    }

    pub fn resources(&self) -> &[RunResourceName] {
        &self.resources
    }
}

/// Services that can be port-forwarded to
///
/// Jobs never reach this list: they run to completion and serve no traffic.
#[derive(Debug, Clone, Default)]
pub struct RunAccessor {
    run_id: String,
    resources: Vec<RunResourceName>,
}

impl RunAccessor {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            resources: Vec::new(),
        }
    }

    pub fn add_resource(&mut self, name: RunResourceName) {
        tracing::debug!(run_id = %self.run_id, "accessor tracking {}", name);
        self.resources.push(name);
    }

    pub fn resources(&self) -> &[RunResourceName] {
        &self.resources
    }
}

/// Resources whose rollout status is watched
#[derive(Debug, Clone, Default)]
pub struct StatusMonitor {
    resources: Vec<RunResourceName>,
}

impl StatusMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_resource(&mut self, name: RunResourceName) {
        tracing::debug!("monitoring {}", name);
        self.resources.push(name);
    }

    pub fn resources(&self) -> &[RunResourceName] {
        &self.resources
    }
}
