//! # Service Status Board
//!
//! Tracks the startup state of every service and records start failures.
//!
//! ```text
//! Pending ──deps ready──→ Starting ──launch ok──→ Running
//!                             │
//!                             └────launch err───→ Failed
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

use parking_lot::RwLock;
use shared_types::ServiceId;
use tokio::sync::watch;
use tracing::info;

use crate::errors::RuntimeError;

/// Startup status of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    /// Waiting for dependencies.
    Pending,
    /// Dependencies ready, launch in progress.
    Starting,
    /// Handle resolved.
    Running,
    /// Launch failed; handle will never resolve.
    Failed,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Starting => "STARTING",
            Self::Running => "RUNNING",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Status of every service plus the reason of each failure.
pub struct ServiceStatusBoard {
    statuses: RwLock<BTreeMap<ServiceId, ServiceStatus>>,
    failures: RwLock<BTreeMap<ServiceId, String>>,
    /// Bumped on every change so waiters can re-check.
    generation: watch::Sender<u64>,
}

impl ServiceStatusBoard {
    /// Board with every service pending.
    #[must_use]
    pub fn new() -> Self {
        let statuses = ServiceId::all()
            .into_iter()
            .map(|id| (id, ServiceStatus::Pending))
            .collect();
        Self {
            statuses: RwLock::new(statuses),
            failures: RwLock::new(BTreeMap::new()),
            generation: watch::Sender::new(0),
        }
    }

    pub(crate) fn set(&self, service: ServiceId, status: ServiceStatus) {
        self.statuses.write().insert(service, status);
        self.generation.send_modify(|g| *g += 1);
    }

    pub(crate) fn record_failure(&self, service: ServiceId, reason: String) {
        self.failures.write().insert(service, reason);
        self.set(service, ServiceStatus::Failed);
    }

    #[must_use]
    pub fn status(&self, service: ServiceId) -> ServiceStatus {
        self.statuses
            .read()
            .get(&service)
            .copied()
            .unwrap_or(ServiceStatus::Pending)
    }

    /// Every recorded start failure.
    #[must_use]
    pub fn failures(&self) -> Vec<RuntimeError> {
        self.failures
            .read()
            .iter()
            .map(|(service, reason)| RuntimeError::ServiceStartFailure {
                service: *service,
                reason: reason.clone(),
            })
            .collect()
    }

    /// Number of services currently running.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.statuses
            .read()
            .values()
            .filter(|s| **s == ServiceStatus::Running)
            .count()
    }

    /// Wait until `service` reaches `status`.
    pub async fn wait_for(&self, service: ServiceId, status: ServiceStatus) {
        let mut rx = self.generation.subscribe();
        loop {
            if self.status(service) == status {
                return;
            }
            // The board owns the sender, so this only fails once the board
            // is gone.
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Human-readable status table.
    #[must_use]
    pub fn render(&self) -> String {
        let statuses = self.statuses.read();
        let failures = self.failures.read();
        let mut out = String::new();
        let _ = writeln!(out, "┌──────────────┬──────────┐");
        let _ = writeln!(out, "│ Service      │ Status   │");
        let _ = writeln!(out, "├──────────────┼──────────┤");
        for (service, status) in statuses.iter() {
            let _ = writeln!(out, "│ {:<12} │ {:<8} │", service.name(), status.to_string());
        }
        let _ = writeln!(out, "└──────────────┴──────────┘");
        for (service, reason) in failures.iter() {
            let _ = writeln!(out, "  {service}: {reason}");
        }
        out
    }

    /// Log the status table.
    pub fn log_status(&self) {
        for line in self.render().lines() {
            info!("[bootstrap] {}", line);
        }
    }
}

impl Default for ServiceStatusBoard {
    fn default() -> Self {
        Self::new()
    }
}
