//! Aggregated health check reporting.
//!
//! Pings every downstream system the service depends on and produces
//! a unified [`DaemonHealth`] report. The overall status is the worst
//! status among all components.
//!
//! # Aggregation Rule
//!
//! - All Healthy -> Healthy
//! - Any Degraded, none Unhealthy -> Degraded(reason)
//! - Any Unhealthy -> Unhealthy(reason)

use std::time::Instant;

use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use smoketest_core::types::HealthStatus;
use smoketest_engine::DownstreamClient;

/// Aggregated health report for the entire service.
#[derive(Debug, Clone, Serialize)]
pub struct DaemonHealth {
    /// Overall status (worst of all components).
    pub status: HealthStatus,
    /// Uptime in seconds since start.
    pub uptime_secs: u64,
    /// Per-component health reports.
    pub components: Vec<ComponentHealth>,
}

impl DaemonHealth {
    /// Build a report from component results.
    pub fn new(started: Instant, components: Vec<ComponentHealth>) -> Self {
        Self {
            status: aggregate_status(&components),
            uptime_secs: started.elapsed().as_secs(),
            components,
        }
    }
}

/// Health status for a single downstream component.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    /// Component name (e.g., "community-api", "oauth").
    pub name: String,
    /// Current health status of the component.
    pub status: HealthStatus,
}

/// Aggregate multiple component health statuses into a single status.
///
/// Returns the worst status found: Unhealthy > Degraded > Healthy.
pub fn aggregate_status(components: &[ComponentHealth]) -> HealthStatus {
    let mut worst = HealthStatus::Healthy;
    let mut reasons = Vec::new();

    for component in components {
        match &component.status {
            HealthStatus::Healthy => {}
            HealthStatus::Degraded(reason) => {
                if !worst.is_unhealthy() {
                    reasons.push(format!("{}: {}", component.name, reason));
                    worst = HealthStatus::Degraded(String::new());
                }
            }
            HealthStatus::Unhealthy(reason) => {
                reasons.push(format!("{}: {}", component.name, reason));
                worst = HealthStatus::Unhealthy(String::new());
            }
        }
    }

    match worst {
        HealthStatus::Healthy => HealthStatus::Healthy,
        HealthStatus::Degraded(_) => HealthStatus::Degraded(reasons.join("; ")),
        HealthStatus::Unhealthy(_) => HealthStatus::Unhealthy(reasons.join("; ")),
    }
}

/// Ping every health target of `client` concurrently.
///
/// Unreachable components are reported as Unhealthy with the error text.
pub async fn check_components<C: DownstreamClient>(client: &C) -> Vec<ComponentHealth> {
    let targets = client.health_targets();
    let results = join_all(targets.iter().map(|target| client.ping(target))).await;

    targets
        .into_iter()
        .zip(results)
        .map(|(name, result)| {
            let status = match result {
                Ok(()) => HealthStatus::Healthy,
                Err(e) => {
                    warn!(component = %name, error = %e, "downstream health check failed");
                    HealthStatus::Unhealthy(e.to_string())
                }
            };
            ComponentHealth { name, status }
        })
        .collect()
}
