//! Prometheus metrics for the wallet runtime.
//!
//! All metrics follow the naming convention: `wallet_<component>_<metric>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., actions_dispatched_total)
//! - **Gauge**: Value that can go up or down (e.g., replicas_attached)

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // STORE METRICS
    // =========================================================================

    /// Actions applied by the canonical store, by kind
    pub static ref ACTIONS_DISPATCHED: IntCounterVec = IntCounterVec::new(
        Opts::new("wallet_store_actions_dispatched_total", "Actions applied by the canonical store"),
        &["kind"]
    ).expect("metric creation failed");

    /// Latest store version
    pub static ref STORE_VERSION: IntGauge = IntGauge::new(
        "wallet_store_version",
        "Number of dispatches applied by the canonical store"
    ).expect("metric creation failed");

    // =========================================================================
    // BRIDGE METRICS
    // =========================================================================

    /// Domain events translated into actions
    pub static ref EVENTS_BRIDGED: IntCounterVec = IntCounterVec::new(
        Opts::new("wallet_bridge_events_bridged_total", "Domain events translated into store actions"),
        &["service", "event"]
    ).expect("metric creation failed");

    /// Domain events with no route for their owning service
    pub static ref EVENTS_UNROUTED: IntCounterVec = IntCounterVec::new(
        Opts::new("wallet_bridge_events_unrouted_total", "Domain events ignored for lack of a route"),
        &["service", "event"]
    ).expect("metric creation failed");

    /// Intents whose service call failed
    pub static ref INTENT_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("wallet_bridge_intent_failures_total", "Intent service calls that failed"),
        &["intent"]
    ).expect("metric creation failed");

    // =========================================================================
    // GATEWAY METRICS
    // =========================================================================

    /// Snapshots written to durable storage
    pub static ref SNAPSHOTS_PERSISTED: IntCounter = IntCounter::new(
        "wallet_gateway_snapshots_persisted_total",
        "State snapshots written to durable storage"
    ).expect("metric creation failed");

    /// Persistence failures by stage (hydrate, encode, write)
    pub static ref PERSISTENCE_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("wallet_gateway_persistence_failures_total", "Persistence failures by stage"),
        &["stage"]
    ).expect("metric creation failed");

    /// Messages sent to replicas, by message type
    pub static ref REPLICA_MESSAGES_SENT: IntCounterVec = IntCounterVec::new(
        Opts::new("wallet_gateway_replica_messages_sent_total", "Messages sent to replicas"),
        &["type"]
    ).expect("metric creation failed");

    /// Replica messages dropped, by reason
    pub static ref REPLICA_MESSAGES_DROPPED: IntCounterVec = IntCounterVec::new(
        Opts::new("wallet_gateway_replica_messages_dropped_total", "Replica messages dropped"),
        &["reason"]
    ).expect("metric creation failed");

    /// Currently attached replicas
    pub static ref REPLICAS_ATTACHED: IntGauge = IntGauge::new(
        "wallet_gateway_replicas_attached",
        "Number of attached replicas"
    ).expect("metric creation failed");

    // =========================================================================
    // BOOTSTRAP METRICS
    // =========================================================================

    /// Services that failed to start
    pub static ref SERVICE_START_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("wallet_bootstrap_service_start_failures_total", "Service launches that failed"),
        &["service"]
    ).expect("metric creation failed");

    /// Services currently running
    pub static ref SERVICES_RUNNING: IntGauge = IntGauge::new(
        "wallet_bootstrap_services_running",
        "Number of services whose handle has resolved"
    ).expect("metric creation failed");
}

/// Handle to the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Store
        Box::new(ACTIONS_DISPATCHED.clone()),
        Box::new(STORE_VERSION.clone()),
        // Bridge
        Box::new(EVENTS_BRIDGED.clone()),
        Box::new(EVENTS_UNROUTED.clone()),
        Box::new(INTENT_FAILURES.clone()),
        // Gateway
        Box::new(SNAPSHOTS_PERSISTED.clone()),
        Box::new(PERSISTENCE_FAILURES.clone()),
        Box::new(REPLICA_MESSAGES_SENT.clone()),
        Box::new(REPLICA_MESSAGES_DROPPED.clone()),
        Box::new(REPLICAS_ATTACHED.clone()),
        // Bootstrap
        Box::new(SERVICE_START_FAILURES.clone()),
        Box::new(SERVICES_RUNNING.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
