use std::net::SocketAddr;

use anyhow::{Context, Result};
use metrics::{counter, histogram, Counter, Histogram};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use xaas_core::ReplyStatus;

/// Initialize the tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        "pretty" => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
        _ => {
            return Err(anyhow::anyhow!("不支持的日志格式: {log_format}"));
        }
    }

    Ok(())
}

/// Install the Prometheus exporter with an HTTP listener
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(bind_address: &str) -> Result<()> {
    let addr: SocketAddr = bind_address
        .parse()
        .with_context(|| format!("无效的指标监听地址: {bind_address}"))?;

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    info!("Prometheus metrics exporter listening on {addr}");
    Ok(())
}

/// Metrics for the request dispatch path
pub struct DispatchMetrics {
    replies_ok: Counter,
    replies_bad_request: Counter,
    replies_not_found: Counter,
    replies_internal_error: Counter,
    requests_dropped: Counter,
    publish_failures: Counter,
    dispatch_duration: Histogram,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self {
            replies_ok: counter!("xaas_requests_total", "status" => "200"),
            replies_bad_request: counter!("xaas_requests_total", "status" => "400"),
            replies_not_found: counter!("xaas_requests_total", "status" => "404"),
            replies_internal_error: counter!("xaas_requests_total", "status" => "500"),
            requests_dropped: counter!("xaas_requests_dropped_total"),
            publish_failures: counter!("xaas_reply_publish_failures_total"),
            dispatch_duration: histogram!("xaas_dispatch_duration_seconds"),
        }
    }

    /// Record a reply produced by the dispatcher
    pub fn record_reply(&self, status: ReplyStatus, duration_seconds: f64) {
        match status {
            ReplyStatus::Ok => self.replies_ok.increment(1),
            ReplyStatus::BadRequest => self.replies_bad_request.increment(1),
            ReplyStatus::NotFound => self.replies_not_found.increment(1),
            ReplyStatus::InternalError => self.replies_internal_error.increment(1),
        }
        self.dispatch_duration.record(duration_seconds);
    }

    /// Record a delivery that could not be answered
    pub fn record_dropped(&self) {
        self.requests_dropped.increment(1);
    }

    /// Record a reply that failed to reach the broker
    pub fn record_publish_failure(&self) {
        self.publish_failures.increment(1);
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}
