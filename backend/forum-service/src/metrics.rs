//! Prometheus metrics for forum-service.
//!
//! RED metrics per gRPC method plus the text renderer behind `/metrics`.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, Encoder,
    HistogramVec, IntCounterVec, IntGaugeVec, TextEncoder,
};
use std::time::Instant;

lazy_static! {
    /// Completed gRPC requests by method and gRPC status code.
    pub static ref GRPC_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "forum_grpc_requests_total",
        "Total forum gRPC requests segmented by method and status code",
        &["method", "code"]
    )
    .expect("failed to register forum_grpc_requests_total");

    /// gRPC request latency in seconds.
    pub static ref GRPC_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "forum_grpc_request_duration_seconds",
        "Forum gRPC request latency in seconds",
        &["method"]
    )
    .expect("failed to register forum_grpc_request_duration_seconds");

    /// Requests currently being served.
    pub static ref GRPC_IN_FLIGHT_REQUESTS: IntGaugeVec = register_int_gauge_vec!(
        "forum_grpc_in_flight_requests",
        "Forum gRPC requests currently in flight",
        &["method"]
    )
    .expect("failed to register forum_grpc_in_flight_requests");
}

/// Tracks one gRPC call: in-flight while alive, counted on `complete`.
pub struct RequestGuard {
    method: &'static str,
    start: Instant,
}

impl RequestGuard {
    pub fn new(method: &'static str) -> Self {
        GRPC_IN_FLIGHT_REQUESTS.with_label_values(&[method]).inc();
        Self {
            method,
            start: Instant::now(),
        }
    }

    /// Record the outcome of the call.
    pub fn complete(&self, code: tonic::Code) {
        let code = format!("{:?}", code);
        GRPC_REQUESTS_TOTAL
            .with_label_values(&[self.method, code.as_str()])
            .inc();
        GRPC_REQUEST_DURATION_SECONDS
            .with_label_values(&[self.method])
            .observe(self.start.elapsed().as_secs_f64());
    }

    /// Record `Ok` or the status code carried by the error.
    pub fn complete_with<T>(&self, result: &Result<T, tonic::Status>) {
        match result {
            Ok(_) => self.complete(tonic::Code::Ok),
            Err(status) => self.complete(status.code()),
        }
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        GRPC_IN_FLIGHT_REQUESTS
            .with_label_values(&[self.method])
            .dec();
    }
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
