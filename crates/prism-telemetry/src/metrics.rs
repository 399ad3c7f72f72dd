//! Metric names and the engine's instrument set

use std::time::Instant;

use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram};

pub const BACKEND_CALL_DURATION: &str = "prism.backend.call.duration";
pub const ORCHESTRATION_TURNS: &str = "prism.orchestration.turns";
pub const TOOL_CALL_COUNT: &str = "prism.tool.call.count";
pub const TOOL_REPAIR_DROPPED: &str = "prism.tool_repair.dropped";
pub const EXTRACTION_FAILURE: &str = "prism.extraction.failure";
pub const STREAM_DOWNGRADE: &str = "prism.stream.downgrade";

/// Instruments recorded by the normalization and orchestration engine
///
/// Created from the global meter, so with no exporter installed every
/// recording is a no-op.
#[derive(Clone)]
pub struct EngineMetrics {
    backend_duration: Histogram<f64>,
    turns: Histogram<u64>,
    tool_calls: Counter<u64>,
    repair_dropped: Counter<u64>,
    extraction_failures: Counter<u64>,
    downgrades: Counter<u64>,
}

impl EngineMetrics {
    pub fn new() -> Self {
        let meter = global::meter("prism");

        Self {
            backend_duration: meter
                .f64_histogram(BACKEND_CALL_DURATION)
                .with_unit("s")
                .with_description("Duration of one backend completion call")
                .build(),
            turns: meter
                .u64_histogram(ORCHESTRATION_TURNS)
                .with_description("Backend calls needed to answer one request")
                .build(),
            tool_calls: meter
                .u64_counter(TOOL_CALL_COUNT)
                .with_description("Tool executions by outcome")
                .build(),
            repair_dropped: meter
                .u64_counter(TOOL_REPAIR_DROPPED)
                .with_description("Tool calls dropped as unrepairable")
                .build(),
            extraction_failures: meter
                .u64_counter(EXTRACTION_FAILURE)
                .with_description("Backend responses without usable content")
                .build(),
            downgrades: meter
                .u64_counter(STREAM_DOWNGRADE)
                .with_description("Streaming requests answered non-streamed")
                .build(),
        }
    }

    pub fn record_backend_call(&self, backend: &'static str, start: Instant, outcome: &'static str) {
        self.backend_duration.record(
            start.elapsed().as_secs_f64(),
            &[KeyValue::new("backend", backend), KeyValue::new("outcome", outcome)],
        );
    }

    pub fn record_turns(&self, turns: u32) {
        self.turns.record(u64::from(turns), &[]);
    }

    pub fn record_tool_call(&self, tool: &str, outcome: &'static str) {
        self.tool_calls.add(
            1,
            &[KeyValue::new("tool", tool.to_owned()), KeyValue::new("outcome", outcome)],
        );
    }

    pub fn record_repair_dropped(&self, count: usize) {
        if count > 0 {
            self.repair_dropped.add(u64::try_from(count).unwrap_or(u64::MAX), &[]);
        }
    }

    pub fn record_extraction_failure(&self, backend: &'static str) {
        self.extraction_failures.add(1, &[KeyValue::new("backend", backend)]);
    }

    pub fn record_downgrade(&self, protocol: &'static str) {
        self.downgrades.add(1, &[KeyValue::new("protocol", protocol)]);
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
