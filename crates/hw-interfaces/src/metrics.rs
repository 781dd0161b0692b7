use crate::HwError;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Clone)]
pub struct IoMetrics {
    pub points_registered: IntCounter,
    pub points_cleared: IntCounter,
    pub values_written: IntCounter,
    pub writes_dropped: IntCounter,
    pub objects_tracked: IntGauge,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub io: IoMetrics,
}

fn counter(name: &str, help: &str) -> Result<IntCounter, HwError> {
    IntCounter::new(name, help).map_err(|e| HwError::Metrics(format!("metrics init error: {e}")))
}

impl MetricsHub {
    pub fn new() -> Result<Self, HwError> {
        let registry = Registry::new();
        let io = IoMetrics {
            points_registered: counter(
                "hwi_points_registered_total",
                "IO point registrations that resolved an object",
            )?,
            points_cleared: counter(
                "hwi_points_cleared_total",
                "Value records removed by reconciliation",
            )?,
            values_written: counter(
                "hwi_values_written_total",
                "Values written to registered points",
            )?,
            writes_dropped: counter(
                "hwi_writes_dropped_total",
                "Writes ignored for unresolved objects or unregistered points",
            )?,
            objects_tracked: IntGauge::new(
                "hwi_objects_tracked",
                "Distinct interface/object pairs in the registry",
            )
            .map_err(|e| HwError::Metrics(format!("metrics init error: {e}")))?,
        };
        let _ = registry.register(Box::new(io.points_registered.clone()));
        let _ = registry.register(Box::new(io.points_cleared.clone()));
        let _ = registry.register(Box::new(io.values_written.clone()));
        let _ = registry.register(Box::new(io.writes_dropped.clone()));
        let _ = registry.register(Box::new(io.objects_tracked.clone()));
        Ok(Self { registry, io })
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
