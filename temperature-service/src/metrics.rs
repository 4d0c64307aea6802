use crate::errors::Result;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "temperature_requests_total",
            "Temperature API operations by outcome"
        ),
        &["operation", "outcome"]
    )
    .expect("requests metric definition is valid");
    pub static ref STORAGE_ERRORS_TOTAL: IntCounter = IntCounter::with_opts(Opts::new(
        "temperature_storage_errors_total",
        "Unexpected storage failures surfaced as internal errors"
    ))
    .expect("storage errors metric definition is valid");
}

pub fn init_metrics() -> Result<()> {
    REGISTRY.register(Box::new(REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STORAGE_ERRORS_TOTAL.clone()))?;
    Ok(())
}

pub fn record_outcome(operation: &str, outcome: &str) {
    REQUESTS_TOTAL.with_label_values(&[operation, outcome]).inc();
}

pub fn gather_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_metrics_are_exported() {
        init_metrics().unwrap();
        record_outcome("get_by_id", "not_found");
        STORAGE_ERRORS_TOTAL.inc();

        let text = gather_metrics().unwrap();

        assert!(text.contains("temperature_requests_total"));
        assert!(text.contains("operation=\"get_by_id\""));
        assert!(text.contains("temperature_storage_errors_total"));
    }
}
