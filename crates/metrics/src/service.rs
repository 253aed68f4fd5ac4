use laponia_models::ChatError;
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Registry, TextEncoder};
use tracing::{debug, instrument};

pub struct MetricsService {
    registry: Registry,
    messages_total: Counter,
    knowledge_saves_total: Counter,
    knowledge_lookups_total: Counter,
    completion_errors_total: Counter,
    completion_duration_ms: Histogram,
}

fn internal(e: prometheus::Error) -> ChatError {
    ChatError::Internal {
        reason: e.to_string(),
    }
}

impl MetricsService {
    pub fn new() -> Result<Self, ChatError> {
        let registry = Registry::new();

        let messages_total = Counter::new(
            "laponia_messages_total",
            "Total number of chat messages handled",
        )
        .map_err(internal)?;

        let knowledge_saves_total = Counter::new(
            "laponia_knowledge_saves_total",
            "Total number of /salvar commands stored",
        )
        .map_err(internal)?;

        let knowledge_lookups_total = Counter::new(
            "laponia_knowledge_lookups_total",
            "Total number of /recuperar commands answered",
        )
        .map_err(internal)?;

        let completion_errors_total = Counter::new(
            "laponia_completion_errors_total",
            "Total number of failed chat completions",
        )
        .map_err(internal)?;

        let completion_duration_ms = Histogram::with_opts(
            HistogramOpts::new(
                "laponia_completion_duration_ms",
                "Chat completion round-trip duration in milliseconds",
            )
            .buckets(vec![
                50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0,
            ]),
        )
        .map_err(internal)?;

        registry
            .register(Box::new(messages_total.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(knowledge_saves_total.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(knowledge_lookups_total.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(completion_errors_total.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(completion_duration_ms.clone()))
            .map_err(internal)?;

        Ok(Self {
            registry,
            messages_total,
            knowledge_saves_total,
            knowledge_lookups_total,
            completion_errors_total,
            completion_duration_ms,
        })
    }

    pub fn record_message(&self) {
        self.messages_total.inc();
    }

    pub fn record_knowledge_save(&self) {
        self.knowledge_saves_total.inc();
    }

    pub fn record_knowledge_lookup(&self) {
        self.knowledge_lookups_total.inc();
    }

    #[instrument(skip(self))]
    pub fn record_completion_error(&self, error_type: &str) {
        self.completion_errors_total.inc();
        debug!("Recorded completion error");
    }

    pub fn record_completion_duration(&self, duration_ms: f64) {
        self.completion_duration_ms.observe(duration_ms);
    }

    pub fn get_prometheus_metrics(&self) -> Result<String, ChatError> {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();

        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(internal)?;

        String::from_utf8(buffer).map_err(|e| ChatError::Internal {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposition_contains_all_series() {
        let metrics = MetricsService::new().unwrap();
        metrics.record_message();
        metrics.record_message();
        metrics.record_knowledge_save();
        metrics.record_completion_duration(120.0);

        let text = metrics.get_prometheus_metrics().unwrap();
        assert!(text.contains("laponia_messages_total 2"));
        assert!(text.contains("laponia_knowledge_saves_total 1"));
        assert!(text.contains("laponia_knowledge_lookups_total 0"));
        assert!(text.contains("laponia_completion_errors_total 0"));
        assert!(text.contains("laponia_completion_duration_ms_count 1"));
    }

    #[test]
    fn services_do_not_share_registries() {
        let a = MetricsService::new().unwrap();
        let b = MetricsService::new().unwrap();
        a.record_completion_error("CompletionError");

        assert!(a
            .get_prometheus_metrics()
            .unwrap()
            .contains("laponia_completion_errors_total 1"));
        assert!(b
            .get_prometheus_metrics()
            .unwrap()
            .contains("laponia_completion_errors_total 0"));
    }
}
