pub mod service;
pub mod tracing;

pub use service::MetricsService;
pub use crate::tracing::TracingService;
