//! HTTP middleware

mod body;
pub mod logging;
pub mod record;
pub mod sink;

pub use logging::{logging_middleware, RequestLogger, RequestLoggerConfig};
pub use record::{normalize_path, RequestRecord};
pub use sink::{Emission, LogSink, MemorySink, Severity, TracingSink};
