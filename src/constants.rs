//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default filter directive when `RUST_LOG` is not set
pub const DEFAULT_RUST_LOG: &str = "info";

// =============================================================================
// REQUEST LOGGING
// =============================================================================

/// Tracing target used for access log records
pub const ACCESS_LOG_TARGET: &str = "http_request_logger::access";

/// Separator for the `LOG_SKIP_PATHS` environment variable
pub const SKIP_PATHS_SEPARATOR: char = ',';

/// Responses with a status at or above this value are logged at error severity
pub const ERROR_STATUS_THRESHOLD: u16 = 300;

/// Path substituted for an empty request path
pub const ROOT_PATH: &str = "/";

// =============================================================================
// HEADERS
// =============================================================================

/// Proxy header carrying the client address chain
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Proxy header carrying the client address
pub const X_REAL_IP: &str = "x-real-ip";
