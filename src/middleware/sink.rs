//! Destinations for access log records

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use super::record::RequestRecord;
use crate::constants::{ACCESS_LOG_TARGET, ERROR_STATUS_THRESHOLD};

/// Severity of an access log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

impl Severity {
    /// Any status at or above 300, redirects included, is an error
    pub fn for_status(status: u16) -> Self {
        if status >= ERROR_STATUS_THRESHOLD {
            Self::Error
        } else {
            Self::Info
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Receives one call per logged request
#[cfg_attr(test, mockall::automock)]
pub trait LogSink: Send + Sync {
    fn emit(&self, record: &RequestRecord, severity: Severity, message: &str);
}

/// Forwards records to the global `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! access_event {
    ($level:ident, $record:expr, $message:expr) => {
        tracing::$level!(
            target: ACCESS_LOG_TARGET,
            remote_ip = %$record.remote_ip,
            status = $record.status,
            host = %$record.host,
            uri = %$record.uri,
            user_agent = %$record.user_agent,
            method = %$record.method,
            path = %$record.path,
            protocol = %$record.protocol,
            referer = %$record.referer,
            latency = $record.latency,
            latency_human = %$record.latency_human,
            bytes_in = %$record.bytes_in.as_deref().unwrap_or_default(),
            bytes_out = $record.bytes_out,
            "{}",
            $message
        )
    };
}

impl LogSink for TracingSink {
    fn emit(&self, record: &RequestRecord, severity: Severity, message: &str) {
        match severity {
            Severity::Info => access_event!(info, record, message),
            Severity::Error => access_event!(error, record, message),
        }
    }
}

/// A single captured `emit` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub record: RequestRecord,
    pub severity: Severity,
    pub message: String,
}

/// Keeps every emitted record in memory.
///
/// Clones share the same buffer, so a clone can be handed to the logger while
/// the original is used to inspect what was emitted.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    emissions: Arc<Mutex<Vec<Emission>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn emissions(&self) -> Vec<Emission> {
        self.emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: &RequestRecord, severity: Severity, message: &str) {
        self.emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Emission {
                record: record.clone(),
                severity,
                message: message.to_string(),
            });
    }
}
