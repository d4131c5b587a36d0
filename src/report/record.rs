//! Trace record assembly.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::capture::LogEntry;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 6;

/// Everything reported about one traced request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceRecord {
    pub trace_id: String,
    pub method: String,
    pub endpoint: String,
    pub status: u16,
    pub response_time_ms: u64,
    pub logs: Vec<LogEntry>,
}

impl TraceRecord {
    pub fn new(
        method: String,
        endpoint: String,
        status: u16,
        response_time_ms: u64,
        logs: Vec<LogEntry>,
    ) -> Self {
        Self {
            trace_id: new_trace_id(),
            method,
            endpoint,
            status,
            response_time_ms,
            logs,
        }
    }
}

/// `<unix millis>-<6 random base36 chars>`.
pub fn new_trace_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();

    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();

    format!("{}-{}", millis, suffix)
}
