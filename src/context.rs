use chrono::{DateTime, Local};
use sysinfo::System;

/// Per-run facts captured once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub version: &'static str,
    pub hostname: String,
    pub now: DateTime<Local>,
}

impl RunContext {
    pub fn capture() -> Self {
        RunContext::new(detect_hostname(), Local::now())
    }

    pub fn new(hostname: impl Into<String>, now: DateTime<Local>) -> Self {
        RunContext {
            version: env!("CARGO_PKG_VERSION"),
            hostname: hostname.into(),
            now,
        }
    }
}

fn detect_hostname() -> String {
    hostname_or_unknown(System::host_name().or_else(|| std::env::var("HOSTNAME").ok()))
}

fn hostname_or_unknown(name: Option<String>) -> String {
    name.map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
