//! Console logging.
//!
//! `init` installs `env_logger` with an `info` default (override with `RUST_LOG`).
//! Request bodies are only ever logged through [`redact`], and handlers report how
//! long they took with [`Timer`].

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

const MASK: &str = "********";
const SENSITIVE_KEYS: [&str; 4] = ["password", "password_hash", "token", "authorization"];

pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Returns a copy of `value` with every sensitive key masked, at any depth.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| {
                    let masked = if SENSITIVE_KEYS.contains(&key.to_ascii_lowercase().as_str()) {
                        Value::String(MASK.to_string())
                    } else {
                        redact(inner)
                    };
                    (key.clone(), masked)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

/// Serializes `body` and redacts it, for debug logging.
pub fn redacted<T: Serialize>(body: &T) -> Value {
    serde_json::to_value(body)
        .map(|value| redact(&value))
        .unwrap_or(Value::Null)
}

/// Measures one handler operation.
pub struct Timer {
    operation: &'static str,
    started: Instant,
}

impl Timer {
    /// Logs the start of `operation`, with the acting user when there is one.
    pub fn start(operation: &'static str, user_id: Option<Uuid>) -> Self {
        match user_id {
            Some(id) => log::info!("[user {}] {} started", id, operation),
            None => log::info!("{} started", operation),
        }
        Self {
            operation,
            started: Instant::now(),
        }
    }

    pub fn finish(self, user_id: Uuid) {
        log::info!(
            "[user {}] {} completed in {:.2}ms",
            user_id,
            self.operation,
            self.started.elapsed().as_secs_f64() * 1000.0
        );
    }
}
