//! Structured logging for the dashboard refresh pipeline.
//!
//! Every record is one JSON line carrying a run id, a sequence number, a level
//! and a domain, so a single refresh cycle can be followed from fetch to mount.
//! Records are mirrored to stdout and to a per-run directory under `LOG_DIR`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Fetch,     // Data source requests
    Schema,    // Payload validation
    Render,    // Projection, scales, chart output
    Scheduler, // Cycle lifecycle, timer replacement
    Tooltip,   // Pointer interaction
    System,    // Startup, shutdown, server
    Profile,   // Timing scopes
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Fetch => "fetch",
            Domain::Schema => "schema",
            Domain::Render => "render",
            Domain::Scheduler => "scheduler",
            Domain::Tooltip => "tooltip",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS is a comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    events: Option<Mutex<BufWriter<File>>>,
    trace: Option<Mutex<BufWriter<File>>>,
}

fn open_log(path: PathBuf) -> Option<Mutex<BufWriter<File>>> {
    match File::create(&path) {
        Ok(f) => Some(Mutex::new(BufWriter::new(f))),
        Err(err) => {
            eprintln!("[log] failed to create {}: {}", path.display(), err);
            None
        }
    }
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("d-{}-{}", ts_epoch_ms(), process::id()));
        // Without LOG_DIR records only go to stdout.
        let Ok(base) = std::env::var("LOG_DIR") else {
            return RunContext { run_id, events: None, trace: None };
        };
        let mut run_dir = PathBuf::from(base);
        run_dir.push(&run_id);
        if let Err(err) = create_dir_all(&run_dir) {
            eprintln!("[log] failed to create run dir: {}", err);
        }
        let _ = std::fs::write(
            run_dir.join("manifest.json"),
            json!({
                "run_id": run_id,
                "ts": ts_now(),
                "pid": process::id(),
                "log_dir": run_dir.to_string_lossy(),
            })
            .to_string(),
        );

        RunContext {
            events: open_log(run_dir.join("events.jsonl")),
            trace: open_log(run_dir.join("trace.jsonl")),
            run_id,
        }
    })
}

fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["cycle", "trigger", "region", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

fn write_line(writer: &Option<Mutex<BufWriter<File>>>, line: &str) {
    if let Some(writer) = writer {
        if let Ok(mut w) = writer.lock() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Epoch milliseconds
pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    let line = build_record(level, domain.as_str(), event, fields);
    let ctx = ensure_run_context();
    match level {
        Level::Trace | Level::Debug => write_line(&ctx.trace, &line),
        _ => write_line(&ctx.events, &line),
    }
    println!("{}", line);
}

fn build_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) -> String {
    let ctx = ensure_run_context();
    let (mut top, data) = split_fields(fields);

    let msg = top.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(ctx.run_id.clone()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for (k, v) in top {
        entry.insert(k, v);
    }
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry).to_string()
}

// =============================================================================
// Refresh cycle helpers
// =============================================================================

pub fn log_cycle_start(cycle: u64, trigger: &str, source: &str) {
    log(
        Level::Debug,
        Domain::Scheduler,
        "cycle_start",
        obj(&[
            ("cycle", json!(cycle)),
            ("trigger", v_str(trigger)),
            ("source", v_str(source)),
        ]),
    );
}

pub fn log_cycle_ok(cycle: u64, trigger: &str, charts: usize, payload_digest: &str) {
    log(
        Level::Info,
        Domain::Scheduler,
        "cycle_ok",
        obj(&[
            ("cycle", json!(cycle)),
            ("trigger", v_str(trigger)),
            ("charts", json!(charts)),
            ("payload_sha256", v_str(payload_digest)),
        ]),
    );
}

pub fn log_cycle_failed(cycle: u64, trigger: &str, kind: &str, reason: &str) {
    let domain = match kind {
        "fetch" => Domain::Fetch,
        "schema" => Domain::Schema,
        _ => Domain::Render,
    };
    log(
        Level::Error,
        domain,
        "cycle_failed",
        obj(&[
            ("cycle", json!(cycle)),
            ("trigger", v_str(trigger)),
            ("kind", v_str(kind)),
            ("msg", v_str(reason)),
        ]),
    );
}

pub fn log_cycle_skipped(trigger: &str) {
    log(
        Level::Warn,
        Domain::Scheduler,
        "cycle_skipped",
        obj(&[
            ("trigger", v_str(trigger)),
            ("msg", v_str("cycle already in flight")),
        ]),
    );
}

pub fn log_timer_replaced(period_secs: u64, cancelled_previous: bool) {
    log(
        Level::Info,
        Domain::Scheduler,
        "timer_registered",
        obj(&[
            ("period_secs", json!(period_secs)),
            ("cancelled_previous", Value::Bool(cancelled_previous)),
        ]),
    );
}

/// Hex sha256 of a decoded payload, used to spot unchanged refreshes in logs.
pub fn payload_digest(payload: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Profiling scope that emits structured timing on drop.
pub struct ProfileScope {
    label: &'static str,
    context: Map<String, Value>,
    started: Instant,
}

impl ProfileScope {
    pub fn new(label: &'static str) -> Self {
        Self { label, context: Map::new(), started: Instant::now() }
    }

    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self { label, context: obj(fields), started: Instant::now() }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = std::mem::take(&mut self.context);
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_digest_is_stable() {
        let a = payload_digest(&json!({"summary": {"pre_avg": 40}}));
        let b = payload_digest(&json!({"summary": {"pre_avg": 40}}));
        let c = payload_digest(&json!({"summary": {"pre_avg": 41}}));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_record_shape() {
        let line = build_record(
            Level::Error,
            "scheduler",
            "cycle_failed",
            obj(&[("cycle", json!(3)), ("msg", v_str("boom")), ("kind", v_str("fetch"))]),
        );
        let v: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["lvl"], "ERROR");
        assert_eq!(v["cycle"], 3);
        assert_eq!(v["msg"], "boom");
        assert_eq!(v["data"]["kind"], "fetch");
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }
}
