//! Testing utilities for the Fibery lifecycle workspace
//!
//! Shared transports, log sinks and fixtures.

#![allow(missing_docs)]

use fibery_client::{
    IdentityKeys, LogSink, Record, RemoteResponse, Transport, TransportError,
};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Result<RemoteResponse, TransportError>>,
    calls: Vec<Value>,
}

/// Transport that answers from a queue and records every payload
///
/// Clones share the same queue and call log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply with `status` and raw `body`
    #[must_use]
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.script
            .lock()
            .replies
            .push_back(Ok(RemoteResponse::new(status, body)));
        self
    }

    /// Queue a 200 reply with a JSON body
    #[must_use]
    pub fn respond_json(self, body: &Value) -> Self {
        self.respond(200, body.to_string())
    }

    /// Queue a transport failure
    #[must_use]
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .replies
            .push_back(Err(TransportError::Send(message.into())));
        self
    }

    /// Every payload posted so far
    pub fn calls(&self) -> Vec<Value> {
        self.script.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().calls.len()
    }

    /// Wire name of the first command of each call
    pub fn command_names(&self) -> Vec<String> {
        self.script
            .lock()
            .calls
            .iter()
            .map(|call| {
                let first = &call[0];
                match first["command"].as_str() {
                    Some("fibery.schema/batch") => first["args"]["commands"][0]["command"]
                        .as_str()
                        .unwrap_or("fibery.schema/batch")
                        .to_string(),
                    Some(name) => name.to_string(),
                    None => String::from("?"),
                }
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, payload: &Value) -> Result<RemoteResponse, TransportError> {
        let mut script = self.script.lock();
        script.calls.push(payload.clone());
        script
            .replies
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Send("no scripted reply".to_string())))
    }
}

/// Severity recorded by `RecordingLog`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Success,
}

/// Log sink that keeps every line in memory
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<(Level, String)>>,
}

impl RecordingLog {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().clone()
    }

    /// Any line at `level` containing `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines
            .lock()
            .iter()
            .any(|(l, line)| *l == level && line.contains(needle))
    }

    pub fn count(&self, level: Level) -> usize {
        self.lines.lock().iter().filter(|(l, _)| *l == level).count()
    }

    fn push(&self, level: Level, args: fmt::Arguments<'_>) {
        self.lines.lock().push((level, args.to_string()));
    }
}

impl LogSink for RecordingLog {
    fn debug(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Debug, args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Info, args);
    }

    fn warning(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Warning, args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Error, args);
    }

    fn success(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Success, args);
    }
}

/// Object literal to record; panics on non-objects
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("record fixture must be an object, got {other}"),
    }
}

/// Ordered field declaration from pairs
pub fn fields(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(name, ty)| ((*name).to_string(), (*ty).to_string()))
        .collect()
}

/// `{Name: text, Age: int}`
pub fn name_age_fields() -> IndexMap<String, String> {
    fields(&[("Name", "text"), ("Age", "int")])
}

/// Identity keys matching `name_age_fields`
pub fn name_age_keys() -> IdentityKeys {
    IdentityKeys::new("Name", "Age")
}

/// `{Name: "A", Age: 1}`, `{Name: "B", Age: 2}`
pub fn two_people() -> Vec<Record> {
    vec![
        record(json!({"Name": "A", "Age": 1})),
        record(json!({"Name": "B", "Age": 2})),
    ]
}

/// Batch body with one `{"success": true}` per command
pub fn ok_results(count: usize) -> Value {
    Value::Array(vec![json!({"success": true}); count])
}

/// Schema creation rejected because the database exists
pub fn already_exists() -> Value {
    json!([{"success": false, "result": {"message": "database already exists"}}])
}

/// Query body with the given rows
pub fn query_rows(rows: Vec<Value>) -> Value {
    json!([{"success": true, "result": rows}])
}
