//! Purpose: In-process stub catalog server shared by the integration suites.
//! Exports: `StubCatalog`.
//! Role: Stand in for the HTTP+JSON API server; record requests, serve CRUD over `/movies`.
//! Invariants: Loopback-only; the listener thread is shut down on drop.
//! Invariants: The request log records every request in arrival order.
//! Invariants: Injected failures consume exactly one request each.
#![allow(dead_code)]

use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

#[derive(Default)]
struct State {
    records: Vec<Value>,
    log: Vec<String>,
    fail_next: Option<u16>,
    malformed_list: bool,
}

pub struct StubCatalog {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl StubCatalog {
    pub fn start() -> Self {
        Self::start_with(Vec::new())
    }

    /// Start with seeded records; each must carry a numeric `id`.
    pub fn start_with(records: Vec<Value>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let addr = listener.local_addr().expect("stub addr");
        let state = Arc::new(Mutex::new(State {
            records,
            ..State::default()
        }));
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread_state = Arc::clone(&state);
        let thread_shutdown = Arc::clone(&shutdown);
        let handle = std::thread::spawn(move || {
            for stream in listener.incoming() {
                if thread_shutdown.load(Ordering::SeqCst) {
                    break;
                }
                let Ok(stream) = stream else { continue };
                handle_connection(stream, &thread_state);
            }
        });

        Self {
            addr,
            state,
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests seen so far, as "METHOD /path" strings in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().expect("stub state").log.clone()
    }

    pub fn records(&self) -> Vec<Value> {
        self.state.lock().expect("stub state").records.clone()
    }

    /// The next request, whatever it is, fails with this status.
    pub fn fail_next_with(&self, status: u16) {
        self.state.lock().expect("stub state").fail_next = Some(status);
    }

    /// Serve a non-array body for list requests until turned off.
    pub fn set_malformed_list(&self, on: bool) {
        self.state.lock().expect("stub state").malformed_list = on;
    }
}

impl Drop for StubCatalog {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Wake the accept loop so it observes the flag.
        let _ = TcpStream::connect(self.addr);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn handle_connection(stream: TcpStream, state: &Arc<Mutex<State>>) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() || request_line.trim().is_empty() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).is_err() {
            return;
        }
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some(value) = line
            .to_ascii_lowercase()
            .strip_prefix("content-length:")
            .map(str::trim)
            .map(str::to_string)
        {
            content_length = value.parse().unwrap_or(0);
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 && reader.read_exact(&mut body).is_err() {
        return;
    }
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let (status, response_body) = respond(&method, &path, body, state);
    let payload = response_body.to_string();
    let reason = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        payload.len(),
    );
    let _ = reader.get_mut().write_all(response.as_bytes());
}

fn respond(method: &str, path: &str, body: Value, state: &Arc<Mutex<State>>) -> (u16, Value) {
    let mut state = state.lock().expect("stub state");
    state.log.push(format!("{method} {path}"));

    if let Some(status) = state.fail_next.take() {
        return (status, json!({"error": "injected failure"}));
    }

    match (method, path) {
        ("GET", "/movies") => {
            if state.malformed_list {
                return (200, json!({"not": "an array"}));
            }
            (200, Value::Array(state.records.clone()))
        }
        ("POST", "/movies") => {
            let Value::Object(mut fields) = body else {
                return (400, json!({"error": "body must be an object"}));
            };
            let id = state
                .records
                .iter()
                .filter_map(record_id)
                .max()
                .unwrap_or(0)
                + 1;
            fields.insert("id".to_string(), json!(id));
            let record = Value::Object(fields);
            state.records.push(record.clone());
            (201, record)
        }
        ("PUT", _) => {
            let Some(id) = item_id(path) else {
                return (404, json!({"error": "no such route"}));
            };
            let Value::Object(mut fields) = body else {
                return (400, json!({"error": "body must be an object"}));
            };
            fields.insert("id".to_string(), json!(id));
            let record = Value::Object(fields);
            let Some(slot) = state
                .records
                .iter_mut()
                .find(|existing| record_id(existing) == Some(id))
            else {
                return (404, json!({"error": "not found"}));
            };
            *slot = record.clone();
            (200, record)
        }
        ("DELETE", _) => {
            let Some(id) = item_id(path) else {
                return (404, json!({"error": "no such route"}));
            };
            let before = state.records.len();
            state
                .records
                .retain(|existing| record_id(existing) != Some(id));
            if state.records.len() == before {
                return (404, json!({"error": "not found"}));
            }
            (200, json!({}))
        }
        _ => (404, json!({"error": "no such route"})),
    }
}

fn item_id(path: &str) -> Option<u64> {
    path.strip_prefix("/movies/")?.parse().ok()
}

fn record_id(record: &Value) -> Option<u64> {
    record.get("id").and_then(Value::as_u64)
}
