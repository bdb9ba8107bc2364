use std::ffi::OsStr;
use std::future::Future;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};

pub const PROJECT_ID: &str = "7";
pub const RECORDING_ID: &str = "rec-1";
pub const WINDOW_A: &str = "window-a";
pub const WINDOW_B: &str = "window-b";

/// How the fake recordings API answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMode {
    Healthy,
    MetadataError,
}

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ServerHandle {
    /// Request targets (path and query) received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|target| target.split('?').next() == Some(path))
            .count()
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

pub fn meta_path() -> String {
    format!("/api/projects/{}/session_recordings/{}", PROJECT_ID, RECORDING_ID)
}

pub fn snapshots_path() -> String {
    format!("{}/snapshots", meta_path())
}

pub fn events_path() -> String {
    format!("/api/projects/{}/events", PROJECT_ID)
}

pub fn performance_path() -> String {
    format!("/api/projects/{}/performance_events", PROJECT_ID)
}

/// Spawn a fake recordings API on a random local port.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_api_server(mode: ApiMode) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let log = Arc::clone(&log);
                    thread::spawn(move || handle_client(stream, mode, &log));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
            requests,
        },
    ))
}

pub fn spawn_api_server_or_skip(mode: ApiMode) -> Result<Option<(String, ServerHandle)>, String> {
    match spawn_api_server(mode) {
        Ok(result) => Ok(Some(result)),
        Err(err) if err.contains("Operation not permitted") => {
            eprintln!("Skipping e2e test: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn handle_client(mut stream: TcpStream, mode: ApiMode, log: &Mutex<Vec<String>>) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let Some(target) = read_request_target(&mut stream) else {
        return;
    };
    if let Ok(mut requests) = log.lock() {
        requests.push(target.clone());
    }

    let (status, body) = route(&target, mode);
    let body = body.to_string();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Reads the request head and returns the request target of the first line.
fn read_request_target(stream: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut buffer = [0u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut buffer).ok()?;
        if read == 0 {
            break;
        }
        head.extend_from_slice(buffer.get(..read)?);
    }
    let head = String::from_utf8_lossy(&head);
    let first_line = head.lines().next()?;
    first_line.split_whitespace().nth(1).map(str::to_owned)
}

fn route(target: &str, mode: ApiMode) -> (&'static str, Value) {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    if path == meta_path() {
        return match mode {
            ApiMode::Healthy => ("200 OK", meta_body()),
            ApiMode::MetadataError => ("500 Internal Server Error", json!({"detail": "boom"})),
        };
    }
    if path == snapshots_path() {
        if query.contains("offset=2") {
            return ("200 OK", snapshots_second_page());
        }
        return ("200 OK", snapshots_first_page());
    }
    if path == events_path() {
        if query.contains("page=2") {
            return ("200 OK", events_page(&["e3"], None));
        }
        let next = format!("api/projects/{}/events?page=2", PROJECT_ID);
        return ("200 OK", events_page(&["e1", "e2"], Some(&next)));
    }
    if path == performance_path() {
        return (
            "200 OK",
            json!({"results": [
                {"entry_type": "navigation", "name": "https://example.com", "timestamp": 1_639_080_000_000_i64}
            ]}),
        );
    }
    ("404 Not Found", json!({"detail": "not found"}))
}

fn meta_body() -> Value {
    json!({
        "segments": [
            {"start_time": "2021-12-09T19:36:59Z", "end_time": "2021-12-09T20:10:00Z", "window_id": WINDOW_A, "is_active": true},
            {"start_time": "2021-12-09T20:10:00Z", "end_time": "2021-12-09T20:23:24Z", "window_id": WINDOW_B, "is_active": false}
        ],
        "start_and_end_times_by_window_id": {
            WINDOW_A: {"start_time": "2021-12-09T19:36:59Z", "end_time": "2021-12-09T20:10:00Z"},
            WINDOW_B: {"start_time": "2021-12-09T20:10:00Z", "end_time": "2021-12-09T20:23:24Z"}
        },
        "pinned_count": 1,
        "person": {"id": 1, "distinct_ids": ["user-1"]}
    })
}

fn snapshots_first_page() -> Value {
    json!({
        "snapshot_data_by_window_id": {
            WINDOW_A: [
                {"timestamp": 1_639_080_000_000_i64, "type": 4},
                {"timestamp": 1_639_080_001_000_i64, "type": 2}
            ]
        },
        "next": format!("{}?offset=2", snapshots_path())
    })
}

fn snapshots_second_page() -> Value {
    json!({
        "snapshot_data_by_window_id": {
            WINDOW_A: [{"timestamp": 1_639_080_000_500_i64, "type": 3}],
            WINDOW_B: [{"timestamp": 1_639_080_700_000_i64, "type": 3}]
        },
        "next": null
    })
}

fn events_page(ids: &[&str], next: Option<&str>) -> Value {
    let results: Vec<Value> = ids
        .iter()
        .map(|id| json!({"id": id, "event": "$pageview", "timestamp": "2021-12-09T19:40:00Z"}))
        .collect();
    json!({"results": results, "next": next})
}

/// Runs an async test body on a fresh current-thread runtime.
///
/// # Errors
///
/// Returns the body's error, or an error if the runtime cannot be built.
pub fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("runtime build failed: {}", err))?;
    runtime.block_on(future)
}

/// Run the `replay-loader` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_replay_loader<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = replay_loader_bin()?;
    Command::new(bin)
        .args(args)
        .env("RUST_LOG", "error")
        .env_remove("REPLAY_LOADER_LOG")
        .env_remove("REPLAY_LOADER_TOKEN")
        .output()
        .map_err(|err| format!("run replay-loader failed: {}", err))
}

fn replay_loader_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_replay-loader").map_or_else(
        || Err("CARGO_BIN_EXE_replay-loader missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
