//! In-memory `ArchivesSpaceApi` and a loopback HTTP server for tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use super::client::ArchivesSpaceApi;
use crate::error::{ApiError, RemoteApiError};

/// Canned GET responses, scripted POST responses, and a log of every call
#[derive(Default)]
pub struct FakeApi {
    username: String,
    gets: HashMap<String, Value>,
    post_failures: Mutex<HashMap<String, usize>>,
    next_id: Mutex<u64>,
    get_log: Mutex<Vec<String>>,
    post_log: Mutex<Vec<(String, Value)>>,
}

impl FakeApi {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            next_id: Mutex::new(100),
            ..Default::default()
        }
    }

    /// Serve `body` for `GET path`
    pub fn with_get(mut self, path: &str, body: Value) -> Self {
        self.gets.insert(path.to_string(), body);
        self
    }

    /// Fail the `nth` (0-based) POST to `path` with a 500
    pub fn fail_post(self, path: &str, nth: usize) -> Self {
        self.post_failures
            .lock()
            .unwrap()
            .insert(path.to_string(), nth);
        self
    }

    pub fn gets(&self) -> Vec<String> {
        self.get_log.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<(String, Value)> {
        self.post_log.lock().unwrap().clone()
    }

    pub fn get_count(&self, path: &str) -> usize {
        self.gets().iter().filter(|p| p.as_str() == path).count()
    }
}

#[async_trait]
impl ArchivesSpaceApi for FakeApi {
    fn base_url(&self) -> &str {
        "http://aspace.test/api"
    }

    fn username(&self) -> &str {
        &self.username
    }

    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        self.get_log.lock().unwrap().push(path.to_string());
        self.gets.get(path).cloned().ok_or_else(|| {
            RemoteApiError {
                uri: path.to_string(),
                status: 404,
                message: "Record not found".to_string(),
            }
            .into()
        })
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let attempt = {
            let mut log = self.post_log.lock().unwrap();
            let attempt = log.iter().filter(|(p, _)| p == path).count();
            log.push((path.to_string(), body.clone()));
            attempt
        };

        if self.post_failures.lock().unwrap().get(path) == Some(&attempt) {
            return Err(RemoteApiError {
                uri: path.to_string(),
                status: 500,
                message: "Internal Server Error".to_string(),
            }
            .into());
        }

        // Updates post to the record's own URI; creates post to the collection
        let uri = if path.rsplit('/').next().is_some_and(|s| s.parse::<u64>().is_ok()) {
            path.to_string()
        } else {
            let mut id = self.next_id.lock().unwrap();
            *id += 1;
            format!("{}/{}", path, *id)
        };

        Ok(json!({"status": "Created", "uri": uri}))
    }
}

/// Loopback HTTP server answering one connection per canned response, in order
pub struct CannedServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    pub async fn start(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let head = read_request_head(&mut socket).await;
                seen.lock().unwrap().push(head);

                let response = format!(
                    "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });

        Self { base_url, requests }
    }

    /// Request line and headers of every request served so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Read one request, body included, and return its head lowercased
async fn read_request_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let mut head_end = None;
    loop {
        if let Some(end) = head_end {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|len| len.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                return head;
            }
        }
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return String::from_utf8_lossy(&buf).to_lowercase();
        }
        buf.extend_from_slice(&chunk[..n]);
        if head_end.is_none() {
            head_end = buf.windows(4).position(|w| w == b"\r\n\r\n");
        }
    }
}
