//! Minimal HTTP server standing in for the Compute `instances.list` endpoint.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

const EMPTY_LIST: &str = r#"{"kind":"compute#instanceList"}"#;

/// Serves scripted responses in order, then empty listings forever.
pub struct FakeCompute {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeCompute {
    /// Starts the server on an ephemeral loopback port.
    pub fn serve(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .unwrap_or_else(|err| panic!("bind fake compute: {err}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|err| panic!("fake compute addr: {err}"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        thread::spawn(move || {
            let mut queue = responses.into_iter();
            for stream in listener.incoming().flatten() {
                let (status, body) = queue
                    .next()
                    .unwrap_or_else(|| (200, EMPTY_LIST.to_owned()));
                handle(stream, status, &body, &recorded);
            }
        });

        Self { addr, requests }
    }

    /// Base URL to pass as the Compute endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://{}/compute/v1", self.addr)
    }

    /// Request heads received so far, one string per request.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn handle(
    mut stream: TcpStream,
    status: u16,
    body: &str,
    recorded: &Mutex<Vec<String>>,
) -> Option<()> {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    while !buf.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut chunk).ok()?;
        if read == 0 {
            break;
        }
        buf.extend(chunk.iter().take(read));
    }

    recorded
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(String::from_utf8_lossy(&buf).into_owned());

    let reason = if status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).ok()?;
    stream.flush().ok()
}

/// JSON body listing one worker labelled with `job_id` and carrying `emails`.
pub fn instance_list(name: &str, job_id: &str, emails: &[&str]) -> String {
    let accounts = emails
        .iter()
        .map(|email| format!(r#"{{"email":"{email}","scopes":[]}}"#))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"{{"kind":"compute#instanceList","items":[{{"id":"1","name":"{name}","labels":{{"goog-dataflow-job-id":"{job_id}"}},"serviceAccounts":[{accounts}]}}]}}"#
    )
}
