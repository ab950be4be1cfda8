// crates/spinnaker-provider-gate/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Scripted mock Gate server for transport tests.
// Purpose: Serve canned responses and record what the client sent.
// Dependencies: tiny_http
// ============================================================================

//! ## Overview
//! [`MockGate`] answers a fixed sequence of requests on a local port and
//! hands back every request it saw once the sequence is exhausted.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;

use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Mock Server
// ============================================================================

/// Request observed by the mock server.
#[derive(Debug, Clone)]
pub struct Recorded {
    /// HTTP method.
    pub method: String,
    /// Path and query.
    pub url: String,
    /// Request body.
    pub body: String,
    /// Header names and values.
    pub headers: Vec<(String, String)>,
}

impl Recorded {
    /// Returns the first header value with the given name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Running mock Gate server.
pub struct MockGate {
    /// Base URL of the server.
    pub url: String,
    /// Serving thread; yields the recorded requests.
    handle: thread::JoinHandle<Vec<Recorded>>,
}

impl MockGate {
    /// Serves `responses` in order, one per incoming request.
    pub fn serve(responses: Vec<(u16, &'static str)>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let url = format!("http://{addr}");
        let handle = thread::spawn(move || {
            let mut recorded = Vec::new();
            for (status, body) in responses {
                let Ok(mut request) = server.recv() else {
                    break;
                };
                let mut content = String::new();
                let _ = request.as_reader().read_to_string(&mut content);
                recorded.push(Recorded {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    body: content,
                    headers: request
                        .headers()
                        .iter()
                        .map(|header| (header.field.to_string(), header.value.to_string()))
                        .collect(),
                });
                let _ = request.respond(Response::from_string(body).with_status_code(status));
            }
            recorded
        });
        Self { url, handle }
    }

    /// Waits for every scripted response and returns the recorded requests.
    pub fn finish(self) -> Vec<Recorded> {
        self.handle.join().unwrap()
    }
}
