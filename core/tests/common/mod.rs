//! Live mock server shared by the integration tests.
//!
//! The listener is bound before the server thread starts, so requests made
//! right after `start()` queue in the backlog instead of racing the runtime.

#![allow(dead_code)]

use mock_server::{RecordedRequest, RequestLog};

pub struct TestServer {
    base: String,
    log: RequestLog,
}

pub fn start() -> TestServer {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let log = mock_server::request_log();
    let server_log = log.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, server_log).await
        })
        .unwrap();
    });

    TestServer {
        base: format!("http://{addr}"),
        log,
    }
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// `host` and `port` for the connection adapter.
    pub fn host_port(&self) -> (String, u16) {
        let authority = self.base.trim_start_matches("http://");
        let (host, port) = authority.rsplit_once(':').unwrap();
        (host.to_string(), port.parse().unwrap())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.blocking_read().clone()
    }

    pub fn last(&self) -> RecordedRequest {
        self.requests().pop().expect("server saw no requests")
    }
}
