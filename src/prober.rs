//! Readiness probing.
//!
//! Repeats check cycles until exactly one terminal condition is met:
//! startup timeout, child exit, an unexpected probe failure, or a response
//! from the `/ping` endpoint. Connection-level failures are the expected
//! steady state while the application binds its listener and are never
//! escalated.

use std::error::Error as _;
use std::io;
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::process::Child;
use tracing::debug;

use crate::config::ProbeConfig;
use crate::outcome::StartupOutcome;

pub struct ReadinessProber {
    url: String,
    startup_timeout: Duration,
    poll_interval: Duration,
    request_timeout: Duration,
    client: Client,
}

impl ReadinessProber {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            url: config.ping_url(),
            startup_timeout: config.startup_timeout,
            poll_interval: config.poll_interval,
            request_timeout: config.request_timeout,
            client: Client::new(),
        }
    }

    /// Runs check cycles until a terminal condition is met and returns the
    /// single `StartupOutcome` of this launch. The child handle is only
    /// polled for liveness, never signalled.
    pub async fn run(&self, child: &mut Child) -> StartupOutcome {
        let deadline = Instant::now() + self.startup_timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return StartupOutcome::TimedOut;
            }

            match child.try_wait() {
                Ok(Some(status)) => return StartupOutcome::ProcessExited(status.code()),
                Ok(None) => {}
                Err(err) => {
                    return StartupOutcome::ProbeError(format!(
                        "could not query application process: {err}"
                    ))
                }
            }

            // The request and the sleep are both clamped to the remaining
            // budget, so no cycle can push the timeout past the deadline
            // even against a listener that accepts and then stalls.
            match self
                .client
                .get(&self.url)
                .timeout(self.request_timeout.min(remaining))
                .send()
                .await
            {
                Ok(response) => {
                    // Any response at all counts; the status and body are
                    // irrelevant to readiness.
                    debug!("readiness endpoint answered with {}", response.status());
                    return StartupOutcome::Ready;
                }
                Err(err) if still_starting(&err) => {
                    debug!("application not listening yet: {err}");
                }
                Err(err) => return StartupOutcome::ProbeError(err.to_string()),
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }
}

/// Whether a probe failure means "the listener is not bound yet" rather
/// than a genuine fault. Connect failures (refused, reset, unresolvable
/// loopback) and a bounded per-request timeout both qualify.
fn still_starting(err: &reqwest::Error) -> bool {
    if err.is_connect() || err.is_timeout() {
        return true;
    }

    // A listener that accepts and immediately drops the socket surfaces as
    // an io reset further down the source chain.
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<io::Error>() {
            return matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
            );
        }
        source = inner.source();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    async fn probe_error_from(port: u16) -> reqwest::Error {
        Client::new()
            .get(format!("http://127.0.0.1:{port}/ping"))
            .timeout(Duration::from_millis(500))
            .send()
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn connection_refused_means_still_starting() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = probe_error_from(port).await;
        assert!(still_starting(&err), "refused must not escalate: {err}");
    }

    #[tokio::test]
    async fn stalled_connection_times_out_as_still_starting() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            // Accept and hold sockets without ever answering.
            let mut held = Vec::new();
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    return;
                };
                held.push(socket);
            }
        });

        let err = probe_error_from(port).await;
        assert!(err.is_timeout());
        assert!(still_starting(&err), "bounded timeout must not escalate");
        server.abort();
    }

    #[tokio::test]
    async fn malformed_response_is_a_real_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let _ = socket.write_all(b"definitely not http\r\n\r\n").await;
                let _ = socket.shutdown().await;
            }
        });

        let err = probe_error_from(port).await;
        assert!(!still_starting(&err), "malformed response must escalate: {err}");
    }
}
