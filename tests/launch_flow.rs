//! Launcher contract and the launch-then-probe flow.

use std::path::Path;

use overture::launcher::{self, LaunchError};
use overture::outcome::{EXIT_EXEC_NOT_FOUND, EXIT_SPAWN_FAILED};

#[test]
fn missing_executable_fails_immediately_with_not_found() {
    let path = Path::new("/no/such/dir/overture-app");
    let err = launcher::launch(path, &["--level", "3"]).unwrap_err();

    match &err {
        LaunchError::NotFound(reported) => assert_eq!(reported, path),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert_eq!(err.exit_code(), EXIT_EXEC_NOT_FOUND);
    assert_ne!(EXIT_EXEC_NOT_FOUND, EXIT_SPAWN_FAILED);
}

#[cfg(unix)]
mod unix {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use overture::config::ProbeConfig;
    use overture::outcome::StartupOutcome;
    use overture::prober::ReadinessProber;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn arguments_are_forwarded_verbatim_to_the_child() {
        let mut child = launcher::launch(Path::new("/bin/sh"), &["-c", "exit 3"]).unwrap();
        let status = child.wait().await.unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[tokio::test]
    async fn launched_child_becomes_ready_once_the_endpoint_answers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let hits = Arc::new(AtomicUsize::new(0));
        let server_hits = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                server_hits.fetch_add(1, Ordering::SeqCst);
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 204 No Content\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    )
                    .await;
                let _ = socket.shutdown().await;
            }
        });

        // A real launched child standing in for the application while the
        // test endpoint plays its readiness side.
        let mut child = launcher::launch(Path::new("/bin/sleep"), &["30"]).unwrap();

        let config = ProbeConfig {
            port,
            startup_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
            request_timeout: Duration::from_millis(500),
        };
        let outcome = ReadinessProber::new(&config).run(&mut child).await;

        assert_eq!(outcome, StartupOutcome::Ready);
        assert!(hits.load(Ordering::SeqCst) >= 1);
        child.start_kill().unwrap();
        let _ = child.wait().await;
    }
}
