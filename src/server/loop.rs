// Server loop module
// Accepts connections until shutdown is requested, then drains them

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Run the accept loop until `shutdown` is notified.
///
/// Must run inside a `LocalSet`: connections are served with `spawn_local`.
/// After shutdown the listener is closed and in-flight connections get up to
/// the configured write timeout to finish.
#[allow(clippy::ignored_unit_patterns)]
pub async fn run_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = shutdown.notified() => {
                break;
            }
        }
    }

    drop(listener);

    let grace = Duration::from_secs(state.config.performance.write_timeout);
    let drained = tokio::time::timeout(grace, async {
        while active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL).await;
        }
    })
    .await;

    match drained {
        Ok(()) => logger::log_info("[Shutdown] All connections closed"),
        Err(_) => logger::log_warning(&format!(
            "[Shutdown] {} connection(s) still open after {}s, exiting",
            active_connections.load(Ordering::SeqCst),
            grace.as_secs()
        )),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::logos::{LogoIndex, RankPolicy};
    use crate::server::create_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_serves_logo_over_tcp_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("ticker_icons")).unwrap();
        std::fs::write(dir.path().join("ticker_icons/ETSY.png"), b"png-bytes").unwrap();

        let mut config = Config::load_from("does-not-exist/config").unwrap();
        config.logging.access_log = false;
        config.performance.write_timeout = 1;
        let index = LogoIndex::build(dir.path(), RankPolicy::default()).unwrap();
        let state = Arc::new(AppState::new(config, index));

        let listener = create_listener("127.0.0.1:0".parse().unwrap(), 16).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = tokio::task::spawn_local(run_server_loop(
                    listener,
                    Arc::clone(&state),
                    Arc::clone(&shutdown),
                ));

                let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
                client
                    .write_all(b"GET /logo/etsy HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                    .await
                    .unwrap();
                let mut raw = Vec::new();
                client.read_to_end(&mut raw).await.unwrap();
                let text = String::from_utf8_lossy(&raw);

                assert!(text.starts_with("HTTP/1.1 200 OK"));
                assert!(text.to_ascii_lowercase().contains("content-type: image/png"));
                assert!(text.ends_with("png-bytes"));

                shutdown.notify_one();
                server.await.unwrap().unwrap();
            })
            .await;
    }
}
