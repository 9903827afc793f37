// Server loop module
// Accepts connections until a shutdown signal arrives

use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` until `shutdown` resolves.
///
/// In-flight connections keep running in their own tasks; they are not
/// awaited here.
pub async fn run<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = &'static str>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            reason = &mut shutdown => {
                logger::log_server_stop(reason);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::render::HtmlTemplates;
    use crate::routing::PathRouter;
    use crate::server::create_listener;
    use crate::storage::PageStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn roundtrip(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8(response).unwrap()
    }

    #[tokio::test]
    async fn test_serves_over_tcp_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let pages = dir.path().join("pages");
        let config = Config::for_tests("", pages.to_str().unwrap(), "templates");
        let state = Arc::new(AppState::new(
            config,
            PathRouter::new("").unwrap(),
            PageStore::open(&pages).unwrap(),
            Arc::new(HtmlTemplates::from_sources("<p>{{body}}</p>", "<form>{{body}}</form>")),
        ));

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(run(listener, state, async move {
            let _ = stop_rx.await;
            "test finished"
        }));

        let saved = roundtrip(
            addr,
            "POST /save/test HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
             Content-Type: application/x-www-form-urlencoded\r\nContent-Length: 10\r\n\r\nbody=Hello",
        )
        .await;
        assert!(saved.starts_with("HTTP/1.1 302"), "got: {saved}");
        assert!(
            saved.to_ascii_lowercase().contains("location: /view/test"),
            "got: {saved}"
        );

        let viewed = roundtrip(
            addr,
            "GET /view/test HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(viewed.starts_with("HTTP/1.1 200"), "got: {viewed}");
        assert!(viewed.ends_with("<p>Hello</p>"), "got: {viewed}");

        stop_tx.send(()).unwrap();
        server.await.unwrap();
    }
}
