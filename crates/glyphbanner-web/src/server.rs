//! Connection loop
//!
//! Every accepted connection gets its own task. Tasks share the [`App`]
//! through an `Arc` and never write to it.

use crate::app::{error_response, App};
use crate::http::{read_request, Response, StatusCode};
use crate::WebError;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Bind `address` and serve until `shutdown` resolves
pub async fn run(
    address: SocketAddr,
    app: Arc<App>,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(address).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    serve(listener, app, shutdown).await
}

/// Accept connections on `listener` until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    app: Arc<App>,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutting down");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let app = Arc::clone(&app);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer, &app).await {
                            tracing::error!("Connection from {} failed: {}", peer, e);
                        }
                    });
                }
                Err(e) => tracing::warn!("Failed to accept connection: {}", e),
            },
        }
    }

    Ok(())
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, app: &App) -> std::io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let read = tokio::time::timeout(
        app.read_timeout(),
        read_request(&mut reader, app.max_body_bytes()),
    );

    let response = match read.await {
        Err(_) => {
            tracing::warn!("{} sent no complete request in time", peer);
            Response::error(StatusCode::REQUEST_TIMEOUT, "REQUEST TIMEOUT")
        }
        Ok(Ok(Some(request))) => {
            let response = app.handle(&request).await;
            tracing::info!(
                "{} {} {} -> {}",
                peer,
                request.method.as_str(),
                request.target,
                response.status.as_u16()
            );
            response
        }
        Ok(Ok(None)) => return Ok(()),
        Ok(Err(WebError::Io(e))) => return Err(e),
        Ok(Err(e)) => error_response(&e),
    };

    response.write_to(&mut write_half).await?;
    write_half.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphbanner_config::Config;
    use std::path::Path;
    use tokio::io::AsyncReadExt;
    use tokio::sync::oneshot;

    async fn start() -> (SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
        let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../static");
        let mut config = Config::default();
        config.assets.static_dir = static_dir.clone();
        config.assets.glyph_dir = static_dir;
        config.server.max_body_bytes = 256;
        config.server.read_timeout_secs = 1;
        let app = Arc::new(App::from_config(&config).unwrap());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            serve(listener, app, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });
        (address, tx, handle)
    }

    async fn exchange(address: SocketAddr, raw: &[u8]) -> String {
        let mut stream = TcpStream::connect(address).await.unwrap();
        stream.write_all(raw).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_round_trip_over_tcp() {
        let (address, shutdown, handle) = start().await;

        let body = "textToPrint=A&font=standard&genOrDown=download";
        let raw = format!(
            "POST / HTTP/1.1\r\nHost: test\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let response = exchange(address, raw.as_bytes()).await;

        let (head, art) = response.split_once("\r\n\r\n").unwrap();
        assert!(head.starts_with("HTTP/1.1 200 OK"));
        assert!(head.contains("Content-Disposition: attachment; filename=ASCII_Art.txt"));
        assert!(head.contains(&format!("Content-Length: {}", art.len())));
        assert_eq!(art.lines().count(), 8);

        shutdown.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_and_oversized_requests() {
        let (address, shutdown, handle) = start().await;

        let response = exchange(address, b"NONSENSE\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 400 Bad Request"));

        let response = exchange(
            address,
            b"POST / HTTP/1.1\r\nContent-Length: 100000\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 413 Payload Too Large"));

        shutdown.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_stalled_client_times_out() {
        let (address, shutdown, handle) = start().await;

        let mut stream = TcpStream::connect(address).await.unwrap();
        stream.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();
        let mut response = String::new();
        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            stream.read_to_string(&mut response),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(response.starts_with("HTTP/1.1 408 Request Timeout"));

        shutdown.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_requests() {
        let (address, shutdown, handle) = start().await;

        let requests = (0..8).map(|_| {
            tokio::spawn(exchange(address, b"GET / HTTP/1.1\r\nHost: test\r\n\r\n"))
        });
        for request in requests.collect::<Vec<_>>() {
            let response = request.await.unwrap();
            assert!(response.starts_with("HTTP/1.1 200 OK"));
        }

        shutdown.send(()).unwrap();
        handle.await.unwrap();
    }
}
