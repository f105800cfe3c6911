// Network module - line-delimited JSON over TCP
// Accept loop with one task per connection, plus the one-shot outbound client

pub mod config;

pub use config::NetworkConfig;

use crate::error::{MarketError, MarketResult};
use crate::observability;
use crate::protocol::Response;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, error, info, warn, Instrument};

/// A service reachable over the line protocol.
/// Implementors decode one request type and answer each with a [`Response`].
#[async_trait]
pub trait Service: Send + Sync + 'static {
    type Request: DeserializeOwned + Send;

    /// Name used in logs and spans
    fn name(&self) -> &'static str;

    fn operation(request: &Self::Request) -> &'static str;

    async fn handle(&self, request: Self::Request) -> Response;
}

/// Create a listening socket with the configured tuning and hand it to tokio
pub fn bind(addr: SocketAddr, config: &NetworkConfig) -> Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))
        .context("Failed to create TCP socket")?;

    if config.so_reuseaddr {
        socket.set_reuse_address(true)?;
    }
    if config.keepalive {
        socket.set_keepalive(true)?;
    }

    socket
        .bind(&addr.into())
        .with_context(|| format!("Failed to bind {}", addr))?;
    socket.listen(config.backlog)?;
    socket.set_nonblocking(true)?;

    let std_listener: std::net::TcpListener = socket.into();
    let listener = TcpListener::from_std(std_listener)?;

    info!(addr = %addr, backlog = config.backlog, "TCP listener created");

    Ok(listener)
}

/// Accept connections until a shutdown notification arrives.
/// Each connection runs in its own task; a failing connection never affects the others.
pub async fn serve<S: Service>(
    listener: TcpListener,
    service: Arc<S>,
    config: NetworkConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let connection_counter = AtomicU64::new(0);
    let local_addr = listener.local_addr()?;

    info!(service = service.name(), addr = %local_addr, "Service accepting connections");

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!(service = service.name(), "Accept loop stopped");
                return Ok(());
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer_addr)) => {
                        let conn_id = connection_counter.fetch_add(1, Ordering::Relaxed);
                        let service = service.clone();
                        let config = config.clone();

                        debug!(conn_id = conn_id, peer = %peer_addr, "New connection");

                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, service, &config).await {
                                warn!(conn_id = conn_id, error = %e, "Connection error");
                            }
                            debug!(conn_id = conn_id, "Connection closed");
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                }
            }
        }
    }
}

/// Answer each request line on one connection, strictly one at a time
async fn handle_connection<S: Service>(
    stream: TcpStream,
    service: Arc<S>,
    config: &NetworkConfig,
) -> Result<()> {
    if config.tcp_nodelay {
        stream.set_nodelay(true)?;
    }

    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(config.max_line_length));

    while let Some(line) = framed.next().await {
        let response = match line {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => dispatch_line(service.as_ref(), &line).await,
            Err(LinesCodecError::MaxLineLengthExceeded) => Response::error(&MarketError::Protocol(
                format!("request line exceeds {} bytes", config.max_line_length),
            )),
            Err(LinesCodecError::Io(e)) => return Err(e.into()),
        };

        let encoded = serde_json::to_string(&response)?;
        framed.send(encoded).await?;
    }

    Ok(())
}

/// Decode one request line and run it through the service
pub async fn dispatch_line<S: Service>(service: &S, line: &str) -> Response {
    let request: S::Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            debug!(service = service.name(), error = %e, "Malformed request line");
            return Response::error(&MarketError::Protocol(format!("invalid request: {}", e)));
        }
    };

    let operation = S::operation(&request);
    let span = observability::request_span(service.name(), operation);
    let start = std::time::Instant::now();

    let response = service.handle(request).instrument(span).await;

    observability::record_request_duration(service.name(), operation, start.elapsed());
    response
}

/// Send one request on a fresh connection and decode the typed result
pub async fn call<R, T>(addr: &str, request: &R) -> MarketResult<T>
where
    R: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| MarketError::Protocol(format!("cannot reach {}: {}", addr, e)))?;
    stream.set_nodelay(true)?;

    let mut framed = Framed::new(stream, LinesCodec::new());
    framed
        .send(serde_json::to_string(request)?)
        .await
        .map_err(codec_error)?;

    let line = framed
        .next()
        .await
        .ok_or_else(|| MarketError::Protocol(format!("{} closed the connection without a response", addr)))?
        .map_err(codec_error)?;

    let response: Response = serde_json::from_str(&line)?;
    response.into_result()
}

fn codec_error(err: LinesCodecError) -> MarketError {
    match err {
        LinesCodecError::MaxLineLengthExceeded => MarketError::Protocol("response line too long".into()),
        LinesCodecError::Io(e) => e.into(),
    }
}
