//! Async TCP transport using Tokio.
//!
//! Accepts connections and feeds parsed HTTP/1.1 requests into an
//! [`Application`]. Dispatch itself is synchronous and non-blocking; only the
//! socket I/O is async. HTTP/1.1 persistent connections (keep-alive) are
//! supported out of the box.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::app::Application;
use crate::http::{
    StatusCode,
    request::{Request, RequestError},
    response::Response,
};

/// Errors produced by the transport.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Maximum size of a complete HTTP request we will buffer before rejecting it (8 MiB).
const MAX_REQUEST_SIZE: usize = 8 * 1024 * 1024;

/// Initial read buffer capacity per connection.
const INITIAL_BUF_SIZE: usize = 4096;

/// The TCP server hosting an [`Application`].
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Server {
    /// Binds the server to the given TCP address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound
    /// (e.g. port already in use, insufficient permissions).
    pub async fn bind(addr: impl AsRef<str>) -> Result<Self, ServerError> {
        let addr = addr.as_ref();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.to_owned(),
                source: e,
            })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Starts accepting connections and dispatching requests into `app`.
    ///
    /// Runs until the process is terminated or an unrecoverable listener
    /// error occurs.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] if the TCP listener itself fails.
    pub async fn run(self, app: Application) -> Result<(), ServerError> {
        let app = Arc::new(app);
        info!(address = %self.local_addr, "listening");

        loop {
            let (stream, peer_addr) = match self.listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            debug!(peer = %peer_addr, "connection accepted");
            let app = Arc::clone(&app);

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, peer_addr, app).await {
                    warn!(peer = %peer_addr, error = %e, "connection closed with error");
                }
            });
        }
    }
}

// One connection over its lifetime: HTTP/1.1 connections are persistent by
// default, so we loop reading one request per iteration until the peer
// closes or signals `Connection: close`.
async fn handle_connection(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    app: Arc<Application>,
) -> Result<(), std::io::Error> {
    let mut buf = BytesMut::with_capacity(INITIAL_BUF_SIZE);

    loop {
        let bytes_read = stream.read_buf(&mut buf).await?;

        if bytes_read == 0 {
            debug!(peer = %peer_addr, "connection closed by peer");
            break;
        }

        if buf.len() > MAX_REQUEST_SIZE {
            warn!(peer = %peer_addr, "request too large — sending 413");
            let response = Response::new(StatusCode::PayloadTooLarge)
                .body("Request entity too large")
                .keep_alive(false);
            stream.write_all(&response.into_bytes()).await?;
            break;
        }

        let (request, body_offset) = match Request::parse(&buf) {
            Ok(pair) => pair,
            Err(RequestError::Incomplete) => {
                // Headers not yet fully received — read more data.
                continue;
            }
            Err(e) => {
                warn!(peer = %peer_addr, error = %e, "bad request — sending 400");
                let response = Response::new(StatusCode::BadRequest)
                    .body(format!("Bad Request: {e}"))
                    .keep_alive(false);
                stream.write_all(&response.into_bytes()).await?;
                break;
            }
        };

        // Wait for the full body to arrive if Content-Length is set.
        let content_length = request.content_length().unwrap_or(0);
        let total_needed = body_offset + content_length;
        if buf.len() < total_needed {
            continue;
        }

        let keep_alive = request.is_keep_alive();
        let response = app.handle(&request).keep_alive(keep_alive);
        stream.write_all(&response.into_bytes()).await?;
        stream.flush().await?;

        // Drop the consumed request bytes from the buffer.
        let _ = buf.split_to(total_needed);

        if !keep_alive {
            debug!(peer = %peer_addr, "Connection: close — shutting down");
            break;
        }
    }

    Ok(())
}
