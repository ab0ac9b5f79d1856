//! Note: This `RpcServer` does not include authentication, authorization or
//! transport security. It is best suited for trusted, internal network
//! communication. Anything that owns a [`ServiceRegistry`] can dispatch
//! requests; this implementation demonstrates one way to do so over plain TCP.

use crate::{ConnectionSet, ServerConfig};
use futures::FutureExt;
use std::{future::Future, io, net::SocketAddr, panic::AssertUnwindSafe, sync::Arc};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::{TcpListener, ToSocketAddrs},
};
use tracing::Instrument;
use wirecall::frame::{FrameDecodeError, Message, read_message, write_message};
use wirecall_rpc_service::RpcResultStatus;
use wirecall_rpc_service_endpoint::{RpcContext, ServiceRegistry, error_reply};

/// An RPC server that accepts TCP connections and answers framed requests.
///
/// Requests on one connection are handled strictly in order: the next
/// frame is not read until the previous reply has been flushed. Separate
/// connections run concurrently on their own tasks.
pub struct RpcServer {
    registry: Arc<ServiceRegistry>,
    config: ServerConfig,
    connections: ConnectionSet,
}

impl Default for RpcServer {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcServer {
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ServiceRegistry::new()))
    }

    /// Serves the services of an existing registry.
    pub fn with_registry(registry: Arc<ServiceRegistry>) -> Self {
        RpcServer {
            registry,
            config: ServerConfig::default(),
            connections: ConnectionSet::new(),
        }
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns an `Arc` clone of the registry, for registering services
    /// without tying that logic to the server.
    pub fn registry(&self) -> Arc<ServiceRegistry> {
        self.registry.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn connections(&self) -> &ConnectionSet {
        &self.connections
    }

    /// Number of connections currently being served.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Binds to an address and serves it until the listener fails.
    ///
    /// The address can be any type that implements `ToSocketAddrs`, such as
    /// a string "127.0.0.1:8080" or a `SocketAddr`.
    pub async fn serve<A: ToSocketAddrs>(self: Arc<Self>, addr: A) -> io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.accept(listener).await
    }

    /// Convenience wrapper around `serve` taking a host and port.
    pub async fn serve_on(self: Arc<Self>, host: &str, port: u16) -> io::Result<()> {
        self.serve(format!("{host}:{port}")).await
    }

    /// Accepts connections until the listener reports an error, which is returned.
    pub async fn accept(self: Arc<Self>, listener: TcpListener) -> io::Result<()> {
        self.accept_until(listener, std::future::pending()).await
    }

    /// Accepts connections until `shutdown` resolves or the listener fails.
    ///
    /// Connections already accepted keep being served after this returns.
    pub async fn accept_until<F>(
        self: Arc<Self>,
        listener: TcpListener,
        shutdown: F,
    ) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("Server running on {:?}", listener.local_addr()?);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested. No longer accepting connections.");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    let (stream, peer_addr) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            tracing::warn!("Listener failed: {}", err);
                            return Err(err);
                        }
                    };

                    let guard = self.connections.insert(Some(peer_addr));
                    let span =
                        tracing::info_span!("connection", peer = %peer_addr, id = guard.id());
                    tracing::info!(parent: &span, "Client connected");

                    let server = self.clone();
                    tokio::spawn(
                        async move {
                            let _guard = guard;
                            let outcome = server.handle_connection(stream, Some(peer_addr)).await;
                            server.log_outcome(outcome);
                        }
                        .instrument(span),
                    );
                }
            }
        }
    }

    /// Serves one already-established stream on the caller's task.
    ///
    /// Returns `Ok(())` when the peer closes cleanly between requests. A frame
    /// that cannot be decoded gets a best-effort `ProtocolError` reply and ends
    /// the connection with an `InvalidData` error.
    pub async fn serve_connection<S>(
        &self,
        stream: S,
        peer_addr: Option<SocketAddr>,
    ) -> io::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let _guard = self.connections.insert(peer_addr);
        self.handle_connection(stream, peer_addr).await
    }

    async fn handle_connection<S>(
        &self,
        stream: S,
        peer_addr: Option<SocketAddr>,
    ) -> io::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut stream = BufReader::new(stream);

        loop {
            let request = match read_message(&mut stream, self.config.max_frame_size).await {
                Ok(Some(request)) => request,
                Ok(None) => return Ok(()),
                Err(FrameDecodeError::Io(err)) => return Err(err),
                Err(err) => {
                    tracing::warn!("Failed to decode frame: {}", err);
                    let reply = error_reply(&Message::new(), RpcResultStatus::ProtocolError, &err);
                    // FIN goes out ahead of any reset caused by unread input.
                    if write_message(&mut stream, &reply).await.is_ok() {
                        let _ = stream.flush().await;
                        let _ = stream.shutdown().await;
                    }
                    return Err(io::Error::new(io::ErrorKind::InvalidData, err));
                }
            };

            tracing::debug!("Decoded request for {}", request.service_method);

            let reply = self.dispatch(request, peer_addr).await;

            tracing::debug!(
                "Replying to {} with status {}",
                reply.service_method,
                reply.header.result_status()
            );

            write_message(&mut stream, &reply).await?;
            stream.flush().await?;
        }
    }

    /// Runs one request through the registry under the effective deadline.
    async fn dispatch(&self, request: Message, peer_addr: Option<SocketAddr>) -> Message {
        let mut ctx = RpcContext::from_request(&request, peer_addr)
            .with_max_payload_size(self.config.max_frame_size);
        ctx.cap_timeout(self.config.request_timeout);
        let deadline = ctx.timeout();

        let mut origin = Message::new();
        origin.header = request.header;
        origin.service_method = request.service_method.clone();

        let invocation = AssertUnwindSafe(self.registry.dispatch(ctx, request)).catch_unwind();

        let outcome = match deadline {
            None => invocation.await,
            Some(limit) => match tokio::time::timeout(limit, invocation).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(
                        "{} exceeded its deadline of {:?}",
                        origin.service_method,
                        limit
                    );
                    return error_reply(
                        &origin,
                        RpcResultStatus::DeadlineExceeded,
                        format!(
                            "rpc: {} exceeded deadline of {:?}",
                            origin.service_method, limit
                        ),
                    );
                }
            },
        };

        outcome.unwrap_or_else(|_| {
            tracing::error!("Handler for {} panicked", origin.service_method);
            error_reply(
                &origin,
                RpcResultStatus::SystemError,
                format!("rpc: handler for {} panicked", origin.service_method),
            )
        })
    }

    fn log_outcome(&self, outcome: io::Result<()>) {
        match outcome {
            Ok(()) => tracing::info!("Client disconnected"),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                tracing::warn!("Closed connection after protocol error: {}", err)
            }
            Err(err) => tracing::info!("Connection ended: {}", err),
        }
    }
}
