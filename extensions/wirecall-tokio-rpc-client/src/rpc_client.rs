use std::{io, net::SocketAddr};
use tokio::{
    io::{AsyncWriteExt, BufReader},
    net::{TcpStream, ToSocketAddrs},
    sync::Mutex,
};
use wirecall::{
    constants::DEFAULT_MAX_FRAME_SIZE,
    frame::{FrameDecodeError, Message, read_message, write_message},
};
use wirecall_rpc_service::{RpcClientInterface, ensure_reply_matches};

/// A TCP client for a wirecall server.
///
/// The server answers one request at a time per connection, so calls made
/// through one client are serialized: each waits for the previous reply.
/// Open more clients for parallel calls.
///
/// A call whose future is dropped after its request went out leaves the
/// reply unread on the socket. The client then refuses further calls with
/// `BrokenPipe` instead of handing that stale reply to the next caller;
/// reconnect to recover.
pub struct RpcClient {
    connection: Mutex<Connection>,
    peer_addr: SocketAddr,
    max_frame_size: usize,
}

impl RpcClient {
    /// Connects to `host:port`.
    pub async fn new(host: &str, port: u16) -> io::Result<RpcClient> {
        Self::connect(format!("{host}:{port}")).await
    }

    /// Connects to any address tokio can resolve.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<RpcClient> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let peer_addr = stream.peer_addr()?;

        tracing::debug!("Connected to {}", peer_addr);

        Ok(RpcClient {
            connection: Mutex::new(Connection {
                stream: BufReader::new(stream),
                unanswered: None,
            }),
            peer_addr,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        })
    }

    /// Largest reply body this client will accept.
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}

/// The socket, plus the request it still owes a reply for, if any.
///
/// `unanswered` is set before a request is written and cleared only once its
/// reply has been read in full, so a cancelled or failed exchange leaves it
/// set.
struct Connection {
    stream: BufReader<TcpStream>,
    unanswered: Option<String>,
}

impl Connection {
    async fn exchange(&mut self, request: &Message, max_frame_size: usize) -> io::Result<Message> {
        if let Some(service_method) = &self.unanswered {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("connection out of sync: the reply to {service_method} was never read"),
            ));
        }
        self.unanswered = Some(request.service_method.clone());

        write_message(&mut self.stream, request).await?;
        self.stream.flush().await?;

        let reply = match read_message(&mut self.stream, max_frame_size).await {
            Ok(Some(reply)) if reply.is_reply() => reply,
            Ok(Some(other)) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("expected a reply frame for {}", other.service_method),
                ));
            }
            Ok(None) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "server closed the connection before replying",
                ));
            }
            Err(FrameDecodeError::Io(err)) => return Err(err),
            Err(err) => return Err(io::Error::new(io::ErrorKind::InvalidData, err)),
        };
        ensure_reply_matches(&request.service_method, &reply)?;

        self.unanswered = None;
        Ok(reply)
    }
}

#[async_trait::async_trait]
impl RpcClientInterface for RpcClient {
    async fn call_rpc(&self, request: Message) -> Result<Message, io::Error> {
        let mut connection = self.connection.lock().await;
        let outcome = connection.exchange(&request, self.max_frame_size).await;
        if let Err(err) = &outcome {
            tracing::debug!(
                "Call to {} on {} failed: {}",
                request.service_method,
                self.peer_addr,
                err
            );
        }
        outcome
    }
}
