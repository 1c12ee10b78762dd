//! Length-framed TCP transports: the input listener and the output sink.
//!
//! Wire format on both sides: a `u32` big-endian payload length followed by
//! the payload bytes. Oversized, zero-length, or truncated frames are
//! malformed: they are dropped and counted, and the carrying connection is
//! closed because its framing can no longer be trusted.

use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use stream_router::{BindError, Frame, FrameSink, FrameSource, InputId, SinkSendError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

const SOURCE_COMPONENT: &str = "tcp_source";
const SINK_COMPONENT: &str = "tcp_sink";
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(250);

enum FrameReadError {
    BadLength(usize),
    Truncated,
    Io(std::io::Error),
}

/// Listening input endpoint that yields decoded frames, one connection at a
/// time. Between connections `recv` simply waits on the next accept.
pub struct TcpFrameSource {
    input: InputId,
    listener: TcpListener,
    conn: Option<TcpStream>,
    max_frame_size: usize,
    malformed_frames: u64,
}

impl TcpFrameSource {
    /// Binds the listening endpoint. Failure here is fatal by contract.
    pub async fn bind(
        input: InputId,
        addr: &str,
        max_frame_size: usize,
    ) -> Result<Self, BindError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| BindError {
            addr: addr.to_string(),
            source,
        })?;
        info!(
            component = SOURCE_COMPONENT,
            input = input.as_str(),
            addr,
            "input endpoint bound"
        );
        Ok(Self {
            input,
            listener,
            conn: None,
            max_frame_size,
            malformed_frames: 0,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Count of malformed frames dropped on this input.
    pub fn malformed_frames(&self) -> u64 {
        self.malformed_frames
    }

    async fn read_frame(
        stream: &mut TcpStream,
        max_frame_size: usize,
    ) -> Result<Option<Bytes>, FrameReadError> {
        let mut len_buf = [0u8; 4];
        match stream.read_exact(&mut len_buf).await {
            Ok(_) => {}
            // EOF on a frame boundary is a clean close.
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(err) => return Err(FrameReadError::Io(err)),
        }

        let len = u32::from_be_bytes(len_buf) as usize;
        if len == 0 || len > max_frame_size {
            return Err(FrameReadError::BadLength(len));
        }

        let mut payload = vec![0u8; len];
        match stream.read_exact(&mut payload).await {
            Ok(_) => Ok(Some(Bytes::from(payload))),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Err(FrameReadError::Truncated),
            Err(err) => Err(FrameReadError::Io(err)),
        }
    }
}

#[async_trait]
impl FrameSource for TcpFrameSource {
    fn label(&self) -> &str {
        self.input.as_str()
    }

    async fn recv(&mut self) -> Option<Frame> {
        loop {
            if self.conn.is_none() {
                match self.listener.accept().await {
                    Ok((stream, peer)) => {
                        info!(
                            component = SOURCE_COMPONENT,
                            input = self.input.as_str(),
                            peer = %peer,
                            "input connection accepted"
                        );
                        self.conn = Some(stream);
                    }
                    Err(err) => {
                        warn!(
                            component = SOURCE_COMPONENT,
                            input = self.input.as_str(),
                            err = %err,
                            "accept failed; retrying"
                        );
                        tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                        continue;
                    }
                }
            }

            let Some(stream) = self.conn.as_mut() else {
                continue;
            };
            match Self::read_frame(stream, self.max_frame_size).await {
                Ok(Some(payload)) => return Some(Frame::new(self.input.clone(), payload)),
                Ok(None) => {
                    info!(
                        component = SOURCE_COMPONENT,
                        input = self.input.as_str(),
                        "input connection closed by peer"
                    );
                    self.conn = None;
                }
                Err(FrameReadError::BadLength(len)) => {
                    self.malformed_frames += 1;
                    warn!(
                        component = SOURCE_COMPONENT,
                        input = self.input.as_str(),
                        len,
                        max = self.max_frame_size,
                        "dropping malformed frame; closing connection"
                    );
                    self.conn = None;
                }
                Err(FrameReadError::Truncated) => {
                    self.malformed_frames += 1;
                    warn!(
                        component = SOURCE_COMPONENT,
                        input = self.input.as_str(),
                        "dropping truncated frame; closing connection"
                    );
                    self.conn = None;
                }
                Err(FrameReadError::Io(err)) => {
                    warn!(
                        component = SOURCE_COMPONENT,
                        input = self.input.as_str(),
                        err = %err,
                        "read failed; closing connection"
                    );
                    self.conn = None;
                }
            }
        }
    }
}

struct SinkState {
    stream: Option<TcpStream>,
    last_attempt: Option<Instant>,
}

/// Outbound sink with lazy, backoff-limited reconnection.
///
/// A failed send marks the sink disconnected and drops the socket; the next
/// send past the backoff retries the connection. The router never waits on
/// this: all of it happens on the sink's egress worker.
pub struct TcpFrameSink {
    destination: String,
    reconnect_backoff: Duration,
    connected: AtomicBool,
    state: tokio::sync::Mutex<SinkState>,
}

impl TcpFrameSink {
    pub fn new(destination: &str, reconnect_backoff: Duration) -> Arc<Self> {
        Arc::new(Self {
            destination: destination.to_string(),
            reconnect_backoff,
            connected: AtomicBool::new(false),
            state: tokio::sync::Mutex::new(SinkState {
                stream: None,
                last_attempt: None,
            }),
        })
    }

    async fn try_connect_locked(&self, state: &mut SinkState) {
        if state.stream.is_some() {
            return;
        }
        if let Some(last_attempt) = state.last_attempt {
            if last_attempt.elapsed() < self.reconnect_backoff {
                return;
            }
        }
        state.last_attempt = Some(Instant::now());

        match TcpStream::connect(&self.destination).await {
            Ok(stream) => {
                info!(
                    component = SINK_COMPONENT,
                    destination = self.destination.as_str(),
                    "output sink connected"
                );
                state.stream = Some(stream);
                self.connected.store(true, Ordering::SeqCst);
            }
            Err(err) => {
                warn!(
                    component = SINK_COMPONENT,
                    destination = self.destination.as_str(),
                    err = %err,
                    "unable to connect output sink"
                );
                self.connected.store(false, Ordering::SeqCst);
            }
        }
    }
}

#[async_trait]
impl FrameSink for TcpFrameSink {
    fn destination(&self) -> &str {
        &self.destination
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn connect(&self) {
        let mut state = self.state.lock().await;
        // Explicit connects ignore the backoff window.
        state.last_attempt = None;
        self.try_connect_locked(&mut state).await;
    }

    async fn disconnect(&self) {
        let mut state = self.state.lock().await;
        // Dropping the stream closes the socket.
        state.stream = None;
        self.connected.store(false, Ordering::SeqCst);
        debug!(
            component = SINK_COMPONENT,
            destination = self.destination.as_str(),
            "output sink disconnected"
        );
    }

    async fn send(&self, frame: &Frame) -> Result<(), SinkSendError> {
        let mut state = self.state.lock().await;
        if state.stream.is_none() {
            self.try_connect_locked(&mut state).await;
        }
        let Some(stream) = state.stream.as_mut() else {
            return Err(SinkSendError::NotConnected);
        };

        let Ok(len) = u32::try_from(frame.payload.len()) else {
            return Err(SinkSendError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                "payload exceeds u32 frame length",
            )));
        };

        let write_result = async {
            stream.write_all(&len.to_be_bytes()).await?;
            stream.write_all(&frame.payload).await?;
            stream.flush().await
        }
        .await;

        if let Err(err) = write_result {
            state.stream = None;
            self.connected.store(false, Ordering::SeqCst);
            return Err(SinkSendError::Io(err));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{TcpFrameSink, TcpFrameSource};
    use bytes::Bytes;
    use std::time::Duration;
    use stream_router::{Frame, FrameSink, FrameSource, InputId};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const MAX_FRAME: usize = 1024;

    async fn bound_source() -> TcpFrameSource {
        TcpFrameSource::bind(InputId::new("a"), "127.0.0.1:0", MAX_FRAME)
            .await
            .expect("bind on loopback")
    }

    async fn write_frame(stream: &mut TcpStream, payload: &[u8]) {
        let len = payload.len() as u32;
        stream
            .write_all(&len.to_be_bytes())
            .await
            .expect("write length");
        stream.write_all(payload).await.expect("write payload");
        stream.flush().await.expect("flush");
    }

    #[tokio::test]
    async fn source_decodes_length_framed_payloads_in_order() {
        let mut source = bound_source().await;
        let addr = source.local_addr().expect("local addr");

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.expect("connect");
            write_frame(&mut stream, b"first").await;
            write_frame(&mut stream, b"second").await;
        });

        let frame = source.recv().await.expect("first frame");
        assert_eq!(&frame.payload[..], b"first");
        assert_eq!(frame.input, InputId::new("a"));

        let frame = source.recv().await.expect("second frame");
        assert_eq!(&frame.payload[..], b"second");

        client.await.expect("client task");
    }

    #[tokio::test]
    async fn source_counts_oversized_frame_and_survives_reconnect() {
        let mut source = bound_source().await;
        let addr = source.local_addr().expect("local addr");

        let client = tokio::spawn(async move {
            // Advertises a frame larger than the limit.
            let mut stream = TcpStream::connect(addr).await.expect("connect");
            let bogus_len = (MAX_FRAME as u32 + 1).to_be_bytes();
            stream.write_all(&bogus_len).await.expect("write length");
            stream.flush().await.expect("flush");
            // Source closes this connection; send a good frame on a new one.
            drop(stream);
            let mut stream = TcpStream::connect(addr).await.expect("reconnect");
            write_frame(&mut stream, b"good").await;
        });

        let frame = source.recv().await.expect("good frame after malformed");
        assert_eq!(&frame.payload[..], b"good");
        assert_eq!(source.malformed_frames(), 1);

        client.await.expect("client task");
    }

    #[tokio::test]
    async fn source_counts_truncated_frame() {
        let mut source = bound_source().await;
        let addr = source.local_addr().expect("local addr");

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.expect("connect");
            // Promise 100 bytes, deliver 3, then hang up.
            stream
                .write_all(&100u32.to_be_bytes())
                .await
                .expect("write length");
            stream.write_all(b"abc").await.expect("write partial");
            drop(stream);
            let mut stream = TcpStream::connect(addr).await.expect("reconnect");
            write_frame(&mut stream, b"good").await;
        });

        let frame = source.recv().await.expect("good frame after truncated");
        assert_eq!(&frame.payload[..], b"good");
        assert_eq!(source.malformed_frames(), 1);

        client.await.expect("client task");
    }

    #[tokio::test]
    async fn sink_writes_length_framed_payloads() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let sink = TcpFrameSink::new(&addr.to_string(), Duration::from_millis(100));
        sink.connect().await;
        assert!(sink.is_connected());

        let (mut server_side, _) = listener.accept().await.expect("accept");
        sink.send(&Frame::new(InputId::new("a"), Bytes::from_static(b"hello")))
            .await
            .expect("send");

        let mut len_buf = [0u8; 4];
        server_side
            .read_exact(&mut len_buf)
            .await
            .expect("read length");
        assert_eq!(u32::from_be_bytes(len_buf), 5);
        let mut payload = [0u8; 5];
        server_side
            .read_exact(&mut payload)
            .await
            .expect("read payload");
        assert_eq!(&payload, b"hello");
    }

    #[tokio::test]
    async fn sink_reports_not_connected_when_destination_is_down() {
        // Grab a port that nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let sink = TcpFrameSink::new(&addr.to_string(), Duration::from_millis(100));
        let result = sink
            .send(&Frame::new(InputId::new("a"), Bytes::from_static(b"x")))
            .await;

        assert!(result.is_err());
        assert!(!sink.is_connected());
    }

    #[tokio::test]
    async fn sink_connect_and_disconnect_are_idempotent() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let sink = TcpFrameSink::new(&addr.to_string(), Duration::from_millis(100));
        sink.connect().await;
        sink.connect().await;
        assert!(sink.is_connected());

        sink.disconnect().await;
        sink.disconnect().await;
        assert!(!sink.is_connected());
    }
}
