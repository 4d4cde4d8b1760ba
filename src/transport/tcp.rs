use std::io::ErrorKind;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::{self, Message, ProtocolError};
use crate::transport::Transport;

/// Default timeout for writing one frame (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum frame payload (64 KiB). Every valid message is far smaller.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

const HEADER_LEN: usize = 4;

const READ_CHUNK: usize = 4096;

/// JSON messages framed by a 4-byte big-endian length prefix.
///
/// Incoming bytes are buffered until a whole frame is present, so dropping
/// a pending `recv` never loses data.
pub struct TcpTransport {
    stream: TcpStream,
    timeout_duration: Duration,
    max_message_size: usize,
    buffer: Vec<u8>,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE)
    }

    pub fn with_config(stream: TcpStream, timeout_duration: Duration, max_message_size: usize) -> Self {
        Self {
            stream,
            timeout_duration,
            max_message_size,
            buffer: Vec::with_capacity(READ_CHUNK),
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    /// Pop one complete frame off the buffer, if there is one.
    fn take_frame(&mut self) -> anyhow::Result<Option<Message>> {
        if self.buffer.len() < HEADER_LEN {
            return Ok(None);
        }
        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&self.buffer[..HEADER_LEN]);
        let len = u32::from_be_bytes(header) as usize;

        if len == 0 {
            self.buffer.drain(..HEADER_LEN);
            return Err(ProtocolError::Malformed("empty frame".to_string()).into());
        }
        if len > self.max_message_size {
            return Err(ProtocolError::TooLarge {
                len,
                max: self.max_message_size,
            }
            .into());
        }
        if self.buffer.len() < HEADER_LEN + len {
            return Ok(None);
        }

        let frame: Vec<u8> = self.buffer.drain(..HEADER_LEN + len).skip(HEADER_LEN).collect();
        Ok(Some(protocol::decode(&frame)?))
    }
}

fn io_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::UnexpectedEof => {
            anyhow::anyhow!("Connection closed by peer")
        }
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        let data = protocol::encode(&msg)?;
        if data.len() > self.max_message_size {
            return Err(ProtocolError::TooLarge {
                len: data.len(),
                max: self.max_message_size,
            }
            .into());
        }

        let send_op = async {
            let len = (data.len() as u32).to_be_bytes();
            self.stream.write_all(&len).await.map_err(io_error)?;
            self.stream.write_all(&data).await.map_err(io_error)?;
            anyhow::Ok(())
        };

        timeout(self.timeout_duration, send_op)
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.timeout_duration))?
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        loop {
            if let Some(msg) = self.take_frame()? {
                return Ok(msg);
            }
            let mut chunk = [0u8; READ_CHUNK];
            let n = self.stream.read(&mut chunk).await.map_err(io_error)?;
            if n == 0 {
                return Err(anyhow::anyhow!("Connection closed by peer"));
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}
