//! Duplex link to a receiver
//!
//! Splits any async byte stream into a reader task that drives a
//! [`Reassembler`] and a command path that frames outbound messages and
//! waits for the receiver's ACK or NACK.

use crate::core::codec::{CodecError, LayoutError};
use crate::core::messages::Message;
use crate::core::protocol::{encode_frame, FrameError, DEFAULT_MAX_BUFFER};
use crate::core::reassembler::{AckReceiver, Acknowledgement, MessageReceiver, Reassembler, ReassemblerStats};
use crate::core::registry::Registry;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Link error types
#[derive(Error, Debug)]
pub enum LinkError {
    /// The message catalog failed validation
    #[error("Invalid message catalog: {0}")]
    Layout(#[from] LayoutError),

    /// The command could not be encoded
    #[error("Encode error: {0}")]
    Codec(#[from] CodecError),

    /// The command could not be framed
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No ACK or NACK arrived in time
    #[error("No acknowledgement within {0:?}")]
    AckTimeout(Duration),

    /// The reader stopped
    #[error("Link closed")]
    Closed,
}

/// Link configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Delivery channel capacity
    pub queue_capacity: usize,
    /// Bound on bytes buffered while looking for a frame
    pub max_buffer: usize,
    /// Read size of the reader task
    pub read_chunk: usize,
    /// Bound on the wait for an acknowledgement, none waits forever
    pub ack_timeout_ms: Option<u64>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            max_buffer: DEFAULT_MAX_BUFFER,
            read_chunk: 1024,
            ack_timeout_ms: None,
        }
    }
}

impl LinkConfig {
    /// Acknowledgement timeout
    pub fn ack_timeout(&self) -> Option<Duration> {
        self.ack_timeout_ms.map(Duration::from_millis)
    }

    /// Set the acknowledgement timeout
    #[must_use]
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }
}

struct CommandPath {
    writer: Box<dyn AsyncWrite + Send + Unpin>,
    acks: AckReceiver,
}

/// Running link
pub struct Link {
    registry: &'static Registry,
    commands: Mutex<CommandPath>,
    paused: watch::Sender<bool>,
    stats: Arc<RwLock<ReassemblerStats>>,
    ack_timeout: Option<Duration>,
    reader: JoinHandle<()>,
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("paused", &*self.paused.borrow())
            .field("ack_timeout", &self.ack_timeout)
            .field("closed", &self.reader.is_finished())
            .finish_non_exhaustive()
    }
}

impl Link {
    /// Start a link over a byte stream
    ///
    /// Must be called from within a tokio runtime. Returns the link and the
    /// receiving end of the message channel; the channel ends when the
    /// stream reaches EOF or fails.
    pub fn spawn<T>(io: T, config: &LinkConfig) -> Result<(Self, MessageReceiver), LinkError>
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        let registry = Registry::global()?;
        let (reassembler, messages, acks) =
            Reassembler::channel(registry, config.queue_capacity, config.max_buffer);
        let stats = reassembler.shared_stats();
        let (reader, writer) = tokio::io::split(io);
        let (paused_tx, paused_rx) = watch::channel(false);

        let reader = tokio::spawn(read_loop(reader, reassembler, paused_rx, config.read_chunk.max(1)));

        let link = Self {
            registry,
            commands: Mutex::new(CommandPath {
                writer: Box::new(writer),
                acks,
            }),
            paused: paused_tx,
            stats,
            ack_timeout: config.ack_timeout(),
            reader,
        };
        Ok((link, messages))
    }

    /// Send a command and wait for the receiver's acknowledgement
    ///
    /// Commands are serialized: a second caller waits until the first one
    /// has its answer. A command that fails to encode is never written.
    pub async fn send_command(&self, message: &Message) -> Result<Acknowledgement, LinkError> {
        let payload = self.registry.encode(message)?;
        let frame = encode_frame(&payload)?;

        let mut path = self.commands.lock().await;
        path.acks.mark_unchanged();
        path.writer.write_all(&frame).await?;
        path.writer.flush().await?;
        tracing::debug!(message = message.name(), bytes = frame.len(), "Command sent");

        let changed = path.acks.changed();
        let result = match self.ack_timeout {
            Some(limit) => tokio::time::timeout(limit, changed)
                .await
                .map_err(|_| LinkError::AckTimeout(limit))?,
            None => changed.await,
        };
        result.map_err(|_| LinkError::Closed)?;

        let ack = (*path.acks.borrow_and_update()).ok_or(LinkError::Closed)?;
        tracing::debug!(message = message.name(), %ack, "Command acknowledged");
        Ok(ack)
    }

    /// Stop reading from the stream until [`resume_reading`](Self::resume_reading)
    pub fn pause_reading(&self) {
        self.paused.send_replace(true);
    }

    /// Resume reading from the stream
    pub fn resume_reading(&self) {
        self.paused.send_replace(false);
    }

    /// Whether reading is paused
    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    /// Whether the reader has stopped
    pub fn is_closed(&self) -> bool {
        self.reader.is_finished()
    }

    /// Reassembly counters snapshot
    pub fn stats(&self) -> ReassemblerStats {
        *self.stats.read()
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_loop<R>(mut reader: R, mut reassembler: Reassembler, mut paused: watch::Receiver<bool>, chunk: usize)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; chunk];
    loop {
        while *paused.borrow_and_update() {
            if paused.changed().await.is_err() {
                return;
            }
        }

        tokio::select! {
            biased;

            changed = paused.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            result = reader.read(&mut buf) => match result {
                Ok(0) => {
                    tracing::info!("Link stream closed");
                    return;
                }
                Ok(n) => reassembler.feed(&buf[..n]),
                Err(e) => {
                    tracing::error!(error = %e, "Link read failed");
                    return;
                }
            },
        }
    }
}
