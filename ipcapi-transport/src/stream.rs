// JSON-lines transport over any byte stream
// `serve_connection` answers requests from a local `Invoke` target;
// `StreamInvoker` is the calling side and correlates responses by id.

use async_trait::async_trait;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use ipcapi_core::{HandlerResult, RpcError};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, WriteHalf};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, trace, warn};

use crate::codec::{CodecError, NewlineDelimitedCodec};
use crate::transport::{Invoke, TransportError};
use crate::wire::{Outcome, WireMessage};

/// Drain `rx` into the write half until every sender is gone, then shut the
/// write half down so the peer sees end of stream.
async fn write_frames<IO>(
    writer: WriteHalf<IO>,
    mut rx: mpsc::UnboundedReceiver<WireMessage>,
) -> Result<(), CodecError>
where
    IO: AsyncRead + AsyncWrite,
{
    let mut sink = FramedWrite::new(writer, NewlineDelimitedCodec::new());
    while let Some(msg) = rx.recv().await {
        trace!(id = msg.id(), "writing frame");
        sink.send(msg).await?;
    }
    sink.close().await
}

/// Serve requests arriving on `io` by forwarding them to `target`.
///
/// Each request runs in its own task, so a slow handler does not hold up the
/// others and responses may leave in a different order than requests came in.
/// Returns once the peer closes its side and all in-flight responses are written.
pub async fn serve_connection<IO>(io: IO, target: Arc<dyn Invoke>) -> Result<(), TransportError>
where
    IO: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, writer) = tokio::io::split(io);
    let mut frames = FramedRead::new(reader, NewlineDelimitedCodec::new());
    let (tx, rx) = mpsc::unbounded_channel();
    let writer_task = tokio::spawn(write_frames(writer, rx));

    while let Some(frame) = frames.next().await {
        match frame? {
            WireMessage::Request {
                id,
                channel,
                payload,
            } => {
                debug!(id, %channel, "dispatching request");
                let target = Arc::clone(&target);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let outcome = Outcome::from(target.invoke(&channel, payload).await);
                    if tx.send(WireMessage::Response { id, outcome }).is_err() {
                        warn!(id, %channel, "connection writer gone, dropping response");
                    }
                });
            }
            WireMessage::Response { id, .. } => {
                warn!(id, "ignoring response frame on serving connection");
            }
        }
    }

    drop(tx);
    writer_task.await??;
    debug!("connection closed by peer");
    Ok(())
}

struct Pending {
    calls: DashMap<u64, oneshot::Sender<HandlerResult>>,
    closed: AtomicBool,
}

impl Pending {
    fn complete(&self, id: u64, result: HandlerResult) {
        match self.calls.remove(&id) {
            Some((_, waiter)) => {
                let _ = waiter.send(result);
            }
            None => warn!(id, "response for unknown call"),
        }
    }

    /// Mark the connection closed and fail every outstanding call.
    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let ids: Vec<u64> = self.calls.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            if let Some((_, waiter)) = self.calls.remove(&id) {
                let _ = waiter.send(Err(RpcError::canceled("connection closed")));
            }
        }
    }
}

/// Calling side of a JSON-lines connection.
pub struct StreamInvoker {
    next_id: AtomicU64,
    pending: Arc<Pending>,
    outbound: mpsc::UnboundedSender<WireMessage>,
    reader_task: JoinHandle<()>,
}

impl StreamInvoker {
    /// Start the reader and writer tasks for `io`. Must be called inside a
    /// tokio runtime.
    pub fn connect<IO>(io: IO) -> Self
    where
        IO: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(io);
        let (outbound, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(Pending {
            calls: DashMap::new(),
            closed: AtomicBool::new(false),
        });

        let on_write_failure = Arc::clone(&pending);
        tokio::spawn(async move {
            if let Err(e) = write_frames(writer, rx).await {
                warn!("invoker writer failed: {}", e);
                on_write_failure.close();
            }
        });

        let responses = Arc::clone(&pending);
        let reader_task = tokio::spawn(async move {
            let mut frames = FramedRead::new(reader, NewlineDelimitedCodec::new());
            while let Some(frame) = frames.next().await {
                match frame {
                    Ok(WireMessage::Response { id, outcome }) => {
                        responses.complete(id, outcome.into());
                    }
                    Ok(WireMessage::Request { id, channel, .. }) => {
                        warn!(id, %channel, "ignoring request frame on invoking connection");
                    }
                    Err(e) => {
                        warn!("invoker reader failed: {}", e);
                        break;
                    }
                }
            }
            responses.close();
        });

        Self {
            next_id: AtomicU64::new(1),
            pending,
            outbound,
            reader_task,
        }
    }

    /// Number of calls still waiting for a response.
    pub fn pending_calls(&self) -> usize {
        self.pending.calls.len()
    }

    pub fn is_closed(&self) -> bool {
        self.pending.closed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for StreamInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamInvoker")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .field("pending_calls", &self.pending_calls())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Drop for StreamInvoker {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

#[async_trait]
impl Invoke for StreamInvoker {
    async fn invoke(&self, channel: &str, payload: Value) -> HandlerResult {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (waiter, response) = oneshot::channel();
        self.pending.calls.insert(id, waiter);

        // `close` may have drained the table just before the insert above.
        if self.is_closed() {
            self.pending.calls.remove(&id);
            return Err(RpcError::canceled("connection closed"));
        }

        trace!(id, channel, "sending request");
        let request = WireMessage::Request {
            id,
            channel: channel.to_string(),
            payload,
        };
        if self.outbound.send(request).is_err() {
            self.pending.calls.remove(&id);
            return Err(RpcError::canceled("connection closed"));
        }

        response
            .await
            .unwrap_or_else(|_| Err(RpcError::canceled("connection closed")))
    }
}
