//! Egress pool: owns the frame broadcast channel and one worker per sink.

use crate::data_plane::egress_worker::EgressWorker;
use crate::frame::Frame;
use crate::sink::FrameSink;
use std::sync::Arc;
use tokio::sync::broadcast::Sender;
use tracing::debug;

const COMPONENT: &str = "egress_pool";

/// Fan-out pool over the configured sink set.
///
/// The sink set is append-only after startup: workers are attached once and
/// live until the pool (and its broadcast sender) is dropped.
pub(crate) struct EgressPool {
    frame_sender: Sender<Arc<Frame>>,
    workers: Vec<EgressWorker>,
}

impl EgressPool {
    /// Creates an empty pool with the given per-worker queue capacity.
    pub(crate) fn new(queue_size: usize) -> Self {
        let (frame_sender, _) = tokio::sync::broadcast::channel(queue_size);
        Self {
            frame_sender,
            workers: Vec::new(),
        }
    }

    /// Attaches one sink and spawns its dispatch worker.
    pub(crate) fn attach_sink(&mut self, sink: Arc<dyn FrameSink>) {
        let worker = EgressWorker::new(sink, self.frame_sender.subscribe());
        debug!(
            component = COMPONENT,
            worker_id = worker.worker_id(),
            "attached egress sink"
        );
        self.workers.push(worker);
    }

    /// Fans one frame out to every attached worker. Returns the number of
    /// workers the frame was queued for; zero when no sinks are attached.
    pub(crate) fn broadcast(&self, frame: Arc<Frame>) -> usize {
        // send() only errors when there are no receivers, which here means
        // no sinks were attached. That is a legal configuration.
        self.frame_sender.send(frame).unwrap_or(0)
    }

    /// Closes the broadcast channel and awaits every worker's dispatch loop.
    pub(crate) async fn shutdown(self) {
        drop(self.frame_sender);
        for worker in self.workers {
            worker.join().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EgressPool;
    use crate::errors::SinkSendError;
    use crate::frame::{Frame, InputId};
    use crate::sink::FrameSink;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingSink {
        send_count: AtomicUsize,
    }

    #[async_trait]
    impl FrameSink for CountingSink {
        fn destination(&self) -> &str {
            "counting-sink"
        }

        fn is_connected(&self) -> bool {
            true
        }

        async fn connect(&self) {}

        async fn disconnect(&self) {}

        async fn send(&self, _frame: &Frame) -> Result<(), SinkSendError> {
            self.send_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_every_attached_sink() {
        let mut pool = EgressPool::new(8);
        let sink_a = Arc::new(CountingSink::default());
        let sink_b = Arc::new(CountingSink::default());
        pool.attach_sink(sink_a.clone());
        pool.attach_sink(sink_b.clone());

        let queued = pool.broadcast(Arc::new(Frame::new(
            InputId::new("a"),
            Bytes::from_static(b"frame"),
        )));
        assert_eq!(queued, 2);

        pool.shutdown().await;
        assert_eq!(sink_a.send_count.load(Ordering::Relaxed), 1);
        assert_eq!(sink_b.send_count.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn broadcast_without_sinks_is_a_no_op() {
        let pool = EgressPool::new(8);

        let queued = pool.broadcast(Arc::new(Frame::new(
            InputId::new("a"),
            Bytes::from_static(b"frame"),
        )));

        assert_eq!(queued, 0);
    }
}
