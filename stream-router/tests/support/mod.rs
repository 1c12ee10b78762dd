//! Shared test doubles for router integration tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stream_router::{
    Frame, FrameSink, InputConfig, InputId, NoProbe, Router, RouterConfig, RouterState,
    SinkSendError, StateObserver,
};

/// Sink that records every forwarded frame and can be flipped offline.
pub struct RecordingSink {
    destination: String,
    connected: AtomicBool,
    frames: Mutex<Vec<Frame>>,
}

impl RecordingSink {
    pub fn new(destination: &str) -> Arc<Self> {
        Arc::new(Self {
            destination: destination.to_string(),
            connected: AtomicBool::new(true),
            frames: Mutex::new(Vec::new()),
        })
    }

    pub fn go_offline(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn recorded(&self) -> Vec<Frame> {
        self.frames.lock().expect("sink mutex poisoned").clone()
    }

    /// Polls until the sink has recorded at least `count` frames or the
    /// timeout elapses. Egress delivery runs on worker tasks, so tests must
    /// wait rather than assert immediately.
    pub async fn wait_for_frames(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.recorded().len() >= count {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl FrameSink for RecordingSink {
    fn destination(&self) -> &str {
        &self.destination
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    async fn send(&self, frame: &Frame) -> Result<(), SinkSendError> {
        if !self.is_connected() {
            return Err(SinkSendError::NotConnected);
        }
        self.frames
            .lock()
            .expect("sink mutex poisoned")
            .push(frame.clone());
        Ok(())
    }
}

/// Observer that collects every emitted snapshot.
#[derive(Default)]
pub struct CollectingObserver {
    states: Mutex<Vec<RouterState>>,
}

impl CollectingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn collected(&self) -> Vec<RouterState> {
        self.states.lock().expect("observer mutex poisoned").clone()
    }
}

impl StateObserver for CollectingObserver {
    fn on_state(&self, state: &RouterState) {
        self.states
            .lock()
            .expect("observer mutex poisoned")
            .push(state.clone());
    }
}

/// Router with inputs `a` (highest priority) then `b`, both on `window`.
pub fn priority_ab_router(window: Duration) -> Arc<Router> {
    let config = RouterConfig {
        inputs: vec![
            InputConfig::new(InputId::new("a"), window),
            InputConfig::new(InputId::new("b"), window),
        ],
        egress_queue_size: 16,
    };
    Arc::new(Router::new("integration", config, Arc::new(NoProbe)).expect("valid config"))
}

pub fn frame(input: &str, payload: &'static [u8]) -> Frame {
    Frame::new(InputId::new(input), Bytes::from_static(payload))
}
