/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Ingress receive loop: one task per input feeding the router.

use crate::frame::Frame;
use crate::observability::events;
use crate::router::Router;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const COMPONENT: &str = "ingress";

/// Inbound frame supply for one input.
///
/// `recv` suspends until the next complete frame is available and returns
/// `None` once the source is closed for good. Transport-level errors stay
/// inside the implementation; the router only ever observes frames or the
/// end of the stream.
#[async_trait]
pub trait FrameSource: Send {
    /// Identity label used in logs.
    fn label(&self) -> &str;

    async fn recv(&mut self) -> Option<Frame>;
}

/// Spawns the blocking-receive loop for one input.
///
/// The loop stops when the source closes or when the shutdown signal flips
/// to `true`; both paths resolve the returned handle so callers can join
/// every ingress task before exit.
pub fn spawn_ingress(
    router: Arc<Router>,
    mut source: Box<dyn FrameSource>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let label = source.label().to_string();
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!(
                            event = events::INGRESS_SHUTDOWN,
                            component = COMPONENT,
                            input = label.as_str(),
                            "shutdown signalled; stopping ingress loop"
                        );
                        break;
                    }
                }
                frame = source.recv() => {
                    match frame {
                        Some(frame) => {
                            debug!(
                                event = events::INGRESS_RECEIVE,
                                component = COMPONENT,
                                input = frame.input.as_str(),
                                payload_len = frame.payload.len(),
                                "received ingress frame"
                            );
                            router.handle_frame(frame).await;
                        }
                        None => {
                            info!(
                                event = events::INGRESS_SOURCE_CLOSED,
                                component = COMPONENT,
                                input = label.as_str(),
                                "source closed; stopping ingress loop"
                            );
                            break;
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{spawn_ingress, FrameSource};
    use crate::frame::{Frame, InputId, NoProbe};
    use crate::router::{InputConfig, Router, RouterConfig};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    struct ScriptedSource {
        frames: Vec<Frame>,
    }

    #[async_trait]
    impl FrameSource for ScriptedSource {
        fn label(&self) -> &str {
            "scripted"
        }

        async fn recv(&mut self) -> Option<Frame> {
            if self.frames.is_empty() {
                None
            } else {
                Some(self.frames.remove(0))
            }
        }
    }

    struct PendingSource;

    #[async_trait]
    impl FrameSource for PendingSource {
        fn label(&self) -> &str {
            "pending"
        }

        async fn recv(&mut self) -> Option<Frame> {
            std::future::pending().await
        }
    }

    fn router() -> Arc<Router> {
        let config = RouterConfig {
            inputs: vec![InputConfig::new(
                InputId::new("a"),
                Duration::from_secs(5),
            )],
            egress_queue_size: 8,
        };
        Arc::new(Router::new("ingress-test", config, Arc::new(NoProbe)).expect("valid config"))
    }

    #[tokio::test]
    async fn ingress_loop_feeds_router_until_source_closes() {
        let router = router();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let source = Box::new(ScriptedSource {
            frames: vec![Frame::new(InputId::new("a"), Bytes::from_static(b"f1"))],
        });

        spawn_ingress(router.clone(), source, shutdown_rx)
            .await
            .expect("ingress task should not panic");

        // The single frame ticked input "a" and made it the selection.
        let state = router.status().await;
        assert_eq!(state.current_input, Some(InputId::new("a")));
    }

    #[tokio::test]
    async fn ingress_loop_stops_on_shutdown_signal() {
        let router = router();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = spawn_ingress(router, Box::new(PendingSource), shutdown_rx);
        shutdown_tx.send(true).expect("receiver is alive");

        handle.await.expect("ingress task should stop cleanly");
    }
}
