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

//! Egress worker that forwards broadcast frames to one sink.

use crate::frame::Frame;
use crate::observability::{events, fields};
use crate::sink::FrameSink;
use std::sync::Arc;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

const COMPONENT: &str = "egress_worker";

/// Worker state that owns the spawned dispatch task handle.
pub(crate) struct EgressWorker {
    worker_id: String,
    dispatch_handle: JoinHandle<()>,
}

impl EgressWorker {
    /// Spawns one dispatch loop task for one sink.
    pub(crate) fn new(sink: Arc<dyn FrameSink>, frame_receiver: Receiver<Arc<Frame>>) -> Self {
        let worker_id = Uuid::new_v4().to_string();
        let worker_id_for_loop = worker_id.clone();

        debug!(
            event = events::EGRESS_WORKER_CREATE,
            component = COMPONENT,
            worker_id = worker_id.as_str(),
            destination = sink.destination(),
            "spawning egress worker"
        );

        let dispatch_handle = tokio::spawn(async move {
            Self::dispatch_loop(worker_id_for_loop, sink, frame_receiver).await;
        });

        Self {
            worker_id,
            dispatch_handle,
        }
    }

    /// Returns the unique worker identifier for correlation logs.
    pub(crate) fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Awaits the dispatch loop; resolves once the broadcast channel closes.
    pub(crate) async fn join(self) {
        let _ = self.dispatch_handle.await;
    }

    /// Forwards each received frame to the sink. Send failures are logged and
    /// never retried here; the sink's own transport owns reconnection.
    pub(crate) async fn dispatch_loop(
        worker_id: String,
        sink: Arc<dyn FrameSink>,
        mut frame_receiver: Receiver<Arc<Frame>>,
    ) {
        loop {
            match frame_receiver.recv().await {
                Ok(frame) => {
                    debug!(
                        event = events::EGRESS_SEND_ATTEMPT,
                        component = COMPONENT,
                        worker_id = worker_id.as_str(),
                        destination = sink.destination(),
                        input = frame.input.as_str(),
                        payload_len = frame.payload.len(),
                        "attempting egress send"
                    );

                    match sink.send(&frame).await {
                        Ok(()) => {
                            debug!(
                                event = events::EGRESS_SEND_OK,
                                component = COMPONENT,
                                worker_id = worker_id.as_str(),
                                destination = sink.destination(),
                                input = frame.input.as_str(),
                                "egress send succeeded"
                            );
                        }
                        Err(err) => {
                            warn!(
                                event = events::EGRESS_SEND_FAILED,
                                component = COMPONENT,
                                worker_id = worker_id.as_str(),
                                destination = sink.destination(),
                                input = frame.input.as_str(),
                                err = %err,
                                "egress send failed"
                            );
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        event = events::EGRESS_RECV_LAGGED,
                        component = COMPONENT,
                        worker_id = worker_id.as_str(),
                        destination = sink.destination(),
                        skipped,
                        "receiver lagged"
                    );
                }
                Err(RecvError::Closed) => {
                    info!(
                        event = events::EGRESS_RECV_CLOSED,
                        component = COMPONENT,
                        worker_id = worker_id.as_str(),
                        destination = sink.destination(),
                        reason = fields::REASON_BROADCAST_CLOSED,
                        "receiver closed; stopping dispatch loop"
                    );
                    break;
                }
            }
        }
    }
}
