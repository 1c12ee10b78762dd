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

use crate::data_plane::egress_pool::EgressPool;
use crate::errors::{ConfigError, ForceError};
use crate::frame::{Frame, InputId, SignalProbe};
use crate::health::InputHealth;
use crate::observability::{events, fields};
use crate::selection::select_active;
use crate::sink::FrameSink;
use crate::state::{InputStatus, OutputStatus, RouterState, StateNotifier, StateObserver};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const COMPONENT: &str = "router";

/// Static configuration for one input.
///
/// Priority is implied by position in [`RouterConfig::inputs`]; the first
/// entry is preferred. A `signal_threshold` enables quality tracking: the
/// signal timestamp only advances when the probed level meets it. Without a
/// threshold the signal is always considered ok.
#[derive(Clone, Debug)]
pub struct InputConfig {
    pub id: InputId,
    pub failover_window: Duration,
    pub signal_threshold: Option<f32>,
}

impl InputConfig {
    pub fn new(id: InputId, failover_window: Duration) -> Self {
        Self {
            id,
            failover_window,
            signal_threshold: None,
        }
    }

    pub fn with_signal_threshold(mut self, threshold: f32) -> Self {
        self.signal_threshold = Some(threshold);
        self
    }
}

/// Static configuration for a [`Router`].
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Inputs in priority order, highest priority first.
    pub inputs: Vec<InputConfig>,
    /// Capacity of each egress worker's frame queue.
    pub egress_queue_size: usize,
}

struct InputSlot {
    config: InputConfig,
    health: InputHealth,
}

struct RouterCore {
    inputs: Vec<InputSlot>,
    forced: Option<InputId>,
    current: Option<InputId>,
    sinks: Vec<Arc<dyn FrameSink>>,
    egress: Option<EgressPool>,
    notifier: StateNotifier,
    dropped_frames: u64,
}

impl RouterCore {
    fn slot_index(&self, id: &InputId) -> Option<usize> {
        self.inputs.iter().position(|slot| &slot.config.id == id)
    }

    /// Re-evaluates the selection state machine at `now`.
    fn reselect(&mut self, now: Instant) {
        let priority: Vec<InputId> = self
            .inputs
            .iter()
            .map(|slot| slot.config.id.clone())
            .collect();
        let next = select_active(self.forced.as_ref(), &priority, |id| {
            self.slot_index(id)
                .map(|index| self.inputs[index].health.is_available(now))
                .unwrap_or(false)
        });

        if next != self.current {
            info!(
                event = events::ROUTER_SELECTION_CHANGED,
                component = COMPONENT,
                selected = fields::format_optional_input(next.as_ref()),
                previous = fields::format_optional_input(self.current.as_ref()),
                "active input changed"
            );
            self.current = next;
        }
    }

    fn snapshot(&self, now: Instant) -> RouterState {
        RouterState {
            forced_input: self.forced.clone(),
            current_input: self.current.clone(),
            inputs: self
                .inputs
                .iter()
                .map(|slot| InputStatus {
                    id: slot.config.id.clone(),
                    available: slot.health.is_available(now),
                })
                .collect(),
            outputs: self
                .sinks
                .iter()
                .map(|sink| OutputStatus {
                    destination: sink.destination().to_string(),
                    connected: sink.is_connected(),
                })
                .collect(),
        }
    }
}

/// Failover stream router.
///
/// Owns the input health table, the forced/current selection, the sink set,
/// and state change notification, all behind one mutex: selection state is
/// only ever mutated inside this critical section, and snapshots handed out
/// by [`status`][Router::status] are immutable copies.
pub struct Router {
    name: String,
    probe: Arc<dyn SignalProbe>,
    core: Mutex<RouterCore>,
}

impl Router {
    /// Builds a router from configuration. Inputs must be non-empty and
    /// unique by id.
    pub fn new(
        name: &str,
        config: RouterConfig,
        probe: Arc<dyn SignalProbe>,
    ) -> Result<Self, ConfigError> {
        if config.inputs.is_empty() {
            return Err(ConfigError::NoInputs);
        }
        if config.egress_queue_size == 0 {
            return Err(ConfigError::ZeroQueueSize);
        }
        let mut seen = HashSet::new();
        for input in &config.inputs {
            if !seen.insert(input.id.clone()) {
                return Err(ConfigError::DuplicateInput(input.id.as_str().to_string()));
            }
        }

        let inputs = config
            .inputs
            .into_iter()
            .map(|input_config| InputSlot {
                health: InputHealth::new(input_config.failover_window),
                config: input_config,
            })
            .collect();

        debug!(component = COMPONENT, name, "router created");

        Ok(Self {
            name: name.to_string(),
            probe,
            core: Mutex::new(RouterCore {
                inputs,
                forced: None,
                current: None,
                sinks: Vec::new(),
                egress: Some(EgressPool::new(config.egress_queue_size)),
                notifier: StateNotifier::new(),
                dropped_frames: 0,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches one sink and spawns its egress worker. The sink set is
    /// append-only; there is no detach.
    pub async fn add_sink(&self, sink: Arc<dyn FrameSink>) {
        let mut core = self.core.lock().await;
        if let Some(egress) = core.egress.as_mut() {
            egress.attach_sink(sink.clone());
        }
        core.sinks.push(sink);
    }

    /// Registers a state observer. Observers fire on every distinct
    /// snapshot produced by [`recompute`][Router::recompute] and by the
    /// force control actions.
    pub async fn register_observer(&self, observer: Arc<dyn StateObserver>) {
        let mut core = self.core.lock().await;
        core.notifier.register(observer);
    }

    /// Ingests one frame: ticks the source input's health, re-evaluates the
    /// selection, and forwards the frame to every sink only when its source
    /// is the selected input. Frames from non-selected inputs are dropped
    /// and counted, never queued.
    pub async fn handle_frame(&self, frame: Frame) {
        let now = Instant::now();
        let mut core = self.core.lock().await;

        let Some(index) = core.slot_index(&frame.input) else {
            warn!(
                event = events::ROUTER_UNKNOWN_INPUT,
                component = COMPONENT,
                input = frame.input.as_str(),
                "dropping frame from unconfigured input"
            );
            return;
        };

        let signal_ok = match core.inputs[index].config.signal_threshold {
            None => true,
            Some(threshold) => self
                .probe
                .level(&frame.payload)
                .is_some_and(|level| level >= threshold),
        };
        core.inputs[index].health.record_frame(now, signal_ok);

        core.reselect(now);

        if core.current.as_ref() == Some(&frame.input) {
            if let Some(egress) = core.egress.as_ref() {
                egress.broadcast(Arc::new(frame));
            }
        } else {
            core.dropped_frames += 1;
            debug!(
                event = events::ROUTER_FRAME_DROPPED,
                component = COMPONENT,
                input = frame.input.as_str(),
                selected = fields::format_optional_input(core.current.as_ref()),
                reason = fields::REASON_NOT_SELECTED,
                "dropping frame from non-selected input"
            );
        }
    }

    /// Timer-driven availability recomputation and state notification.
    pub async fn recompute(&self) {
        let now = Instant::now();
        let mut core = self.core.lock().await;
        core.reselect(now);
        let state = core.snapshot(now);
        core.notifier.update(state);
    }

    /// Pins selection to `input_id`. The pin holds regardless of priority
    /// ranking but still requires availability: an unavailable forced input
    /// leaves the router in the no-input state until it recovers or the
    /// force is cleared.
    pub async fn force(&self, input_id: &InputId) -> Result<(), ForceError> {
        let now = Instant::now();
        let mut core = self.core.lock().await;

        if core.slot_index(input_id).is_none() {
            return Err(ForceError::UnknownInput(input_id.as_str().to_string()));
        }

        info!(
            event = events::ROUTER_FORCE_SET,
            component = COMPONENT,
            input = input_id.as_str(),
            "operator forced input"
        );
        core.forced = Some(input_id.clone());
        core.reselect(now);
        let state = core.snapshot(now);
        core.notifier.update(state);
        Ok(())
    }

    /// Clears an operator force and restores automatic priority selection.
    pub async fn clear_force(&self) {
        let now = Instant::now();
        let mut core = self.core.lock().await;

        info!(
            event = events::ROUTER_FORCE_CLEARED,
            component = COMPONENT,
            "operator cleared forced input"
        );
        core.forced = None;
        core.reselect(now);
        let state = core.snapshot(now);
        core.notifier.update(state);
    }

    /// Returns an immutable snapshot of the current router state.
    pub async fn status(&self) -> RouterState {
        let now = Instant::now();
        let mut core = self.core.lock().await;
        core.reselect(now);
        core.snapshot(now)
    }

    /// Count of frames dropped because their source was not selected.
    pub async fn dropped_frames(&self) -> u64 {
        self.core.lock().await.dropped_frames
    }

    /// Closes the egress fan-out and awaits every worker. Idempotent; late
    /// frames after shutdown are dropped silently.
    pub async fn shutdown(&self) {
        let egress = {
            let mut core = self.core.lock().await;
            core.egress.take()
        };
        if let Some(egress) = egress {
            egress.shutdown().await;
        }
    }
}
