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

//! # stream-router
//!
//! `stream-router` implements an event-driven failover router for opaque byte
//! frames. A fixed set of inputs supplies frames; the router tracks each
//! input's heartbeat and signal recency, selects the active input by operator
//! force or configured priority, and fans forwarded frames out to every
//! configured sink.
//!
//! Typical usage is API-first and remains centered on [`Router`]. Transports
//! stay outside the crate behind the [`FrameSource`] and [`FrameSink`] seams,
//! so the core can be driven by TCP, in-process channels, or test doubles
//! alike.
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use stream_router::{InputConfig, InputId, NoProbe, Router, RouterConfig};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let config = RouterConfig {
//!     inputs: vec![
//!         InputConfig::new(InputId::new("primary"), Duration::from_secs(5)),
//!         InputConfig::new(InputId::new("backup"), Duration::from_secs(5)),
//!     ],
//!     egress_queue_size: 16,
//! };
//! let router = Router::new("quick-start", config, Arc::new(NoProbe)).unwrap();
//!
//! // No frames yet, so nothing is available and nothing is selected.
//! let state = router.status().await;
//! assert!(state.current_input.is_none());
//! # });
//! ```
//!
//! ## Selection contract
//!
//! Evaluated whenever a frame arrives or the recompute timer fires:
//! a forced input wins when it is available; otherwise the first available
//! input in configured priority order wins; otherwise the router is in the
//! no-input state and frames are dropped, not queued. A forced input that is
//! unavailable yields no-input even when other inputs are healthy.
//!
//! ## Internal architecture map
//!
//! - API facade: outward [`Router`] surface plus frame/sink/source seams
//! - Policy: input health recency and priority selection rules
//! - Data plane: per-input ingress tasks and the egress worker fan-out
//! - Runtime: recompute timer and watch-based shutdown propagation
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events. Library code emits
//! events and does not unconditionally initialize a global subscriber;
//! binaries and tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

mod errors;
pub use errors::{BindError, ConfigError, ForceError, SinkSendError};

mod frame;
pub use frame::{Frame, InputId, NoProbe, SignalProbe};

mod health;
pub use health::InputHealth;

mod selection;

mod sink;
pub use sink::FrameSink;

mod state;
pub use state::{InputStatus, OutputStatus, RouterState, StateObserver};

mod data_plane;
pub use data_plane::ingress::{spawn_ingress, FrameSource};

#[doc(hidden)]
pub mod observability;

mod runtime;
pub use runtime::timer::spawn_recompute_timer;

mod router;
pub use router::{InputConfig, Router, RouterConfig};
