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

use crate::errors::SinkSendError;
use crate::frame::Frame;
use async_trait::async_trait;

/// Outbound destination frames are forwarded to.
///
/// `send` is fire-and-forget from the router's perspective: a failure is
/// logged by the egress worker and never retried synchronously. Reconnection
/// belongs to the transport implementation, which reflects progress through
/// `is_connected`. `connect` and `disconnect` are idempotent.
#[async_trait]
pub trait FrameSink: Send + Sync {
    /// Human-readable destination label used in snapshots and logs.
    fn destination(&self) -> &str;

    /// Current connectivity flag as maintained by the transport.
    fn is_connected(&self) -> bool;

    async fn connect(&self);

    async fn disconnect(&self);

    async fn send(&self, frame: &Frame) -> Result<(), SinkSendError>;
}
