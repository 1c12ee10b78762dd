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

use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// Stable identity of a configured input.
///
/// Cheap to clone; the backing string is shared.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct InputId(Arc<str>);

impl InputId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque byte frame tagged with the input it arrived on.
///
/// The framing format (length prefix, delimiter) is a transport concern and
/// is already stripped by the time a `Frame` reaches the router.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Frame {
    pub input: InputId,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(input: InputId, payload: Bytes) -> Self {
        Self { input, payload }
    }
}

/// Decodes an optional signal-quality level from a frame payload.
///
/// Implementations return `None` when the payload carries no decodable
/// indicator. The router compares the level against each input's configured
/// threshold; inputs without a threshold skip quality tracking entirely.
pub trait SignalProbe: Send + Sync {
    /// Returns the decoded signal level, normalized to `0.0..=1.0`.
    fn level(&self, payload: &[u8]) -> Option<f32>;
}

/// Probe that never decodes a level. Quality tracking stays disabled.
pub struct NoProbe;

impl SignalProbe for NoProbe {
    fn level(&self, _payload: &[u8]) -> Option<f32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{InputId, NoProbe, SignalProbe};

    #[test]
    fn input_id_equality_follows_backing_string() {
        assert_eq!(InputId::new("studio-a"), InputId::new("studio-a"));
        assert_ne!(InputId::new("studio-a"), InputId::new("studio-b"));
    }

    #[test]
    fn input_id_displays_backing_string() {
        assert_eq!(InputId::new("studio-a").to_string(), "studio-a");
    }

    #[test]
    fn no_probe_never_decodes_a_level() {
        assert!(NoProbe.level(&[0xff; 32]).is_none());
    }
}
