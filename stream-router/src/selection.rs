//! Active-input selection policy: operator force first, then priority order.

use crate::frame::InputId;

/// Resolves the active input for one evaluation instant.
///
/// A forced input wins only while it is available; an unavailable forced
/// input yields `None` even when lower-priority inputs are healthy, so the
/// operator's pin is never silently overridden. Without a force, the first
/// available input in configured priority order wins.
pub(crate) fn select_active<F>(
    forced: Option<&InputId>,
    priority: &[InputId],
    is_available: F,
) -> Option<InputId>
where
    F: Fn(&InputId) -> bool,
{
    if let Some(forced) = forced {
        if is_available(forced) {
            return Some(forced.clone());
        }
        return None;
    }

    priority.iter().find(|id| is_available(id)).cloned()
}
