//! Canonical structured event names used across `stream-router`.

// Egress worker and pool events.
pub const EGRESS_SEND_ATTEMPT: &str = "egress_send_attempt";
pub const EGRESS_SEND_OK: &str = "egress_send_ok";
pub const EGRESS_SEND_FAILED: &str = "egress_send_failed";
pub const EGRESS_RECV_LAGGED: &str = "egress_recv_lagged";
pub const EGRESS_RECV_CLOSED: &str = "egress_recv_closed";
pub const EGRESS_WORKER_CREATE: &str = "egress_worker_create";

// Ingress events.
pub const INGRESS_RECEIVE: &str = "ingress_receive";
pub const INGRESS_SOURCE_CLOSED: &str = "ingress_source_closed";
pub const INGRESS_SHUTDOWN: &str = "ingress_shutdown";

// Router selection and control events.
pub const ROUTER_UNKNOWN_INPUT: &str = "router_unknown_input";
pub const ROUTER_SELECTION_CHANGED: &str = "router_selection_changed";
pub const ROUTER_FRAME_DROPPED: &str = "router_frame_dropped";
pub const ROUTER_FORCE_SET: &str = "router_force_set";
pub const ROUTER_FORCE_CLEARED: &str = "router_force_cleared";

// State notification events.
pub const STATE_CHANGED: &str = "state_changed";

// Recompute timer events.
pub const RECOMPUTE_TICK: &str = "recompute_tick";
pub const RECOMPUTE_SHUTDOWN: &str = "recompute_shutdown";
