//! Data-plane layer.
//!
//! Owns the per-input ingress receive loops and the egress worker fan-out.
//! This layer translates the router's selection decisions into concrete
//! frame dispatch execution paths.

pub(crate) mod egress_pool;
pub(crate) mod egress_worker;
pub mod ingress;
