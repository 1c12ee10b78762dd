//! Runtime layer: periodic recomputation and task lifecycle helpers.

pub(crate) mod timer;
