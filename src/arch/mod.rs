//! # Architecture Abstraction Layer
//!
//! Hardware source of scheduler time. Currently implements the Cortex-M4
//! port; host builds drive the scheduler from a
//! [`ManualClock`](crate::time::ManualClock) instead.

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod cortex_m4;
