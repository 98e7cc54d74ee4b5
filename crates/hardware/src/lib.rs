//! Cycle-accurate 3D-stacked DRAM simulator core.
//!
//! This crate implements the timing model of a Mono3D shared-memory device and
//! its bank-parallel controller:
//! 1. **Device:** Hierarchical bank state, JEDEC-style timing fences at the
//!    channel and bank levels, the four-activate window, and readiness /
//!    prerequisite queries for any command at any address.
//! 2. **Controller:** Read/write/priority/active request buffers, a
//!    dual-watermark read-write mode switch, multi-issue with bank
//!    exclusivity for accessing commands, and completion tracking.
//! 3. **Configuration:** Presets and per-parameter overrides, deserialized
//!    with serde.
//! 4. **Statistics:** Per-channel row-buffer, queue, and latency counters.

/// Common types (levels, address vectors, clocks, configuration errors).
pub mod common;
/// Simulator configuration (defaults, presets, hierarchical structures).
pub mod config;
/// Bank-parallel controller (buffers, scheduler, refresh, policies).
pub mod controller;
/// DRAM device timing engine (commands, organization, timing, node tree).
pub mod dram;
/// Per-channel statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Per-channel controller; owns its device, buffers, and scheduling hooks.
pub use crate::controller::BankParallelController;
/// Request record submitted by a front-end.
pub use crate::controller::{ReqType, Request};
/// The Mono3D device timing engine.
pub use crate::dram::StackedDram;
