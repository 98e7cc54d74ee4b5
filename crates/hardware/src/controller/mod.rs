//! Bank-parallel memory controller.
//!
//! This module tree implements the per-channel scheduler that drives the
//! device. It provides:
//! 1. **Requests:** The request record and the bounded request buffer.
//! 2. **Scheduling:** The pairwise-compare scheduler seam and its FR-FCFS default.
//! 3. **Refresh:** The refresh-manager seam and its no-op implementation.
//! 4. **Row policy & plugins:** Per-selection hooks for policy and observation.
//! 5. **Controller:** The bank-parallel controller proper.

pub mod bank_parallel;
pub mod refresh;
pub mod request;
pub mod rowpolicy;
pub mod scheduler;

pub use bank_parallel::BankParallelController;
pub use refresh::{NoRefresh, RefreshManager};
pub use request::{ReqBuffer, ReqType, Request};
pub use rowpolicy::{ControllerPlugin, OpenRowPolicy, RowPolicy, TracePlugin};
pub use scheduler::{Candidate, FrFcfs, Scheduler};
