//! Refresh manager seam.
//!
//! A refresh implementation is ticked once per controller cycle, before any
//! commands are selected. A non-trivial policy may move bank nodes through
//! `Refreshing` and raise their fences; the controller does not need to know
//! which policy is installed.

use crate::dram::StackedDram;

/// Per-cycle refresh hook.
pub trait RefreshManager {
    fn tick(&mut self, dram: &mut StackedDram);
}

/// Disables periodic refresh entirely.
pub struct NoRefresh;

impl RefreshManager for NoRefresh {
    fn tick(&mut self, _dram: &mut StackedDram) {}
}
