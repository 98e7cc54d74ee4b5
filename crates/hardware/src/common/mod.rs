//! Common types shared across the device and controller.
//!
//! This module provides:
//! 1. **Addressing:** Hierarchy levels, address vectors, and bank-key helpers.
//! 2. **Errors:** Configuration error reporting for device and controller setup.
//! 3. **Clocking:** The simulation clock type.

pub mod addr;
pub mod error;

pub use addr::{bank_key, bank_prefix_matches, AddrVec, BankKey, Level, NUM_LEVELS};
pub use error::ConfigError;

/// Simulation clock, in device cycles. Signed so that `-1` can mark an
/// unset arrival or departure stamp on a request.
pub type Clk = i64;
