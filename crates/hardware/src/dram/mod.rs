//! DRAM device timing engine.
//!
//! This module tree models the Mono3D 3D-stacked DRAM device. It provides:
//! 1. **Commands:** The six-command set and its per-command metadata.
//! 2. **Organization:** Level counts, device width, and density checking.
//! 3. **Timing:** The resolved timing vector and the constraint rule table.
//! 4. **Nodes:** The hierarchical state tree with per-command issue fences.
//! 5. **Device:** The `StackedDram` front door the controller drives each cycle.

pub mod command;
pub mod device;
pub mod node;
pub mod organization;
pub mod timing;

pub use command::{Command, NUM_COMMANDS};
pub use device::StackedDram;
pub use node::{Node, NodeState};
pub use organization::Organization;
pub use timing::{TimingRule, TimingVals};
