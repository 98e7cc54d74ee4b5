//! Row policy and controller plugin seams.
//!
//! Both hooks run on every accepted selection, before the command is issued.
//! The row policy may rewrite the request (for example, promoting a plain
//! access to its auto-precharge variant); plugins only observe.

use log::trace;

use crate::common::ConfigError;
use crate::config::PluginConfig;
use crate::controller::request::Request;
use crate::dram::StackedDram;

/// Row-management policy, consulted on each accepted selection.
pub trait RowPolicy {
    fn update(&mut self, dram: &StackedDram, req: &mut Request);
}

/// Leaves rows open after accesses; never rewrites a request.
pub struct OpenRowPolicy;

impl RowPolicy for OpenRowPolicy {
    fn update(&mut self, _dram: &StackedDram, _req: &mut Request) {}
}

/// Observer hook run after the row policy on each accepted selection.
pub trait ControllerPlugin {
    fn update(&mut self, dram: &StackedDram, req: &Request);
}

/// Logs every selected command at trace level.
pub struct TracePlugin;

impl ControllerPlugin for TracePlugin {
    fn update(&mut self, dram: &StackedDram, req: &Request) {
        trace!(
            "clk {}: selected {} for {:?} at {:?}",
            dram.clk(),
            req.command,
            req.type_id,
            req.addr_vec
        );
    }
}

/// Instantiates a plugin from its spec.
pub fn build_plugin(spec: &PluginConfig) -> Result<Box<dyn ControllerPlugin>, ConfigError> {
    match spec.name.as_str() {
        "Trace" => Ok(Box::new(TracePlugin)),
        other => Err(ConfigError::UnknownPlugin(other.to_string())),
    }
}
