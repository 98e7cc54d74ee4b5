//! The Mono3D stacked-DRAM device.
//!
//! `StackedDram` is the front door the controller drives each cycle. It owns
//! the resolved organization, the timing vector and its constraint table, and
//! one state subtree per channel (layer). Every public query is total: after
//! construction succeeds the device has no runtime failure modes.

use crate::common::{AddrVec, Clk, ConfigError, Level};
use crate::config::DeviceConfig;
use crate::dram::command::Command;
use crate::dram::node::{Node, NodeState};
use crate::dram::organization::Organization;
use crate::dram::timing::{constraint_table, TimingRule, TimingVals};

/// Cycle-accurate timing model of the Mono3D device.
pub struct StackedDram {
    clk: Clk,
    pub organization: Organization,
    pub timing: TimingVals,
    pub channel_width: i64,
    pub prefetch_size: i64,
    rules: Vec<TimingRule>,
    read_latency: i64,
    channels: Vec<Node>,
}

impl StackedDram {
    /// Builds the device from its configuration section.
    ///
    /// All configuration errors (unknown presets, missing counts or timings,
    /// density mismatch, rate/preset conflicts) surface here.
    pub fn new(cfg: &DeviceConfig) -> Result<Self, ConfigError> {
        let organization = Organization::resolve(&cfg.org)?;
        let timing = TimingVals::resolve(&cfg.timing)?;
        let rules = constraint_table(&timing);
        let read_latency = timing.read_latency();

        let channels = (0..organization.count[Level::Channel.index()])
            .map(|id| Node::build(Level::Channel, id as usize, &organization, &rules))
            .collect();

        Ok(StackedDram {
            clk: 0,
            organization,
            timing,
            channel_width: cfg.org.channel_width,
            prefetch_size: cfg.org.prefetch_size,
            rules,
            read_latency,
            channels,
        })
    }

    /// Advances the device clock by one cycle.
    pub fn tick(&mut self) {
        self.clk += 1;
    }

    /// Current device clock.
    pub fn clk(&self) -> Clk {
        self.clk
    }

    /// Cycles from RD issue to data availability.
    pub fn read_latency(&self) -> Clk {
        self.read_latency
    }

    /// Issues `cmd` at `addr`: raises the timing fences at every node on the
    /// address path, then applies the command's row-buffer action at the bank.
    ///
    /// The address must be concrete (no wildcards) down to the command scope.
    pub fn issue_command(&mut self, cmd: Command, addr: &AddrVec) {
        let clk = self.clk;
        let rules = &self.rules;
        let mut node = &mut self.channels[addr[Level::Channel.index()] as usize];
        loop {
            node.record_issue(rules, cmd, clk);
            if node.level == Level::Bank {
                break;
            }
            let child = addr[node.level.index() + 1] as usize;
            node = &mut node.children[child];
        }

        // `node` is the bank here.
        match cmd {
            Command::Act => {
                node.state = NodeState::Opened;
                node.open_row = Some(addr[Level::Row.index()]);
            }
            Command::Pre | Command::Rda | Command::Wra => {
                node.state = NodeState::Closed;
                node.open_row = None;
            }
            Command::Rd | Command::Wr => {}
        }
    }

    /// The immediate prerequisite for `cmd` at `addr` given current state.
    ///
    /// For accessing commands: a closed bank needs ACT, an open bank on the
    /// target row admits the command itself, any other open (or refreshing)
    /// row needs PRE first. Non-accessing commands are their own prerequisite.
    pub fn get_preq_command(&self, cmd: Command, addr: &AddrVec) -> Command {
        if !cmd.is_accessing() {
            return cmd;
        }
        let bank = self.bank(addr);
        match bank.state {
            NodeState::Closed => Command::Act,
            NodeState::Opened => {
                if bank.open_row == Some(addr[Level::Row.index()]) {
                    cmd
                } else {
                    Command::Pre
                }
            }
            NodeState::Refreshing => Command::Pre,
            NodeState::NA => cmd,
        }
    }

    /// True iff `cmd` may issue at `addr` this cycle: the clock has reached
    /// the fence at every node on the address path.
    pub fn check_ready(&self, cmd: Command, addr: &AddrVec) -> bool {
        let mut node = &self.channels[addr[Level::Channel.index()] as usize];
        loop {
            if self.clk < node.fence(cmd) {
                return false;
            }
            if node.level == Level::Bank {
                return true;
            }
            let child = addr[node.level.index() + 1] as usize;
            node = &node.children[child];
        }
    }

    /// True iff the target bank is opened on the row named by `addr`.
    pub fn check_rowbuffer_hit(&self, _cmd: Command, addr: &AddrVec) -> bool {
        let bank = self.bank(addr);
        bank.state == NodeState::Opened && bank.open_row == Some(addr[Level::Row.index()])
    }

    /// True iff the target bank is opened on some row. Combined with a
    /// negative hit test this detects a row conflict.
    pub fn check_node_open(&self, _cmd: Command, addr: &AddrVec) -> bool {
        self.bank(addr).state == NodeState::Opened
    }

    fn bank(&self, addr: &AddrVec) -> &Node {
        let channel = &self.channels[addr[Level::Channel.index()] as usize];
        let rank = &channel.children[addr[Level::Rank.index()] as usize];
        let group = &rank.children[addr[Level::BankGroup.index()] as usize];
        &group.children[addr[Level::Bank.index()] as usize]
    }
}
