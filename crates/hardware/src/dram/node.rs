//! Hierarchical device state tree.
//!
//! One `Node` per materialized hierarchy level (channel, rank, bank group,
//! bank). Rows are not materialized: the opened row lives on its bank. Each
//! node carries a per-command issue fence (`next_valid`) that only ever moves
//! forward, plus the sliding-issue rings backing windowed timing rules.

use std::collections::VecDeque;

use crate::common::{Clk, Level};
use crate::dram::command::{Command, NUM_COMMANDS};
use crate::dram::organization::Organization;
use crate::dram::timing::TimingRule;

/// Row-buffer state of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Opened,
    Closed,
    Refreshing,
    /// The level carries no row-buffer state (channel, rank, bank group).
    NA,
}

/// Ring of recent issue cycles backing one windowed timing rule.
#[derive(Clone, Debug)]
struct SlidingWindow {
    rule_idx: usize,
    capacity: usize,
    issues: VecDeque<Clk>,
}

/// One node of the device hierarchy.
#[derive(Clone, Debug)]
pub struct Node {
    pub level: Level,
    pub id: usize,
    pub state: NodeState,
    /// The currently opened row; banks only. At most one row per bank.
    pub open_row: Option<i64>,
    next_valid: [Clk; NUM_COMMANDS],
    windows: Vec<SlidingWindow>,
    pub children: Vec<Node>,
}

/// Initial row-buffer state for a level: banks start closed, everything else
/// carries no state.
fn init_state(level: Level) -> NodeState {
    match level {
        Level::Bank | Level::Row => NodeState::Closed,
        _ => NodeState::NA,
    }
}

impl Node {
    /// Builds the subtree rooted at (`level`, `id`), attaching the rings for
    /// every windowed rule anchored at this level.
    pub fn build(level: Level, id: usize, org: &Organization, rules: &[TimingRule]) -> Self {
        let windows = rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.window > 1 && r.level == level)
            .map(|(rule_idx, r)| SlidingWindow {
                rule_idx,
                capacity: r.window,
                issues: VecDeque::with_capacity(r.window + 1),
            })
            .collect();

        let child_level = Level::ALL.get(level.index() + 1).copied();
        let children = match child_level {
            Some(next) => (0..org.children_of(level))
                .map(|i| Node::build(next, i as usize, org, rules))
                .collect(),
            None => Vec::new(),
        };

        Node {
            level,
            id,
            state: init_state(level),
            open_row: None,
            next_valid: [0; NUM_COMMANDS],
            windows,
            children,
        }
    }

    /// Earliest cycle at which `cmd` may issue at this node.
    #[inline]
    pub fn fence(&self, cmd: Command) -> Clk {
        self.next_valid[cmd.index()]
    }

    /// Raises the fence for `cmd`; fences never move backward.
    #[inline]
    pub fn raise_fence(&mut self, cmd: Command, cycle: Clk) {
        let slot = &mut self.next_valid[cmd.index()];
        *slot = (*slot).max(cycle);
    }

    /// Applies every rule anchored at this node's level whose preceding set
    /// contains `cmd`, for an issue at cycle `clk`.
    pub fn record_issue(&mut self, rules: &[TimingRule], cmd: Command, clk: Clk) {
        for (rule_idx, rule) in rules.iter().enumerate() {
            if rule.level != self.level || !rule.preceding.contains(&cmd) {
                continue;
            }
            if rule.window > 1 {
                let fence = self.push_windowed(rule_idx, rule.window, clk, rule.latency);
                if let Some(fence) = fence {
                    for follow in rule.following {
                        self.raise_fence(*follow, fence);
                    }
                }
            } else {
                for follow in rule.following {
                    self.raise_fence(*follow, clk + rule.latency);
                }
            }
        }
    }

    /// Pushes `clk` into the ring for `rule_idx`. Once the ring holds a full
    /// window of issues, the next issue is fenced to `oldest + latency`.
    fn push_windowed(
        &mut self,
        rule_idx: usize,
        capacity: usize,
        clk: Clk,
        latency: i64,
    ) -> Option<Clk> {
        let window = self
            .windows
            .iter_mut()
            .find(|w| w.rule_idx == rule_idx && w.capacity == capacity)?;
        window.issues.push_back(clk);
        if window.issues.len() > capacity {
            window.issues.pop_front();
        }
        if window.issues.len() == capacity {
            window.issues.front().map(|oldest| oldest + latency)
        } else {
            None
        }
    }
}
