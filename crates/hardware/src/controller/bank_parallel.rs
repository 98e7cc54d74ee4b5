//! The bank-parallel controller.
//!
//! A per-channel scheduler that drains read/write queues under a dual-watermark
//! mode switch and issues up to `bank_parallel_ports_per_layer` commands per
//! cycle, with at most one accessing command per bank per cycle. Selection
//! walks the active buffer (rows being opened), then the priority buffer's
//! head, then the mode-selected read or write buffer; closing commands are
//! vetoed while the active buffer holds a request for the same bank.

use std::collections::{HashSet, VecDeque};

use log::{debug, trace};

use crate::common::{bank_key, bank_prefix_matches, BankKey, Clk, ConfigError};
use crate::config::{Config, ACTIVE_BUFFER_SIZE, PRIORITY_BUFFER_SIZE};
use crate::controller::refresh::{NoRefresh, RefreshManager};
use crate::controller::request::{ReqBuffer, ReqType, Request};
use crate::controller::rowpolicy::{build_plugin, ControllerPlugin, OpenRowPolicy, RowPolicy};
use crate::controller::scheduler::{Candidate, FrFcfs, Scheduler};
use crate::dram::{Command, StackedDram};
use crate::stats::ControllerStats;

/// Which buffer a selected request lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    Active,
    Priority,
    Read,
    Write,
}

/// Per-channel bank-parallel controller. Owns its device, buffers, and hooks.
pub struct BankParallelController {
    clk: Clk,
    channel_id: usize,
    pub dram: StackedDram,

    /// Issued requests awaiting their departure cycle.
    pending: VecDeque<Request>,
    active_buffer: ReqBuffer,
    priority_buffer: ReqBuffer,
    read_buffer: ReqBuffer,
    write_buffer: ReqBuffer,

    wr_low_watermark: f64,
    wr_high_watermark: f64,
    is_write_mode: bool,
    bank_parallel_ports: u32,

    scheduler: Box<dyn Scheduler>,
    refresh: Box<dyn RefreshManager>,
    row_policy: Box<dyn RowPolicy>,
    plugins: Vec<Box<dyn ControllerPlugin>>,

    pub stats: ControllerStats,
}

impl BankParallelController {
    /// Builds the controller and its device for one channel.
    pub fn new(config: &Config, channel_id: usize, num_cores: usize) -> Result<Self, ConfigError> {
        let dram = StackedDram::new(&config.device)?;
        let ctrl = &config.controller;

        let plugins = ctrl
            .plugins
            .iter()
            .map(build_plugin)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            clk: 0,
            channel_id,
            dram,
            pending: VecDeque::new(),
            active_buffer: ReqBuffer::new(ACTIVE_BUFFER_SIZE),
            priority_buffer: ReqBuffer::new(PRIORITY_BUFFER_SIZE),
            read_buffer: ReqBuffer::new(ctrl.read_buffer_size),
            write_buffer: ReqBuffer::new(ctrl.write_buffer_size),
            wr_low_watermark: ctrl.wr_low_watermark,
            wr_high_watermark: ctrl.wr_high_watermark,
            is_write_mode: false,
            bank_parallel_ports: ctrl.bank_parallel_ports_per_layer,
            scheduler: Box::new(FrFcfs),
            refresh: Box::new(NoRefresh),
            row_policy: Box::new(OpenRowPolicy),
            plugins,
            stats: ControllerStats::new(num_cores),
        })
    }

    pub fn clk(&self) -> Clk {
        self.clk
    }

    pub fn channel_id(&self) -> usize {
        self.channel_id
    }

    pub fn is_write_mode(&self) -> bool {
        self.is_write_mode
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn active_buffer_len(&self) -> usize {
        self.active_buffer.len()
    }

    pub fn priority_buffer_len(&self) -> usize {
        self.priority_buffer.len()
    }

    pub fn read_buffer_len(&self) -> usize {
        self.read_buffer.len()
    }

    pub fn write_buffer_len(&self) -> usize {
        self.write_buffer.len()
    }

    /// Accepts a request into the controller.
    ///
    /// Reads that hit a buffered write to the same flat address bypass the
    /// device and complete next cycle. A full buffer hands the request back
    /// unchanged, with its arrival stamp cleared; the caller retries.
    ///
    /// # Panics
    ///
    /// Panics on a request type this controller does not queue. Front-ends
    /// only submit reads and writes; anything else is a caller bug.
    pub fn send(&mut self, mut req: Request) -> Result<(), Request> {
        match req.type_id {
            ReqType::Read => {
                req.final_command = Command::Rd;
                self.stats.num_read_reqs += 1;
            }
            ReqType::Write => {
                req.final_command = Command::Wr;
                self.stats.num_write_reqs += 1;
            }
            ReqType::Other => {
                self.stats.num_other_reqs += 1;
                panic!("invalid request type at controller intake");
            }
        }

        if req.type_id == ReqType::Read && self.write_buffer.iter().any(|w| w.addr == req.addr) {
            req.depart = self.clk + 1;
            self.pending.push_back(req);
            return Ok(());
        }

        req.arrive = self.clk;
        let result = match req.type_id {
            ReqType::Read => self.read_buffer.enqueue(req),
            ReqType::Write => self.write_buffer.enqueue(req),
            ReqType::Other => unreachable!(),
        };
        result.map_err(|mut rejected| {
            rejected.arrive = -1;
            debug!(
                "clk {}: channel {} rejected {:?} (buffer full)",
                self.clk, self.channel_id, rejected.type_id
            );
            rejected
        })
    }

    /// Accepts a request into the high-priority buffer.
    ///
    /// # Panics
    ///
    /// Panics on a request type with no terminal command, as [`send`] does.
    ///
    /// [`send`]: BankParallelController::send
    pub fn priority_send(&mut self, mut req: Request) -> Result<(), Request> {
        match req.type_id.final_command() {
            Some(cmd) => req.final_command = cmd,
            None => panic!("invalid request type at controller intake"),
        }
        self.priority_buffer.enqueue(req)
    }

    /// Advances the controller (and its device) by one cycle.
    ///
    /// Phases, in order: clock, queue-length accounting, at most one pending
    /// completion, refresh, then the issue slots.
    pub fn tick(&mut self) {
        self.clk += 1;
        self.dram.tick();

        self.stats.queue_len += (self.read_buffer.len()
            + self.write_buffer.len()
            + self.priority_buffer.len()
            + self.pending.len()) as u64;
        self.stats.read_queue_len += (self.read_buffer.len() + self.pending.len()) as u64;
        self.stats.write_queue_len += self.write_buffer.len() as u64;
        self.stats.priority_queue_len += self.priority_buffer.len() as u64;

        self.serve_completed_pending();

        self.refresh.tick(&mut self.dram);

        let issue_budget = self.bank_parallel_ports.max(1);
        let mut used_access_banks: HashSet<BankKey> = HashSet::new();
        for _ in 0..issue_budget {
            match self.schedule_request(&used_access_banks) {
                Some((source, idx)) => self.issue_at(source, idx, &mut used_access_banks),
                None => break,
            }
        }
    }

    /// Derives the statistics averages once the simulation is over.
    pub fn finalize(&mut self) {
        self.stats.finalize(self.clk);
    }

    /// Completes at most one pending request whose departure cycle has come.
    /// One per cycle: completions share a single result bus.
    fn serve_completed_pending(&mut self) {
        let due = matches!(self.pending.front(), Some(req) if req.depart <= self.clk);
        if !due {
            return;
        }
        if let Some(mut req) = self.pending.pop_front() {
            if req.type_id == ReqType::Read && req.depart - req.arrive > 1 {
                self.stats.read_latency += req.depart - req.arrive;
            }
            if let Some(mut callback) = req.callback.take() {
                callback(&req);
            }
        }
    }

    /// Dual-watermark read/write mode switch, evaluated lazily when an issue
    /// slot reaches the read/write buffers.
    fn set_write_mode(&mut self) {
        let high = self.wr_high_watermark * self.write_buffer.max_size as f64;
        let low = self.wr_low_watermark * self.write_buffer.max_size as f64;
        if !self.is_write_mode {
            if (self.write_buffer.len() as f64) > high || self.read_buffer.is_empty() {
                self.is_write_mode = true;
                debug!("clk {}: channel {} enters write mode", self.clk, self.channel_id);
            }
        } else if (self.write_buffer.len() as f64) < low && !self.read_buffer.is_empty() {
            self.is_write_mode = false;
            debug!("clk {}: channel {} enters read mode", self.clk, self.channel_id);
        }
    }

    /// Recomputes every candidate's prerequisite, then folds the scheduler's
    /// pairwise compare over the buffer, skipping accessing candidates whose
    /// bank already received an accessing command this cycle.
    fn best_request(&mut self, source: Source, used_access_banks: &HashSet<BankKey>) -> Option<usize> {
        let Self {
            dram,
            scheduler,
            active_buffer,
            read_buffer,
            write_buffer,
            ..
        } = self;
        let buffer = match source {
            Source::Active => active_buffer,
            Source::Read => read_buffer,
            Source::Write => write_buffer,
            Source::Priority => return None,
        };
        if buffer.is_empty() {
            return None;
        }

        for req in buffer.iter_mut() {
            req.command = dram.get_preq_command(req.final_command, &req.addr_vec);
        }

        let mut best: Option<usize> = None;
        for idx in 0..buffer.len() {
            let req = buffer.get(idx);
            if req.command.is_accessing() && used_access_banks.contains(&bank_key(&req.addr_vec)) {
                continue;
            }
            best = match best {
                None => Some(idx),
                Some(current) => {
                    match scheduler.compare(dram, buffer.get(current), req) {
                        Candidate::First => Some(current),
                        Candidate::Second => Some(idx),
                    }
                }
            };
        }
        best
    }

    /// Selects the request for one issue slot, or `None` to leave the slot
    /// (and, by the caller's loop, the rest of this cycle's slots) unused.
    fn schedule_request(&mut self, used_access_banks: &HashSet<BankKey>) -> Option<(Source, usize)> {
        let mut found: Option<(Source, usize)> = None;

        if let Some(idx) = self.best_request(Source::Active, used_access_banks) {
            let req = self.active_buffer.get(idx);
            if self.dram.check_ready(req.command, &req.addr_vec) {
                found = Some((Source::Active, idx));
            }
        }

        if found.is_none() && !self.priority_buffer.is_empty() {
            // Strict head-of-line: only the head is considered, and an
            // unready head gives up the slot rather than letting the bulk
            // buffers overtake it.
            let head = self.priority_buffer.get(0);
            let preq = self.dram.get_preq_command(head.final_command, &head.addr_vec);
            self.priority_buffer.get_mut(0).command = preq;
            let head = self.priority_buffer.get(0);
            if self.dram.check_ready(preq, &head.addr_vec) {
                found = Some((Source::Priority, 0));
            } else {
                return None;
            }
        }

        if found.is_none() {
            self.set_write_mode();
            let source = if self.is_write_mode { Source::Write } else { Source::Read };
            if let Some(idx) = self.best_request(source, used_access_banks) {
                let buffer = match source {
                    Source::Write => &self.write_buffer,
                    _ => &self.read_buffer,
                };
                let req = buffer.get(idx);
                if self.dram.check_ready(req.command, &req.addr_vec) {
                    found = Some((source, idx));
                }
            }
        }

        // Never close a row that a request in the active buffer still needs.
        if let Some((source, idx)) = found {
            let req = self.buffer(source).get(idx);
            if req.command.is_closing() {
                let target = req.addr_vec;
                for active in self.active_buffer.iter() {
                    if bank_prefix_matches(&active.addr_vec, &target) {
                        return None;
                    }
                }
            }
        }

        found
    }

    fn buffer(&self, source: Source) -> &ReqBuffer {
        match source {
            Source::Active => &self.active_buffer,
            Source::Priority => &self.priority_buffer,
            Source::Read => &self.read_buffer,
            Source::Write => &self.write_buffer,
        }
    }

    fn buffer_mut(&mut self, source: Source) -> &mut ReqBuffer {
        match source {
            Source::Active => &mut self.active_buffer,
            Source::Priority => &mut self.priority_buffer,
            Source::Read => &mut self.read_buffer,
            Source::Write => &mut self.write_buffer,
        }
    }

    /// Issues the selected request's prerequisite command and routes the
    /// request onward: to `pending` when that was its terminal command, to
    /// the active buffer when it just opened its row.
    fn issue_at(&mut self, source: Source, idx: usize, used_access_banks: &mut HashSet<BankKey>) {
        let clk = self.clk;
        let read_latency = self.dram.read_latency();
        let channel_id = self.channel_id;

        let (command, final_command, type_id) = {
            let Self {
                dram,
                row_policy,
                plugins,
                stats,
                active_buffer,
                priority_buffer,
                read_buffer,
                write_buffer,
                ..
            } = self;
            let buffer = match source {
                Source::Active => active_buffer,
                Source::Priority => priority_buffer,
                Source::Read => read_buffer,
                Source::Write => write_buffer,
            };
            let req = buffer.get_mut(idx);

            row_policy.update(dram, req);
            for plugin in plugins.iter_mut() {
                plugin.update(dram, req);
            }

            if !req.is_stat_updated {
                update_request_stats(dram, stats, req);
            }

            let command = req.command;
            trace!(
                "clk {}: channel {} issues {} at {:?}",
                clk,
                channel_id,
                command,
                req.addr_vec
            );
            dram.issue_command(command, &req.addr_vec);
            if command.is_accessing() {
                used_access_banks.insert(bank_key(&req.addr_vec));
            }
            (command, req.final_command, req.type_id)
        };

        if command == final_command {
            let mut req = self.buffer_mut(source).remove(idx);
            match type_id {
                ReqType::Read => {
                    req.depart = clk + read_latency;
                    self.pending.push_back(req);
                }
                ReqType::Write => {
                    req.depart = clk + 1;
                    self.pending.push_back(req);
                }
                ReqType::Other => {}
            }
        } else if command.is_opening() {
            // Space is checked with the request still in place, so a full
            // active buffer leaves it where it is to retry next cycle.
            if self.active_buffer.has_space() {
                let req = self.buffer_mut(source).remove(idx);
                let _ = self.active_buffer.enqueue(req);
            }
        }
    }
}

/// Credits the request's row-buffer outcome exactly once, at its first issued
/// command: hit when the target row is open, conflict when another row is,
/// miss when the bank is closed.
fn update_request_stats(dram: &StackedDram, stats: &mut ControllerStats, req: &mut Request) {
    req.is_stat_updated = true;

    let hit = dram.check_rowbuffer_hit(req.final_command, &req.addr_vec);
    let open = dram.check_node_open(req.final_command, &req.addr_vec);

    match req.type_id {
        ReqType::Read => {
            if hit {
                stats.read_row_hits += 1;
                stats.row_hits += 1;
                per_core(&mut stats.read_row_hits_per_core, req.source_id);
            } else if open {
                stats.read_row_conflicts += 1;
                stats.row_conflicts += 1;
                per_core(&mut stats.read_row_conflicts_per_core, req.source_id);
            } else {
                stats.read_row_misses += 1;
                stats.row_misses += 1;
                per_core(&mut stats.read_row_misses_per_core, req.source_id);
            }
        }
        ReqType::Write => {
            if hit {
                stats.write_row_hits += 1;
                stats.row_hits += 1;
            } else if open {
                stats.write_row_conflicts += 1;
                stats.row_conflicts += 1;
            } else {
                stats.write_row_misses += 1;
                stats.row_misses += 1;
            }
        }
        ReqType::Other => {}
    }
}

fn per_core(counters: &mut [u64], source_id: i64) {
    if source_id >= 0 {
        if let Some(slot) = counters.get_mut(source_id as usize) {
            *slot += 1;
        }
    }
}
