//! Memory requests and the bounded request buffer.

use std::fmt;

use crate::common::{AddrVec, Clk};
use crate::dram::Command;

/// Completion callback, invoked once when the request departs.
pub type Callback = Box<dyn FnMut(&Request)>;

/// Kind of memory request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReqType {
    Read,
    Write,
    /// Anything else; counted at intake but not served by this controller.
    Other,
}

impl ReqType {
    /// The terminal DRAM command for this request kind, if it has one.
    pub fn final_command(self) -> Option<Command> {
        match self {
            ReqType::Read => Some(Command::Rd),
            ReqType::Write => Some(Command::Wr),
            ReqType::Other => None,
        }
    }
}

/// One memory request, from intake to departure.
pub struct Request {
    /// Flat address, used for write-to-read forwarding.
    pub addr: i64,
    /// Decomposed address, one coordinate per hierarchy level.
    pub addr_vec: AddrVec,
    pub type_id: ReqType,
    /// Issuing core, or -1 when not attributed.
    pub source_id: i64,
    /// Terminal command this request resolves to (RD for reads, WR for writes).
    pub final_command: Command,
    /// Prerequisite command currently needed; recomputed each time the
    /// request is considered for issue.
    pub command: Command,
    /// Cycle the request entered a buffer; -1 until then.
    pub arrive: Clk,
    /// Cycle the completion callback fires; -1 until scheduled.
    pub depart: Clk,
    /// Latch so the row-hit/miss/conflict counters credit this request once.
    pub is_stat_updated: bool,
    pub callback: Option<Callback>,
}

impl Request {
    /// Creates a request with no callback.
    pub fn new(addr: i64, addr_vec: AddrVec, type_id: ReqType, source_id: i64) -> Self {
        let final_command = type_id.final_command().unwrap_or(Command::Rd);
        Self {
            addr,
            addr_vec,
            type_id,
            source_id,
            final_command,
            command: final_command,
            arrive: -1,
            depart: -1,
            is_stat_updated: false,
            callback: None,
        }
    }

    /// Creates a request that fires `callback` on departure.
    pub fn with_callback(
        addr: i64,
        addr_vec: AddrVec,
        type_id: ReqType,
        source_id: i64,
        callback: Callback,
    ) -> Self {
        let mut req = Self::new(addr, addr_vec, type_id, source_id);
        req.callback = Some(callback);
        req
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("addr", &self.addr)
            .field("addr_vec", &self.addr_vec)
            .field("type_id", &self.type_id)
            .field("source_id", &self.source_id)
            .field("final_command", &self.final_command)
            .field("command", &self.command)
            .field("arrive", &self.arrive)
            .field("depart", &self.depart)
            .finish_non_exhaustive()
    }
}

/// A bounded, order-preserving request buffer.
pub struct ReqBuffer {
    entries: Vec<Request>,
    pub max_size: usize,
}

impl ReqBuffer {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_size.min(64)),
            max_size,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when one more request still fits.
    pub fn has_space(&self) -> bool {
        self.entries.len() < self.max_size
    }

    /// Appends `req`, handing it back when the buffer is full.
    pub fn enqueue(&mut self, req: Request) -> Result<(), Request> {
        if !self.has_space() {
            return Err(req);
        }
        self.entries.push(req);
        Ok(())
    }

    /// Removes and returns the request at `idx`, preserving order.
    pub fn remove(&mut self, idx: usize) -> Request {
        self.entries.remove(idx)
    }

    pub fn get(&self, idx: usize) -> &Request {
        &self.entries[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Request {
        &mut self.entries[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Request> {
        self.entries.iter_mut()
    }
}
