//! Per-channel controller statistics.
//!
//! This module tracks the controller's performance counters. It provides:
//! 1. **Row buffer:** Hit/miss/conflict counts, split by read/write and per core.
//! 2. **Requests:** Intake counts by type.
//! 3. **Queues:** Per-cycle length sums and their finalized averages.
//! 4. **Latency:** Read latency sum and its finalized average.

use crate::common::Clk;

/// Counter set for one controller channel.
///
/// Sums accumulate while the simulation runs; `finalize` derives the averages
/// once the clock stops.
#[derive(Clone, Debug, Default)]
pub struct ControllerStats {
    pub row_hits: u64,
    pub row_misses: u64,
    pub row_conflicts: u64,
    pub read_row_hits: u64,
    pub read_row_misses: u64,
    pub read_row_conflicts: u64,
    pub write_row_hits: u64,
    pub write_row_misses: u64,
    pub write_row_conflicts: u64,

    /// Read row-buffer outcomes attributed per core.
    pub read_row_hits_per_core: Vec<u64>,
    pub read_row_misses_per_core: Vec<u64>,
    pub read_row_conflicts_per_core: Vec<u64>,

    pub num_read_reqs: u64,
    pub num_write_reqs: u64,
    pub num_other_reqs: u64,

    /// Per-cycle queue length sums (total, read+pending, write, priority).
    pub queue_len: u64,
    pub read_queue_len: u64,
    pub write_queue_len: u64,
    pub priority_queue_len: u64,
    pub queue_len_avg: f64,
    pub read_queue_len_avg: f64,
    pub write_queue_len_avg: f64,
    pub priority_queue_len_avg: f64,

    /// Sum of read departure-minus-arrival latencies.
    pub read_latency: i64,
    pub avg_read_latency: f64,
}

impl ControllerStats {
    /// Creates a counter set attributing reads across `num_cores` cores.
    pub fn new(num_cores: usize) -> Self {
        Self {
            read_row_hits_per_core: vec![0; num_cores],
            read_row_misses_per_core: vec![0; num_cores],
            read_row_conflicts_per_core: vec![0; num_cores],
            ..Self::default()
        }
    }

    /// Derives the averages from the accumulated sums at clock `clk`.
    pub fn finalize(&mut self, clk: Clk) {
        let cycles = clk.max(1) as f64;
        self.queue_len_avg = self.queue_len as f64 / cycles;
        self.read_queue_len_avg = self.read_queue_len as f64 / cycles;
        self.write_queue_len_avg = self.write_queue_len as f64 / cycles;
        self.priority_queue_len_avg = self.priority_queue_len as f64 / cycles;
        self.avg_read_latency = self.read_latency as f64 / self.num_read_reqs.max(1) as f64;
    }

    /// Prints the full counter report for channel `channel_id` to stdout.
    pub fn print(&self, channel_id: usize) {
        println!("==========================================================");
        println!("DRAM CONTROLLER STATISTICS (channel {})", channel_id);
        println!("==========================================================");
        println!("ROW BUFFER");
        println!("  row_hits               {}", self.row_hits);
        println!("  row_misses             {}", self.row_misses);
        println!("  row_conflicts          {}", self.row_conflicts);
        println!(
            "  read  hit/miss/conf    {} / {} / {}",
            self.read_row_hits, self.read_row_misses, self.read_row_conflicts
        );
        println!(
            "  write hit/miss/conf    {} / {} / {}",
            self.write_row_hits, self.write_row_misses, self.write_row_conflicts
        );
        for core in 0..self.read_row_hits_per_core.len() {
            println!(
                "  core {:<3} read h/m/c     {} / {} / {}",
                core,
                self.read_row_hits_per_core[core],
                self.read_row_misses_per_core[core],
                self.read_row_conflicts_per_core[core]
            );
        }
        println!("----------------------------------------------------------");
        println!("REQUESTS");
        println!("  num_read_reqs          {}", self.num_read_reqs);
        println!("  num_write_reqs         {}", self.num_write_reqs);
        println!("  num_other_reqs         {}", self.num_other_reqs);
        println!("----------------------------------------------------------");
        println!("QUEUES");
        println!("  queue_len_avg          {:.4}", self.queue_len_avg);
        println!("  read_queue_len_avg     {:.4}", self.read_queue_len_avg);
        println!("  write_queue_len_avg    {:.4}", self.write_queue_len_avg);
        println!("  priority_queue_len_avg {:.4}", self.priority_queue_len_avg);
        println!("----------------------------------------------------------");
        println!("LATENCY");
        println!("  read_latency           {}", self.read_latency);
        println!("  avg_read_latency       {:.4}", self.avg_read_latency);
        println!("==========================================================");
    }
}
