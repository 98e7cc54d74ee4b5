//! Controller Scheduling Tests.
//!
//! End-to-end traces through the bank-parallel controller: cold reads, row
//! hits and conflicts, priority head-of-line blocking, the closing-command
//! hazard, bank-parallel issue, completion serialization, and the
//! dual-watermark mode switch.

use mono3d_core::controller::{Candidate, FrFcfs, Scheduler};
use mono3d_core::dram::{Command, StackedDram};
use mono3d_core::{Config, ReqType};

use crate::common::{addr, controller, plain, run_until_done, tracked};

fn tick_n(ctrl: &mut mono3d_core::BankParallelController, n: usize) {
    for _ in 0..n {
        ctrl.tick();
    }
}

// ══════════════════════════════════════════════════════════
// 1. Cold read, row hit, row conflict
// ══════════════════════════════════════════════════════════

#[test]
fn cold_read_activates_then_reads() {
    let config = Config::default();
    let mut ctrl = controller(&config);

    let (req, done) = tracked(ReqType::Read, addr(3, 7, 0));
    ctrl.send(req).unwrap();

    // ACT issues on the first tick; RD waits out nRCD; data arrives
    // nCL + nBL after the RD: 1 + 10 + 11.
    assert_eq!(run_until_done(&mut ctrl, &done, 100), 22);
    assert_eq!(ctrl.stats.read_row_misses, 1);
    assert_eq!(ctrl.stats.row_misses, 1);
    assert_eq!(ctrl.stats.num_read_reqs, 1);
}

#[test]
fn row_hit_skips_straight_to_the_read() {
    let config = Config::default();
    let mut ctrl = controller(&config);

    let (first, done_first) = tracked(ReqType::Read, addr(3, 7, 0));
    ctrl.send(first).unwrap();
    run_until_done(&mut ctrl, &done_first, 100);
    tick_n(&mut ctrl, 8); // idle until clk 30

    let send_clk = ctrl.clk();
    let (second, done_second) = tracked(ReqType::Read, addr(3, 7, 1));
    ctrl.send(second).unwrap();

    // The row is still open: the RD issues on the next tick and completes
    // read_latency later.
    assert_eq!(run_until_done(&mut ctrl, &done_second, 100), send_clk + 1 + 11);
    assert_eq!(ctrl.stats.read_row_hits, 1);
    assert_eq!(ctrl.stats.read_row_misses, 1);
}

#[test]
fn row_conflict_precharges_reactivates_and_counts_once() {
    let config = Config::default();
    let mut ctrl = controller(&config);

    let (first, done_first) = tracked(ReqType::Read, addr(3, 7, 0));
    ctrl.send(first).unwrap();
    assert_eq!(run_until_done(&mut ctrl, &done_first, 100), 22);

    let (conflicting, done) = tracked(ReqType::Read, addr(3, 8, 0));
    ctrl.send(conflicting).unwrap();

    // PRE waits for nRAS after the original ACT (clk 25), the new ACT for
    // nRC after it (clk 35), the RD for nRCD (clk 45), data at 56.
    assert_eq!(run_until_done(&mut ctrl, &done, 200), 56);
    assert_eq!(ctrl.stats.read_row_conflicts, 1);
    assert_eq!(ctrl.stats.row_conflicts, 1);
    // The conflict was credited exactly once across PRE, ACT, and RD.
    assert_eq!(ctrl.stats.row_hits, 0);
    assert_eq!(ctrl.stats.row_misses, 1);
}

// ══════════════════════════════════════════════════════════
// 2. Priority head-of-line
// ══════════════════════════════════════════════════════════

#[test]
fn unready_priority_head_blocks_the_bulk_buffers() {
    let config = Config::default();
    let mut ctrl = controller(&config);

    // r1 opens bank 3 row 7 and sits in the active buffer.
    let (r1, done_r1) = tracked(ReqType::Read, addr(3, 7, 0));
    ctrl.send(r1).unwrap();
    ctrl.tick();
    assert_eq!(ctrl.active_buffer_len(), 1);

    // The priority head needs a PRE that is unready for nRAS; r2 is a ready
    // read to an idle bank but must not overtake it.
    let (p, done_p) = tracked(ReqType::Read, addr(3, 8, 0));
    ctrl.priority_send(p).unwrap();
    let (r2, done_r2) = tracked(ReqType::Read, addr(4, 0, 0));
    ctrl.send(r2).unwrap();

    // Until the priority request has fully left the priority buffer (its ACT
    // issues at clk 35), r2 stays in the read buffer.
    while ctrl.clk() < 34 {
        ctrl.tick();
        assert_eq!(ctrl.read_buffer_len(), 1);
    }

    run_until_done(&mut ctrl, &done_r2, 200);
    assert_eq!(done_r1.get(), 22);
    assert_eq!(done_p.get(), 56);
    assert_eq!(done_r2.get(), 60);
    assert_eq!(ctrl.stats.read_row_conflicts, 1);
    assert_eq!(ctrl.stats.read_row_misses, 2);
}

// ══════════════════════════════════════════════════════════
// 3. Closing-command hazard
// ══════════════════════════════════════════════════════════

#[test]
fn ready_precharge_is_vetoed_while_the_active_buffer_needs_the_row() {
    let mut config = Config::default();
    // Shrink nRAS so the conflicting PRE becomes ready long before the
    // active request's RD does.
    config.device.timing.n_ras = Some(2);
    let mut ctrl = controller(&config);

    let (r1, done_r1) = tracked(ReqType::Read, addr(3, 7, 0));
    ctrl.send(r1).unwrap();
    ctrl.tick(); // ACT at clk 1
    assert_eq!(ctrl.active_buffer_len(), 1);

    let (r2, done_r2) = tracked(ReqType::Read, addr(3, 8, 0));
    ctrl.send(r2).unwrap();

    // The PRE is timing-ready from clk 3, but closing row 7 would strand r1:
    // the row must stay open until r1's RD has issued at clk 11.
    while ctrl.clk() < 11 {
        ctrl.tick();
        assert!(ctrl
            .dram
            .check_rowbuffer_hit(Command::Rd, &addr(3, 7, 0)));
    }

    // With r1 out of the active buffer, the PRE goes through as soon as the
    // read-to-precharge gap after r1's RD has passed (clk 16).
    while ctrl.clk() < 16 {
        ctrl.tick();
    }
    assert!(!ctrl.dram.check_node_open(Command::Rd, &addr(3, 7, 0)));

    run_until_done(&mut ctrl, &done_r2, 200);
    assert_eq!(done_r1.get(), 22);
    assert_eq!(done_r2.get(), 56);
    assert_eq!(ctrl.stats.read_row_conflicts, 1);
}

// ══════════════════════════════════════════════════════════
// 4. Bank-parallel issue
// ══════════════════════════════════════════════════════════

/// Two issue ports with a zero CAS-to-CAS gap, so accessing commands can
/// share a cycle and only bank exclusivity separates them.
fn dual_port_config() -> Config {
    let mut config = Config::default();
    config.controller.bank_parallel_ports_per_layer = 2;
    config.device.timing.n_ccds = Some(0);
    config.device.timing.n_bl = Some(0);
    config
}

#[test]
fn ready_reads_to_distinct_banks_issue_in_one_cycle() {
    let config = dual_port_config();
    let mut ctrl = controller(&config);

    // Open rows on banks 0 and 1.
    let (warm_a, done_a) = tracked(ReqType::Read, addr(0, 0, 0));
    let (warm_b, done_b) = tracked(ReqType::Read, addr(1, 0, 0));
    ctrl.send(warm_a).unwrap();
    ctrl.send(warm_b).unwrap();
    run_until_done(&mut ctrl, &done_a, 100);
    run_until_done(&mut ctrl, &done_b, 100);
    assert_eq!(ctrl.pending_len(), 0);

    ctrl.send(plain(ReqType::Read, addr(0, 0, 1))).unwrap();
    ctrl.send(plain(ReqType::Read, addr(1, 0, 1))).unwrap();
    ctrl.tick();
    // Both row hits issued in the same cycle, one per bank.
    assert_eq!(ctrl.pending_len(), 2);
    assert_eq!(ctrl.read_buffer_len(), 0);
}

#[test]
fn same_bank_accesses_never_share_a_cycle() {
    let config = dual_port_config();
    let mut ctrl = controller(&config);

    let (warm, done) = tracked(ReqType::Read, addr(0, 0, 0));
    ctrl.send(warm).unwrap();
    run_until_done(&mut ctrl, &done, 100);
    assert_eq!(ctrl.pending_len(), 0);

    ctrl.send(plain(ReqType::Read, addr(0, 0, 1))).unwrap();
    ctrl.send(plain(ReqType::Read, addr(0, 0, 2))).unwrap();
    ctrl.tick();
    // Both are ready row hits, but they target the same bank: one per cycle.
    assert_eq!(ctrl.pending_len(), 1);
    ctrl.tick();
    assert_eq!(ctrl.pending_len(), 2);
}

// ══════════════════════════════════════════════════════════
// 5. Completion serialization
// ══════════════════════════════════════════════════════════

#[test]
fn at_most_one_pending_completion_per_cycle() {
    let config = Config::default();
    let mut ctrl = controller(&config);

    // A buffered write and two forwarded reads due on the same cycle.
    ctrl.send(plain(ReqType::Write, addr(6, 1, 0))).unwrap();
    ctrl.send(plain(ReqType::Read, addr(6, 1, 0))).unwrap();
    ctrl.send(plain(ReqType::Read, addr(6, 1, 0))).unwrap();
    assert_eq!(ctrl.pending_len(), 2);

    ctrl.tick();
    assert_eq!(ctrl.pending_len(), 1);
    ctrl.tick();
    assert_eq!(ctrl.pending_len(), 0);
}

// ══════════════════════════════════════════════════════════
// 6. Dual-watermark mode switch
// ══════════════════════════════════════════════════════════

#[test]
fn watermarks_move_the_controller_between_read_and_write_mode() {
    let mut config = Config::default();
    config.controller.write_buffer_size = 4; // high watermark at 3.2, low at 0.8
    let mut ctrl = controller(&config);

    let (read, done_read) = tracked(ReqType::Read, addr(0, 0, 0));
    ctrl.send(read).unwrap();
    for col in 0..4 {
        ctrl.send(plain(ReqType::Write, addr(1, 0, col))).unwrap();
    }

    assert!(!ctrl.is_write_mode());
    ctrl.tick();
    // Four buffered writes exceed the high watermark even with a read queued.
    assert!(ctrl.is_write_mode());

    while ctrl.write_buffer_len() > 0 {
        ctrl.tick();
    }
    assert!(ctrl.is_write_mode());
    ctrl.tick();
    // Drained below the low watermark with a read waiting: back to reads.
    assert!(!ctrl.is_write_mode());

    run_until_done(&mut ctrl, &done_read, 200);
    assert!(done_read.get() > 0);
    assert_eq!(ctrl.stats.write_row_misses, 1);
    assert_eq!(ctrl.stats.write_row_hits, 3);
    assert_eq!(ctrl.stats.read_row_misses, 1);
}

// ══════════════════════════════════════════════════════════
// 7. Scheduler ordering
// ══════════════════════════════════════════════════════════

#[test]
fn frfcfs_prefers_ready_then_older() {
    let mut dram = StackedDram::new(&Config::default().device).unwrap();
    dram.issue_command(Command::Act, &addr(0, 0, 0));
    while dram.clk() < 10 {
        dram.tick();
    }

    let mut ready = plain(ReqType::Read, addr(0, 0, 0)); // RD ready at clk 10
    ready.arrive = 5;
    let mut blocked = plain(ReqType::Read, addr(0, 1, 0));
    blocked.command = Command::Act; // fenced by nRC until clk 34
    blocked.arrive = 1;

    let scheduler = FrFcfs;
    assert_eq!(scheduler.compare(&dram, &ready, &blocked), Candidate::First);
    assert_eq!(scheduler.compare(&dram, &blocked, &ready), Candidate::Second);

    let mut older = plain(ReqType::Read, addr(0, 0, 1));
    older.arrive = 3;
    assert_eq!(scheduler.compare(&dram, &ready, &older), Candidate::Second);
}

// ══════════════════════════════════════════════════════════
// 8. Statistics finalization
// ══════════════════════════════════════════════════════════

#[test]
fn finalize_derives_averages_from_sums() {
    let config = Config::default();
    let mut ctrl = controller(&config);

    let (req, done) = tracked(ReqType::Read, addr(3, 7, 0));
    ctrl.send(req).unwrap();
    run_until_done(&mut ctrl, &done, 100);
    ctrl.finalize();

    // One read, 22 cycles of latency, over 22 elapsed cycles.
    assert_eq!(ctrl.stats.read_latency, 22);
    assert!((ctrl.stats.avg_read_latency - 22.0).abs() < f64::EPSILON);
    assert!(ctrl.stats.queue_len_avg > 0.0);
}
