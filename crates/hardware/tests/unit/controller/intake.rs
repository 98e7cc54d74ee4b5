//! Controller Intake Tests.
//!
//! Verifies `send` and `priority_send`: request counting, buffer-full
//! rejection, the write-to-read forwarding bypass, and the unsupported-type
//! contract.

use mono3d_core::{Config, ReqType};

use crate::common::{addr, controller, plain, tracked};

// ══════════════════════════════════════════════════════════
// 1. Rejection and counting
// ══════════════════════════════════════════════════════════

#[test]
fn full_buffer_rejects_and_clears_the_arrival_stamp() {
    let mut config = Config::default();
    config.controller.write_buffer_size = 2;
    let mut ctrl = controller(&config);

    assert!(ctrl.send(plain(ReqType::Write, addr(0, 0, 0))).is_ok());
    assert!(ctrl.send(plain(ReqType::Write, addr(0, 0, 1))).is_ok());
    let rejected = ctrl.send(plain(ReqType::Write, addr(0, 0, 2))).unwrap_err();
    assert_eq!(rejected.arrive, -1);
    assert_eq!(ctrl.write_buffer_len(), 2);
    // Rejected sends still count at intake.
    assert_eq!(ctrl.stats.num_write_reqs, 3);
}

#[test]
fn accepted_requests_are_stamped_with_the_current_cycle() {
    let config = Config::default();
    let mut ctrl = controller(&config);
    for _ in 0..5 {
        ctrl.tick();
    }
    assert!(ctrl.send(plain(ReqType::Read, addr(1, 2, 3))).is_ok());
    assert_eq!(ctrl.read_buffer_len(), 1);
    assert_eq!(ctrl.stats.num_read_reqs, 1);
}

#[test]
#[should_panic(expected = "invalid request type")]
fn other_request_types_are_a_fatal_contract_violation() {
    let config = Config::default();
    let mut ctrl = controller(&config);
    let _ = ctrl.send(plain(ReqType::Other, addr(0, 0, 0)));
}

// ══════════════════════════════════════════════════════════
// 2. Write-to-read forwarding
// ══════════════════════════════════════════════════════════

#[test]
fn read_hitting_a_buffered_write_bypasses_the_device() {
    let config = Config::default();
    let mut ctrl = controller(&config);

    let write = plain(ReqType::Write, addr(2, 5, 3));
    ctrl.send(write).unwrap();

    let (read, done) = tracked(ReqType::Read, addr(2, 5, 3));
    ctrl.send(read).unwrap();
    // Forwarded data departs next cycle, without entering the read buffer.
    assert_eq!(ctrl.read_buffer_len(), 0);
    assert_eq!(ctrl.pending_len(), 1);

    ctrl.tick();
    assert_eq!(done.get(), 1);
    // The bypassed read never had an arrival stamp; the latency counter
    // credits depart - arrive = 2 regardless.
    assert_eq!(ctrl.stats.read_latency, 2);
}

#[test]
fn read_to_a_different_address_is_not_forwarded() {
    let config = Config::default();
    let mut ctrl = controller(&config);
    ctrl.send(plain(ReqType::Write, addr(2, 5, 3))).unwrap();
    ctrl.send(plain(ReqType::Read, addr(2, 5, 4))).unwrap();
    assert_eq!(ctrl.read_buffer_len(), 1);
    assert_eq!(ctrl.pending_len(), 0);
}

// ══════════════════════════════════════════════════════════
// 3. Priority intake
// ══════════════════════════════════════════════════════════

#[test]
fn priority_send_enqueues_without_forwarding() {
    let config = Config::default();
    let mut ctrl = controller(&config);
    ctrl.send(plain(ReqType::Write, addr(2, 5, 3))).unwrap();
    ctrl.priority_send(plain(ReqType::Read, addr(2, 5, 3))).unwrap();
    // Same flat address, but the priority path never bypasses.
    assert_eq!(ctrl.priority_buffer_len(), 1);
    assert_eq!(ctrl.pending_len(), 0);
}
