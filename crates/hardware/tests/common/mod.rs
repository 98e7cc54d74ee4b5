//! Shared helpers for the simulator tests.

use std::cell::Cell;
use std::rc::Rc;

use mono3d_core::common::AddrVec;
use mono3d_core::{BankParallelController, Config, ReqType, Request};

/// Builds a single-channel address: channel 0, rank 0, bank group 0.
pub fn addr(bank: i64, row: i64, col: i64) -> AddrVec {
    [0, 0, 0, bank, row, col]
}

/// Packs an address vector into a distinct flat address for forwarding tests.
pub fn flat(v: &AddrVec) -> i64 {
    (v[3] << 40) | (v[4] << 16) | v[5]
}

/// A request whose completion cycle lands in the returned cell (-1 until it
/// departs).
pub fn tracked(type_id: ReqType, addr_vec: AddrVec) -> (Request, Rc<Cell<i64>>) {
    let done = Rc::new(Cell::new(-1));
    let done_cb = Rc::clone(&done);
    let req = Request::with_callback(
        flat(&addr_vec),
        addr_vec,
        type_id,
        -1,
        Box::new(move |r| done_cb.set(r.depart)),
    );
    (req, done)
}

/// A plain request with no callback.
pub fn plain(type_id: ReqType, addr_vec: AddrVec) -> Request {
    Request::new(flat(&addr_vec), addr_vec, type_id, -1)
}

/// A fresh single-core controller over the given configuration.
pub fn controller(config: &Config) -> BankParallelController {
    BankParallelController::new(config, 0, 1).expect("controller config")
}

/// Ticks the controller until `done` holds a completion cycle, up to `max`
/// cycles. Returns the recorded departure cycle.
pub fn run_until_done(ctrl: &mut BankParallelController, done: &Cell<i64>, max: usize) -> i64 {
    for _ in 0..max {
        if done.get() >= 0 {
            return done.get();
        }
        ctrl.tick();
    }
    done.get()
}
