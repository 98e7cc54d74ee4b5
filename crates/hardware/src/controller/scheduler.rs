//! Request scheduler seam.
//!
//! The controller finds its best candidate by folding a buffer through the
//! scheduler's pairwise `compare`. Implementations see the device so they can
//! rank on readiness.

use crate::controller::request::Request;
use crate::dram::StackedDram;

/// Which of two candidates wins a pairwise comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Candidate {
    First,
    Second,
}

/// Pairwise request comparison, folded over a buffer to pick the issue
/// candidate.
pub trait Scheduler {
    fn compare(&self, dram: &StackedDram, first: &Request, second: &Request) -> Candidate;
}

/// First-ready, first-come-first-served.
///
/// A request whose current prerequisite is issuable beats one whose is not;
/// between equals the earlier arrival wins.
pub struct FrFcfs;

impl Scheduler for FrFcfs {
    fn compare(&self, dram: &StackedDram, first: &Request, second: &Request) -> Candidate {
        let first_ready = dram.check_ready(first.command, &first.addr_vec);
        let second_ready = dram.check_ready(second.command, &second.addr_vec);
        if first_ready != second_ready {
            if first_ready {
                Candidate::First
            } else {
                Candidate::Second
            }
        } else if first.arrive <= second.arrive {
            Candidate::First
        } else {
            Candidate::Second
        }
    }
}
