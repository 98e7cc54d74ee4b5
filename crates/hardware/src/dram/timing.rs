//! Timing parameter resolution and the command-to-command constraint table.
//!
//! This module provides:
//! 1. **TimingVals:** The sixteen-entry timing vector, resolved from presets,
//!    cycle counts, and JEDEC-rounded nanosecond values.
//! 2. **TimingRule:** One row of the constraint table: at a given hierarchy
//!    level, commands in the preceding set fence commands in the following set
//!    by a latency, optionally across a sliding window of recent issues.

use crate::common::{ConfigError, Level};
use crate::config::TimingConfig;
use crate::dram::command::Command;

/// Names of the fourteen per-parameter timings, in vector order. `rate` and
/// `tCK_ps` bracket these and are resolved separately.
pub const TIMING_NAMES: [&str; 14] = [
    "nBL", "nCL", "nRCD", "nRP", "nRAS", "nRC", "nWR", "nRTP", "nCWL", "nWTR", "nRTW", "nCCDS",
    "nRRDS", "nFAW",
];

/// Resolved timing vector, in device cycles (`tck_ps` in picoseconds,
/// `rate` in MT/s).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingVals {
    pub rate: i64,
    pub n_bl: i64,
    pub n_cl: i64,
    pub n_rcd: i64,
    pub n_rp: i64,
    pub n_ras: i64,
    pub n_rc: i64,
    pub n_wr: i64,
    pub n_rtp: i64,
    pub n_cwl: i64,
    pub n_wtr: i64,
    pub n_rtw: i64,
    pub n_ccds: i64,
    pub n_rrds: i64,
    pub n_faw: i64,
    pub tck_ps: i64,
}

/// Looks up a timing preset by name. Entries are cycles except `rate` (MT/s)
/// and `tck_ps` (ps).
fn preset(name: &str) -> Option<TimingVals> {
    match name {
        "Mono3D_Default" => Some(TimingVals {
            rate: 2000,
            n_bl: 1,
            n_cl: 10,
            n_rcd: 10,
            n_rp: 10,
            n_ras: 24,
            n_rc: 34,
            n_wr: 10,
            n_rtp: 5,
            n_cwl: 8,
            n_wtr: 5,
            n_rtw: 5,
            n_ccds: 1,
            n_rrds: 4,
            n_faw: 16,
            tck_ps: 1000,
        }),
        _ => None,
    }
}

/// Converts a nanosecond timing to cycles by JEDEC rounding: ceiling to the
/// next full cycle, with an epsilon so exact multiples do not round up.
pub fn jedec_round(t_ns: f64, tck_ps: i64) -> i64 {
    (t_ns * 1000.0 / tck_ps as f64 - 0.001).ceil() as i64
}

impl TimingVals {
    /// Resolves the timing vector from its configuration section.
    ///
    /// A preset fixes all entries; `rate` is rejected alongside a preset but
    /// otherwise derives `tCK_ps = 10^6 / (rate/2)`. Each parameter then takes
    /// its explicit cycle count if given, else its nanosecond value JEDEC-
    /// rounded with the current `tCK_ps`. An explicit `tCK_ps` is applied after
    /// the nanosecond conversions. Anything still unset is an error.
    pub fn resolve(cfg: &TimingConfig) -> Result<Self, ConfigError> {
        let mut rate: i64 = -1;
        let mut tck_ps: i64 = -1;
        let mut vals: [i64; TIMING_NAMES.len()] = [-1; TIMING_NAMES.len()];

        let mut preset_provided = false;
        if let Some(name) = &cfg.preset {
            let p = preset(name).ok_or_else(|| ConfigError::UnknownTimingPreset(name.clone()))?;
            rate = p.rate;
            tck_ps = p.tck_ps;
            vals = [
                p.n_bl, p.n_cl, p.n_rcd, p.n_rp, p.n_ras, p.n_rc, p.n_wr, p.n_rtp, p.n_cwl,
                p.n_wtr, p.n_rtw, p.n_ccds, p.n_rrds, p.n_faw,
            ];
            preset_provided = true;
        }

        if let Some(r) = cfg.rate {
            if preset_provided {
                return Err(ConfigError::RateWithTimingPreset);
            }
            rate = r;
        }
        if rate != -1 {
            tck_ps = 1_000_000 / (rate / 2);
        }

        for (i, name) in TIMING_NAMES.iter().enumerate() {
            if let Some(cycles) = cfg.cycles(name) {
                vals[i] = cycles;
            } else if tck_ps != -1 {
                if let Some(ns) = cfg.nanos(name) {
                    vals[i] = jedec_round(ns, tck_ps);
                }
            }
        }

        if let Some(t) = cfg.tck_ps {
            tck_ps = t;
        }

        for (i, name) in TIMING_NAMES.iter().enumerate() {
            if vals[i] == -1 {
                return Err(ConfigError::MissingTiming(name));
            }
        }
        if rate == -1 {
            return Err(ConfigError::MissingTiming("rate"));
        }
        if tck_ps == -1 {
            return Err(ConfigError::MissingTiming("tCK_ps"));
        }

        Ok(TimingVals {
            rate,
            n_bl: vals[0],
            n_cl: vals[1],
            n_rcd: vals[2],
            n_rp: vals[3],
            n_ras: vals[4],
            n_rc: vals[5],
            n_wr: vals[6],
            n_rtp: vals[7],
            n_cwl: vals[8],
            n_wtr: vals[9],
            n_rtw: vals[10],
            n_ccds: vals[11],
            n_rrds: vals[12],
            n_faw: vals[13],
            tck_ps,
        })
    }

    /// Cycles from RD issue to data availability.
    pub fn read_latency(&self) -> i64 {
        self.n_cl + self.n_bl
    }
}

/// One row of the timing constraint table.
///
/// Issuing any command in `preceding` at cycle `t` on an address fences every
/// command in `following` at the `level` node of that address to
/// `t + latency`. A rule with `window > 1` instead fences from the oldest of
/// the last `window` issues, implementing sliding-window limits such as the
/// four-activate window.
#[derive(Clone, Debug)]
pub struct TimingRule {
    pub level: Level,
    pub preceding: &'static [Command],
    pub following: &'static [Command],
    pub latency: i64,
    pub window: usize,
}

const ACT: &[Command] = &[Command::Act];
const PRE: &[Command] = &[Command::Pre];
const RD_ANY: &[Command] = &[Command::Rd, Command::Rda];
const WR_ANY: &[Command] = &[Command::Wr, Command::Wra];
const RD_ONLY: &[Command] = &[Command::Rd];
const WR_ONLY: &[Command] = &[Command::Wr];
const RDA_ONLY: &[Command] = &[Command::Rda];
const WRA_ONLY: &[Command] = &[Command::Wra];
const ACCESS: &[Command] = &[Command::Rd, Command::Rda, Command::Wr, Command::Wra];

/// Builds the constraint table from a resolved timing vector.
pub fn constraint_table(t: &TimingVals) -> Vec<TimingRule> {
    let rule = |level, preceding, following, latency| TimingRule {
        level,
        preceding,
        following,
        latency,
        window: 1,
    };

    vec![
        // Channel (layer): ACT spacing across banks, and the 4-ACT window.
        rule(Level::Channel, ACT, ACT, t.n_rrds),
        TimingRule {
            level: Level::Channel,
            preceding: ACT,
            following: ACT,
            latency: t.n_faw,
            window: 4,
        },
        // Data bus occupancy.
        rule(Level::Channel, RD_ANY, RD_ANY, t.n_bl),
        rule(Level::Channel, WR_ANY, WR_ANY, t.n_bl),
        // CAS-to-CAS minimum gap.
        rule(Level::Channel, RD_ANY, RD_ANY, t.n_ccds),
        rule(Level::Channel, WR_ANY, WR_ANY, t.n_ccds),
        // Read/write turnarounds.
        rule(Level::Channel, RD_ANY, WR_ANY, t.n_rtw),
        rule(Level::Channel, WR_ANY, RD_ANY, t.n_wtr),
        // Bank.
        rule(Level::Bank, ACT, ACT, t.n_rc),
        rule(Level::Bank, ACT, ACCESS, t.n_rcd),
        rule(Level::Bank, ACT, PRE, t.n_ras),
        rule(Level::Bank, PRE, ACT, t.n_rp),
        rule(Level::Bank, RD_ONLY, PRE, t.n_rtp),
        rule(Level::Bank, WR_ONLY, PRE, t.n_cwl + t.n_bl + t.n_wr),
        rule(Level::Bank, RDA_ONLY, ACT, t.n_rtp + t.n_rp),
        rule(Level::Bank, WRA_ONLY, ACT, t.n_cwl + t.n_bl + t.n_wr + t.n_rp),
    ]
}
