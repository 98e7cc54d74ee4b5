//! Mono3D stacked-DRAM simulator CLI.
//!
//! This binary drives the bank-parallel controller with a synthetic request
//! stream and prints the per-channel statistics report. It performs:
//! 1. **Configuration:** Built-in Mono3D defaults, or a JSON file.
//! 2. **Workload:** Interleaved reads and writes swept across banks and rows.
//! 3. **Simulation:** Feeds requests with retry-on-full, ticks until drained.

use std::cell::Cell;
use std::process;
use std::rc::Rc;

use clap::Parser;
use log::info;

use mono3d_core::common::{AddrVec, Level};
use mono3d_core::{BankParallelController, Config, ReqType, Request};

#[derive(Parser, Debug)]
#[command(
    name = "mono3d",
    version,
    about = "Cycle-accurate Mono3D stacked-DRAM simulator",
    long_about = "Runs a synthetic read/write stream through the bank-parallel\n\
                  controller and reports row-buffer, queue, and latency statistics.\n\n\
                  Examples:\n  mono3d --reads 10000 --writes 2000\n  mono3d --config mono3d.json --ports 2"
)]
struct Cli {
    /// JSON configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Number of synthetic read requests.
    #[arg(long, default_value_t = 10_000)]
    reads: u64,

    /// Number of synthetic write requests.
    #[arg(long, default_value_t = 2_000)]
    writes: u64,

    /// Row stride between consecutive requests on a bank; 0 stays in one row.
    #[arg(long, default_value_t = 1)]
    stride: i64,

    /// Override bank_parallel_ports_per_layer.
    #[arg(long)]
    ports: Option<u32>,

    /// Safety cap on simulated cycles.
    #[arg(long, default_value_t = 10_000_000)]
    max_cycles: u64,
}

fn load_config(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("error reading config {}: {}", path, e);
                process::exit(1);
            });
            serde_json::from_str(&text).unwrap_or_else(|e| {
                eprintln!("error parsing config {}: {}", path, e);
                process::exit(1);
            })
        }
        None => Config::default(),
    };
    if let Some(ports) = cli.ports {
        config.controller.bank_parallel_ports_per_layer = ports;
    }
    config
}

/// Spreads request `i` across banks round-robin, walking rows by `stride`.
fn synthetic_addr(i: u64, stride: i64, banks: i64, rows: i64, columns: i64) -> AddrVec {
    let bank = (i as i64) % banks;
    let round = (i as i64) / banks;
    let row = (round * stride).rem_euclid(rows.max(1));
    let column = round.rem_euclid(columns.max(1));
    [0, 0, 0, bank, row, column]
}

fn flat_addr(v: &AddrVec) -> i64 {
    (v[Level::Bank.index()] << 40) | (v[Level::Row.index()] << 16) | v[Level::Column.index()]
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli);

    let mut ctrl = match BankParallelController::new(&config, 0, 1) {
        Ok(ctrl) => ctrl,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            process::exit(1);
        }
    };

    let banks = ctrl.dram.organization.count[Level::Bank.index()];
    let rows = ctrl.dram.organization.count[Level::Row.index()];
    let columns = ctrl.dram.organization.count[Level::Column.index()];
    let total = cli.reads + cli.writes;
    let completed = Rc::new(Cell::new(0u64));

    info!(
        "workload: {} reads, {} writes over {} banks (stride {})",
        cli.reads, cli.writes, banks, cli.stride
    );

    // Interleave writes among reads at an even spacing.
    let write_every = if cli.writes > 0 { (total / cli.writes).max(1) } else { u64::MAX };
    let mut submitted = 0u64;
    let mut retry: Option<Request> = None;

    while completed.get() < total && (ctrl.clk() as u64) < cli.max_cycles {
        loop {
            let req = match retry.take() {
                Some(req) => req,
                None if submitted < total => {
                    let type_id = if submitted % write_every == write_every - 1 {
                        ReqType::Write
                    } else {
                        ReqType::Read
                    };
                    let addr_vec = synthetic_addr(submitted, cli.stride, banks, rows, columns);
                    let completed = Rc::clone(&completed);
                    Request::with_callback(
                        flat_addr(&addr_vec),
                        addr_vec,
                        type_id,
                        0,
                        Box::new(move |_| completed.set(completed.get() + 1)),
                    )
                }
                None => break,
            };
            match ctrl.send(req) {
                Ok(()) => submitted += 1,
                Err(rejected) => {
                    retry = Some(rejected);
                    break;
                }
            }
        }
        ctrl.tick();
    }

    ctrl.finalize();
    println!(
        "simulated {} cycles, completed {} of {} requests",
        ctrl.clk(),
        completed.get(),
        total
    );
    ctrl.stats.print(ctrl.channel_id());
}
