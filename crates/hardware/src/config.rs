//! Configuration system for the simulator.
//!
//! This module defines all configuration structures used to parameterize the
//! device and controller. It provides:
//! 1. **Defaults:** Baseline constants (presets, widths, watermarks, buffer sizes).
//! 2. **Structures:** Hierarchical config for the device (organization, timing)
//!    and the controller (watermarks, issue ports, buffers, plugins).
//!
//! Configuration is supplied as JSON (`serde_json`) or built with
//! `Config::default()`, which selects the Mono3D presets. Resolution into
//! runnable values happens in [`crate::dram::Organization::resolve`] and
//! [`crate::dram::TimingVals::resolve`]; all validation errors are raised
//! there, before any simulation state exists.

use serde::Deserialize;

use crate::common::Level;

/// Default configuration constants.
mod defaults {
    /// Organization preset selected by `Config::default()`.
    pub const ORG_PRESET: &str = "Mono3D_DefaultOrg";

    /// Timing preset selected by `Config::default()`.
    pub const TIMING_PRESET: &str = "Mono3D_Default";

    /// Channel interface width in bits.
    pub const CHANNEL_WIDTH: i64 = 256;

    /// Internal prefetch size (column bursts per access).
    pub const PREFETCH_SIZE: i64 = 1;

    /// Write-buffer occupancy fraction below which the controller returns to
    /// read mode.
    pub const WR_LOW_WATERMARK: f64 = 0.2;

    /// Write-buffer occupancy fraction above which the controller switches to
    /// write mode.
    pub const WR_HIGH_WATERMARK: f64 = 0.8;

    /// Commands the controller may issue per cycle.
    pub const BANK_PARALLEL_PORTS: u32 = 1;

    /// Capacity of the read and write request buffers.
    pub const RW_BUFFER_SIZE: usize = 32;

    /// Capacity of the active (row-opening-in-progress) buffer.
    pub const ACTIVE_BUFFER_SIZE: usize = 32;

    /// Capacity of the high-priority buffer.
    pub const PRIORITY_BUFFER_SIZE: usize = 512 * 3 + 32;
}

pub(crate) use defaults::{ACTIVE_BUFFER_SIZE, PRIORITY_BUFFER_SIZE};

/// Root configuration.
///
/// # Examples
///
/// Deserializing from JSON:
///
/// ```
/// use mono3d_core::config::Config;
///
/// let json = r#"{
///     "device": {
///         "org": { "preset": "Mono3D_DefaultOrg", "channel": 2 },
///         "timing": { "preset": "Mono3D_Default", "nRRDS": 3 }
///     },
///     "controller": { "bank_parallel_ports_per_layer": 2 }
/// }"#;
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.device.org.channel, Some(2));
/// assert_eq!(config.controller.bank_parallel_ports_per_layer, 2);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Device organization and timing.
    #[serde(default)]
    pub device: DeviceConfig,
    /// Per-channel controller parameters.
    #[serde(default)]
    pub controller: ControllerConfig,
}

/// Device configuration: organization plus timing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub org: OrgConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Organization section.
///
/// The Rust `Default` selects the Mono3D organization preset. A section given
/// explicitly in JSON starts empty instead: it must name a preset or supply
/// every level count itself.
#[derive(Debug, Clone, Deserialize)]
pub struct OrgConfig {
    #[serde(default)]
    pub preset: Option<String>,

    #[serde(default)]
    pub channel: Option<i64>,
    #[serde(default)]
    pub rank: Option<i64>,
    #[serde(default)]
    pub bankgroup: Option<i64>,
    #[serde(default)]
    pub bank: Option<i64>,
    #[serde(default)]
    pub row: Option<i64>,
    #[serde(default)]
    pub column: Option<i64>,

    /// Data-bus width in bits.
    #[serde(default)]
    pub dq: Option<i64>,

    /// Channel interface width in bits.
    #[serde(default = "OrgConfig::default_channel_width")]
    pub channel_width: i64,

    /// Internal prefetch size.
    #[serde(default = "OrgConfig::default_prefetch_size")]
    pub prefetch_size: i64,

    /// Per-channel density in Mb, checked against the level counts.
    #[serde(default)]
    pub density: Option<i64>,
}

impl OrgConfig {
    fn default_channel_width() -> i64 {
        defaults::CHANNEL_WIDTH
    }

    fn default_prefetch_size() -> i64 {
        defaults::PREFETCH_SIZE
    }

    /// An organization section with nothing specified.
    pub fn empty() -> Self {
        Self {
            preset: None,
            channel: None,
            rank: None,
            bankgroup: None,
            bank: None,
            row: None,
            column: None,
            dq: None,
            channel_width: defaults::CHANNEL_WIDTH,
            prefetch_size: defaults::PREFETCH_SIZE,
            density: None,
        }
    }

    /// The configured count for `level`, if any.
    pub fn level_count(&self, level: Level) -> Option<i64> {
        match level {
            Level::Channel => self.channel,
            Level::Rank => self.rank,
            Level::BankGroup => self.bankgroup,
            Level::Bank => self.bank,
            Level::Row => self.row,
            Level::Column => self.column,
        }
    }
}

impl Default for OrgConfig {
    fn default() -> Self {
        Self {
            preset: Some(defaults::ORG_PRESET.to_string()),
            ..Self::empty()
        }
    }
}

/// Timing section.
///
/// Each parameter may be given in cycles (`nX`) or nanoseconds (`tX`); cycles
/// win, nanoseconds are JEDEC-rounded at the effective `tCK_ps`. The Rust
/// `Default` selects the Mono3D timing preset.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    #[serde(default)]
    pub preset: Option<String>,

    /// Transfer rate in MT/s; exclusive with a preset.
    #[serde(default)]
    pub rate: Option<i64>,

    /// Clock period override in picoseconds.
    #[serde(default, rename = "tCK_ps")]
    pub tck_ps: Option<i64>,

    #[serde(default, rename = "nBL")]
    pub n_bl: Option<i64>,
    #[serde(default, rename = "tBL")]
    pub t_bl: Option<f64>,
    #[serde(default, rename = "nCL")]
    pub n_cl: Option<i64>,
    #[serde(default, rename = "tCL")]
    pub t_cl: Option<f64>,
    #[serde(default, rename = "nRCD")]
    pub n_rcd: Option<i64>,
    #[serde(default, rename = "tRCD")]
    pub t_rcd: Option<f64>,
    #[serde(default, rename = "nRP")]
    pub n_rp: Option<i64>,
    #[serde(default, rename = "tRP")]
    pub t_rp: Option<f64>,
    #[serde(default, rename = "nRAS")]
    pub n_ras: Option<i64>,
    #[serde(default, rename = "tRAS")]
    pub t_ras: Option<f64>,
    #[serde(default, rename = "nRC")]
    pub n_rc: Option<i64>,
    #[serde(default, rename = "tRC")]
    pub t_rc: Option<f64>,
    #[serde(default, rename = "nWR")]
    pub n_wr: Option<i64>,
    #[serde(default, rename = "tWR")]
    pub t_wr: Option<f64>,
    #[serde(default, rename = "nRTP")]
    pub n_rtp: Option<i64>,
    #[serde(default, rename = "tRTP")]
    pub t_rtp: Option<f64>,
    #[serde(default, rename = "nCWL")]
    pub n_cwl: Option<i64>,
    #[serde(default, rename = "tCWL")]
    pub t_cwl: Option<f64>,
    #[serde(default, rename = "nWTR")]
    pub n_wtr: Option<i64>,
    #[serde(default, rename = "tWTR")]
    pub t_wtr: Option<f64>,
    #[serde(default, rename = "nRTW")]
    pub n_rtw: Option<i64>,
    #[serde(default, rename = "tRTW")]
    pub t_rtw: Option<f64>,
    #[serde(default, rename = "nCCDS")]
    pub n_ccds: Option<i64>,
    #[serde(default, rename = "tCCDS")]
    pub t_ccds: Option<f64>,
    #[serde(default, rename = "nRRDS")]
    pub n_rrds: Option<i64>,
    #[serde(default, rename = "tRRDS")]
    pub t_rrds: Option<f64>,
    #[serde(default, rename = "nFAW")]
    pub n_faw: Option<i64>,
    #[serde(default, rename = "tFAW")]
    pub t_faw: Option<f64>,
}

impl TimingConfig {
    /// A timing section with nothing specified.
    pub fn empty() -> Self {
        Self {
            preset: None,
            rate: None,
            tck_ps: None,
            n_bl: None,
            t_bl: None,
            n_cl: None,
            t_cl: None,
            n_rcd: None,
            t_rcd: None,
            n_rp: None,
            t_rp: None,
            n_ras: None,
            t_ras: None,
            n_rc: None,
            t_rc: None,
            n_wr: None,
            t_wr: None,
            n_rtp: None,
            t_rtp: None,
            n_cwl: None,
            t_cwl: None,
            n_wtr: None,
            t_wtr: None,
            n_rtw: None,
            t_rtw: None,
            n_ccds: None,
            t_ccds: None,
            n_rrds: None,
            t_rrds: None,
            n_faw: None,
            t_faw: None,
        }
    }

    /// The cycle-count form of the named parameter, if configured.
    pub fn cycles(&self, name: &str) -> Option<i64> {
        match name {
            "nBL" => self.n_bl,
            "nCL" => self.n_cl,
            "nRCD" => self.n_rcd,
            "nRP" => self.n_rp,
            "nRAS" => self.n_ras,
            "nRC" => self.n_rc,
            "nWR" => self.n_wr,
            "nRTP" => self.n_rtp,
            "nCWL" => self.n_cwl,
            "nWTR" => self.n_wtr,
            "nRTW" => self.n_rtw,
            "nCCDS" => self.n_ccds,
            "nRRDS" => self.n_rrds,
            "nFAW" => self.n_faw,
            _ => None,
        }
    }

    /// The nanosecond form of the named parameter, if configured.
    pub fn nanos(&self, name: &str) -> Option<f64> {
        match name {
            "nBL" => self.t_bl,
            "nCL" => self.t_cl,
            "nRCD" => self.t_rcd,
            "nRP" => self.t_rp,
            "nRAS" => self.t_ras,
            "nRC" => self.t_rc,
            "nWR" => self.t_wr,
            "nRTP" => self.t_rtp,
            "nCWL" => self.t_cwl,
            "nWTR" => self.t_wtr,
            "nRTW" => self.t_rtw,
            "nCCDS" => self.t_ccds,
            "nRRDS" => self.t_rrds,
            "nFAW" => self.t_faw,
            _ => None,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            preset: Some(defaults::TIMING_PRESET.to_string()),
            ..Self::empty()
        }
    }
}

/// Controller section.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    /// Write-buffer occupancy fraction for switching back to read mode.
    #[serde(default = "ControllerConfig::default_low_watermark")]
    pub wr_low_watermark: f64,

    /// Write-buffer occupancy fraction for switching to write mode.
    #[serde(default = "ControllerConfig::default_high_watermark")]
    pub wr_high_watermark: f64,

    /// Max commands issued per controller cycle; accessing commands are
    /// additionally constrained to distinct banks.
    #[serde(default = "ControllerConfig::default_ports")]
    pub bank_parallel_ports_per_layer: u32,

    /// Read buffer capacity.
    #[serde(default = "ControllerConfig::default_buffer_size")]
    pub read_buffer_size: usize,

    /// Write buffer capacity.
    #[serde(default = "ControllerConfig::default_buffer_size")]
    pub write_buffer_size: usize,

    /// Controller plugin specs, instantiated in order.
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

impl ControllerConfig {
    fn default_low_watermark() -> f64 {
        defaults::WR_LOW_WATERMARK
    }

    fn default_high_watermark() -> f64 {
        defaults::WR_HIGH_WATERMARK
    }

    fn default_ports() -> u32 {
        defaults::BANK_PARALLEL_PORTS
    }

    fn default_buffer_size() -> usize {
        defaults::RW_BUFFER_SIZE
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            wr_low_watermark: defaults::WR_LOW_WATERMARK,
            wr_high_watermark: defaults::WR_HIGH_WATERMARK,
            bank_parallel_ports_per_layer: defaults::BANK_PARALLEL_PORTS,
            read_buffer_size: defaults::RW_BUFFER_SIZE,
            write_buffer_size: defaults::RW_BUFFER_SIZE,
            plugins: Vec::new(),
        }
    }
}

/// One controller plugin spec.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    /// Plugin name; unknown names are a configuration error.
    pub name: String,
}
