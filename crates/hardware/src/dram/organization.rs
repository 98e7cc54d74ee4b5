//! Device organization: level counts, width, and density.

use crate::common::{ConfigError, Level, NUM_LEVELS};
use crate::config::OrgConfig;

/// Resolved device organization.
///
/// `count` holds the number of children at each hierarchy level; `dq` is the
/// data-bus width in bits and `density` the per-channel capacity in Mb.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Organization {
    pub count: [i64; NUM_LEVELS],
    pub dq: i64,
    pub density: i64,
}

/// Default data-bus width in bits when neither a preset nor `org.dq` sets it.
const DEFAULT_DQ: i64 = 256;

/// Looks up an organization preset by name.
fn preset(name: &str) -> Option<Organization> {
    match name {
        // 1 channel, 1 rank, 1 bank group, 8 banks, 1024 rows, 256 columns.
        "Mono3D_DefaultOrg" => Some(Organization {
            count: [1, 1, 1, 8, 1 << 10, 1 << 8],
            dq: 256,
            density: 0,
        }),
        _ => None,
    }
}

impl Organization {
    /// Resolves the organization from its configuration section.
    ///
    /// Resolution order: preset, then explicit `dq`, then explicit per-level
    /// counts, then explicit density. Every level must end up specified, and a
    /// provided density must agree with the one computed from the counts.
    pub fn resolve(cfg: &OrgConfig) -> Result<Self, ConfigError> {
        let mut org = Organization {
            count: [-1; NUM_LEVELS],
            dq: -1,
            density: 0,
        };

        if let Some(name) = &cfg.preset {
            org = preset(name).ok_or_else(|| ConfigError::UnknownOrgPreset(name.clone()))?;
        }

        if let Some(dq) = cfg.dq {
            org.dq = dq;
        }
        if org.dq < 0 {
            org.dq = DEFAULT_DQ;
        }

        for level in Level::ALL {
            if let Some(count) = cfg.level_count(level) {
                org.count[level.index()] = count;
            }
        }

        for level in Level::ALL {
            if org.count[level.index()] < 0 {
                return Err(ConfigError::MissingOrgLevel(level.name()));
            }
        }

        let computed = org.computed_density_mb();
        match cfg.density {
            Some(provided) if provided > 0 => {
                if provided != computed {
                    return Err(ConfigError::DensityMismatch { provided, computed });
                }
                org.density = provided;
            }
            _ => org.density = computed,
        }

        Ok(org)
    }

    /// Per-channel density in Mb implied by the level counts and bus width.
    pub fn computed_density_mb(&self) -> i64 {
        let bits = self.count[Level::Rank.index()]
            * self.count[Level::BankGroup.index()]
            * self.count[Level::Bank.index()]
            * self.count[Level::Row.index()]
            * self.count[Level::Column.index()]
            * self.dq;
        bits >> 20
    }

    /// Number of children below `level` on the materialized part of the tree.
    pub fn children_of(&self, level: Level) -> i64 {
        match level {
            Level::Channel => self.count[Level::Rank.index()],
            Level::Rank => self.count[Level::BankGroup.index()],
            Level::BankGroup => self.count[Level::Bank.index()],
            // Rows and columns are not materialized as nodes.
            Level::Bank | Level::Row | Level::Column => 0,
        }
    }
}
