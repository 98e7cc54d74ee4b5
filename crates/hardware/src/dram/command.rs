//! DRAM command set and per-command metadata.

use std::fmt;

use crate::common::Level;

/// Number of distinct DRAM commands.
pub const NUM_COMMANDS: usize = 6;

/// A DRAM command.
///
/// `Rda` and `Wra` are the auto-precharge variants: they perform the access
/// and close the row in one command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Act,
    Pre,
    Rd,
    Wr,
    Rda,
    Wra,
}

impl Command {
    /// All commands, in table order.
    pub const ALL: [Command; NUM_COMMANDS] = [
        Command::Act,
        Command::Pre,
        Command::Rd,
        Command::Wr,
        Command::Rda,
        Command::Wra,
    ];

    /// Index of this command into per-command tables.
    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// True when this command opens a row.
    #[inline]
    pub fn is_opening(self) -> bool {
        matches!(self, Command::Act)
    }

    /// True when this command closes a row (precharge or auto-precharge).
    #[inline]
    pub fn is_closing(self) -> bool {
        matches!(self, Command::Pre | Command::Rda | Command::Wra)
    }

    /// True when this command moves data over the column interface.
    #[inline]
    pub fn is_accessing(self) -> bool {
        matches!(self, Command::Rd | Command::Wr | Command::Rda | Command::Wra)
    }

    /// The hierarchy level this command names in its address.
    pub fn scope(self) -> Level {
        match self {
            Command::Act => Level::Row,
            Command::Pre => Level::Bank,
            Command::Rd | Command::Wr | Command::Rda | Command::Wra => Level::Column,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Act => "ACT",
            Command::Pre => "PRE",
            Command::Rd => "RD",
            Command::Wr => "WR",
            Command::Rda => "RDA",
            Command::Wra => "WRA",
        };
        f.write_str(name)
    }
}
