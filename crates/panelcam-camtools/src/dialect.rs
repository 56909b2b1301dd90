//! Controller dialects and post-processing of raw engine output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target controller of a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// GRBL
    #[default]
    Grbl,
    /// LinuxCNC
    LinuxCnc,
}

impl Dialect {
    /// Name written into the program header
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grbl => "grbl",
            Self::LinuxCnc => "linuxcnc",
        }
    }

    /// Rewrite raw engine output for this controller.
    ///
    /// GRBL rejects the two preamble lines after the banner, so lines 1 and 2
    /// are dropped by position; everything else passes through unchanged.
    pub fn postprocess(&self, raw: &str) -> String {
        match self {
            Self::Grbl => {
                let lines: Vec<&str> = raw.split('\n').collect();
                lines
                    .iter()
                    .take(1)
                    .chain(lines.iter().skip(3))
                    .copied()
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Self::LinuxCnc => raw.to_string(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grbl" => Ok(Self::Grbl),
            "linuxcnc" | "linux_cnc" => Ok(Self::LinuxCnc),
            _ => Err(format!("Unknown dialect: {}", s)),
        }
    }
}
